use reqwest::Method;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, OnceLock};
use std::time::{Duration, Instant};

use super::clock::Clock;
use super::diagnostics::{DiagnosticsReport, DiagnosticsReporter};
use super::http::Endpoint;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionStatus {
    Remote,
    LocalOnly,
}

impl fmt::Display for ConnectionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConnectionStatus::Remote => write!(f, "remote connected"),
            ConnectionStatus::LocalOnly => write!(f, "local storage mode"),
        }
    }
}

struct ProbeState {
    available: bool,
    last_checked: Option<Instant>,
}

/// Cached view of whether the remote service is reachable.
///
/// Starts optimistic. A probe runs on the first `ensure_checked` and again
/// once `check_interval` has passed; in between the cached flag is returned
/// without touching the network. Concurrent callers at the expiry boundary
/// may both probe, which is harmless.
pub struct AvailabilityMonitor {
    endpoint: Endpoint,
    clock: Arc<dyn Clock>,
    check_interval: Duration,
    probe_timeout: Duration,
    state: Mutex<ProbeState>,
    diagnostics: Arc<DiagnosticsRun>,
}

/// The one-time diagnostics run, shared with the task that performs it.
struct DiagnosticsRun {
    reporter: DiagnosticsReporter,
    claimed: AtomicBool,
    report: OnceLock<DiagnosticsReport>,
}

impl DiagnosticsRun {
    fn claim(&self) -> bool {
        self.claimed
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_ok()
    }
}

impl AvailabilityMonitor {
    pub fn new(
        endpoint: Endpoint,
        clock: Arc<dyn Clock>,
        check_interval: Duration,
        probe_timeout: Duration,
        reporter: DiagnosticsReporter,
    ) -> Self {
        Self {
            endpoint,
            clock,
            check_interval,
            probe_timeout,
            state: Mutex::new(ProbeState {
                available: true,
                last_checked: None,
            }),
            diagnostics: Arc::new(DiagnosticsRun {
                reporter,
                claimed: AtomicBool::new(false),
                report: OnceLock::new(),
            }),
        }
    }

    pub fn is_available(&self) -> bool {
        self.state().available
    }

    pub fn status(&self) -> ConnectionStatus {
        if self.is_available() {
            ConnectionStatus::Remote
        } else {
            ConnectionStatus::LocalOnly
        }
    }

    /// Report from the one-time diagnostics run, once it has finished.
    pub fn diagnostics(&self) -> Option<&DiagnosticsReport> {
        self.diagnostics.report.get()
    }

    pub async fn ensure_checked(&self) -> bool {
        if !self.probe_due() {
            return self.is_available();
        }
        self.probe().await
    }

    /// Drops the cached result and probes right away.
    pub async fn force_recheck(&self) -> bool {
        self.state().last_checked = None;
        self.probe().await
    }

    /// Flips the cached flag without waiting for the next probe.
    pub fn mark_unavailable(&self, reason: &str) {
        let mut state = self.state();
        if state.available {
            tracing::warn!(reason, "Remote service marked unavailable");
        }
        state.available = false;
    }

    fn probe_due(&self) -> bool {
        let state = self.state();
        match state.last_checked {
            None => true,
            Some(at) => self.clock.now().saturating_duration_since(at) >= self.check_interval,
        }
    }

    async fn probe(&self) -> bool {
        // Stamp first so callers arriving mid-probe reuse the cached flag.
        self.state().last_checked = Some(self.clock.now());

        let available = match self
            .endpoint
            .request(Method::GET, "/health")
            .timeout(self.probe_timeout)
            .send()
            .await
        {
            Ok(response) if response.status().is_success() => true,
            Ok(response) => {
                tracing::debug!(status = %response.status(), "Health probe rejected");
                false
            }
            Err(e) => {
                tracing::debug!(error = %e, "Health probe failed");
                false
            }
        };

        self.set_available(available);
        if available {
            self.spawn_diagnostics_once();
        }
        available
    }

    fn set_available(&self, available: bool) {
        let mut state = self.state();
        if state.available != available {
            let status = if available {
                ConnectionStatus::Remote
            } else {
                ConnectionStatus::LocalOnly
            };
            tracing::info!(%status, base_url = %self.endpoint.base_url(), "Connection status changed");
        }
        state.available = available;
    }

    /// Diagnostics run in the background so the probing caller is not held up.
    fn spawn_diagnostics_once(&self) {
        if !self.diagnostics.claim() {
            return;
        }
        let run = self.diagnostics.clone();
        tokio::spawn(async move {
            let report = run.reporter.run().await;
            let _ = run.report.set(report);
        });
    }

    fn state(&self) -> MutexGuard<'_, ProbeState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::clock::ManualClock;
    use crate::client::test_support::{closed_port_url, spawn_health_stub};
    use chrono::Utc;

    fn monitor(base_url: &str, clock: Arc<ManualClock>) -> AvailabilityMonitor {
        let endpoint = Endpoint::new(reqwest::Client::new(), base_url, "test-key");
        let reporter = DiagnosticsReporter::new(endpoint.clone(), Duration::from_secs(10));
        AvailabilityMonitor::new(
            endpoint,
            clock,
            Duration::from_secs(30),
            Duration::from_secs(5),
            reporter,
        )
    }

    #[tokio::test]
    async fn test_starts_optimistic() {
        let clock = Arc::new(ManualClock::new(Utc::now()));
        let monitor = monitor(&closed_port_url().await, clock);
        assert!(monitor.is_available());
        assert_eq!(monitor.status(), ConnectionStatus::Remote);
    }

    #[tokio::test]
    async fn test_calls_within_interval_probe_once() {
        let stub = spawn_health_stub().await;
        let clock = Arc::new(ManualClock::new(Utc::now()));
        let monitor = monitor(&stub.base_url, clock.clone());

        assert!(monitor.ensure_checked().await);
        clock.advance(Duration::from_secs(29));
        assert!(monitor.ensure_checked().await);

        assert_eq!(stub.probes(), 1);
    }

    #[tokio::test]
    async fn test_probes_again_after_interval() {
        let stub = spawn_health_stub().await;
        let clock = Arc::new(ManualClock::new(Utc::now()));
        let monitor = monitor(&stub.base_url, clock.clone());

        monitor.ensure_checked().await;
        clock.advance(Duration::from_secs(30));
        monitor.ensure_checked().await;

        assert_eq!(stub.probes(), 2);
    }

    #[tokio::test]
    async fn test_force_recheck_ignores_cache() {
        let stub = spawn_health_stub().await;
        let clock = Arc::new(ManualClock::new(Utc::now()));
        let monitor = monitor(&stub.base_url, clock);

        monitor.ensure_checked().await;
        stub.set_healthy(false);
        assert!(!monitor.force_recheck().await);
        assert_eq!(stub.probes(), 2);
        assert_eq!(monitor.status(), ConnectionStatus::LocalOnly);
    }

    #[tokio::test]
    async fn test_unhealthy_status_marks_unavailable() {
        let stub = spawn_health_stub().await;
        stub.set_healthy(false);
        let clock = Arc::new(ManualClock::new(Utc::now()));
        let monitor = monitor(&stub.base_url, clock);

        assert!(!monitor.ensure_checked().await);
        assert!(!monitor.is_available());
    }

    #[tokio::test]
    async fn test_unreachable_service_never_errors() {
        let clock = Arc::new(ManualClock::new(Utc::now()));
        let monitor = monitor(&closed_port_url().await, clock);

        assert!(!monitor.ensure_checked().await);
        assert!(monitor.diagnostics().is_none());
    }

    #[tokio::test]
    async fn test_recovers_on_next_probe() {
        let stub = spawn_health_stub().await;
        stub.set_healthy(false);
        let clock = Arc::new(ManualClock::new(Utc::now()));
        let monitor = monitor(&stub.base_url, clock.clone());

        assert!(!monitor.ensure_checked().await);
        stub.set_healthy(true);
        clock.advance(Duration::from_secs(31));
        assert!(monitor.ensure_checked().await);
    }

    #[tokio::test]
    async fn test_mark_unavailable_keeps_cache_window() {
        let stub = spawn_health_stub().await;
        let clock = Arc::new(ManualClock::new(Utc::now()));
        let monitor = monitor(&stub.base_url, clock);

        monitor.ensure_checked().await;
        monitor.mark_unavailable("test");
        assert!(!monitor.ensure_checked().await);
        assert_eq!(stub.probes(), 1);
    }

    #[tokio::test]
    async fn test_diagnostics_run_once() {
        let stub = spawn_health_stub().await;
        let clock = Arc::new(ManualClock::new(Utc::now()));
        let monitor = monitor(&stub.base_url, clock);

        monitor.ensure_checked().await;
        monitor.force_recheck().await;
        monitor.force_recheck().await;

        let report = wait_for_diagnostics(&monitor).await;
        assert!(report.healthy());
        assert_eq!(stub.diagnostics_runs(), 1);
    }

    #[tokio::test]
    async fn test_probe_does_not_wait_for_diagnostics() {
        let stub = spawn_health_stub().await;
        stub.set_diagnostics_delay(Duration::from_secs(3));
        let clock = Arc::new(ManualClock::new(Utc::now()));
        let monitor = monitor(&stub.base_url, clock);

        let available = tokio::time::timeout(Duration::from_secs(1), monitor.ensure_checked())
            .await
            .expect("probe should return before diagnostics finish");
        assert!(available);
        assert!(monitor.diagnostics().is_none());
    }

    async fn wait_for_diagnostics(monitor: &AvailabilityMonitor) -> &DiagnosticsReport {
        for _ in 0..100 {
            if let Some(report) = monitor.diagnostics() {
                return report;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
        panic!("diagnostics report never arrived");
    }
}
