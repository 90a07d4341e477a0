use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;

use super::availability::AvailabilityMonitor;

/// Re-checks availability on a fixed cadence so the connection status stays
/// current even when no data calls are made. Transitions are logged by the
/// monitor. Abort the handle to stop watching.
pub fn spawn_status_watcher(monitor: Arc<AvailabilityMonitor>, every: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(every);
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        loop {
            interval.tick().await;
            let available = monitor.ensure_checked().await;
            tracing::debug!(available, status = %monitor.status(), "Connection status checked");
        }
    })
}
