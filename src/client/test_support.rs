use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
use chrono::Utc;
use std::sync::{
    atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering},
    Arc,
};
use std::time::Duration;
use tokio::net::TcpListener;

use crate::config::Config;
use crate::db::{KvStore, MemoryKv};
use crate::models::diagnostics::StoreDiagnostics;
use crate::{server, AppState};

pub(crate) struct TestService {
    pub base_url: String,
    pub kv: MemoryKv,
}

/// The real API over an in-memory store, on an ephemeral port.
pub(crate) async fn spawn_service() -> TestService {
    let kv = MemoryKv::new();
    let state = AppState {
        kv: KvStore::Memory(kv.clone()),
        config: Arc::new(Config::default()),
    };
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(server::serve(listener, state));
    TestService {
        base_url: format!("http://{addr}/wellness"),
        kv,
    }
}

/// Address nothing listens on, so connections are refused.
pub(crate) async fn closed_port_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{addr}/wellness")
}

#[derive(Clone, Default)]
struct StubCounters {
    healthy: Arc<AtomicBool>,
    probes: Arc<AtomicUsize>,
    diagnostics: Arc<AtomicUsize>,
    diagnostics_delay_ms: Arc<AtomicU64>,
    data_delay_ms: Arc<AtomicU64>,
}

impl StubCounters {
    async fn pause(delay_ms: &AtomicU64) {
        let ms = delay_ms.load(Ordering::SeqCst);
        if ms > 0 {
            tokio::time::sleep(Duration::from_millis(ms)).await;
        }
    }
}

pub(crate) struct HealthStub {
    pub base_url: String,
    counters: StubCounters,
}

impl HealthStub {
    pub fn probes(&self) -> usize {
        self.counters.probes.load(Ordering::SeqCst)
    }

    pub fn diagnostics_runs(&self) -> usize {
        self.counters.diagnostics.load(Ordering::SeqCst)
    }

    pub fn set_healthy(&self, healthy: bool) {
        self.counters.healthy.store(healthy, Ordering::SeqCst);
    }

    pub fn set_diagnostics_delay(&self, delay: Duration) {
        self.counters
            .diagnostics_delay_ms
            .store(delay.as_millis() as u64, Ordering::SeqCst);
    }

    /// Every route other than health and diagnostics stalls for `delay`.
    pub fn set_data_delay(&self, delay: Duration) {
        self.counters
            .data_delay_ms
            .store(delay.as_millis() as u64, Ordering::SeqCst);
    }
}

/// Health and diagnostics endpoints that count their calls. Any other
/// route answers 404, after the configured data delay.
pub(crate) async fn spawn_health_stub() -> HealthStub {
    let counters = StubCounters::default();
    counters.healthy.store(true, Ordering::SeqCst);

    let app = Router::new()
        .route(
            "/health",
            get(|State(c): State<StubCounters>| async move {
                c.probes.fetch_add(1, Ordering::SeqCst);
                if c.healthy.load(Ordering::SeqCst) {
                    StatusCode::OK
                } else {
                    StatusCode::SERVICE_UNAVAILABLE
                }
            }),
        )
        .route(
            "/diagnostics",
            get(|State(c): State<StubCounters>| async move {
                c.diagnostics.fetch_add(1, Ordering::SeqCst);
                StubCounters::pause(&c.diagnostics_delay_ms).await;
                let mut report = StoreDiagnostics::new(Utc::now());
                report.connected = true;
                report.table_exists = true;
                report.can_write = true;
                report.can_read = true;
                Json(report)
            }),
        )
        .fallback(|State(c): State<StubCounters>| async move {
            StubCounters::pause(&c.data_delay_ms).await;
            StatusCode::NOT_FOUND
        })
        .with_state(counters.clone());

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move { axum::serve(listener, app).await });
    HealthStub {
        base_url: format!("http://{addr}"),
        counters,
    }
}
