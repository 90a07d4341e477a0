use reqwest::{Method, RequestBuilder, StatusCode};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;

use super::availability::AvailabilityMonitor;
use super::error::FetchFailure;
use super::http::Endpoint;
use crate::models::ErrorBody;

/// HTTP access to the key/value service. Short-circuits while the monitor
/// reports the service down, and reports outages back to it.
pub struct RemoteStore {
    endpoint: Endpoint,
    monitor: Arc<AvailabilityMonitor>,
    timeout: Duration,
}

impl RemoteStore {
    pub fn new(endpoint: Endpoint, monitor: Arc<AvailabilityMonitor>, timeout: Duration) -> Self {
        Self {
            endpoint,
            monitor,
            timeout,
        }
    }

    /// Untyped request: `request("/mood", Method::POST, Some(&body))`.
    pub async fn request(
        &self,
        path: &str,
        method: Method,
        body: Option<&Value>,
    ) -> Result<Value, FetchFailure> {
        self.send(method, path, body).await
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, FetchFailure> {
        self.send::<(), T>(Method::GET, path, None).await
    }

    pub async fn post<B, T>(&self, path: &str, body: &B) -> Result<T, FetchFailure>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.send(Method::POST, path, Some(body)).await
    }

    async fn send<B, T>(&self, method: Method, path: &str, body: Option<&B>) -> Result<T, FetchFailure>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        if !self.monitor.ensure_checked().await {
            return Err(FetchFailure::Unavailable);
        }

        let mut request = self
            .endpoint
            .request(method.clone(), path)
            .timeout(self.timeout);
        if let Some(body) = body {
            request = request.json(body);
        }

        let result = exchange(request).await;
        if let Err(failure) = &result {
            if failure.signals_outage() {
                self.monitor.mark_unavailable(&failure.to_string());
            }
            tracing::debug!(%method, path, error = %failure, "Remote request failed");
        }
        result
    }
}

async fn exchange<T: DeserializeOwned>(request: RequestBuilder) -> Result<T, FetchFailure> {
    let response = request
        .send()
        .await
        .map_err(|e| FetchFailure::from_transport(&e))?;

    let status = response.status();
    let body = response
        .bytes()
        .await
        .map_err(|e| FetchFailure::from_transport(&e))?;

    if !status.is_success() {
        return Err(FetchFailure::Status {
            status: status.as_u16(),
            message: error_message(status, &body),
        });
    }

    serde_json::from_slice(&body).map_err(|e| FetchFailure::Decode(e.to_string()))
}

fn error_message(status: StatusCode, body: &[u8]) -> String {
    serde_json::from_slice::<ErrorBody>(body)
        .map(|b| b.error)
        .unwrap_or_else(|_| status.canonical_reason().unwrap_or("unknown error").to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::clock::ManualClock;
    use crate::client::diagnostics::DiagnosticsReporter;
    use crate::client::test_support::{closed_port_url, spawn_health_stub, spawn_service};
    use crate::models::stats::StatsSnapshot;
    use chrono::Utc;
    use serde_json::json;

    fn remote(base_url: &str) -> (RemoteStore, Arc<AvailabilityMonitor>) {
        remote_with_timeout(base_url, Duration::from_secs(10))
    }

    fn remote_with_timeout(base_url: &str, timeout: Duration) -> (RemoteStore, Arc<AvailabilityMonitor>) {
        let endpoint = Endpoint::new(reqwest::Client::new(), base_url, "test-key");
        let monitor = Arc::new(AvailabilityMonitor::new(
            endpoint.clone(),
            Arc::new(ManualClock::new(Utc::now())),
            Duration::from_secs(30),
            Duration::from_secs(5),
            DiagnosticsReporter::new(endpoint.clone(), Duration::from_secs(10)),
        ));
        let store = RemoteStore::new(endpoint, monitor.clone(), timeout);
        (store, monitor)
    }

    #[tokio::test]
    async fn test_typed_get_against_service() {
        let service = spawn_service().await;
        let (store, _) = remote(&service.base_url);

        let stats: StatsSnapshot = store.get("/stats/demo-user").await.unwrap();
        assert_eq!(stats, StatsSnapshot::default());
    }

    #[tokio::test]
    async fn test_untyped_request_round_trip() {
        let service = spawn_service().await;
        let (store, _) = remote(&service.base_url);

        let body = json!({ "userId": "demo-user", "date": "2026-02-10", "amount": 300 });
        let ack = store
            .request("/hydration", Method::POST, Some(&body))
            .await
            .unwrap();
        assert_eq!(ack["data"]["total"], 300.0);
    }

    #[tokio::test]
    async fn test_short_circuits_when_unavailable() {
        let stub = spawn_health_stub().await;
        stub.set_healthy(false);
        let (store, monitor) = remote(&stub.base_url);

        assert!(!monitor.ensure_checked().await);
        let result = store.get::<Value>("/stats/demo-user").await;
        assert_eq!(result, Err(FetchFailure::Unavailable));
        assert_eq!(stub.probes(), 1);
    }

    #[tokio::test]
    async fn test_server_error_flips_availability() {
        let service = spawn_service().await;
        let (store, monitor) = remote(&service.base_url);
        assert!(monitor.ensure_checked().await);

        service.kv.set_failing(true);
        let result = store.get::<StatsSnapshot>("/stats/demo-user").await;

        match result {
            Err(FetchFailure::Status { status, message }) => {
                assert_eq!(status, 500);
                assert!(message.starts_with("Failed to fetch stats"));
            }
            other => panic!("expected status failure, got {other:?}"),
        }
        assert!(!monitor.is_available());
    }

    #[tokio::test]
    async fn test_client_error_keeps_availability() {
        let service = spawn_service().await;
        let (store, monitor) = remote(&service.base_url);

        let result = store
            .post::<_, Value>("/mood", &json!({ "userId": "demo-user" }))
            .await;

        assert!(matches!(result, Err(FetchFailure::Status { status: 400, .. })));
        assert!(monitor.is_available());
    }

    #[tokio::test]
    async fn test_network_error_flips_availability() {
        let url = closed_port_url().await;
        let (store, monitor) = remote(&url);

        // Probe fails first, so the call never reaches the data path.
        let result = store.get::<Value>("/stats/demo-user").await;
        assert_eq!(result, Err(FetchFailure::Unavailable));
        assert!(!monitor.is_available());
    }

    #[tokio::test]
    async fn test_data_timeout_flips_availability() {
        let stub = spawn_health_stub().await;
        stub.set_data_delay(Duration::from_secs(2));
        let (store, monitor) = remote_with_timeout(&stub.base_url, Duration::from_millis(200));

        let result = store.get::<StatsSnapshot>("/stats/demo-user").await;

        assert_eq!(result, Err(FetchFailure::Timeout));
        assert_eq!(stub.probes(), 1, "health probe succeeded before the data call");
        assert!(!monitor.is_available());
        assert_eq!(
            store.get::<StatsSnapshot>("/stats/demo-user").await,
            Err(FetchFailure::Unavailable)
        );
    }

    #[tokio::test]
    async fn test_unexpected_shape_is_decode_failure() {
        let service = spawn_service().await;
        let (store, monitor) = remote(&service.base_url);

        let result = store.get::<Vec<u32>>("/stats/demo-user").await;
        assert!(matches!(result, Err(FetchFailure::Decode(_))));
        assert!(monitor.is_available());
    }
}
