use chrono::{DateTime, Utc};
use reqwest::Method;
use serde::Serialize;
use std::time::Duration;

use super::http::Endpoint;
use crate::models::diagnostics::StoreDiagnostics;

/// Outcome of the extended probe run after the first successful connection.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DiagnosticsReport {
    pub config_present: bool,
    pub connected: bool,
    pub table_exists: bool,
    pub can_write: bool,
    pub can_read: bool,
    pub errors: Vec<String>,
    pub checked_at: DateTime<Utc>,
}

impl DiagnosticsReport {
    fn empty(checked_at: DateTime<Utc>) -> Self {
        Self {
            config_present: false,
            connected: false,
            table_exists: false,
            can_write: false,
            can_read: false,
            errors: Vec::new(),
            checked_at,
        }
    }

    pub fn healthy(&self) -> bool {
        self.config_present && self.connected && self.table_exists && self.can_write && self.can_read
    }
}

#[derive(Debug, Clone)]
pub struct DiagnosticsReporter {
    endpoint: Endpoint,
    timeout: Duration,
}

impl DiagnosticsReporter {
    pub fn new(endpoint: Endpoint, timeout: Duration) -> Self {
        Self { endpoint, timeout }
    }

    /// Runs every stage and logs the report. Failures are recorded, never returned.
    pub async fn run(&self) -> DiagnosticsReport {
        let mut report = DiagnosticsReport::empty(Utc::now());

        if !self.endpoint.has_credentials() {
            report
                .errors
                .push("Missing configuration: API base address or key is not set".into());
            log_report(&report);
            return report;
        }
        report.config_present = true;

        match self.fetch_store_diagnostics().await {
            Ok(store) => {
                report.connected = store.connected;
                report.table_exists = store.table_exists;
                report.can_write = store.can_write;
                report.can_read = store.can_read;
                report.errors.extend(store.errors);
                report.checked_at = store.checked_at;
            }
            Err(message) => report.errors.push(message),
        }

        log_report(&report);
        report
    }

    async fn fetch_store_diagnostics(&self) -> Result<StoreDiagnostics, String> {
        let response = self
            .endpoint
            .request(Method::GET, "/diagnostics")
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| format!("Diagnostics request failed: {e}"))?;

        let status = response.status();
        if !status.is_success() {
            return Err(format!("Diagnostics endpoint returned {status}"));
        }

        response
            .json::<StoreDiagnostics>()
            .await
            .map_err(|e| format!("Diagnostics response unreadable: {e}"))
    }
}

fn log_report(report: &DiagnosticsReport) {
    if report.healthy() {
        tracing::info!(
            connected = report.connected,
            table_exists = report.table_exists,
            can_write = report.can_write,
            can_read = report.can_read,
            "Remote diagnostics passed"
        );
    } else {
        tracing::warn!(
            config_present = report.config_present,
            connected = report.connected,
            table_exists = report.table_exists,
            can_write = report.can_write,
            can_read = report.can_read,
            errors = ?report.errors,
            "Remote diagnostics found problems"
        );
    }
}
