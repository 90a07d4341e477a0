use axum::{extract::State, Json};
use chrono::Utc;
use serde_json::json;
use uuid::Uuid;

use crate::db::KvStore;
use crate::models::diagnostics::{HealthStatus, StoreDiagnostics};
use crate::AppState;

pub async fn health_check() -> Json<HealthStatus> {
    tracing::debug!("Health check requested");
    Json(HealthStatus {
        status: "ok".into(),
        timestamp: Utc::now(),
    })
}

pub async fn diagnostics(State(state): State<AppState>) -> Json<StoreDiagnostics> {
    let report = run_store_diagnostics(&state.kv).await;
    if report.all_passed() {
        tracing::info!("Store diagnostics passed");
    } else {
        tracing::warn!(errors = ?report.errors, "Store diagnostics found problems");
    }
    Json(report)
}

/// Connectivity, table, write and read checks against the store. The
/// temporary probe key is always removed before returning.
pub async fn run_store_diagnostics(kv: &KvStore) -> StoreDiagnostics {
    let mut report = StoreDiagnostics::new(Utc::now());

    match kv.ping().await {
        Ok(()) => report.connected = true,
        Err(e) => {
            report.errors.push(format!("Connection failed: {e}"));
            return report;
        }
    }

    match kv.check_table().await {
        Ok(()) => report.table_exists = true,
        Err(e) => {
            report.errors.push(format!("Table check failed: {e}"));
            return report;
        }
    }

    let probe_key = format!("diagnostics:probe:{}", Uuid::new_v4());
    let probe_value = json!({ "probe": true, "writtenAt": report.checked_at });

    match kv.set(&probe_key, probe_value.clone()).await {
        Ok(()) => report.can_write = true,
        Err(e) => {
            report.errors.push(format!("Write failed: {e}"));
            return report;
        }
    }

    match kv.get(&probe_key).await {
        Ok(Some(value)) if value == probe_value => report.can_read = true,
        Ok(_) => report.errors.push("Read returned a different value than written".into()),
        Err(e) => report.errors.push(format!("Read failed: {e}")),
    }

    if let Err(e) = kv.delete(&probe_key).await {
        tracing::warn!(error = %e, key = %probe_key, "Failed to delete diagnostics probe key");
        report.errors.push(format!("Cleanup failed: {e}"));
    }

    report
}
