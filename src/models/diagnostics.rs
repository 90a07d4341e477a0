use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// GET /health
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthStatus {
    pub status: String,
    pub timestamp: DateTime<Utc>,
}

/// GET /diagnostics: each stage of the store check, recorded independently.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct StoreDiagnostics {
    pub connected: bool,
    pub table_exists: bool,
    pub can_write: bool,
    pub can_read: bool,
    #[serde(default)]
    pub errors: Vec<String>,
    pub checked_at: DateTime<Utc>,
}

impl StoreDiagnostics {
    pub fn new(checked_at: DateTime<Utc>) -> Self {
        Self {
            connected: false,
            table_exists: false,
            can_write: false,
            can_read: false,
            errors: Vec::new(),
            checked_at,
        }
    }

    pub fn all_passed(&self) -> bool {
        self.connected && self.table_exists && self.can_write && self.can_read
    }
}
