pub mod achievement;
pub mod diagnostics;
pub mod hydration;
pub mod meal;
pub mod mood;
pub mod stats;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Fixed identity used while the app runs single-user.
pub const DEFAULT_USER_ID: &str = "demo-user";

/// Calendar-day key (`YYYY-MM-DD`) partitioning per-day records.
pub fn day_key(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// Acknowledgement returned by every write, remote or local.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WriteAck<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T> WriteAck<T> {
    pub fn ok() -> Self {
        Self {
            success: true,
            data: None,
        }
    }

    pub fn with_data(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
        }
    }
}

/// Error envelope used by the service: `{"error": "..."}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_day_key_is_zero_padded() {
        let date = NaiveDate::from_ymd_opt(2026, 3, 7).unwrap();
        assert_eq!(day_key(date), "2026-03-07");
    }

    #[test]
    fn test_ack_without_data_omits_field() {
        let json = serde_json::to_value(WriteAck::<()>::ok()).unwrap();
        assert_eq!(json, serde_json::json!({ "success": true }));
    }

    #[test]
    fn test_ack_deserializes_without_data() {
        let ack: WriteAck<()> = serde_json::from_str(r#"{"success":true}"#).unwrap();
        assert!(ack.success);
        assert!(ack.data.is_none());
    }
}
