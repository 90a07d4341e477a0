use serde::{Deserialize, Serialize};
use validator::Validate;

/// Per-user progress summary. Writes replace the whole snapshot.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Validate)]
#[serde(rename_all = "camelCase")]
pub struct StatsSnapshot {
    #[serde(default)]
    pub days_active: u32,
    #[serde(default)]
    pub current_streak: u32,
    #[serde(default)]
    #[validate(range(min = 0.0, message = "Average calories cannot be negative"))]
    pub avg_calories: f64,
}

/// POST /stats
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveStatsRequest {
    pub user_id: Option<String>,
    pub stats: Option<StatsSnapshot>,
}
