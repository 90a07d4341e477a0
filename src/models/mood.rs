use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Mood {
    Energized,
    Neutral,
    Sluggish,
}

/// One per user per day; a later write for the same day replaces it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MoodEntry {
    pub mood: Mood,
    pub timestamp: DateTime<Utc>,
}

impl MoodEntry {
    pub fn new(mood: Mood, timestamp: DateTime<Utc>) -> Self {
        Self { mood, timestamp }
    }
}

/// POST /mood
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveMoodRequest {
    pub user_id: Option<String>,
    pub date: Option<NaiveDate>,
    pub mood: Option<Mood>,
}
