use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Validate)]
pub struct NewBadge {
    #[validate(length(min = 1, message = "Badge title is required"))]
    pub title: String,
    pub emoji: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Badge {
    #[serde(flatten)]
    pub details: NewBadge,
    pub earned_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct AchievementLog {
    #[serde(default)]
    pub badges: Vec<Badge>,
}

impl AchievementLog {
    pub fn award(&mut self, badge: NewBadge, earned_at: DateTime<Utc>) {
        self.badges.push(Badge {
            details: badge,
            earned_at,
        });
    }
}

/// POST /achievements
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddAchievementRequest {
    pub user_id: Option<String>,
    pub badge: Option<NewBadge>,
}
