pub mod achievements;
pub mod health;
pub mod hydration;
pub mod meals;
pub mod mood;
pub mod stats;

use crate::error::{AppError, AppResult};

/// Rejects a request whose required fields are absent or blank.
pub(crate) fn require<T>(value: Option<T>, fields: &str) -> AppResult<T> {
    value.ok_or_else(|| AppError::Validation(format!("Missing required fields: {fields}")))
}

pub(crate) fn require_user(user_id: Option<String>, fields: &str) -> AppResult<String> {
    require(user_id.filter(|id| !id.trim().is_empty()), fields)
}

pub(crate) fn daily_key(domain: &str, user_id: &str, date: chrono::NaiveDate) -> String {
    format!("{domain}:{user_id}:{}", crate::models::day_key(date))
}

pub(crate) fn user_key(domain: &str, user_id: &str) -> String {
    format!("{domain}:{user_id}")
}
