use axum::{
    extract::{Path, State},
    Json,
};
use axum_extra::extract::WithRejection;
use chrono::{NaiveDate, Utc};

use super::{daily_key, require, require_user};
use crate::error::{AppError, AppResult};
use crate::models::mood::{MoodEntry, SaveMoodRequest};
use crate::models::WriteAck;
use crate::AppState;

const FIELDS: &str = "userId, date, mood";

pub async fn save_mood(
    State(state): State<AppState>,
    WithRejection(Json(body), _): WithRejection<Json<SaveMoodRequest>, AppError>,
) -> AppResult<Json<WriteAck<()>>> {
    let user_id = require_user(body.user_id, FIELDS)?;
    let date = require(body.date, FIELDS)?;
    let mood = require(body.mood, FIELDS)?;

    let key = daily_key("mood", &user_id, date);
    state
        .kv
        .set_as(&key, &MoodEntry::new(mood, Utc::now()))
        .await
        .map_err(|e| AppError::storage("save mood", e))?;

    tracing::info!(user_id = %user_id, %date, ?mood, "Mood saved");
    Ok(Json(WriteAck::ok()))
}

pub async fn get_mood(
    State(state): State<AppState>,
    WithRejection(Path((user_id, date)), _): WithRejection<Path<(String, NaiveDate)>, AppError>,
) -> AppResult<Json<Option<MoodEntry>>> {
    let key = daily_key("mood", &user_id, date);
    tracing::debug!(key = %key, "Fetching mood");
    let entry = state
        .kv
        .get_as::<MoodEntry>(&key)
        .await
        .map_err(|e| AppError::storage("fetch mood", e))?;
    Ok(Json(entry))
}
