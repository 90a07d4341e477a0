use axum::{
    extract::{Path, State},
    Json,
};
use axum_extra::extract::WithRejection;
use chrono::Utc;
use validator::Validate;

use super::{require, require_user, user_key};
use crate::error::{AppError, AppResult};
use crate::models::achievement::{AchievementLog, AddAchievementRequest};
use crate::models::WriteAck;
use crate::AppState;

const FIELDS: &str = "userId, badge";

pub async fn get_achievements(
    State(state): State<AppState>,
    WithRejection(Path(user_id), _): WithRejection<Path<String>, AppError>,
) -> AppResult<Json<AchievementLog>> {
    let key = user_key("achievements", &user_id);
    tracing::debug!(key = %key, "Fetching achievements");
    let log = state
        .kv
        .get_as::<AchievementLog>(&key)
        .await
        .map_err(|e| AppError::storage("fetch achievements", e))?
        .unwrap_or_default();
    Ok(Json(log))
}

pub async fn add_achievement(
    State(state): State<AppState>,
    WithRejection(Json(body), _): WithRejection<Json<AddAchievementRequest>, AppError>,
) -> AppResult<Json<WriteAck<AchievementLog>>> {
    let user_id = require_user(body.user_id, FIELDS)?;
    let badge = require(body.badge, FIELDS)?;
    badge.validate()?;

    let key = user_key("achievements", &user_id);
    let mut log = state
        .kv
        .get_as::<AchievementLog>(&key)
        .await
        .map_err(|e| AppError::storage("save achievement", e))?
        .unwrap_or_default();
    let title = badge.title.clone();
    log.award(badge, Utc::now());
    state
        .kv
        .set_as(&key, &log)
        .await
        .map_err(|e| AppError::storage("save achievement", e))?;

    tracing::info!(user_id = %user_id, title = %title, "Achievement saved");
    Ok(Json(WriteAck::with_data(log)))
}
