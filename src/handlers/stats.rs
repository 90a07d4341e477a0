use axum::{
    extract::{Path, State},
    Json,
};
use axum_extra::extract::WithRejection;
use validator::Validate;

use super::{require, require_user, user_key};
use crate::error::{AppError, AppResult};
use crate::models::stats::{SaveStatsRequest, StatsSnapshot};
use crate::models::WriteAck;
use crate::AppState;

const FIELDS: &str = "userId, stats";

pub async fn get_stats(
    State(state): State<AppState>,
    WithRejection(Path(user_id), _): WithRejection<Path<String>, AppError>,
) -> AppResult<Json<StatsSnapshot>> {
    let key = user_key("stats", &user_id);
    tracing::debug!(key = %key, "Fetching stats");
    let stats = state
        .kv
        .get_as::<StatsSnapshot>(&key)
        .await
        .map_err(|e| AppError::storage("fetch stats", e))?
        .unwrap_or_default();
    Ok(Json(stats))
}

pub async fn save_stats(
    State(state): State<AppState>,
    WithRejection(Json(body), _): WithRejection<Json<SaveStatsRequest>, AppError>,
) -> AppResult<Json<WriteAck<()>>> {
    let user_id = require_user(body.user_id, FIELDS)?;
    let stats = require(body.stats, FIELDS)?;
    stats.validate()?;

    state
        .kv
        .set_as(&user_key("stats", &user_id), &stats)
        .await
        .map_err(|e| AppError::storage("save stats", e))?;

    tracing::info!(user_id = %user_id, "Stats saved");
    Ok(Json(WriteAck::ok()))
}
