use axum::{
    extract::{Path, State},
    Json,
};
use axum_extra::extract::WithRejection;
use chrono::{NaiveDate, Utc};

use super::{daily_key, require, require_user};
use crate::error::{AppError, AppResult};
use crate::models::hydration::{check_amount, AddHydrationRequest, HydrationLog};
use crate::models::WriteAck;
use crate::AppState;

const FIELDS: &str = "userId, date, amount";

pub async fn add_hydration(
    State(state): State<AppState>,
    WithRejection(Json(body), _): WithRejection<Json<AddHydrationRequest>, AppError>,
) -> AppResult<Json<WriteAck<HydrationLog>>> {
    let user_id = require_user(body.user_id, FIELDS)?;
    let date = require(body.date, FIELDS)?;
    let amount = require(body.amount, FIELDS)?;
    check_amount(amount).map_err(AppError::Validation)?;

    let key = daily_key("hydration", &user_id, date);
    let mut log = state
        .kv
        .get_as::<HydrationLog>(&key)
        .await
        .map_err(|e| AppError::storage("save hydration", e))?
        .unwrap_or_default();
    log.record(amount, Utc::now());
    state
        .kv
        .set_as(&key, &log)
        .await
        .map_err(|e| AppError::storage("save hydration", e))?;

    tracing::info!(user_id = %user_id, %date, amount, total = log.total, "Hydration saved");
    Ok(Json(WriteAck::with_data(log)))
}

pub async fn get_hydration(
    State(state): State<AppState>,
    WithRejection(Path((user_id, date)), _): WithRejection<Path<(String, NaiveDate)>, AppError>,
) -> AppResult<Json<HydrationLog>> {
    let key = daily_key("hydration", &user_id, date);
    tracing::debug!(key = %key, "Fetching hydration");
    let log = state
        .kv
        .get_as::<HydrationLog>(&key)
        .await
        .map_err(|e| AppError::storage("fetch hydration", e))?
        .unwrap_or_default();
    Ok(Json(log))
}
