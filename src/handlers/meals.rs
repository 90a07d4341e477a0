use axum::{
    extract::{Path, State},
    Json,
};
use axum_extra::extract::WithRejection;
use chrono::{NaiveDate, Utc};

use super::{daily_key, require, require_user};
use crate::error::{AppError, AppResult};
use crate::models::meal::{AddMealRequest, MealLog};
use crate::models::WriteAck;
use crate::AppState;

const FIELDS: &str = "userId, date, meal";

pub async fn add_meal(
    State(state): State<AppState>,
    WithRejection(Json(body), _): WithRejection<Json<AddMealRequest>, AppError>,
) -> AppResult<Json<WriteAck<MealLog>>> {
    let user_id = require_user(body.user_id, FIELDS)?;
    let date = require(body.date, FIELDS)?;
    let meal = require(body.meal, FIELDS)?;
    meal.validate_all()?;

    let key = daily_key("meals", &user_id, date);
    let mut log = state
        .kv
        .get_as::<MealLog>(&key)
        .await
        .map_err(|e| AppError::storage("save meal", e))?
        .unwrap_or_default();
    log.append(meal, Utc::now());
    state
        .kv
        .set_as(&key, &log)
        .await
        .map_err(|e| AppError::storage("save meal", e))?;

    tracing::info!(user_id = %user_id, %date, meals = log.meals.len(), "Meal saved");
    Ok(Json(WriteAck::with_data(log)))
}

pub async fn get_meals(
    State(state): State<AppState>,
    WithRejection(Path((user_id, date)), _): WithRejection<Path<(String, NaiveDate)>, AppError>,
) -> AppResult<Json<MealLog>> {
    let key = daily_key("meals", &user_id, date);
    tracing::debug!(key = %key, "Fetching meals");
    let log = state
        .kv
        .get_as::<MealLog>(&key)
        .await
        .map_err(|e| AppError::storage("fetch meals", e))?
        .unwrap_or_default();
    Ok(Json(log))
}
