use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use serde::Deserialize;
use std::sync::Arc;

use super::types::{MessageResponse, ProgressDto};
use super::{ApiError, AppState, validation};
use crate::db::StoreError;

#[derive(Debug, Deserialize)]
pub struct LogProgressRequest {
    pub habit_id: i32,
    pub date: String,
    pub status: bool,
}

#[derive(Debug, Deserialize)]
pub struct UpdateProgressRequest {
    pub date: String,
    pub status: bool,
    pub habit_id: i32,
}

#[derive(Debug, Deserialize)]
pub struct DeleteProgressRequest {
    pub habit_id: i32,
}

#[derive(Debug, Deserialize)]
pub struct ListProgressQuery {
    pub habit_id: Option<i32>,
}

/// POST /progress
/// Plain insert, never an upsert: a (habit, date) collision is a 409 and the
/// caller must update or delete+recreate to change a day's status.
pub async fn log_progress(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<LogProgressRequest>,
) -> Result<(StatusCode, Json<ProgressDto>), ApiError> {
    validation::validate_id(payload.habit_id, "habit ID")?;
    validation::validate_date(&payload.date)?;

    match state
        .store()
        .log_progress(payload.habit_id, &payload.date, payload.status)
        .await
    {
        Ok(entry) => Ok((StatusCode::CREATED, Json(ProgressDto::from(entry)))),
        Err(StoreError::Conflict) => Err(ApiError::conflict(
            "Progress for this habit already logged for this date.",
        )),
        Err(e) => Err(e.into()),
    }
}

/// PUT /progress/{id}
/// Scoped by entry id AND owning habit id; moving an entry onto a date that
/// another entry already occupies is a 409 from the unique index.
pub async fn update_progress(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
    Json(payload): Json<UpdateProgressRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    validation::validate_date(&payload.date)?;

    match state
        .store()
        .update_progress(id, payload.habit_id, &payload.date, payload.status)
        .await
    {
        Ok(true) => Ok(Json(MessageResponse::new("Progress updated successfully."))),
        Ok(false) => Err(ApiError::not_found(
            "Progress entry not found or unauthorized.",
        )),
        Err(StoreError::Conflict) => Err(ApiError::conflict(
            "A progress entry for this habit already exists on this date.",
        )),
        Err(e) => Err(e.into()),
    }
}

/// DELETE /progress/{id}
pub async fn delete_progress(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
    Json(payload): Json<DeleteProgressRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    let deleted = state.store().delete_progress(id, payload.habit_id).await?;

    if deleted {
        Ok(Json(MessageResponse::new("Progress deleted successfully.")))
    } else {
        Err(ApiError::not_found(
            "Progress entry not found or unauthorized.",
        ))
    }
}

/// GET /progress?habit_id=
pub async fn list_progress(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ListProgressQuery>,
) -> Result<Json<Vec<ProgressDto>>, ApiError> {
    let habit_id = query
        .habit_id
        .ok_or_else(|| ApiError::validation("Habit ID is required."))?;

    let entries = state.store().list_progress(habit_id).await?;
    let dtos: Vec<ProgressDto> = entries.into_iter().map(ProgressDto::from).collect();

    Ok(Json(dtos))
}
