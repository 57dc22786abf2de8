use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use serde::Deserialize;
use std::sync::Arc;

use super::types::{HabitDto, MessageResponse};
use super::{ApiError, AppState, validation};

#[derive(Debug, Deserialize)]
pub struct CreateHabitRequest {
    pub user_id: i32,
    pub habit_name: String,
    pub category: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateHabitRequest {
    pub habit_name: String,
    pub category: Option<String>,
    pub description: Option<String>,
    pub user_id: i32,
}

#[derive(Debug, Deserialize)]
pub struct DeleteHabitRequest {
    pub user_id: i32,
}

#[derive(Debug, Deserialize)]
pub struct ListHabitsQuery {
    pub user_id: Option<i32>,
}

/// POST /habits
/// Habit names are not unique; omitted category/description stay NULL.
pub async fn create_habit(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<CreateHabitRequest>,
) -> Result<(StatusCode, Json<HabitDto>), ApiError> {
    validation::validate_id(payload.user_id, "user ID")?;
    validation::validate_habit_name(&payload.habit_name)?;

    let habit = state
        .store()
        .create_habit(
            payload.user_id,
            &payload.habit_name,
            payload.category.as_deref(),
            payload.description.as_deref(),
        )
        .await?;

    Ok((StatusCode::CREATED, Json(HabitDto::from(habit))))
}

/// PUT /habits/{id}
/// The update is scoped by habit id AND owning user id in one statement, so
/// "doesn't exist" and "not yours" are indistinguishable by design.
pub async fn update_habit(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
    Json(payload): Json<UpdateHabitRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    validation::validate_habit_name(&payload.habit_name)?;

    let updated = state
        .store()
        .update_habit(
            id,
            payload.user_id,
            &payload.habit_name,
            payload.category.as_deref(),
            payload.description.as_deref(),
        )
        .await?;

    if updated {
        Ok(Json(MessageResponse::new("Habit updated successfully.")))
    } else {
        Err(ApiError::not_found("Habit not found or unauthorized."))
    }
}

/// DELETE /habits/{id}
/// Cascades to the habit's progress entries.
pub async fn delete_habit(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
    Json(payload): Json<DeleteHabitRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    let deleted = state.store().delete_habit(id, payload.user_id).await?;

    if deleted {
        Ok(Json(MessageResponse::new("Habit deleted successfully.")))
    } else {
        Err(ApiError::not_found("Habit not found or unauthorized."))
    }
}

/// GET /habits?user_id=
pub async fn list_habits(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ListHabitsQuery>,
) -> Result<Json<Vec<HabitDto>>, ApiError> {
    let user_id = query
        .user_id
        .ok_or_else(|| ApiError::validation("User ID is required."))?;

    let habits = state.store().list_habits(user_id).await?;
    let dtos: Vec<HabitDto> = habits.into_iter().map(HabitDto::from).collect();

    Ok(Json(dtos))
}
