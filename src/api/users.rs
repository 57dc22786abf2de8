use axum::{
    Json,
    extract::{Query, State},
    http::StatusCode,
};
use serde::Deserialize;
use std::sync::Arc;

use super::types::UserDto;
use super::{ApiError, AppState, validation};
use crate::db::StoreError;

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct LookupQuery {
    pub username: Option<String>,
}

/// POST /users
/// Register a new user. The unique constraint on `username` is the
/// authoritative duplicate check; the store's pre-lookup is only a fast path.
pub async fn register(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<UserDto>), ApiError> {
    validation::validate_username(&payload.username)?;
    validation::validate_password(&payload.password)?;

    let security = state.config().read().await.security.clone();

    match state
        .store()
        .create_user(&payload.username, &payload.password, &security)
        .await
    {
        Ok(user) => Ok((StatusCode::CREATED, Json(UserDto::from(user)))),
        Err(StoreError::Conflict) => Err(ApiError::conflict(
            "Username already taken. Please choose a different one.",
        )),
        Err(e) => Err(e.into()),
    }
}

/// POST /login
/// Verify credentials. Unknown usernames and wrong passwords produce the
/// exact same response, so the endpoint cannot be used to enumerate users.
pub async fn login(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<UserDto>, ApiError> {
    validation::validate_username(&payload.username)?;
    if payload.password.is_empty() {
        return Err(ApiError::validation("Password is required."));
    }

    let user = state
        .store()
        .verify_credentials(&payload.username, &payload.password)
        .await?
        .ok_or_else(|| ApiError::unauthorized("Invalid username or password."))?;

    Ok(Json(UserDto::from(user)))
}

/// GET /users?username=
/// Lookup for client-side recovery flows; never returns the password hash.
pub async fn lookup_user(
    State(state): State<Arc<AppState>>,
    Query(query): Query<LookupQuery>,
) -> Result<Json<UserDto>, ApiError> {
    let username = query
        .username
        .filter(|u| !u.is_empty())
        .ok_or_else(|| ApiError::validation("Username query parameter is required."))?;

    let user = state
        .store()
        .get_user_by_username(&username)
        .await?
        .ok_or_else(|| ApiError::not_found("User not found."))?;

    Ok(Json(UserDto::from(user)))
}
