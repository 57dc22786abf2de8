use serde::Serialize;

use crate::entities::{habits, progress};

/// Public user shape; the password hash never leaves the store layer.
#[derive(Debug, Serialize)]
pub struct UserDto {
    pub id: i32,
    pub username: String,
}

impl From<crate::db::User> for UserDto {
    fn from(user: crate::db::User) -> Self {
        Self {
            id: user.id,
            username: user.username,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct HabitDto {
    pub id: i32,
    pub user_id: i32,
    pub habit_name: String,
    pub category: Option<String>,
    pub description: Option<String>,
    pub created_at: String,
}

impl From<habits::Model> for HabitDto {
    fn from(model: habits::Model) -> Self {
        Self {
            id: model.id,
            user_id: model.user_id,
            habit_name: model.habit_name,
            category: model.category,
            description: model.description,
            created_at: model.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ProgressDto {
    pub id: i32,
    pub habit_id: i32,
    pub date: String,
    pub status: bool,
}

impl From<progress::Model> for ProgressDto {
    fn from(model: progress::Model) -> Self {
        Self {
            id: model.id,
            habit_id: model.habit_id,
            date: model.date,
            status: model.status,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct HealthStatus {
    pub status: String,
    pub version: String,
    pub uptime: u64,
}
