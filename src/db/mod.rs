use anyhow::Result;
use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection, Statement};
use std::path::Path;
use std::time::Duration;
use thiserror::Error;
use tracing::info;

use crate::config::SecurityConfig;
use crate::entities::{habits, progress};

pub mod migrator;
pub mod repositories;

pub use repositories::user::User;

/// Typed error for store operations.
///
/// Uniqueness violations are mapped to [`StoreError::Conflict`] at the
/// `DbErr` boundary, so the storage constraint, not any pre-check, is what
/// callers react to.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("unique constraint violated")]
    Conflict,

    #[error("database error: {0}")]
    Database(sea_orm::DbErr),

    #[error("{0}")]
    Internal(String),
}

impl From<sea_orm::DbErr> for StoreError {
    fn from(err: sea_orm::DbErr) -> Self {
        match err.sql_err() {
            Some(sea_orm::SqlErr::UniqueConstraintViolation(_)) => Self::Conflict,
            _ => Self::Database(err),
        }
    }
}

#[derive(Clone)]
pub struct Store {
    pub conn: DatabaseConnection,
}

impl Store {
    pub async fn new(db_url: &str) -> Result<Self> {
        Self::with_pool_options(db_url, 5, 1).await
    }

    pub async fn with_pool_options(
        db_url: &str,
        max_connections: u32,
        min_connections: u32,
    ) -> Result<Self> {
        use sea_orm_migration::MigratorTrait;

        if !db_url.contains(":memory:") {
            let path_str = db_url.trim_start_matches("sqlite:");
            if let Some(parent) = Path::new(path_str).parent() {
                tokio::fs::create_dir_all(parent).await.ok();
            }
            if !Path::new(path_str).exists() {
                std::fs::File::create(path_str)?;
            }
        }

        let mut opt = ConnectOptions::new(db_url.to_string());
        opt.max_connections(max_connections)
            .min_connections(min_connections)
            .connect_timeout(Duration::from_secs(10))
            .acquire_timeout(Duration::from_secs(10))
            .idle_timeout(Duration::from_secs(300))
            .max_lifetime(Duration::from_secs(600))
            .sqlx_logging(false);

        let conn = Database::connect(opt).await?;

        migrator::Migrator::up(&conn, None).await?;

        info!(
            "Database connected & migrations applied (pool: {}-{})",
            min_connections, max_connections
        );

        Ok(Self { conn })
    }

    pub async fn ping(&self) -> Result<()> {
        let backend = self.conn.get_database_backend();
        self.conn
            .query_one(Statement::from_string(backend, "SELECT 1".to_string()))
            .await?;
        Ok(())
    }

    fn user_repo(&self) -> repositories::user::UserRepository {
        repositories::user::UserRepository::new(self.conn.clone())
    }

    fn habit_repo(&self) -> repositories::habit::HabitRepository {
        repositories::habit::HabitRepository::new(self.conn.clone())
    }

    fn progress_repo(&self) -> repositories::progress::ProgressRepository {
        repositories::progress::ProgressRepository::new(self.conn.clone())
    }

    // ========== Credential Store ==========

    pub async fn create_user(
        &self,
        username: &str,
        password: &str,
        security: &SecurityConfig,
    ) -> Result<User, StoreError> {
        self.user_repo().create(username, password, security).await
    }

    pub async fn get_user_by_username(&self, username: &str) -> Result<Option<User>, StoreError> {
        self.user_repo().get_by_username(username).await
    }

    pub async fn verify_credentials(
        &self,
        username: &str,
        password: &str,
    ) -> Result<Option<User>, StoreError> {
        self.user_repo()
            .verify_credentials(username, password)
            .await
    }

    // ========== Habit/Progress Store ==========

    pub async fn create_habit(
        &self,
        user_id: i32,
        name: &str,
        category: Option<&str>,
        description: Option<&str>,
    ) -> Result<habits::Model, StoreError> {
        self.habit_repo()
            .create(user_id, name, category, description)
            .await
    }

    pub async fn update_habit(
        &self,
        habit_id: i32,
        user_id: i32,
        name: &str,
        category: Option<&str>,
        description: Option<&str>,
    ) -> Result<bool, StoreError> {
        self.habit_repo()
            .update_scoped(habit_id, user_id, name, category, description)
            .await
    }

    pub async fn delete_habit(&self, habit_id: i32, user_id: i32) -> Result<bool, StoreError> {
        self.habit_repo().delete_scoped(habit_id, user_id).await
    }

    pub async fn list_habits(&self, user_id: i32) -> Result<Vec<habits::Model>, StoreError> {
        self.habit_repo().list_for_user(user_id).await
    }

    pub async fn log_progress(
        &self,
        habit_id: i32,
        date: &str,
        status: bool,
    ) -> Result<progress::Model, StoreError> {
        self.progress_repo().log(habit_id, date, status).await
    }

    pub async fn update_progress(
        &self,
        entry_id: i32,
        habit_id: i32,
        date: &str,
        status: bool,
    ) -> Result<bool, StoreError> {
        self.progress_repo()
            .update_scoped(entry_id, habit_id, date, status)
            .await
    }

    pub async fn delete_progress(&self, entry_id: i32, habit_id: i32) -> Result<bool, StoreError> {
        self.progress_repo().delete_scoped(entry_id, habit_id).await
    }

    pub async fn list_progress(&self, habit_id: i32) -> Result<Vec<progress::Model>, StoreError> {
        self.progress_repo().list_for_habit(habit_id).await
    }
}
