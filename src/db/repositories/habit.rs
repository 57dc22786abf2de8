use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};
use tracing::info;

use crate::db::StoreError;
use crate::entities::{habits, prelude::*};

/// Repository for habit records
pub struct HabitRepository {
    conn: DatabaseConnection,
}

impl HabitRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn create(
        &self,
        user_id: i32,
        name: &str,
        category: Option<&str>,
        description: Option<&str>,
    ) -> Result<habits::Model, StoreError> {
        let active = habits::ActiveModel {
            user_id: Set(user_id),
            habit_name: Set(name.to_string()),
            category: Set(category.map(ToString::to_string)),
            description: Set(description.map(ToString::to_string)),
            created_at: Set(chrono::Utc::now().to_rfc3339()),
            ..Default::default()
        };

        let model = active.insert(&self.conn).await?;
        info!("Created habit '{}' for user {}", model.habit_name, user_id);

        Ok(model)
    }

    /// Update a habit, scoped by id AND owning user id in one statement.
    ///
    /// Returns `false` when zero rows matched: the habit does not exist or
    /// belongs to another user. The two cases are indistinguishable.
    pub async fn update_scoped(
        &self,
        habit_id: i32,
        user_id: i32,
        name: &str,
        category: Option<&str>,
        description: Option<&str>,
    ) -> Result<bool, StoreError> {
        let result = Habits::update_many()
            .col_expr(habits::Column::HabitName, Expr::value(name.to_string()))
            .col_expr(
                habits::Column::Category,
                Expr::value(category.map(ToString::to_string)),
            )
            .col_expr(
                habits::Column::Description,
                Expr::value(description.map(ToString::to_string)),
            )
            .filter(habits::Column::Id.eq(habit_id))
            .filter(habits::Column::UserId.eq(user_id))
            .exec(&self.conn)
            .await?;

        Ok(result.rows_affected > 0)
    }

    /// Delete a habit with the same ownership scoping as [`Self::update_scoped`].
    /// Progress entries go with it via the cascading foreign key.
    pub async fn delete_scoped(&self, habit_id: i32, user_id: i32) -> Result<bool, StoreError> {
        let result = Habits::delete_many()
            .filter(habits::Column::Id.eq(habit_id))
            .filter(habits::Column::UserId.eq(user_id))
            .exec(&self.conn)
            .await?;

        Ok(result.rows_affected > 0)
    }

    pub async fn list_for_user(&self, user_id: i32) -> Result<Vec<habits::Model>, StoreError> {
        let rows = Habits::find()
            .filter(habits::Column::UserId.eq(user_id))
            .order_by_asc(habits::Column::Id)
            .all(&self.conn)
            .await?;

        Ok(rows)
    }
}
