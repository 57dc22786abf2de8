use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};

use crate::db::StoreError;
use crate::entities::{prelude::*, progress};

/// Repository for daily progress entries
pub struct ProgressRepository {
    conn: DatabaseConnection,
}

impl ProgressRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    /// Insert a new entry for (habit, date). This is NOT an upsert: a second
    /// insert for the same pair hits the unique index and surfaces as
    /// [`StoreError::Conflict`].
    pub async fn log(
        &self,
        habit_id: i32,
        date: &str,
        status: bool,
    ) -> Result<progress::Model, StoreError> {
        let active = progress::ActiveModel {
            habit_id: Set(habit_id),
            date: Set(date.to_string()),
            status: Set(status),
            ..Default::default()
        };

        let model = active.insert(&self.conn).await?;

        Ok(model)
    }

    /// Update an entry, scoped by entry id AND owning habit id.
    ///
    /// Returns `false` when zero rows matched (nonexistent or foreign-owned);
    /// a date collision with another entry surfaces as [`StoreError::Conflict`].
    pub async fn update_scoped(
        &self,
        entry_id: i32,
        habit_id: i32,
        date: &str,
        status: bool,
    ) -> Result<bool, StoreError> {
        let result = Progress::update_many()
            .col_expr(progress::Column::Date, Expr::value(date.to_string()))
            .col_expr(progress::Column::Status, Expr::value(status))
            .filter(progress::Column::Id.eq(entry_id))
            .filter(progress::Column::HabitId.eq(habit_id))
            .exec(&self.conn)
            .await?;

        Ok(result.rows_affected > 0)
    }

    pub async fn delete_scoped(&self, entry_id: i32, habit_id: i32) -> Result<bool, StoreError> {
        let result = Progress::delete_many()
            .filter(progress::Column::Id.eq(entry_id))
            .filter(progress::Column::HabitId.eq(habit_id))
            .exec(&self.conn)
            .await?;

        Ok(result.rows_affected > 0)
    }

    pub async fn list_for_habit(&self, habit_id: i32) -> Result<Vec<progress::Model>, StoreError> {
        let rows = Progress::find()
            .filter(progress::Column::HabitId.eq(habit_id))
            .order_by_asc(progress::Column::Id)
            .all(&self.conn)
            .await?;

        Ok(rows)
    }
}
