use sea_orm::entity::prelude::*;

/// One row per (habit, calendar date); the unique index on that pair is what
/// guarantees a day is never logged twice.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "progress")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub habit_id: i32,

    /// Calendar date, "YYYY-MM-DD"
    pub date: String,

    /// true = done, false = missed
    pub status: bool,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::habits::Entity",
        from = "Column::HabitId",
        to = "super::habits::Column::Id",
        on_update = "Cascade",
        on_delete = "Cascade"
    )]
    Habits,
}

impl Related<super::habits::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Habits.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
