use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Create users table
        manager
            .create_table(
                Table::create()
                    .table(Users::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Users::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Users::Username)
                            .string()
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Users::PasswordHash).string().not_null())
                    .col(ColumnDef::new(Users::CreatedAt).string().not_null())
                    .to_owned(),
            )
            .await?;

        // Create habits table
        manager
            .create_table(
                Table::create()
                    .table(Habits::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Habits::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Habits::UserId).integer().not_null())
                    .col(ColumnDef::new(Habits::HabitName).string().not_null())
                    .col(ColumnDef::new(Habits::Category).string())
                    .col(ColumnDef::new(Habits::Description).string())
                    .col(ColumnDef::new(Habits::CreatedAt).string().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_habits_user_id")
                            .from(Habits::Table, Habits::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Create progress table
        manager
            .create_table(
                Table::create()
                    .table(Progress::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Progress::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Progress::HabitId).integer().not_null())
                    .col(ColumnDef::new(Progress::Date).string().not_null())
                    .col(
                        ColumnDef::new(Progress::Status)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_progress_habit_id")
                            .from(Progress::Table, Progress::HabitId)
                            .to(Habits::Table, Habits::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // One entry per habit per calendar date
        manager
            .create_index(
                Index::create()
                    .name("idx_progress_habit_date")
                    .table(Progress::Table)
                    .col(Progress::HabitId)
                    .col(Progress::Date)
                    .unique()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Progress::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(Habits::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(Users::Table).to_owned())
            .await?;

        Ok(())
    }
}

#[derive(DeriveIden)]
enum Users {
    Table,
    Id,
    Username,
    PasswordHash,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Habits {
    Table,
    Id,
    UserId,
    HabitName,
    Category,
    Description,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Progress {
    Table,
    Id,
    HabitId,
    Date,
    Status,
}
