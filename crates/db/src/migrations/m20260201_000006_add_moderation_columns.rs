//! Add suspension actor and appeal columns to the users table.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .alter_table(
                Table::alter()
                    .table(Users::Table)
                    .add_column(ColumnDef::new(Users::SuspendedBy).string_len(32).null())
                    .add_column(ColumnDef::new(Users::AppealStatus).string_len(16).null())
                    .add_column(ColumnDef::new(Users::AppealText).text().null())
                    .to_owned(),
            )
            .await?;

        // An appeal can only exist on a suspended account
        manager
            .get_connection()
            .execute_unprepared(
                r"
                ALTER TABLE users
                ADD CONSTRAINT chk_users_appeal_requires_suspension
                CHECK (appeal_status IS NULL OR is_suspended);
                ",
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_users_appeal_status")
                    .table(Users::Table)
                    .col(Users::AppealStatus)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(
                Index::drop()
                    .name("idx_users_appeal_status")
                    .table(Users::Table)
                    .to_owned(),
            )
            .await?;

        manager
            .get_connection()
            .execute_unprepared(
                "ALTER TABLE users DROP CONSTRAINT IF EXISTS chk_users_appeal_requires_suspension;",
            )
            .await?;

        manager
            .alter_table(
                Table::alter()
                    .table(Users::Table)
                    .drop_column(Users::SuspendedBy)
                    .drop_column(Users::AppealStatus)
                    .drop_column(Users::AppealText)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }
}

#[derive(Iden)]
enum Users {
    Table,
    SuspendedBy,
    AppealStatus,
    AppealText,
}
