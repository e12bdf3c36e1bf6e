//! Database migrations for fixed tables
//!
//! Module tables are not migrated here; see `schema::sync_module_tables`.

use sea_orm_migration::prelude::*;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![Box::new(m20250301_000001_create_error_logs::Migration)]
    }
}

mod m20250301_000001_create_error_logs {
    use super::*;

    #[derive(DeriveMigrationName)]
    pub struct Migration;

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(ErrorLogs::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(ErrorLogs::Id).uuid().not_null().primary_key())
                        .col(ColumnDef::new(ErrorLogs::Message).text().not_null())
                        .col(ColumnDef::new(ErrorLogs::Stack).text())
                        .col(ColumnDef::new(ErrorLogs::Url).string())
                        .col(ColumnDef::new(ErrorLogs::UserAgent).string())
                        .col(ColumnDef::new(ErrorLogs::ReportedBy).string())
                        .col(
                            ColumnDef::new(ErrorLogs::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null()
                                .default(Expr::current_timestamp()),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .name("idx_error_logs_created_at")
                        .table(ErrorLogs::Table)
                        .col(ErrorLogs::CreatedAt)
                        .if_not_exists()
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(ErrorLogs::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum ErrorLogs {
        Table,
        Id,
        Message,
        Stack,
        Url,
        UserAgent,
        ReportedBy,
        CreatedAt,
    }
}
