//! Module table provisioning
//!
//! Creates missing module tables and adds missing columns. Never drops or
//! alters existing columns.

use crate::contract::{
    FieldSpec, FieldType, ModuleConfig, CREATED_AT_COLUMN, CREATED_BY_COLUMN, ID_COLUMN,
    PROJECT_COLUMN,
};
use sea_orm::DatabaseConnection;
use sea_orm_migration::prelude::*;
use std::sync::Arc;

/// Union of every config stored in one table
struct TableLayout {
    table: String,
    fields: Vec<FieldSpec>,
}

fn layouts(configs: &[Arc<ModuleConfig>]) -> Vec<TableLayout> {
    let mut layouts: Vec<TableLayout> = Vec::new();
    for config in configs {
        let index = match layouts.iter().position(|l| l.table == config.table) {
            Some(index) => index,
            None => {
                layouts.push(TableLayout {
                    table: config.table.clone(),
                    fields: Vec::new(),
                });
                layouts.len() - 1
            }
        };

        let layout = &mut layouts[index];
        for field in &config.fields {
            if !layout.fields.iter().any(|f| f.name == field.name) {
                layout.fields.push(field.clone());
            }
        }
    }
    layouts
}

fn column_def(field: &FieldSpec) -> ColumnDef {
    let mut def = ColumnDef::new(Alias::new(field.name.as_str()));
    match field.field_type {
        FieldType::Number | FieldType::Currency => def.double(),
        FieldType::Boolean => def.boolean(),
        FieldType::Textarea => def.text(),
        FieldType::Text | FieldType::Date | FieldType::Select | FieldType::Relation => def.string(),
    };
    def
}

/// Ensure every table named by `configs` exists with every declared column
pub async fn sync_module_tables(
    db: &DatabaseConnection,
    configs: &[Arc<ModuleConfig>],
) -> Result<(), DbErr> {
    let manager = SchemaManager::new(db);

    for layout in layouts(configs) {
        let table = layout.table.as_str();

        if !manager.has_table(table).await? {
            let mut create = Table::create();
            create
                .table(Alias::new(table))
                .if_not_exists()
                .col(ColumnDef::new(Alias::new(ID_COLUMN)).string().not_null().primary_key())
                .col(ColumnDef::new(Alias::new(PROJECT_COLUMN)).string())
                .col(ColumnDef::new(Alias::new(CREATED_BY_COLUMN)).string())
                .col(
                    ColumnDef::new(Alias::new(CREATED_AT_COLUMN))
                        .string()
                        .not_null()
                        .default(Expr::current_timestamp()),
                );
            for field in &layout.fields {
                create.col(column_def(field));
            }
            manager.create_table(create).await?;

            manager
                .create_index(
                    Index::create()
                        .name(format!("idx_{table}_{PROJECT_COLUMN}"))
                        .table(Alias::new(table))
                        .col(Alias::new(PROJECT_COLUMN))
                        .if_not_exists()
                        .to_owned(),
                )
                .await?;

            tracing::info!(table, columns = layout.fields.len(), "Created module table");
            continue;
        }

        for field in &layout.fields {
            if manager.has_column(table, &field.name).await? {
                continue;
            }
            manager
                .alter_table(
                    Table::alter()
                        .table(Alias::new(table))
                        .add_column(column_def(field))
                        .to_owned(),
                )
                .await?;
            tracing::info!(table, column = %field.name, "Added module column");
        }
    }

    Ok(())
}
