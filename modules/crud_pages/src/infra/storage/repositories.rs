//! SeaORM store implementations

use crate::contract::{ClientErrorReport, EntityRecord, Filter, ID_COLUMN};
use crate::domain::{ErrorSink, StoreError, TableStore};
use async_trait::async_trait;
use sea_orm::sea_query::{Alias, Asterisk, Expr, Query, SelectStatement, SimpleExpr};
use sea_orm::{ConnectionTrait, DatabaseConnection, EntityTrait, FromQueryResult, JsonValue};
use std::sync::Arc;

use super::entity::error_log;
use super::mapper::{classify_db_error, into_record, to_sea_value};

// ===== Table Store =====

/// Table store over any SeaORM connection; tables are addressed by name
pub struct SeaOrmTableStore {
    db: Arc<DatabaseConnection>,
}

impl SeaOrmTableStore {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    async fn fetch_all(&self, query: &SelectStatement) -> Result<Vec<EntityRecord>, StoreError> {
        let stmt = self.db.get_database_backend().build(query);
        let rows = JsonValue::find_by_statement(stmt)
            .all(&*self.db)
            .await
            .map_err(classify_db_error)?;
        Ok(rows.into_iter().filter_map(into_record).collect())
    }

    async fn find_by_id(&self, table: &str, id: &str) -> Result<EntityRecord, StoreError> {
        let mut query = Query::select();
        query
            .column(Asterisk)
            .from(Alias::new(table))
            .and_where(Expr::col(Alias::new(ID_COLUMN)).eq(id));

        self.fetch_all(&query)
            .await?
            .into_iter()
            .next()
            .ok_or(StoreError::RowNotFound)
    }
}

fn matches(filter: &Filter) -> SimpleExpr {
    let column = Expr::col(Alias::new(filter.column.as_str()));
    if filter.value.is_null() {
        column.is_null()
    } else {
        column.eq(to_sea_value(&filter.value))
    }
}

#[async_trait]
impl TableStore for SeaOrmTableStore {
    async fn select(&self, table: &str, filters: &[Filter]) -> Result<Vec<EntityRecord>, StoreError> {
        let mut query = Query::select();
        query.column(Asterisk).from(Alias::new(table));
        for filter in filters {
            query.and_where(matches(filter));
        }

        self.fetch_all(&query).await
    }

    async fn insert(&self, table: &str, record: &EntityRecord) -> Result<EntityRecord, StoreError> {
        let columns: Vec<Alias> = record.keys().map(|k| Alias::new(k.as_str())).collect();
        let values: Vec<SimpleExpr> = record.values().map(|v| to_sea_value(v).into()).collect();

        let mut insert = Query::insert();
        insert
            .into_table(Alias::new(table))
            .columns(columns)
            .values(values)
            .map_err(|e| StoreError::Rejected(e.to_string()))?
            .returning_all();

        let stmt = self.db.get_database_backend().build(&insert);
        let row = JsonValue::find_by_statement(stmt)
            .one(&*self.db)
            .await
            .map_err(classify_db_error)?
            .and_then(into_record)
            .ok_or_else(|| StoreError::Rejected(format!("insert into {table} returned no row")))?;

        tracing::debug!(table, "Inserted row");
        Ok(row)
    }

    async fn update(
        &self,
        table: &str,
        id: &str,
        patch: &EntityRecord,
    ) -> Result<EntityRecord, StoreError> {
        // Nothing to set; report the current row so callers still see it
        if patch.is_empty() {
            return self.find_by_id(table, id).await;
        }

        let mut update = Query::update();
        update
            .table(Alias::new(table))
            .values(
                patch
                    .iter()
                    .map(|(k, v)| (Alias::new(k.as_str()), SimpleExpr::from(to_sea_value(v)))),
            )
            .and_where(Expr::col(Alias::new(ID_COLUMN)).eq(id))
            .returning_all();

        let stmt = self.db.get_database_backend().build(&update);
        let row = JsonValue::find_by_statement(stmt)
            .one(&*self.db)
            .await
            .map_err(classify_db_error)?
            .and_then(into_record)
            .ok_or(StoreError::RowNotFound)?;

        tracing::debug!(table, id, "Updated row");
        Ok(row)
    }

    async fn delete(&self, table: &str, id: &str) -> Result<(), StoreError> {
        let mut delete = Query::delete();
        delete
            .from_table(Alias::new(table))
            .and_where(Expr::col(Alias::new(ID_COLUMN)).eq(id));

        let stmt = self.db.get_database_backend().build(&delete);
        let result = self.db.execute(stmt).await.map_err(classify_db_error)?;

        if result.rows_affected() == 0 {
            return Err(StoreError::RowNotFound);
        }

        tracing::debug!(table, id, "Deleted row");
        Ok(())
    }

    async fn ping(&self) -> Result<(), StoreError> {
        self.db.ping().await.map_err(classify_db_error)
    }
}

// ===== Error Sink =====

/// Error sink writing to the `error_logs` table
pub struct SeaOrmErrorSink {
    db: Arc<DatabaseConnection>,
}

impl SeaOrmErrorSink {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl ErrorSink for SeaOrmErrorSink {
    async fn record(&self, report: ClientErrorReport) -> anyhow::Result<()> {
        let active: error_log::ActiveModel = (&report).into();
        error_log::Entity::insert(active)
            .exec_without_returning(&*self.db)
            .await?;
        Ok(())
    }
}
