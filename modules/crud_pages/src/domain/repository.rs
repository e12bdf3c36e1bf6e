//! Tabular store trait for data access
//!
//! The store is addressed by table name with opaque records, so one
//! implementation serves every module configuration.
//! The SeaORM implementation lives in infra/storage/repositories.rs.

use crate::contract::{EntityRecord, Filter};
use async_trait::async_trait;

/// Failure reported by a store implementation
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    #[error("store unreachable: {0}")]
    Unreachable(String),

    #[error("missing table or column: {0}")]
    MissingRelation(String),

    #[error("row not found")]
    RowNotFound,

    #[error("store rejected request: {0}")]
    Rejected(String),
}

/// Generic table access: select with equality filters, insert, update and
/// delete by primary key
#[async_trait]
pub trait TableStore: Send + Sync {
    /// Select all columns of `table` matching every filter, in store order
    async fn select(&self, table: &str, filters: &[Filter]) -> Result<Vec<EntityRecord>, StoreError>;

    /// Insert a row and return it as stored
    async fn insert(&self, table: &str, record: &EntityRecord) -> Result<EntityRecord, StoreError>;

    /// Apply `patch` to the row with primary key `id` and return the updated row
    async fn update(
        &self,
        table: &str,
        id: &str,
        patch: &EntityRecord,
    ) -> Result<EntityRecord, StoreError>;

    /// Delete the row with primary key `id`
    async fn delete(&self, table: &str, id: &str) -> Result<(), StoreError>;

    /// Cheap connectivity probe
    async fn ping(&self) -> Result<(), StoreError>;
}
