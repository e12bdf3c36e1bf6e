//! Native client trait for inter-module communication
//!
//! Other modules use this trait to read and write records of any bound page
//! without going through HTTP.

use super::{
    error::CrudError,
    model::{EntityRecord, Filter, HealthStatus, ModuleConfig},
};
use async_trait::async_trait;
use std::sync::Arc;

/// Crud pages API for inter-module communication
#[async_trait]
pub trait CrudApi: Send + Sync {
    /// Resolve a page name to its (possibly derived) configuration
    async fn page_config(&self, page: &str) -> Result<Arc<ModuleConfig>, CrudError>;

    /// List the records of a page, scoped to a project when the page requires it
    async fn list_records(
        &self,
        page: &str,
        project_id: Option<&str>,
        filters: &[Filter],
    ) -> Result<Vec<EntityRecord>, CrudError>;

    /// Validate and insert a record
    async fn create_record(
        &self,
        page: &str,
        project_id: Option<&str>,
        record: EntityRecord,
    ) -> Result<EntityRecord, CrudError>;

    /// Validate and apply a partial update
    async fn update_record(
        &self,
        page: &str,
        id: &str,
        patch: EntityRecord,
    ) -> Result<EntityRecord, CrudError>;

    /// Delete a record by primary key
    async fn delete_record(&self, page: &str, id: &str) -> Result<(), CrudError>;

    /// Probe the underlying store
    async fn health(&self) -> HealthStatus;
}
