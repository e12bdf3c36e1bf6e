//! Native client implementation - wraps domain service for in-process calls

use crate::contract::{CrudApi, CrudError, EntityRecord, Filter, HealthStatus, ModuleConfig};
use crate::domain::Service;
use async_trait::async_trait;
use std::sync::Arc;

/// Native client that calls the domain service directly, without HTTP.
///
/// Records created through it are stamped by the adapter's user provider.
#[derive(Clone)]
pub struct NativeClient {
    service: Arc<Service>,
}

impl NativeClient {
    pub fn new(service: Arc<Service>) -> Self {
        Self { service }
    }
}

#[async_trait]
impl CrudApi for NativeClient {
    async fn page_config(&self, page: &str) -> Result<Arc<ModuleConfig>, CrudError> {
        self.service.resolve(page)
    }

    async fn list_records(
        &self,
        page: &str,
        project_id: Option<&str>,
        filters: &[Filter],
    ) -> Result<Vec<EntityRecord>, CrudError> {
        self.service.list_records(page, project_id, filters).await
    }

    async fn create_record(
        &self,
        page: &str,
        project_id: Option<&str>,
        record: EntityRecord,
    ) -> Result<EntityRecord, CrudError> {
        self.service.create_record(page, project_id, record, None).await
    }

    async fn update_record(
        &self,
        page: &str,
        id: &str,
        patch: EntityRecord,
    ) -> Result<EntityRecord, CrudError> {
        self.service.update_record(page, id, patch).await
    }

    async fn delete_record(&self, page: &str, id: &str) -> Result<(), CrudError> {
        self.service.delete_record(page, id).await
    }

    async fn health(&self) -> HealthStatus {
        self.service.health().await
    }
}
