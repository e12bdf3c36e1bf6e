//! Domain service - resolves pages and orchestrates validation and the adapter

use super::adapter::CrudAdapter;
use super::page::CrudPage;
use super::registry::ModuleRegistry;
use super::validation::{validate_record, ValidationMode};
use super::view::ListView;
use crate::contract::{CrudError, EntityRecord, Filter, HealthStatus, ModuleConfig};
use std::sync::Arc;

/// Domain service for page-addressed record access
pub struct Service {
    registry: Arc<ModuleRegistry>,
    adapter: CrudAdapter,
}

impl Service {
    /// Create a new service instance
    pub fn new(registry: Arc<ModuleRegistry>, adapter: CrudAdapter) -> Self {
        Self { registry, adapter }
    }

    pub fn registry(&self) -> &ModuleRegistry {
        &self.registry
    }

    pub fn adapter(&self) -> &CrudAdapter {
        &self.adapter
    }

    /// Configuration a page renders with
    pub fn resolve(&self, page: &str) -> Result<Arc<ModuleConfig>, CrudError> {
        self.registry
            .resolve_page(page)
            .ok_or_else(|| CrudError::configuration(format!("unknown page '{page}'")))
    }

    /// Fresh, unmounted page bound to `scope`
    pub fn open_page(&self, page: &str, scope: Option<&str>) -> Result<CrudPage, CrudError> {
        let config = self.resolve(page)?;
        Ok(CrudPage::new(config, scope.map(str::to_string), self.adapter.clone()))
    }

    /// Mount a page and render its list; fetch failures show up in the view
    pub async fn render_list(&self, page: &str, scope: Option<&str>) -> Result<ListView, CrudError> {
        let mut page = self.open_page(page, scope)?;
        page.mount().await;
        Ok(page.list_view())
    }

    // ===== Record Operations =====

    pub async fn list_records(
        &self,
        page: &str,
        scope: Option<&str>,
        filters: &[Filter],
    ) -> Result<Vec<EntityRecord>, CrudError> {
        let config = self.resolve(page)?;
        self.adapter.list(&config, scope, filters).await
    }

    /// Validate and insert; `acting_user` overrides the adapter's provider
    pub async fn create_record(
        &self,
        page: &str,
        scope: Option<&str>,
        record: EntityRecord,
        acting_user: Option<&str>,
    ) -> Result<EntityRecord, CrudError> {
        let config = self.resolve(page)?;
        validate_record(&config, &record, ValidationMode::Full)?;

        match acting_user {
            Some(user) => self.adapter.acting_as(user).create(&config, scope, record).await,
            None => self.adapter.create(&config, scope, record).await,
        }
    }

    /// Validate the fields present in `patch` and apply it
    pub async fn update_record(
        &self,
        page: &str,
        id: &str,
        patch: EntityRecord,
    ) -> Result<EntityRecord, CrudError> {
        let config = self.resolve(page)?;
        validate_record(&config, &patch, ValidationMode::Partial)?;
        self.adapter.update(&config, id, patch).await
    }

    pub async fn delete_record(&self, page: &str, id: &str) -> Result<(), CrudError> {
        let config = self.resolve(page)?;
        self.adapter.delete(&config, id).await
    }

    pub async fn health(&self) -> HealthStatus {
        self.adapter.health().await
    }
}
