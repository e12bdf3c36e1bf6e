//! Query/mutation adapter
//!
//! Translates `(ModuleConfig, scope)` into store operations. Every call is
//! bounded by a timeout; nothing is retried here.

use super::identity::{CurrentUserProvider, StaticUserProvider};
use super::reporting::{report_in_background, ErrorSink, NoOpErrorSink};
use super::repository::{StoreError, TableStore};
use crate::contract::{
    ClientErrorReport, CrudError, EntityRecord, Filter, HealthStatus, ModuleConfig,
    CREATED_BY_COLUMN, ID_COLUMN, PROJECT_COLUMN,
};
use serde_json::Value;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

/// Default bound on a single store call
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(15);

/// Identity stamped on inserts when no session exists
pub const DEFAULT_USER: &str = "system";

/// Adapter between module configurations and the tabular store
#[derive(Clone)]
pub struct CrudAdapter {
    store: Arc<dyn TableStore>,
    users: Arc<dyn CurrentUserProvider>,
    errors: Arc<dyn ErrorSink>,
    default_user: String,
    timeout: Duration,
}

impl CrudAdapter {
    pub fn new(store: Arc<dyn TableStore>, users: Arc<dyn CurrentUserProvider>) -> Self {
        Self {
            store,
            users,
            errors: Arc::new(NoOpErrorSink),
            default_user: DEFAULT_USER.to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_default_user(mut self, user: impl Into<String>) -> Self {
        self.default_user = user.into();
        self
    }

    pub fn with_error_sink(mut self, errors: Arc<dyn ErrorSink>) -> Self {
        self.errors = errors;
        self
    }

    /// Same adapter, attributing inserts to another provider
    pub fn with_user_provider(&self, users: Arc<dyn CurrentUserProvider>) -> Self {
        Self {
            users,
            ..self.clone()
        }
    }

    /// Same adapter, attributing inserts to `user`
    pub fn acting_as(&self, user: impl Into<String>) -> Self {
        self.with_user_provider(Arc::new(StaticUserProvider::new(user)))
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Records of `config.table`, confined to `scope` when the module is project scoped
    pub async fn list(
        &self,
        config: &ModuleConfig,
        scope: Option<&str>,
        filters: &[Filter],
    ) -> Result<Vec<EntityRecord>, CrudError> {
        let mut applied = Vec::with_capacity(filters.len() + 1);
        if let Some(project_id) = require_scope(config, scope)? {
            applied.push(Filter::eq(PROJECT_COLUMN, project_id));
        }
        for filter in filters {
            if !config.has_column(&filter.column) {
                return Err(CrudError::configuration(format!(
                    "unknown column '{}' for module '{}'",
                    filter.column, config.key
                )));
            }
            if config.project_scoped && filter.column == PROJECT_COLUMN {
                continue;
            }
            applied.push(filter.clone());
        }

        tracing::debug!(table = %config.table, filters = applied.len(), "Listing records");
        self.call(config, "list", self.store.select(&config.table, &applied))
            .await
    }

    /// Insert a record, stamping id, project and attribution
    pub async fn create(
        &self,
        config: &ModuleConfig,
        scope: Option<&str>,
        record: EntityRecord,
    ) -> Result<EntityRecord, CrudError> {
        let project_id = require_scope(config, scope)?;
        let id = record
            .get(ID_COLUMN)
            .and_then(Value::as_str)
            .filter(|id| !id.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| Uuid::new_v4().to_string());

        let mut row = field_values(config, record);
        row.insert(ID_COLUMN.to_string(), Value::String(id));
        if let Some(project_id) = project_id {
            row.insert(PROJECT_COLUMN.to_string(), Value::String(project_id.to_string()));
        }
        row.insert(CREATED_BY_COLUMN.to_string(), Value::String(self.current_user()));

        tracing::debug!(table = %config.table, "Creating record");
        self.call(config, "create", self.store.insert(&config.table, &row))
            .await
    }

    /// Partial update by primary key; last write wins
    pub async fn update(
        &self,
        config: &ModuleConfig,
        id: &str,
        record: EntityRecord,
    ) -> Result<EntityRecord, CrudError> {
        let patch = field_values(config, record);

        tracing::debug!(table = %config.table, %id, fields = patch.len(), "Updating record");
        self.call(config, "update", self.store.update(&config.table, id, &patch))
            .await
            .map_err(|e| not_found_for(e, config, id))
    }

    /// Delete by primary key
    pub async fn delete(&self, config: &ModuleConfig, id: &str) -> Result<(), CrudError> {
        tracing::debug!(table = %config.table, %id, "Deleting record");
        self.call(config, "delete", self.store.delete(&config.table, id))
            .await
            .map_err(|e| not_found_for(e, config, id))
    }

    /// Liveness of the store
    pub async fn health(&self) -> HealthStatus {
        match tokio::time::timeout(self.timeout, self.store.ping()).await {
            Ok(Ok(())) => HealthStatus::Healthy,
            Ok(Err(e)) => HealthStatus::Degraded {
                reason: e.to_string(),
            },
            Err(_) => HealthStatus::Degraded {
                reason: format!("store ping timed out after {:?}", self.timeout),
            },
        }
    }

    fn current_user(&self) -> String {
        self.users
            .current_user()
            .filter(|u| !u.is_empty())
            .unwrap_or_else(|| self.default_user.clone())
    }

    async fn call<T>(
        &self,
        config: &ModuleConfig,
        operation: &'static str,
        fut: impl Future<Output = Result<T, StoreError>>,
    ) -> Result<T, CrudError> {
        match tokio::time::timeout(self.timeout, fut).await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(e)) => Err(self.map_store_error(config, operation, e)),
            Err(_) => {
                tracing::warn!(table = %config.table, operation, timeout = ?self.timeout, "Store call timed out");
                Err(CrudError::Transport {
                    message: format!("{operation} on '{}' timed out after {:?}", config.table, self.timeout),
                })
            }
        }
    }

    fn map_store_error(&self, config: &ModuleConfig, operation: &str, error: StoreError) -> CrudError {
        match error {
            StoreError::Unreachable(message) => {
                tracing::warn!(table = %config.table, operation, %message, "Store unreachable");
                CrudError::Transport { message }
            }
            StoreError::MissingRelation(detail) => {
                tracing::error!(
                    target: "crud_pages::schema",
                    module = %config.key,
                    table = %config.table,
                    operation,
                    %detail,
                    "Module configuration does not match the store schema"
                );
                report_in_background(
                    Arc::clone(&self.errors),
                    ClientErrorReport {
                        message: format!(
                            "schema mismatch for module '{}' on table '{}': {detail}",
                            config.key, config.table
                        ),
                        ..Default::default()
                    },
                );
                CrudError::SchemaMismatch {
                    table: config.table.clone(),
                    detail,
                }
            }
            StoreError::RowNotFound => CrudError::NotFound {
                table: config.table.clone(),
                id: String::new(),
            },
            StoreError::Rejected(message) => {
                tracing::warn!(table = %config.table, operation, %message, "Store rejected request");
                CrudError::Store { message }
            }
        }
    }
}

/// Scope to apply, or a configuration error when a scoped module has none
fn require_scope<'a>(config: &ModuleConfig, scope: Option<&'a str>) -> Result<Option<&'a str>, CrudError> {
    if !config.project_scoped {
        return Ok(None);
    }
    match scope {
        Some(project_id) if !project_id.trim().is_empty() => Ok(Some(project_id)),
        _ => Err(CrudError::configuration(format!(
            "module '{}' is project scoped but no project id was supplied",
            config.key
        ))),
    }
}

/// Keep only the configured field columns of a record, in field order
fn field_values(config: &ModuleConfig, mut record: EntityRecord) -> EntityRecord {
    config
        .fields
        .iter()
        .filter_map(|f| record.remove(&f.name).map(|v| (f.name.clone(), v)))
        .collect()
}

fn not_found_for(error: CrudError, config: &ModuleConfig, id: &str) -> CrudError {
    match error {
        CrudError::NotFound { .. } => CrudError::NotFound {
            table: config.table.clone(),
            id: id.to_string(),
        },
        other => other,
    }
}
