//! Module assembly and lifecycle

use crate::api::native::NativeClient;
use crate::config::Config;
use crate::contract::CrudApi;
use crate::domain::{
    builtin, CrudAdapter, CurrentUserProvider, ErrorSink, ModuleRegistry, Service,
    StaticUserProvider, TableStore,
};
use crate::infra::storage::{sync_module_tables, Migrator, SeaOrmErrorSink, SeaOrmTableStore};
use anyhow::{Context, Result};
use sea_orm::DatabaseConnection;
use sea_orm_migration::MigratorTrait;
use std::sync::Arc;

/// Crud pages module: registry, adapter and service over one database
pub struct CrudPagesModule {
    config: Config,
    service: Arc<Service>,
    sink: Arc<dyn ErrorSink>,
}

impl CrudPagesModule {
    /// Build the registry, migrate, provision module tables and wire the
    /// service against `db`
    pub async fn init(config: Config, db: DatabaseConnection) -> Result<Self> {
        let mut builder = builtin::builder();
        if let Some(path) = &config.modules_file {
            builder = builder.load_file(path)?;
        }
        let registry = Arc::new(builder.build().context("invalid module registry")?);

        Migrator::up(&db, None).await.context("error log migration failed")?;
        tracing::info!("Crud pages migrations completed");

        if config.sync_schema {
            sync_module_tables(&db, &registry.storage_configs())
                .await
                .context("module table provisioning failed")?;
        }

        let db = Arc::new(db);
        let store: Arc<dyn TableStore> = Arc::new(SeaOrmTableStore::new(db.clone()));
        let sink: Arc<dyn ErrorSink> = Arc::new(SeaOrmErrorSink::new(db));

        // Requests name their user explicitly; anything else is stamped as the default user
        let users: Arc<dyn CurrentUserProvider> = Arc::new(StaticUserProvider::anonymous());

        Ok(Self::assemble(config, registry, store, users, sink))
    }

    /// Wire the module from already-built parts
    pub fn assemble(
        config: Config,
        registry: Arc<ModuleRegistry>,
        store: Arc<dyn TableStore>,
        users: Arc<dyn CurrentUserProvider>,
        sink: Arc<dyn ErrorSink>,
    ) -> Self {
        let adapter = CrudAdapter::new(store, users)
            .with_timeout(config.request_timeout)
            .with_default_user(config.default_user.clone())
            .with_error_sink(sink.clone());

        let modules = registry.modules().count();
        let pages = registry.pages().count();
        let service = Arc::new(Service::new(registry, adapter));

        tracing::info!(modules, pages, "Crud pages module initialized");
        Self {
            config,
            service,
            sink,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn service(&self) -> Arc<Service> {
        self.service.clone()
    }

    /// In-process client for other modules
    pub fn client(&self) -> Arc<dyn CrudApi> {
        Arc::new(NativeClient::new(self.service.clone()))
    }

    /// Mount the REST routes on `router`
    pub fn register_rest(&self, router: axum::Router) -> Result<axum::Router> {
        tracing::info!("Registering crud pages REST routes");
        crate::api::rest::routes::register_routes(router, self.service.clone(), self.sink.clone())
    }
}
