//! Route registration

use super::{dto::*, error::Problem, handlers};
use crate::contract::EntityRecord;
use crate::domain::{ErrorSink, ListView, Service};
use axum::{
    extract::{Path, Query},
    http::{HeaderMap, StatusCode},
    routing::{get, patch, post},
    Extension, Json, Router,
};
use std::collections::HashMap;
use std::sync::Arc;

/// Register all REST routes
pub fn register_routes(
    router: Router,
    service: Arc<Service>,
    sink: Arc<dyn ErrorSink>,
) -> anyhow::Result<Router> {
    let router = router
        // Registry endpoints
        .route("/modules", get(list_modules_handler))
        .route("/pages/{page}/schema", get(get_schema_handler))
        .route("/pages/{page}/view", get(page_view_handler))
        // Record endpoints
        .route(
            "/pages/{page}/records",
            get(list_records_handler).post(create_record_handler),
        )
        .route(
            "/pages/{page}/records/{id}",
            patch(update_record_handler).delete(delete_record_handler),
        )
        // Operational endpoints
        .route("/health", get(health_handler))
        .route("/client-errors", post(client_error_handler))
        .layer(Extension(service))
        .layer(Extension(sink));

    Ok(router)
}

// ===== Handler wrappers that extract state from Extension =====

async fn list_modules_handler(
    Extension(service): Extension<Arc<Service>>,
) -> Json<ModulesResponse> {
    handlers::list_modules(service).await
}

async fn get_schema_handler(
    Extension(service): Extension<Arc<Service>>,
    path: Path<String>,
) -> Result<Json<ModuleSchemaDto>, Problem> {
    handlers::get_schema(service, path).await
}

async fn page_view_handler(
    Extension(service): Extension<Arc<Service>>,
    path: Path<String>,
    query: Query<handlers::ScopeQuery>,
) -> Result<Json<ListView>, Problem> {
    handlers::page_view(service, path, query).await
}

async fn list_records_handler(
    Extension(service): Extension<Arc<Service>>,
    path: Path<String>,
    query: Query<HashMap<String, String>>,
) -> Result<Json<RecordsListResponse>, Problem> {
    handlers::list_records(service, path, query).await
}

async fn create_record_handler(
    Extension(service): Extension<Arc<Service>>,
    path: Path<String>,
    query: Query<handlers::ScopeQuery>,
    headers: HeaderMap,
    body: Json<EntityRecord>,
) -> Result<(StatusCode, Json<EntityRecord>), Problem> {
    handlers::create_record(service, path, query, headers, body).await
}

async fn update_record_handler(
    Extension(service): Extension<Arc<Service>>,
    path: Path<(String, String)>,
    body: Json<EntityRecord>,
) -> Result<Json<EntityRecord>, Problem> {
    handlers::update_record(service, path, body).await
}

async fn delete_record_handler(
    Extension(service): Extension<Arc<Service>>,
    path: Path<(String, String)>,
) -> Result<StatusCode, Problem> {
    handlers::delete_record(service, path).await
}

async fn health_handler(
    Extension(service): Extension<Arc<Service>>,
) -> (StatusCode, Json<HealthDto>) {
    handlers::health(service).await
}

async fn client_error_handler(
    Extension(sink): Extension<Arc<dyn ErrorSink>>,
    headers: HeaderMap,
    body: Json<ClientErrorRequest>,
) -> StatusCode {
    handlers::report_client_error(sink, headers, body).await
}
