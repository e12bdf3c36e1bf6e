//! HTTP request handlers - thin layer that delegates to domain service

use super::{
    dto::*,
    error::{map_domain_error, Problem},
};
use crate::contract::{EntityRecord, FieldSpec, FieldType, Filter, ModuleConfig, PROJECT_COLUMN};
use crate::domain::{report_in_background, ErrorSink, ListView, Service};
use axum::{
    extract::{Path, Query},
    http::{HeaderMap, StatusCode},
    Json,
};
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;

/// Header carrying the acting user
pub const USER_HEADER: &str = "x-user-id";

/// Scope query parameter shared by page endpoints
#[derive(Debug, Default, Deserialize)]
pub struct ScopeQuery {
    pub project_id: Option<String>,
}

fn acting_user(headers: &HeaderMap) -> Option<String> {
    headers
        .get(USER_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// Query strings are untyped; parse values the way the column is declared
fn coerce(field: Option<&FieldSpec>, raw: &str) -> Value {
    match field.map(|f| f.field_type) {
        Some(FieldType::Number | FieldType::Currency) => raw
            .parse::<f64>()
            .ok()
            .and_then(serde_json::Number::from_f64)
            .map(Value::Number)
            .unwrap_or_else(|| Value::String(raw.to_string())),
        Some(FieldType::Boolean) => match raw {
            "true" => Value::Bool(true),
            "false" => Value::Bool(false),
            other => Value::String(other.to_string()),
        },
        _ => Value::String(raw.to_string()),
    }
}

fn query_filters(config: &ModuleConfig, params: &HashMap<String, String>) -> Vec<Filter> {
    let mut filters: Vec<Filter> = params
        .iter()
        .filter(|(column, _)| column.as_str() != PROJECT_COLUMN)
        .map(|(column, raw)| Filter::eq(column.as_str(), coerce(config.field_spec(column), raw)))
        .collect();
    // Stable order for the store query
    filters.sort_by(|a, b| a.column.cmp(&b.column));
    filters
}

// ===== Registry Handlers =====

/// List registered modules and page bindings
pub async fn list_modules(service: Arc<Service>) -> Json<ModulesResponse> {
    let registry = service.registry();
    Json(ModulesResponse {
        modules: registry.modules().map(|m| m.as_ref().into()).collect(),
        pages: registry.pages().map(Into::into).collect(),
    })
}

/// Resolved configuration of a page
pub async fn get_schema(
    service: Arc<Service>,
    Path(page): Path<String>,
) -> Result<Json<ModuleSchemaDto>, Problem> {
    let config = service.resolve(&page).map_err(map_domain_error)?;
    Ok(Json(config.as_ref().into()))
}

// ===== Record Handlers =====

/// List records; every query parameter other than `project_id` is an
/// equality filter
pub async fn list_records(
    service: Arc<Service>,
    Path(page): Path<String>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Json<RecordsListResponse>, Problem> {
    let config = service.resolve(&page).map_err(map_domain_error)?;
    let filters = query_filters(&config, &params);
    let scope = params.get(PROJECT_COLUMN).map(String::as_str);

    let records = service
        .list_records(&page, scope, &filters)
        .await
        .map_err(map_domain_error)?;

    Ok(Json(records.into()))
}

/// Validate and insert a record
pub async fn create_record(
    service: Arc<Service>,
    Path(page): Path<String>,
    Query(scope): Query<ScopeQuery>,
    headers: HeaderMap,
    Json(record): Json<EntityRecord>,
) -> Result<(StatusCode, Json<EntityRecord>), Problem> {
    let user = acting_user(&headers);
    let created = service
        .create_record(&page, scope.project_id.as_deref(), record, user.as_deref())
        .await
        .map_err(map_domain_error)?;

    Ok((StatusCode::CREATED, Json(created)))
}

/// Apply a partial update
pub async fn update_record(
    service: Arc<Service>,
    Path((page, id)): Path<(String, String)>,
    Json(patch): Json<EntityRecord>,
) -> Result<Json<EntityRecord>, Problem> {
    let updated = service
        .update_record(&page, &id, patch)
        .await
        .map_err(map_domain_error)?;

    Ok(Json(updated))
}

/// Delete a record by primary key
pub async fn delete_record(
    service: Arc<Service>,
    Path((page, id)): Path<(String, String)>,
) -> Result<StatusCode, Problem> {
    service
        .delete_record(&page, &id)
        .await
        .map_err(map_domain_error)?;

    Ok(StatusCode::NO_CONTENT)
}

/// Rendered list view of a freshly mounted page.
///
/// Fetch failures are part of the view, so this only fails for unknown pages.
pub async fn page_view(
    service: Arc<Service>,
    Path(page): Path<String>,
    Query(scope): Query<ScopeQuery>,
) -> Result<Json<ListView>, Problem> {
    let view = service
        .render_list(&page, scope.project_id.as_deref())
        .await
        .map_err(map_domain_error)?;

    Ok(Json(view))
}

// ===== Operational Handlers =====

pub async fn health(service: Arc<Service>) -> (StatusCode, Json<HealthDto>) {
    let status = service.health().await;
    let code = if status.is_healthy() {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    (code, Json(status.into()))
}

/// Accept a client error report; persistence happens in the background
pub async fn report_client_error(
    sink: Arc<dyn ErrorSink>,
    headers: HeaderMap,
    Json(req): Json<ClientErrorRequest>,
) -> StatusCode {
    let report = req.into_report(acting_user(&headers));
    tracing::info!(message = %report.message, url = ?report.url, "Client error reported");
    report_in_background(sink, report);
    StatusCode::ACCEPTED
}

#[cfg(test)]
mod tests {
    use super::*;

    fn budget() -> ModuleConfig {
        ModuleConfig::new("budget_items", "budget_items", "Budget Item", "Budget")
            .project_scoped()
            .field(FieldSpec::new("amount", "Amount", FieldType::Currency))
            .field(FieldSpec::new("approved", "Approved", FieldType::Boolean))
            .field(FieldSpec::new("code", "Code", FieldType::Text))
    }

    #[test]
    fn filters_follow_column_types() {
        let params: HashMap<String, String> = [
            ("project_id", "proj-1"),
            ("code", "03-300"),
            ("approved", "true"),
            ("amount", "1250.5"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();

        let filters = query_filters(&budget(), &params);

        assert_eq!(
            filters,
            vec![
                Filter::eq("amount", 1250.5),
                Filter::eq("approved", true),
                Filter::eq("code", "03-300"),
            ]
        );
    }

    #[test]
    fn blank_user_header_is_ignored() {
        let mut headers = HeaderMap::new();
        headers.insert(USER_HEADER, "  ".parse().unwrap());
        assert_eq!(acting_user(&headers), None);

        headers.insert(USER_HEADER, "pm@site.test".parse().unwrap());
        assert_eq!(acting_user(&headers).as_deref(), Some("pm@site.test"));
    }
}
