//! REST DTOs with serde derives for HTTP API

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

// ===== Module DTOs =====

/// Select option
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct OptionDto {
    #[schema(example = "open")]
    pub value: String,
    #[schema(example = "Open")]
    pub label: String,
}

/// Field declaration
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct FieldDto {
    /// Column name
    #[schema(example = "due_date")]
    pub name: String,

    pub label: String,

    /// One of text, number, currency, date, select, textarea, boolean, relation
    #[serde(rename = "type")]
    #[schema(example = "date")]
    pub field_type: String,

    pub required: bool,

    pub sortable: bool,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<OptionDto>,
}

/// Module configuration as a page renders it
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ModuleSchemaDto {
    #[schema(example = "rfis")]
    pub key: String,

    #[schema(example = "rfis")]
    pub table: String,

    #[schema(example = "RFI")]
    pub singular: String,

    #[schema(example = "RFIs")]
    pub plural: String,

    /// Whether a project scope is required
    pub project_scoped: bool,

    pub fields: Vec<FieldDto>,
}

/// Named page and the module it is bound to
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PageSummaryDto {
    #[schema(example = "project-contacts")]
    pub name: String,

    #[schema(example = "contacts")]
    pub module: String,

    /// True when the page overrides its module
    pub derived: bool,
}

/// Registry listing
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ModulesResponse {
    pub modules: Vec<ModuleSchemaDto>,
    pub pages: Vec<PageSummaryDto>,
}

// ===== Record DTOs =====

/// Records of one page
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RecordsListResponse {
    #[schema(value_type = Vec<Object>)]
    pub items: Vec<serde_json::Value>,
    pub total: usize,
}

/// Per-field validation failure
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct FieldErrorDto {
    #[schema(example = "subject")]
    pub field: String,
    #[schema(example = "is required")]
    pub message: String,
}

// ===== Operational DTOs =====

/// Store health
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct HealthDto {
    /// `healthy` or `degraded`
    #[schema(example = "healthy")]
    pub status: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

/// Error reported by a client
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct ClientErrorRequest {
    pub message: String,

    #[serde(default)]
    pub stack: Option<String>,

    #[serde(default)]
    pub url: Option<String>,

    #[serde(default)]
    pub user_agent: Option<String>,
}
