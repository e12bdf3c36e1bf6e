//! Contract models for crud pages
//!
//! Module configurations are plain data: they are created once at startup,
//! shared behind `Arc`, and never mutated. Serde derives are present because
//! configurations can also be loaded from YAML at startup.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A single row of a module's table, keyed by column name
pub type EntityRecord = Map<String, Value>;

/// Primary key column present on every module table
pub const ID_COLUMN: &str = "id";
/// Project reference column written for project-scoped modules
pub const PROJECT_COLUMN: &str = "project_id";
/// Attribution column stamped on insert
pub const CREATED_BY_COLUMN: &str = "created_by";
/// Insert timestamp column, filled by the store
pub const CREATED_AT_COLUMN: &str = "created_at";

/// Columns managed by the engine rather than declared as fields
pub const MANAGED_COLUMNS: [&str; 4] = [ID_COLUMN, PROJECT_COLUMN, CREATED_BY_COLUMN, CREATED_AT_COLUMN];

/// Value type of a field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldType {
    Text,
    Number,
    Currency,
    Date,
    Select,
    Textarea,
    Boolean,
    Relation,
}

impl FieldType {
    /// Empty value used to seed a new draft
    pub fn default_value(&self) -> Value {
        match self {
            FieldType::Number | FieldType::Currency => Value::from(0),
            FieldType::Boolean => Value::Bool(false),
            // No foreign row picked yet
            FieldType::Relation => Value::Null,
            FieldType::Text | FieldType::Textarea | FieldType::Date | FieldType::Select => {
                Value::String(String::new())
            }
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            FieldType::Text => "text",
            FieldType::Number => "number",
            FieldType::Currency => "currency",
            FieldType::Date => "date",
            FieldType::Select => "select",
            FieldType::Textarea => "textarea",
            FieldType::Boolean => "boolean",
            FieldType::Relation => "relation",
        }
    }
}

impl std::fmt::Display for FieldType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One choice of a `select` field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectOption {
    /// Stored value
    pub value: String,
    /// Display label
    pub label: String,
}

impl SelectOption {
    pub fn new(value: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            label: label.into(),
        }
    }
}

/// Declarative description of one field of a module
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldSpec {
    /// Column name in the module's table
    pub name: String,
    /// Human readable label
    pub label: String,
    /// Value type
    #[serde(rename = "type")]
    pub field_type: FieldType,
    /// Whether an empty value blocks submission
    #[serde(default)]
    pub required: bool,
    /// Choices, only meaningful for `select`
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<SelectOption>,
    /// Whether the list can be sorted by this column
    #[serde(default)]
    pub sortable: bool,
}

impl FieldSpec {
    pub fn new(name: impl Into<String>, label: impl Into<String>, field_type: FieldType) -> Self {
        Self {
            name: name.into(),
            label: label.into(),
            field_type,
            required: false,
            options: Vec::new(),
            sortable: false,
        }
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn sortable(mut self) -> Self {
        self.sortable = true;
        self
    }

    /// Attach choices given as `(value, label)` pairs
    pub fn with_options<I, V, L>(mut self, options: I) -> Self
    where
        I: IntoIterator<Item = (V, L)>,
        V: Into<String>,
        L: Into<String>,
    {
        self.options = options
            .into_iter()
            .map(|(value, label)| SelectOption::new(value, label))
            .collect();
        self
    }

    /// Label for a stored select value, if it is one of the options
    pub fn option_label(&self, value: &str) -> Option<&str> {
        self.options
            .iter()
            .find(|o| o.value == value)
            .map(|o| o.label.as_str())
    }
}

/// Declarative description of one entity type
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleConfig {
    /// Stable registry key (e.g. "rfis")
    pub key: String,
    /// Table holding the records
    pub table: String,
    /// Singular display name
    pub singular: String,
    /// Plural display name
    pub plural: String,
    /// Whether every operation is confined to one project
    #[serde(default, alias = "projectScoped")]
    pub project_scoped: bool,
    /// Ordered field schema: form order and list column order
    #[serde(default)]
    pub fields: Vec<FieldSpec>,
}

impl ModuleConfig {
    pub fn new(
        key: impl Into<String>,
        table: impl Into<String>,
        singular: impl Into<String>,
        plural: impl Into<String>,
    ) -> Self {
        Self {
            key: key.into(),
            table: table.into(),
            singular: singular.into(),
            plural: plural.into(),
            project_scoped: false,
            fields: Vec::new(),
        }
    }

    pub fn project_scoped(mut self) -> Self {
        self.project_scoped = true;
        self
    }

    pub fn field(mut self, field: FieldSpec) -> Self {
        self.fields.push(field);
        self
    }

    /// Look up a field by column name
    pub fn field_spec(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Whether `column` is a declared field or an engine-managed column
    pub fn has_column(&self, column: &str) -> bool {
        MANAGED_COLUMNS.contains(&column) || self.field_spec(column).is_some()
    }

    /// Produce a new configuration with the override's keys replacing ours.
    ///
    /// `fields` is replaced wholesale when present; there is no per-field merge.
    pub fn derive(&self, overrides: &ConfigOverride) -> ModuleConfig {
        ModuleConfig {
            key: self.key.clone(),
            table: overrides.table.clone().unwrap_or_else(|| self.table.clone()),
            singular: overrides
                .singular
                .clone()
                .unwrap_or_else(|| self.singular.clone()),
            plural: overrides.plural.clone().unwrap_or_else(|| self.plural.clone()),
            project_scoped: overrides.project_scoped.unwrap_or(self.project_scoped),
            fields: overrides
                .fields
                .clone()
                .unwrap_or_else(|| self.fields.clone()),
        }
    }
}

/// Partial configuration applied on top of a base by [`ModuleConfig::derive`]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigOverride {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub table: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub singular: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plural: Option<String>,
    #[serde(default, alias = "projectScoped", skip_serializing_if = "Option::is_none")]
    pub project_scoped: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fields: Option<Vec<FieldSpec>>,
}

impl ConfigOverride {
    pub fn table(mut self, table: impl Into<String>) -> Self {
        self.table = Some(table.into());
        self
    }

    pub fn singular(mut self, singular: impl Into<String>) -> Self {
        self.singular = Some(singular.into());
        self
    }

    pub fn plural(mut self, plural: impl Into<String>) -> Self {
        self.plural = Some(plural.into());
        self
    }

    pub fn project_scoped(mut self, scoped: bool) -> Self {
        self.project_scoped = Some(scoped);
        self
    }

    pub fn fields(mut self, fields: Vec<FieldSpec>) -> Self {
        self.fields = Some(fields);
        self
    }

    pub fn is_empty(&self) -> bool {
        self == &ConfigOverride::default()
    }
}

/// Route name bound to a module key plus an optional override
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageBinding {
    /// Route-level page name (e.g. "company-contacts")
    pub name: String,
    /// Registry key of the base configuration
    pub module: String,
    #[serde(default, skip_serializing_if = "ConfigOverride::is_empty")]
    pub overrides: ConfigOverride,
}

impl PageBinding {
    pub fn new(name: impl Into<String>, module: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            module: module.into(),
            overrides: ConfigOverride::default(),
        }
    }

    pub fn with_overrides(mut self, overrides: ConfigOverride) -> Self {
        self.overrides = overrides;
        self
    }
}

/// Equality filter on one column
#[derive(Debug, Clone, PartialEq)]
pub struct Filter {
    pub column: String,
    pub value: Value,
}

impl Filter {
    pub fn eq(column: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            column: column.into(),
            value: value.into(),
        }
    }
}

/// Store liveness as seen by the adapter
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HealthStatus {
    Healthy,
    Degraded { reason: String },
}

impl HealthStatus {
    pub fn is_healthy(&self) -> bool {
        matches!(self, HealthStatus::Healthy)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            HealthStatus::Healthy => "healthy",
            HealthStatus::Degraded { .. } => "degraded",
        }
    }
}

/// Error reported by a client for best-effort persistence
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ClientErrorReport {
    pub message: String,
    pub stack: Option<String>,
    pub url: Option<String>,
    pub user_agent: Option<String>,
    pub user: Option<String>,
}
