//! Mapper implementations for converting between DTOs and contract models

use super::dto::*;
use crate::contract;

// ===== Module conversions =====

impl From<&contract::SelectOption> for OptionDto {
    fn from(option: &contract::SelectOption) -> Self {
        Self {
            value: option.value.clone(),
            label: option.label.clone(),
        }
    }
}

impl From<&contract::FieldSpec> for FieldDto {
    fn from(field: &contract::FieldSpec) -> Self {
        Self {
            name: field.name.clone(),
            label: field.label.clone(),
            field_type: field.field_type.as_str().to_string(),
            required: field.required,
            sortable: field.sortable,
            options: field.options.iter().map(Into::into).collect(),
        }
    }
}

impl From<&contract::ModuleConfig> for ModuleSchemaDto {
    fn from(config: &contract::ModuleConfig) -> Self {
        Self {
            key: config.key.clone(),
            table: config.table.clone(),
            singular: config.singular.clone(),
            plural: config.plural.clone(),
            project_scoped: config.project_scoped,
            fields: config.fields.iter().map(Into::into).collect(),
        }
    }
}

impl From<&contract::PageBinding> for PageSummaryDto {
    fn from(binding: &contract::PageBinding) -> Self {
        Self {
            name: binding.name.clone(),
            module: binding.module.clone(),
            derived: !binding.overrides.is_empty(),
        }
    }
}

// ===== Record conversions =====

impl From<Vec<contract::EntityRecord>> for RecordsListResponse {
    fn from(records: Vec<contract::EntityRecord>) -> Self {
        let items: Vec<serde_json::Value> =
            records.into_iter().map(serde_json::Value::Object).collect();
        let total = items.len();
        Self { items, total }
    }
}

impl From<&contract::FieldError> for FieldErrorDto {
    fn from(error: &contract::FieldError) -> Self {
        Self {
            field: error.field.clone(),
            message: error.message.clone(),
        }
    }
}

// ===== Operational conversions =====

impl From<contract::HealthStatus> for HealthDto {
    fn from(status: contract::HealthStatus) -> Self {
        let name = status.as_str().to_string();
        match status {
            contract::HealthStatus::Healthy => Self {
                status: name,
                reason: None,
            },
            contract::HealthStatus::Degraded { reason } => Self {
                status: name,
                reason: Some(reason),
            },
        }
    }
}

impl ClientErrorRequest {
    pub fn into_report(self, user: Option<String>) -> contract::ClientErrorReport {
        contract::ClientErrorReport {
            message: self.message,
            stack: self.stack,
            url: self.url,
            user_agent: self.user_agent,
            user,
        }
    }
}
