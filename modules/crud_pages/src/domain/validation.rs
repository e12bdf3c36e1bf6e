//! Draft validation
//!
//! Required-ness is checked by hand (blank strings count as missing). Type
//! conformance is checked against a JSON Schema derived from the field specs.

use crate::contract::{CrudError, EntityRecord, FieldError, FieldType, ModuleConfig};
use jsonschema::Validator;
use serde_json::{json, Map, Value};

/// Which fields a draft must carry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationMode {
    /// Every required field must be present and non-blank (create, full edit)
    Full,
    /// Only fields present in the patch are checked (partial update)
    Partial,
}

/// Empty draft seeded from each field's type
pub fn default_draft(config: &ModuleConfig) -> EntityRecord {
    config
        .fields
        .iter()
        .map(|f| (f.name.clone(), f.field_type.default_value()))
        .collect()
}

/// Whether a value counts as "not filled in"
pub fn is_blank(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => true,
        Some(Value::String(s)) => s.trim().is_empty(),
        Some(Value::Array(items)) => items.is_empty(),
        Some(_) => false,
    }
}

/// Required fields that are missing or blank
pub fn missing_required(
    config: &ModuleConfig,
    record: &EntityRecord,
    mode: ValidationMode,
) -> Vec<FieldError> {
    config
        .fields
        .iter()
        .filter(|f| f.required)
        .filter(|f| mode == ValidationMode::Full || record.contains_key(&f.name))
        .filter(|f| is_blank(record.get(&f.name)))
        .map(|f| FieldError::new(&f.name, format!("{} is required", f.label)))
        .collect()
}

/// JSON Schema describing the value types a module's records accept
pub fn record_schema(config: &ModuleConfig) -> Value {
    let mut properties = Map::new();
    for field in &config.fields {
        let schema = match field.field_type {
            FieldType::Text | FieldType::Textarea => json!({ "type": ["string", "null"] }),
            FieldType::Number | FieldType::Currency => json!({ "type": ["number", "null"] }),
            FieldType::Boolean => json!({ "type": ["boolean", "null"] }),
            FieldType::Date => json!({
                "type": ["string", "null"],
                "pattern": "^$|^[0-9]{4}-[0-9]{2}-[0-9]{2}"
            }),
            FieldType::Select => {
                let mut allowed: Vec<Value> = field
                    .options
                    .iter()
                    .map(|o| Value::String(o.value.clone()))
                    .collect();
                allowed.push(Value::String(String::new()));
                allowed.push(Value::Null);
                json!({ "enum": allowed })
            }
            // Raw foreign value; resolution happens elsewhere
            FieldType::Relation => json!({ "type": ["string", "number", "null"] }),
        };
        properties.insert(field.name.clone(), schema);
    }

    json!({
        "type": "object",
        "properties": properties,
        "additionalProperties": true
    })
}

/// Type errors of a record against its module's schema
pub fn type_errors(config: &ModuleConfig, record: &EntityRecord) -> Result<Vec<FieldError>, CrudError> {
    let schema = record_schema(config);
    let validator = Validator::new(&schema).map_err(|e| {
        CrudError::configuration(format!("Invalid schema for module '{}': {}", config.key, e))
    })?;

    let instance = Value::Object(record.clone());
    let errors = validator
        .iter_errors(&instance)
        .map(|error| {
            let path = error.instance_path.to_string();
            let field = path.trim_start_matches('/').split('/').next().unwrap_or("").to_string();
            let message = match config.field_spec(&field) {
                Some(spec) => format!("{} must be a valid {}", spec.label, spec.field_type),
                None => error.to_string(),
            };
            FieldError::new(field, message)
        })
        .collect();

    Ok(errors)
}

/// Check a draft before it is sent to the adapter
pub fn validate_record(
    config: &ModuleConfig,
    record: &EntityRecord,
    mode: ValidationMode,
) -> Result<(), CrudError> {
    let mut errors = missing_required(config, record, mode);

    for error in type_errors(config, record)? {
        if !errors.iter().any(|e| e.field == error.field) {
            errors.push(error);
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(CrudError::Validation { errors })
    }
}
