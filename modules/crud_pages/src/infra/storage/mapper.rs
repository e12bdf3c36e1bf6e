//! Conversions between JSON records, SeaORM values and contract models

use super::entity::error_log;
use crate::contract::{ClientErrorReport, EntityRecord};
use crate::domain::StoreError;
use sea_orm::{DbErr, JsonValue, Value as SeaValue};

// ===== Record Values =====

/// Bind a JSON value as a SQL parameter
pub fn to_sea_value(value: &JsonValue) -> SeaValue {
    match value {
        JsonValue::Null => SeaValue::String(None),
        JsonValue::Bool(b) => SeaValue::from(*b),
        JsonValue::Number(n) => match n.as_i64() {
            Some(i) => SeaValue::from(i),
            None => SeaValue::Double(n.as_f64()),
        },
        JsonValue::String(s) => SeaValue::from(s.clone()),
        // Arrays and objects are stored as JSON documents
        other => SeaValue::from(other.clone()),
    }
}

/// Row fetched through `JsonValue::find_by_statement` as a record
pub fn into_record(row: JsonValue) -> Option<EntityRecord> {
    match row {
        JsonValue::Object(map) => Some(map),
        _ => None,
    }
}

// ===== Errors =====

/// Sort a SeaORM error into the store taxonomy
pub fn classify_db_error(error: DbErr) -> StoreError {
    match error {
        DbErr::Conn(e) => StoreError::Unreachable(e.to_string()),
        DbErr::ConnectionAcquire(e) => StoreError::Unreachable(e.to_string()),
        DbErr::RecordNotFound(_) | DbErr::RecordNotUpdated => StoreError::RowNotFound,
        other => {
            let message = other.to_string();
            if is_missing_relation(&message) {
                StoreError::MissingRelation(message)
            } else if is_connectivity(&message) {
                StoreError::Unreachable(message)
            } else {
                StoreError::Rejected(message)
            }
        }
    }
}

fn is_missing_relation(message: &str) -> bool {
    let lower = message.to_lowercase();
    // SQLite
    lower.contains("no such table")
        || lower.contains("no such column")
        || lower.contains("has no column named")
        // Postgres: relation "x" does not exist / column "y" of relation "x" does not exist
        || (lower.contains("does not exist") && (lower.contains("relation") || lower.contains("column")))
        // MySQL
        || lower.contains("unknown column")
        || (lower.contains("table") && lower.contains("doesn't exist"))
}

fn is_connectivity(message: &str) -> bool {
    let lower = message.to_lowercase();
    lower.contains("error communicating with database")
        || lower.contains("pool timed out")
        || lower.contains("connection refused")
        || lower.contains("connection reset")
}

// ===== Error Log =====

impl From<&ClientErrorReport> for error_log::ActiveModel {
    fn from(report: &ClientErrorReport) -> Self {
        use sea_orm::ActiveValue::Set;

        Self {
            id: Set(uuid::Uuid::new_v4()),
            message: Set(report.message.clone()),
            stack: Set(report.stack.clone()),
            url: Set(report.url.clone()),
            user_agent: Set(report.user_agent.clone()),
            reported_by: Set(report.user.clone()),
            created_at: Set(chrono::Utc::now()),
        }
    }
}
