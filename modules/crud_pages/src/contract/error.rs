//! Contract error types for crud pages
//!
//! These errors are transport-agnostic. They are what the page state machine
//! stores and what the REST layer maps to problem details.

/// One invalid field of a draft
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    /// Column name of the offending field
    pub field: String,
    /// Human readable reason
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl std::fmt::Display for FieldError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Crud engine errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CrudError {
    /// Draft failed local validation; never reaches the store
    #[error("Validation failed: {}", join_field_errors(errors))]
    Validation { errors: Vec<FieldError> },

    /// Store unreachable or timed out
    #[error("Store unavailable: {message}")]
    Transport { message: String },

    /// Store reports a missing table or column
    #[error("Schema mismatch on '{table}': {detail}")]
    SchemaMismatch { table: String, detail: String },

    /// Row no longer exists
    #[error("{table} record not found: {id}")]
    NotFound { table: String, id: String },

    /// Misconfigured call (scope missing, unknown page, unknown column)
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    /// Store refused the request for another reason
    #[error("Store rejected the request: {message}")]
    Store { message: String },

    /// The same action is already in flight
    #[error("Another operation is already in progress")]
    Busy,
}

impl CrudError {
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Whether repeating the same request can succeed without code changes
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Transport { .. } | Self::NotFound { .. } | Self::Busy)
    }

    /// Field errors carried by a validation failure
    pub fn field_errors(&self) -> &[FieldError] {
        match self {
            Self::Validation { errors } => errors,
            _ => &[],
        }
    }
}

fn join_field_errors(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}
