//! `CrudError` to HTTP status mapping

use super::dto::FieldErrorDto;
use crate::contract::CrudError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

/// Problem Details body (RFC 9457) returned by every failing endpoint
#[derive(Debug, Serialize)]
pub struct Problem {
    #[serde(rename = "type")]
    pub type_uri: String,

    pub title: String,

    pub status: u16,

    /// Message of the underlying `CrudError`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,

    /// Per-field validation failures (extension member)
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<FieldErrorDto>,
}

impl Problem {
    pub fn new(status: StatusCode, title: impl Into<String>) -> Self {
        Self {
            type_uri: format!("https://httpstatuses.io/{}", status.as_u16()),
            title: title.into(),
            status: status.as_u16(),
            detail: None,
            errors: Vec::new(),
        }
    }

    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    pub fn with_errors(mut self, errors: Vec<FieldErrorDto>) -> Self {
        self.errors = errors;
        self
    }
}

impl IntoResponse for Problem {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(self)).into_response()
    }
}

/// Status and title for each error kind
pub fn map_domain_error(error: CrudError) -> Problem {
    let detail = error.to_string();
    match error {
        CrudError::Validation { errors } => {
            Problem::new(StatusCode::UNPROCESSABLE_ENTITY, "Validation Error")
                .with_detail(detail)
                .with_errors(errors.iter().map(Into::into).collect())
        }

        CrudError::NotFound { .. } => {
            Problem::new(StatusCode::NOT_FOUND, "Not Found").with_detail(detail)
        }

        CrudError::Configuration { .. } => {
            Problem::new(StatusCode::BAD_REQUEST, "Configuration Error").with_detail(detail)
        }

        CrudError::SchemaMismatch { .. } => {
            Problem::new(StatusCode::INTERNAL_SERVER_ERROR, "Schema Mismatch").with_detail(detail)
        }

        CrudError::Transport { .. } => {
            Problem::new(StatusCode::SERVICE_UNAVAILABLE, "Store Unavailable").with_detail(detail)
        }

        CrudError::Store { .. } => {
            Problem::new(StatusCode::BAD_GATEWAY, "Store Error").with_detail(detail)
        }

        CrudError::Busy => Problem::new(StatusCode::CONFLICT, "Busy").with_detail(detail),
    }
}
