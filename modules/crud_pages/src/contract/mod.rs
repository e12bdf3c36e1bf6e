//! Contract layer - public API for inter-module communication
//!
//! Transport-agnostic models, the error taxonomy and the native client trait.

pub mod client;
pub mod error;
pub mod model;

pub use client::CrudApi;
pub use error::{CrudError, FieldError};
pub use model::{
    ClientErrorReport, ConfigOverride, EntityRecord, FieldSpec, FieldType, Filter, HealthStatus,
    ModuleConfig, PageBinding, SelectOption, CREATED_AT_COLUMN, CREATED_BY_COLUMN, ID_COLUMN,
    MANAGED_COLUMNS, PROJECT_COLUMN,
};
