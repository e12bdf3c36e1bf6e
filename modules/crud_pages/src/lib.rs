//! Crud Pages Module
//!
//! Configuration-driven list/form engine for construction project records.
//! A module configuration (table, labels, scoping, ordered fields) is the only
//! input a page needs: the adapter turns it into store calls and the page state
//! machine turns it into list and form views.

// Public exports
pub mod contract;
pub use contract::{
    client::CrudApi, error::CrudError, ConfigOverride, EntityRecord, FieldSpec, FieldType,
    Filter, HealthStatus, ModuleConfig, PageBinding,
};

pub mod config;
pub use config::Config;

pub mod domain;
pub use domain::{CrudAdapter, CrudPage, ModuleRegistry, PageState, Service};

pub mod module;
pub use module::CrudPagesModule;

// Internal modules (hidden from public API)
#[doc(hidden)]
pub mod api;
#[doc(hidden)]
pub mod infra;
