//! Storage layer - table store, error log and schema provisioning

pub mod entity;
pub mod mapper;
pub mod migrations;
pub mod repositories;
pub mod schema;

pub use migrations::Migrator;
pub use repositories::{SeaOrmErrorSink, SeaOrmTableStore};
pub use schema::sync_module_tables;
