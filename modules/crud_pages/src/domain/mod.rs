//! Domain layer - registry, adapter, page state machine and services

pub mod adapter;
pub mod builtin;
pub mod identity;
pub mod page;
pub mod registry;
pub mod reporting;
pub mod repository;
pub mod service;
pub mod validation;
pub mod view;

pub use adapter::CrudAdapter;
pub use identity::{CurrentUserProvider, SessionUserProvider, StaticUserProvider};
pub use page::{CrudPage, EditSession, EditTarget, PageState, PendingDelete, PendingSubmit};
pub use registry::{ModuleCatalog, ModuleRegistry, RegistryBuilder, RegistryError};
pub use reporting::{report_in_background, ErrorSink, NoOpErrorSink};
pub use repository::{StoreError, TableStore};
pub use service::Service;
pub use view::{FormView, ListView, SortDirection, Widget};
