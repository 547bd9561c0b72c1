//! Core module - project layout, configuration, catalog and persisted tables

pub mod catalog;
pub mod config;
pub mod project;
pub mod session;
pub mod table;

pub use catalog::{Catalog, CatalogEntry, CatalogError, CatalogSource};
pub use config::Config;
pub use project::{Project, ProjectError};
pub use session::{Session, SessionError};
pub use table::{KeyedTable, StoreError, TableRecord, Upsert};
