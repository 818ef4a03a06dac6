//! sw-db - Storage layer for Stepwise
//!
//! This crate provides the capability traits the migration engine talks to
//! (`Session`, `VersionStore`, `Catalog`) and their DuckDB implementation.

pub mod duckdb;
pub mod error;
pub mod traits;

pub use duckdb::DuckDbBackend;
pub use error::{DbError, DbResult};
pub use traits::{Catalog, MigrationBackend, Session, VersionStore};
