//! sw-core - Core library for Stepwise
//!
//! This crate provides the value types shared across all Stepwise
//! components: migrations and their checksums, version-history records,
//! the statement splitter, configuration and profile parsing, project
//! discovery and migration scaffolding.

pub mod checksum;
pub mod config;
pub mod error;
pub mod generate;
pub mod identifier;
pub mod migration;
mod newtype_string;
pub mod profile;
pub mod project;
pub mod splitter;
pub mod sql_utils;
pub mod version;

pub use checksum::Checksum;
pub use config::Config;
pub use error::{CoreError, CoreResult};
pub use generate::generate;
pub use identifier::{KeyspaceName, TableName};
pub use migration::{Migration, MigrationFormat};
pub use profile::{DdlValue, Profile};
pub use project::Project;
pub use version::{MigrationState, VersionRecord, VersionTable};
