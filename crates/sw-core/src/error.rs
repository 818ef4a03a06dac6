//! Error types for sw-core

use thiserror::Error;

/// Core error type for Stepwise
#[derive(Error, Debug)]
pub enum CoreError {
    /// C001: Configuration file not found
    #[error("[C001] Config file not found: {path}")]
    ConfigNotFound { path: String },

    /// C002: Failed to parse configuration file
    #[error("[C002] Failed to parse config {path}: {message}")]
    ConfigParseError { path: String, message: String },

    /// C003: Invalid configuration value, reported with its key path
    #[error("[C003] Invalid config at '{key}': {message}")]
    ConfigInvalid { key: String, message: String },

    /// C004: Requested profile is not defined
    #[error("[C004] Unknown profile '{name}'. Available profiles: {available}")]
    UnknownProfile { name: String, available: String },

    /// C005: Migration file with an extension we cannot execute
    #[error("[C005] Migration has unknown extension '{extension}': {path}")]
    UnknownMigrationFormat { path: String, extension: String },

    /// C006: Glob pattern used for migration discovery is malformed
    #[error("[C006] Invalid migration pattern '{pattern}': {message}")]
    InvalidPattern { pattern: String, message: String },

    /// C007: Template failed to compile or render
    #[error("[C007] Template error in '{key}': {message}")]
    Template { key: String, message: String },

    /// C008: Generated migration would overwrite an existing file
    #[error("[C008] Migration file already exists: {path}")]
    MigrationExists { path: String },

    /// C009: IO error with file path context
    #[error("[C009] Failed to read '{path}': {source}")]
    IoWithPath {
        path: String,
        source: std::io::Error,
    },

    /// C010: IO error
    #[error("[C010] IO error: {0}")]
    Io(#[from] std::io::Error),

    /// C011: Project directory does not exist
    #[error("[C011] Project directory not found: {path}")]
    ProjectNotFound { path: String },
}

/// Result type alias for CoreError
pub type CoreResult<T> = Result<T, CoreError>;
