//! Error types for the migration engine.

use sw_core::CoreError;
use sw_db::DbError;
use thiserror::Error;

/// Migration engine errors.
///
/// None of these are retried by the engine; they propagate to the caller
/// unchanged.
#[derive(Error, Debug)]
pub enum MigrationError {
    /// A migration raised during execution, or history holds a failed one (M001).
    #[error("[M001] Migration failed, cannot continue (version {version}): {name}")]
    FailedMigration { version: i32, name: String },

    /// A conditional write found its precondition violated (M002).
    #[error("[M002] Migration already in progress (version {version}): {name}")]
    ConcurrentMigration { version: i32, name: String },

    /// Stored history differs from the migration file for the same version (M003).
    #[error(
        "[M003] Found inconsistency between migration '{name}' and stored version {version} \
         ('{stored_name}'): {mismatched} differ"
    )]
    InconsistentState {
        version: i32,
        name: String,
        stored_name: String,
        mismatched: String,
    },

    /// Stored history references a version with no migration file (M004).
    #[error("[M004] Found version in database without corresponding migration (version {version}): {name}")]
    UnknownMigration { version: i32, name: String },

    /// Target version specifier is not a usable version number (M005).
    #[error("[M005] Invalid target version '{spec}': must be a number between 1 and {latest}")]
    InvalidTargetVersion { spec: String, latest: usize },

    /// The keyspace must already exist for this operation (M006).
    #[error("[M006] Keyspace '{keyspace}' does not exist, stopping")]
    KeyspaceMissing { keyspace: String },

    /// Storage error
    #[error(transparent)]
    Db(#[from] DbError),

    /// Configuration or loading error
    #[error(transparent)]
    Core(#[from] CoreError),
}

/// Result type alias for [`MigrationError`].
pub type MigrationResult<T> = Result<T, MigrationError>;
