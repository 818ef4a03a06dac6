//! sw-migrate - Migration engine for Stepwise
//!
//! Reconciles loaded migrations with the version history stored in the
//! target database and applies what is missing, guarding every version
//! slot with conditional writes so concurrent runners cannot both apply
//! the same step.

pub mod error;
pub mod migrator;
pub mod reconcile;
pub mod registry;
pub mod status;
pub mod target;

pub use error::{MigrationError, MigrationResult};
pub use migrator::{AppliedMigration, Migrator};
pub use reconcile::{reconcile, PendingMigration, Reconciliation};
pub use registry::{ScriptError, ScriptFn, ScriptRegistry};
pub use status::{PendingStatus, StatusReport, StatusSummary};
pub use target::resolve_target_version;
