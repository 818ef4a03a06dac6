//! Storage capability traits
//!
//! The migration engine only needs three things from a store: a way to run
//! statements, conditional writes on the version-history table, and
//! keyspace/table metadata. Each lives in its own trait so a backend can be
//! swapped without the engine knowing its query syntax.

use crate::error::DbResult;
use sw_core::{KeyspaceName, MigrationState, Profile, VersionRecord, VersionTable};
use uuid::Uuid;

/// Statement execution handle, also passed to executable migrations.
pub trait Session: Send + Sync {
    /// Execute a single statement, discarding any result rows
    fn execute(&self, sql: &str) -> DbResult<()>;

    /// Execute query returning row count
    fn query_count(&self, sql: &str) -> DbResult<usize>;

    /// Database type identifier for logging
    fn db_type(&self) -> &'static str;
}

/// Compare-and-swap access to the version-history table.
///
/// Each `try_*` method is a single conditional write. `Ok(true)` means the
/// write was applied; `Ok(false)` means its precondition did not hold.
pub trait VersionStore: Send + Sync {
    /// All stored records, in no guaranteed order
    fn read_versions(&self, table: &VersionTable) -> DbResult<Vec<VersionRecord>>;

    /// Insert `record` unless a record with the same version already exists
    fn try_insert(&self, table: &VersionTable, record: &VersionRecord) -> DbResult<bool>;

    /// Set the state of record `id` to `new`, only if it is still `expected`
    fn try_update(
        &self,
        table: &VersionTable,
        id: Uuid,
        expected: MigrationState,
        new: MigrationState,
    ) -> DbResult<bool>;

    /// Delete record `id`, only if its state is still `expected`
    fn try_delete(
        &self,
        table: &VersionTable,
        id: Uuid,
        expected: MigrationState,
    ) -> DbResult<bool>;
}

/// Keyspace and table metadata plus bootstrap DDL.
pub trait Catalog: Send + Sync {
    fn keyspace_exists(&self, keyspace: &KeyspaceName) -> DbResult<bool>;

    /// Create the keyspace if absent, using the profile's replication settings
    fn create_keyspace(&self, keyspace: &KeyspaceName, profile: &Profile) -> DbResult<()>;

    /// Drop the keyspace and everything in it, if it exists
    fn drop_keyspace(&self, keyspace: &KeyspaceName) -> DbResult<()>;

    /// Make `keyspace` the default for unqualified names in later statements
    fn use_keyspace(&self, keyspace: &KeyspaceName) -> DbResult<()>;

    fn table_exists(&self, table: &VersionTable) -> DbResult<bool>;

    /// Create the version-history table if absent
    fn create_version_table(&self, table: &VersionTable) -> DbResult<()>;
}

/// Everything the migration engine needs from a store.
pub trait MigrationBackend: Session + VersionStore + Catalog {
    /// View this backend as the session handed to migrations
    fn as_session(&self) -> &dyn Session;
}

impl<T: Session + VersionStore + Catalog> MigrationBackend for T {
    fn as_session(&self) -> &dyn Session {
        self
    }
}
