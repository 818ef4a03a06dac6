//! DuckDB database backend implementation
//!
//! A keyspace is a DuckDB schema. DuckDB has no replication, so the
//! profile's replication descriptor is only logged when a keyspace is
//! created.

use crate::error::{DbError, DbResult};
use crate::traits::{Catalog, Session, VersionStore};
use chrono::{DateTime, NaiveDateTime, Utc};
use duckdb::Connection;
use std::path::Path;
use std::sync::{Mutex, MutexGuard};
use sw_core::sql_utils::{escape_sql_string, quote_ident};
use sw_core::{KeyspaceName, MigrationState, Profile, VersionRecord, VersionTable};
use uuid::Uuid;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.f";

/// DuckDB database backend
pub struct DuckDbBackend {
    conn: Mutex<Connection>,
}

impl DuckDbBackend {
    /// Create a new in-memory DuckDB connection
    pub fn in_memory() -> DbResult<Self> {
        let conn =
            Connection::open_in_memory().map_err(|e| DbError::ConnectionError(e.to_string()))?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Create a new DuckDB connection from a file path
    pub fn from_path(path: &Path) -> DbResult<Self> {
        let conn = Connection::open(path).map_err(|e| DbError::ConnectionError(e.to_string()))?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Create from path string (handles :memory: special case)
    pub fn new(path: &str) -> DbResult<Self> {
        if path == sw_core::profile::IN_MEMORY {
            Self::in_memory()
        } else {
            Self::from_path(Path::new(path))
        }
    }

    /// Open a second, independent connection to the same database.
    ///
    /// Each connection has its own transactions and default schema, so two
    /// clones behave like two runners sharing one store.
    pub fn try_clone(&self) -> DbResult<Self> {
        let conn = self
            .lock()?
            .try_clone()
            .map_err(|e| DbError::ConnectionError(e.to_string()))?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn lock(&self) -> DbResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| DbError::MutexPoisoned(e.to_string()))
    }

    /// Execute batch SQL synchronously
    fn execute_batch_sync(&self, sql: &str) -> DbResult<()> {
        let conn = self.lock()?;
        conn.execute_batch(sql)
            .map_err(|e| DbError::from_statement(e, sql))
    }

    fn count_sync<P: duckdb::Params>(&self, sql: &str, params: P) -> DbResult<i64> {
        let conn = self.lock()?;
        conn.query_row(sql, params, |row| row.get(0))
            .map_err(|e| DbError::from_statement(e, sql))
    }

    /// Run a create-if-absent statement. A concurrent creator makes DuckDB
    /// raise a catalog conflict; that counts as success once the object is
    /// confirmed to exist.
    fn create_if_absent(
        &self,
        sql: &str,
        exists: impl FnOnce() -> DbResult<bool>,
    ) -> DbResult<()> {
        let result = {
            let conn = self.lock()?;
            conn.execute_batch(sql)
        };
        match result {
            Ok(()) => Ok(()),
            Err(e) if is_write_conflict(&e) => {
                log::debug!("Concurrent create detected: {}", e);
                if exists()? {
                    Ok(())
                } else {
                    Err(DbError::from_statement(e, sql))
                }
            }
            Err(e) => Err(DbError::from_statement(e, sql)),
        }
    }

    /// Run a conditional write and report whether it changed exactly one row
    fn conditional_write<P: duckdb::Params>(&self, sql: &str, params: P) -> DbResult<bool> {
        let conn = self.lock()?;
        match conn.execute(sql, params) {
            Ok(changed) => Ok(changed == 1),
            Err(e) if is_write_conflict(&e) => {
                log::debug!("Conditional write lost a race: {}", e);
                Ok(false)
            }
            Err(e) => Err(DbError::from_statement(e, sql)),
        }
    }
}

/// Concurrent writers on the same slot surface as constraint or transaction
/// conflicts rather than as a zero-row write. DuckDB reports these at
/// statement time or at commit time with differing capitalization.
fn is_write_conflict(err: &duckdb::Error) -> bool {
    let msg = err.to_string().to_lowercase();
    msg.contains("duplicate key")
        || msg.contains("constraint violation")
        || msg.contains("conflict")
}

fn corrupt(table: &VersionTable, message: impl Into<String>) -> DbError {
    DbError::CorruptRow {
        table: table.to_string(),
        message: message.into(),
    }
}

/// A version-history row as read from DuckDB, before validation
struct RawVersionRow {
    id: String,
    version: i32,
    name: String,
    content: String,
    checksum: Vec<u8>,
    state: String,
    applied_at: Option<String>,
}

impl RawVersionRow {
    fn into_record(self, table: &VersionTable) -> DbResult<VersionRecord> {
        let id = Uuid::parse_str(&self.id)
            .map_err(|e| corrupt(table, format!("invalid id '{}': {}", self.id, e)))?;
        let state = MigrationState::parse(&self.state).ok_or_else(|| {
            corrupt(
                table,
                format!("unknown state '{}' for version {}", self.state, self.version),
            )
        })?;
        let applied_at = self
            .applied_at
            .map(|ts| {
                NaiveDateTime::parse_from_str(&ts, TIMESTAMP_FORMAT)
                    .map(|naive| DateTime::<Utc>::from_naive_utc_and_offset(naive, Utc))
                    .map_err(|e| corrupt(table, format!("invalid applied_at '{}': {}", ts, e)))
            })
            .transpose()?;

        Ok(VersionRecord {
            id,
            version: self.version,
            name: self.name,
            content: self.content,
            checksum: self.checksum,
            state,
            applied_at,
        })
    }
}

impl Session for DuckDbBackend {
    fn execute(&self, sql: &str) -> DbResult<()> {
        self.execute_batch_sync(sql)
    }

    fn query_count(&self, sql: &str) -> DbResult<usize> {
        let count = self.count_sync(&format!("SELECT COUNT(*) FROM ({})", sql), [])?;
        Ok(count as usize)
    }

    fn db_type(&self) -> &'static str {
        "duckdb"
    }
}

impl VersionStore for DuckDbBackend {
    fn read_versions(&self, table: &VersionTable) -> DbResult<Vec<VersionRecord>> {
        let sql = format!(
            "SELECT id, version, name, content, checksum, state, CAST(applied_at AS VARCHAR) \
             FROM {} ORDER BY version",
            table.qualified()
        );

        let raw_rows = {
            let conn = self.lock()?;
            let mut stmt = conn
                .prepare(&sql)
                .map_err(|e| DbError::from_statement(e, &sql))?;
            let rows = stmt
                .query_map([], |row| {
                    Ok(RawVersionRow {
                        id: row.get(0)?,
                        version: row.get(1)?,
                        name: row.get(2)?,
                        content: row.get(3)?,
                        checksum: row.get(4)?,
                        state: row.get(5)?,
                        applied_at: row.get(6)?,
                    })
                })
                .map_err(|e| DbError::from_statement(e, &sql))?
                .collect::<Result<Vec<_>, _>>()
                .map_err(|e| corrupt(table, e.to_string()))?;
            rows
        };

        raw_rows
            .into_iter()
            .map(|raw| raw.into_record(table))
            .collect()
    }

    fn try_insert(&self, table: &VersionTable, record: &VersionRecord) -> DbResult<bool> {
        let sql = format!(
            "INSERT INTO {t} (id, version, name, content, checksum, state) \
             SELECT CAST(? AS VARCHAR), CAST(? AS INTEGER), CAST(? AS VARCHAR), \
                    CAST(? AS VARCHAR), CAST(? AS BLOB), CAST(? AS VARCHAR) \
             WHERE NOT EXISTS (SELECT 1 FROM {t} WHERE version = ?)",
            t = table.qualified()
        );
        self.conditional_write(
            &sql,
            duckdb::params![
                record.id.to_string(),
                record.version,
                record.name,
                record.content,
                record.checksum,
                record.state.as_str(),
                record.version,
            ],
        )
    }

    fn try_update(
        &self,
        table: &VersionTable,
        id: Uuid,
        expected: MigrationState,
        new: MigrationState,
    ) -> DbResult<bool> {
        let sql = format!(
            "UPDATE {} SET state = ? WHERE id = ? AND state = ?",
            table.qualified()
        );
        self.conditional_write(
            &sql,
            duckdb::params![new.as_str(), id.to_string(), expected.as_str()],
        )
    }

    fn try_delete(
        &self,
        table: &VersionTable,
        id: Uuid,
        expected: MigrationState,
    ) -> DbResult<bool> {
        let sql = format!(
            "DELETE FROM {} WHERE id = ? AND state = ?",
            table.qualified()
        );
        self.conditional_write(&sql, duckdb::params![id.to_string(), expected.as_str()])
    }
}

impl Catalog for DuckDbBackend {
    fn keyspace_exists(&self, keyspace: &KeyspaceName) -> DbResult<bool> {
        let count = self.count_sync(
            "SELECT COUNT(*) FROM information_schema.schemata WHERE schema_name = ?",
            duckdb::params![keyspace.as_str()],
        )?;
        Ok(count > 0)
    }

    fn create_keyspace(&self, keyspace: &KeyspaceName, profile: &Profile) -> DbResult<()> {
        log::info!(
            "Creating keyspace '{}' (replication = {}, durable_writes = {})",
            keyspace,
            profile.replication_repr(),
            profile.durable_writes
        );
        let sql = format!("CREATE SCHEMA IF NOT EXISTS {}", quote_ident(keyspace.as_str()));
        self.create_if_absent(&sql, || self.keyspace_exists(keyspace))
    }

    fn drop_keyspace(&self, keyspace: &KeyspaceName) -> DbResult<()> {
        // The default schema cannot be the one being dropped
        self.execute_batch_sync(&format!(
            "SET schema = 'main'; DROP SCHEMA IF EXISTS {} CASCADE",
            quote_ident(keyspace.as_str())
        ))
    }

    fn use_keyspace(&self, keyspace: &KeyspaceName) -> DbResult<()> {
        self.execute_batch_sync(&format!(
            "SET schema = '{}'",
            escape_sql_string(keyspace.as_str())
        ))
    }

    fn table_exists(&self, table: &VersionTable) -> DbResult<bool> {
        let count = self.count_sync(
            "SELECT COUNT(*) FROM information_schema.tables \
             WHERE table_schema = ? AND table_name = ?",
            duckdb::params![table.keyspace.as_str(), table.table.as_str()],
        )?;
        Ok(count > 0)
    }

    fn create_version_table(&self, table: &VersionTable) -> DbResult<()> {
        log::info!(
            "Creating table '{}' in keyspace '{}'",
            table.table,
            table.keyspace
        );
        let sql = format!(
            "CREATE TABLE IF NOT EXISTS {} (
                id         VARCHAR PRIMARY KEY,
                version    INTEGER NOT NULL UNIQUE,
                name       VARCHAR NOT NULL,
                content    VARCHAR NOT NULL,
                checksum   BLOB NOT NULL,
                state      VARCHAR NOT NULL,
                applied_at TIMESTAMP NOT NULL DEFAULT now()
            )",
            table.qualified()
        );
        self.create_if_absent(&sql, || self.table_exists(table))
    }
}

#[cfg(test)]
#[path = "duckdb_test.rs"]
mod tests;
