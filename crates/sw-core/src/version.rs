//! Version-history rows and the table that stores them.

use crate::identifier::{KeyspaceName, TableName};
use crate::migration::Migration;
use crate::sql_utils::quote_ident;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Lifecycle state of a version slot.
///
/// A slot is created `InProgress` by a claim and finalized exactly once to
/// one of the three terminal states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MigrationState {
    /// Claimed, script not yet finalized
    InProgress,
    /// Script ran to completion
    Succeeded,
    /// Script raised during execution
    Failed,
    /// Recorded by a baseline without running the script
    Skipped,
}

impl MigrationState {
    /// The string persisted in the `state` column.
    pub fn as_str(&self) -> &'static str {
        match self {
            MigrationState::InProgress => "IN_PROGRESS",
            MigrationState::Succeeded => "SUCCEEDED",
            MigrationState::Failed => "FAILED",
            MigrationState::Skipped => "SKIPPED",
        }
    }

    /// Parse a stored state string. Unknown values yield `None`.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "IN_PROGRESS" => Some(MigrationState::InProgress),
            "SUCCEEDED" => Some(MigrationState::Succeeded),
            "FAILED" => Some(MigrationState::Failed),
            "SKIPPED" => Some(MigrationState::Skipped),
            _ => None,
        }
    }
}

impl fmt::Display for MigrationState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One row of the version-history table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionRecord {
    /// Identifier generated at claim time
    pub id: Uuid,
    /// 1-based position of the migration in the ordered sequence
    pub version: i32,
    pub name: String,
    pub content: String,
    pub checksum: Vec<u8>,
    pub state: MigrationState,
    /// Assigned by the store when the claim is written; `None` before that
    pub applied_at: Option<DateTime<Utc>>,
}

impl VersionRecord {
    /// Build the `IN_PROGRESS` row used to claim `version` for `migration`.
    pub fn claim(version: i32, migration: &Migration) -> Self {
        Self {
            id: Uuid::new_v4(),
            version,
            name: migration.name().to_string(),
            content: migration.content().to_string(),
            checksum: migration.checksum().as_bytes().to_vec(),
            state: MigrationState::InProgress,
            applied_at: None,
        }
    }

    /// Whether name, content and checksum are byte-for-byte those of `migration`.
    pub fn matches(&self, migration: &Migration) -> bool {
        self.name == migration.name()
            && self.content == migration.content()
            && migration.checksum().matches(&self.checksum)
    }

    /// Lowercase hex of the stored checksum.
    pub fn checksum_hex(&self) -> String {
        hex::encode(&self.checksum)
    }
}

impl fmt::Display for VersionRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "VersionRecord(version={}, name=\"{}\", state={})",
            self.version, self.name, self.state
        )
    }
}

/// Location of the version-history table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionTable {
    pub keyspace: KeyspaceName,
    pub table: TableName,
}

impl VersionTable {
    pub fn new(keyspace: KeyspaceName, table: TableName) -> Self {
        Self { keyspace, table }
    }

    /// Quoted `"keyspace"."table"` for use in SQL.
    pub fn qualified(&self) -> String {
        format!(
            "{}.{}",
            quote_ident(self.keyspace.as_str()),
            quote_ident(self.table.as_str())
        )
    }
}

impl fmt::Display for VersionTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.keyspace, self.table)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_state_string_roundtrip() {
        for state in [
            MigrationState::InProgress,
            MigrationState::Succeeded,
            MigrationState::Failed,
            MigrationState::Skipped,
        ] {
            assert_eq!(MigrationState::parse(state.as_str()), Some(state));
        }
    }

    #[test]
    fn test_state_parse_rejects_unknown() {
        assert_eq!(MigrationState::parse("succeeded"), None);
        assert_eq!(MigrationState::parse(""), None);
        assert_eq!(MigrationState::parse("DONE"), None);
    }

    #[test]
    fn test_claim_copies_migration_fields() {
        let migration =
            Migration::new(PathBuf::from("/m/v1_init.sql"), "CREATE TABLE t (id INT);").unwrap();
        let record = VersionRecord::claim(1, &migration);

        assert_eq!(record.version, 1);
        assert_eq!(record.name, "v1_init.sql");
        assert_eq!(record.state, MigrationState::InProgress);
        assert!(record.applied_at.is_none());
        assert!(record.matches(&migration));
        assert_eq!(record.checksum_hex(), migration.checksum().to_hex());
    }

    #[test]
    fn test_claim_generates_fresh_ids() {
        let migration = Migration::new(PathBuf::from("/m/v1.sql"), "SELECT 1;").unwrap();
        let a = VersionRecord::claim(1, &migration);
        let b = VersionRecord::claim(1, &migration);
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn test_matches_detects_content_drift() {
        let migration = Migration::new(PathBuf::from("/m/v1.sql"), "SELECT 1;").unwrap();
        let mut record = VersionRecord::claim(1, &migration);
        record.content = "SELECT 2;".to_string();
        assert!(!record.matches(&migration));
    }

    #[test]
    fn test_version_table_qualified() {
        let table = VersionTable::new(
            KeyspaceName::new("app"),
            TableName::new("database_migrations"),
        );
        assert_eq!(table.qualified(), r#""app"."database_migrations""#);
        assert_eq!(table.to_string(), "app.database_migrations");
    }
}
