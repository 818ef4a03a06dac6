//! Reconciliation of local migration files against stored version history.
//!
//! Local migrations and stored records are walked together, position by
//! position. The walk stops at the first record that is not a confirmed
//! application of the matching local file; everything after the last
//! confirmed version is pending.

use crate::error::{MigrationError, MigrationResult};
use sw_core::{Migration, MigrationState, VersionRecord};

/// A local migration that has not been applied yet.
#[derive(Debug, Clone, Copy)]
pub struct PendingMigration<'a> {
    pub version: i32,
    pub migration: &'a Migration,
}

/// Outcome of comparing local migrations with stored history.
#[derive(Debug)]
pub struct Reconciliation<'a> {
    /// Highest version confirmed as succeeded or skipped, if any
    pub last_version: Option<i32>,

    /// Stored history, sorted by version
    pub versions: Vec<VersionRecord>,

    /// Local migrations after `last_version`, numbered consecutively
    pub pending: Vec<PendingMigration<'a>>,
}

impl Reconciliation<'_> {
    /// Last confirmed version, or 0 when nothing has been applied.
    pub fn current_version(&self) -> i32 {
        self.last_version.unwrap_or(0)
    }

    /// Most recent stored record, if any.
    pub fn last_record(&self) -> Option<&VersionRecord> {
        self.versions.last()
    }
}

/// Compare `local` migrations with `stored` history.
///
/// A `FAILED` record stops the walk when `ignore_failed` is set and is an
/// error otherwise; `IN_PROGRESS` behaves the same with `ignore_concurrent`.
pub fn reconcile<'a>(
    local: &'a [Migration],
    stored: &[VersionRecord],
    ignore_failed: bool,
    ignore_concurrent: bool,
) -> MigrationResult<Reconciliation<'a>> {
    let mut versions = stored.to_vec();
    versions.sort_by_key(|record| record.version);

    let mut last_version = None;
    let mut confirmed = 0;

    for (position, record) in versions.iter().enumerate() {
        let Some(migration) = local.get(position) else {
            return Err(MigrationError::UnknownMigration {
                version: record.version,
                name: record.name.clone(),
            });
        };

        // Versions are dense from 1, so the n-th record must hold version n
        if i64::from(record.version) != position as i64 + 1 {
            return Err(MigrationError::InconsistentState {
                version: record.version,
                name: migration.name().to_string(),
                stored_name: record.name.clone(),
                mismatched: "version".to_string(),
            });
        }

        match record.state {
            MigrationState::Failed => {
                if ignore_failed {
                    break;
                }
                return Err(MigrationError::FailedMigration {
                    version: record.version,
                    name: record.name.clone(),
                });
            }
            MigrationState::InProgress => {
                if ignore_concurrent {
                    break;
                }
                return Err(MigrationError::ConcurrentMigration {
                    version: record.version,
                    name: record.name.clone(),
                });
            }
            MigrationState::Succeeded | MigrationState::Skipped => {}
        }

        if !record.matches(migration) {
            return Err(inconsistency(record, migration));
        }

        last_version = Some(record.version);
        confirmed = position + 1;
    }

    let first_pending = last_version.unwrap_or(0) + 1;
    let pending: Vec<PendingMigration<'a>> = local[confirmed..]
        .iter()
        .zip(first_pending..)
        .map(|(migration, version)| PendingMigration { version, migration })
        .collect();

    if pending.is_empty() {
        log::info!("Database is already up-to-date");
    } else {
        log::info!(
            "Pending migrations found. Current version: {}, Latest version: {}",
            last_version.unwrap_or(0),
            local.len()
        );
    }

    Ok(Reconciliation {
        last_version,
        versions,
        pending,
    })
}

fn inconsistency(record: &VersionRecord, migration: &Migration) -> MigrationError {
    let mut mismatched = Vec::new();
    if record.name != migration.name() {
        mismatched.push("name");
    }
    if record.content != migration.content() {
        mismatched.push("content");
    }
    if !migration.checksum().matches(&record.checksum) {
        mismatched.push("checksum");
    }

    MigrationError::InconsistentState {
        version: record.version,
        name: migration.name().to_string(),
        stored_name: record.name.clone(),
        mismatched: mismatched.join(", "),
    }
}

#[cfg(test)]
#[path = "reconcile_test.rs"]
mod tests;
