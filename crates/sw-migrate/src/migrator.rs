//! Apply engine.
//!
//! Every pending migration up to the target goes through the same cycle:
//! claim its version slot with a conditional insert, execute it (unless
//! baselining), then finalize the slot with a conditional update. Losing
//! either conditional write means another runner is active and the engine
//! stops.

use crate::error::{MigrationError, MigrationResult};
use crate::reconcile::{reconcile, PendingMigration, Reconciliation};
use crate::registry::{ScriptError, ScriptRegistry};
use crate::status::{PendingStatus, StatusReport, StatusSummary};
use crate::target::resolve_target_version;
use sw_core::splitter::split;
use sw_core::{Migration, MigrationFormat, MigrationState, Profile, VersionRecord, VersionTable};
use sw_db::MigrationBackend;

/// Outcome of one successfully finalized migration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppliedMigration {
    pub version: i32,
    pub name: String,
    pub state: MigrationState,
}

/// Drives reconciliation and the claim/execute/finalize cycle against one store.
pub struct Migrator<'a> {
    backend: &'a dyn MigrationBackend,
    table: VersionTable,
    profile: &'a Profile,
    migrations: &'a [Migration],
    scripts: Option<&'a ScriptRegistry>,
}

impl<'a> Migrator<'a> {
    pub fn new(
        backend: &'a dyn MigrationBackend,
        table: VersionTable,
        profile: &'a Profile,
        migrations: &'a [Migration],
    ) -> Self {
        Self {
            backend,
            table,
            profile,
            migrations,
            scripts: None,
        }
    }

    /// Provide entry points for executable migrations.
    pub fn with_scripts(mut self, scripts: &'a ScriptRegistry) -> Self {
        self.scripts = Some(scripts);
        self
    }

    pub fn table(&self) -> &VersionTable {
        &self.table
    }

    /// Record pending migrations up to `target` as `SKIPPED` without running them.
    ///
    /// The keyspace must already exist.
    pub fn baseline(&self, target: Option<&str>) -> MigrationResult<Vec<AppliedMigration>> {
        if !self.backend.keyspace_exists(&self.table.keyspace)? {
            return Err(MigrationError::KeyspaceMissing {
                keyspace: self.table.keyspace.to_string(),
            });
        }
        self.ensure_table()?;

        let reconciliation = self.reconcile(false, false)?;
        let target = resolve_target_version(target, self.migrations.len())?;
        self.advance(&reconciliation, target, true)
    }

    /// Apply pending migrations up to `target`.
    ///
    /// With `force`, a `FAILED` tail record is deleted and its version retried.
    pub fn migrate(
        &self,
        target: Option<&str>,
        force: bool,
    ) -> MigrationResult<Vec<AppliedMigration>> {
        self.ensure_keyspace()?;
        self.ensure_table()?;

        let reconciliation = self.reconcile(force, false)?;
        let target = resolve_target_version(target, self.migrations.len())?;
        if force {
            self.cleanup_failed(&reconciliation)?;
        }
        self.advance(&reconciliation, target, false)
    }

    /// Drop the keyspace, then migrate from scratch.
    pub fn reset(&self, target: Option<&str>) -> MigrationResult<Vec<AppliedMigration>> {
        // Reject a bad target before anything is destroyed
        resolve_target_version(target, self.migrations.len())?;

        log::info!("Dropping existing keyspace '{}'", self.table.keyspace);
        self.backend.drop_keyspace(&self.table.keyspace)?;
        self.migrate(target, false)
    }

    /// Report confirmed and pending versions without writing anything.
    pub fn status(&self) -> MigrationResult<StatusReport> {
        if !self.backend.keyspace_exists(&self.table.keyspace)? {
            return Ok(StatusReport::KeyspaceMissing {
                keyspace: self.table.keyspace.clone(),
            });
        }
        if !self.backend.table_exists(&self.table)? {
            return Ok(StatusReport::TableMissing {
                table: self.table.clone(),
            });
        }

        let reconciliation = self.reconcile(true, true)?;
        let pending = reconciliation
            .pending
            .iter()
            .map(|p| PendingStatus {
                version: p.version,
                name: p.migration.name().to_string(),
                checksum: p.migration.checksum().to_hex(),
            })
            .collect();

        Ok(StatusReport::Ready(StatusSummary {
            table: self.table.clone(),
            current_version: reconciliation.last_version,
            latest_version: self.migrations.len(),
            applied: reconciliation.versions,
            pending,
        }))
    }

    fn ensure_keyspace(&self) -> MigrationResult<()> {
        if !self.backend.keyspace_exists(&self.table.keyspace)? {
            self.backend
                .create_keyspace(&self.table.keyspace, self.profile)?;
        }
        Ok(())
    }

    fn ensure_table(&self) -> MigrationResult<()> {
        if !self.backend.table_exists(&self.table)? {
            self.backend.create_version_table(&self.table)?;
        }
        Ok(())
    }

    fn reconcile(
        &self,
        ignore_failed: bool,
        ignore_concurrent: bool,
    ) -> MigrationResult<Reconciliation<'a>> {
        let stored = self.backend.read_versions(&self.table)?;
        reconcile(self.migrations, &stored, ignore_failed, ignore_concurrent)
    }

    fn cleanup_failed(&self, reconciliation: &Reconciliation<'_>) -> MigrationResult<()> {
        let Some(last) = reconciliation.last_record() else {
            return Ok(());
        };
        match last.state {
            MigrationState::Failed => {}
            MigrationState::InProgress | MigrationState::Succeeded | MigrationState::Skipped => {
                return Ok(())
            }
        }

        log::warn!(
            "Cleaning up previous failed migration (version {}): {}",
            last.version,
            last.name
        );
        if !self
            .backend
            .try_delete(&self.table, last.id, MigrationState::Failed)?
        {
            return Err(MigrationError::ConcurrentMigration {
                version: last.version,
                name: last.name.clone(),
            });
        }
        Ok(())
    }

    fn advance(
        &self,
        reconciliation: &Reconciliation<'_>,
        target: i32,
        skip: bool,
    ) -> MigrationResult<Vec<AppliedMigration>> {
        let due: Vec<&PendingMigration<'_>> = reconciliation
            .pending
            .iter()
            .take_while(|p| p.version <= target)
            .collect();
        if due.is_empty() {
            return Ok(Vec::new());
        }

        log::info!(
            "Advancing from version {} to {}",
            reconciliation.current_version(),
            target
        );
        self.backend.use_keyspace(&self.table.keyspace)?;

        let mut applied = Vec::with_capacity(due.len());
        for pending in due {
            applied.push(self.apply_migration(pending.version, pending.migration, skip)?);
        }
        Ok(applied)
    }

    /// Claim, execute and finalize a single migration.
    pub fn apply_migration(
        &self,
        version: i32,
        migration: &Migration,
        skip: bool,
    ) -> MigrationResult<AppliedMigration> {
        log::info!("Advancing to version {}", version);

        let record = VersionRecord::claim(version, migration);
        log::info!(
            "Writing in-progress migration version {}: {}",
            version,
            migration.name()
        );
        if !self.backend.try_insert(&self.table, &record)? {
            return Err(MigrationError::ConcurrentMigration {
                version,
                name: migration.name().to_string(),
            });
        }

        let outcome = if skip {
            log::info!("Migration is marked for skipping, not actually running script");
            Ok(MigrationState::Skipped)
        } else {
            self.execute(version, migration)
                .map(|()| MigrationState::Succeeded)
        };
        let new_state = match &outcome {
            Ok(state) => *state,
            Err(_) => MigrationState::Failed,
        };

        log::info!("Finalizing migration version {} with state {}", version, new_state);
        let finalized = self.backend.try_update(
            &self.table,
            record.id,
            MigrationState::InProgress,
            new_state,
        );

        match (outcome, finalized) {
            (Ok(state), Ok(true)) => Ok(AppliedMigration {
                version,
                name: migration.name().to_string(),
                state,
            }),
            (Ok(_), Ok(false)) => Err(MigrationError::ConcurrentMigration {
                version,
                name: migration.name().to_string(),
            }),
            (Ok(_), Err(e)) => Err(e.into()),
            (Err(e), Ok(true)) => Err(e),
            (Err(e), Ok(false)) => {
                log::error!(
                    "Could not record failure of version {}: slot was changed by someone else",
                    version
                );
                Err(e)
            }
            (Err(e), Err(db)) => {
                log::error!("Could not record failure of version {}: {}", version, db);
                Err(e)
            }
        }
    }

    fn execute(&self, version: i32, migration: &Migration) -> MigrationResult<()> {
        let result = match migration.format() {
            MigrationFormat::Declarative => self.run_statements(migration),
            MigrationFormat::Executable => self.run_script(migration),
        };

        result.map_err(|e| {
            log::error!(
                "Failed to execute migration (version {}) {}: {}",
                version,
                migration.name(),
                e
            );
            MigrationError::FailedMigration {
                version,
                name: migration.name().to_string(),
            }
        })
    }

    fn run_statements(&self, migration: &Migration) -> Result<(), ScriptError> {
        let statements = split(migration.content());
        if !statements.is_empty() {
            log::info!("Executing migration with {} statements", statements.len());
        }
        for statement in &statements {
            log::debug!("Executing statement: {}", statement);
            self.backend.execute(statement)?;
        }
        Ok(())
    }

    fn run_script(&self, migration: &Migration) -> Result<(), ScriptError> {
        let script = self
            .scripts
            .and_then(|scripts| scripts.lookup(migration))
            .ok_or_else(|| {
                ScriptError::Failed(format!(
                    "no entry point registered for executable migration '{}'",
                    migration.name()
                ))
            })?;

        log::info!("Running executable migration {}", migration.name());
        script(self.backend.as_session())
    }
}

#[cfg(test)]
#[path = "migrator_test.rs"]
mod tests;
