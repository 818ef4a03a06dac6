//! Executable migrations.
//!
//! An executable migration file (`.rs`) is not interpreted at run time.
//! Its body is compiled into the host binary and registered here under the
//! migration's file name or stem; the migrator looks it up when the file's
//! turn comes and hands it the live session.

use std::collections::BTreeMap;
use std::fmt;
use sw_core::Migration;
use sw_db::{DbError, Session};
use thiserror::Error;

/// Error raised by an executable migration.
#[derive(Error, Debug)]
pub enum ScriptError {
    /// A statement issued through the session failed
    #[error(transparent)]
    Db(#[from] DbError),

    /// The script gave up for its own reasons
    #[error("{0}")]
    Failed(String),
}

/// Entry point of an executable migration.
pub type ScriptFn = Box<dyn Fn(&dyn Session) -> Result<(), ScriptError> + Send + Sync>;

/// Executable migrations known to this binary, keyed by file name or stem.
#[derive(Default)]
pub struct ScriptRegistry {
    scripts: BTreeMap<String, ScriptFn>,
}

impl ScriptRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `script` under `key`, replacing any earlier registration.
    pub fn register<F>(&mut self, key: impl Into<String>, script: F) -> &mut Self
    where
        F: Fn(&dyn Session) -> Result<(), ScriptError> + Send + Sync + 'static,
    {
        self.scripts.insert(key.into(), Box::new(script));
        self
    }

    /// Find the script for `migration`, trying its file name before its stem.
    pub fn lookup(&self, migration: &Migration) -> Option<&ScriptFn> {
        self.scripts
            .get(migration.name())
            .or_else(|| self.scripts.get(migration.stem()))
    }

    pub fn len(&self) -> usize {
        self.scripts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scripts.is_empty()
    }
}

impl fmt::Debug for ScriptRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScriptRegistry")
            .field("scripts", &self.scripts.keys().collect::<Vec<_>>())
            .finish()
    }
}
