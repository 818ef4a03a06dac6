//! Read-only status report.

use sw_core::{KeyspaceName, VersionRecord, VersionTable};

/// A migration that would be applied by the next `migrate`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingStatus {
    pub version: i32,
    pub name: String,
    pub checksum: String,
}

/// Confirmed and pending versions of a bootstrapped keyspace.
#[derive(Debug, Clone)]
pub struct StatusSummary {
    pub table: VersionTable,
    /// Last confirmed version, if any
    pub current_version: Option<i32>,
    /// Number of local migrations
    pub latest_version: usize,
    /// Stored history, sorted by version
    pub applied: Vec<VersionRecord>,
    pub pending: Vec<PendingStatus>,
}

impl StatusSummary {
    pub fn is_up_to_date(&self) -> bool {
        self.pending.is_empty()
    }
}

/// What `status` found. Nothing is ever created to produce it.
#[derive(Debug, Clone)]
pub enum StatusReport {
    KeyspaceMissing { keyspace: KeyspaceName },
    TableMissing { table: VersionTable },
    Ready(StatusSummary),
}
