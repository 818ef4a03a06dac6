//! Named connection profiles.
//!
//! A profile bundles where the database lives with the replication settings
//! used when the keyspace has to be created.

use crate::sql_utils::ddl_map_repr;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// Name of the profile used when none is requested.
pub const DEFAULT_PROFILE: &str = "dev";

/// DuckDB path that opens a private in-memory database.
pub const IN_MEMORY: &str = ":memory:";

/// A scalar or map value that can be rendered into DDL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DdlValue {
    Bool(bool),
    Int(i64),
    String(String),
    Map(BTreeMap<String, DdlValue>),
}

impl From<&str> for DdlValue {
    fn from(s: &str) -> Self {
        DdlValue::String(s.to_string())
    }
}

impl From<i64> for DdlValue {
    fn from(n: i64) -> Self {
        DdlValue::Int(n)
    }
}

/// Connection and keyspace settings for one environment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Profile {
    /// DuckDB database file, relative to the config directory, or `:memory:`
    #[serde(default = "default_database")]
    pub database: String,

    /// Replication strategy class plus its parameters
    #[serde(default = "default_replication")]
    pub replication: BTreeMap<String, DdlValue>,

    /// Whether writes to the keyspace go through the commit log
    #[serde(default = "default_durable_writes")]
    pub durable_writes: bool,
}

impl Default for Profile {
    fn default() -> Self {
        Self {
            database: default_database(),
            replication: default_replication(),
            durable_writes: default_durable_writes(),
        }
    }
}

fn default_durable_writes() -> bool {
    true
}

fn default_database() -> String {
    IN_MEMORY.to_string()
}

fn default_replication() -> BTreeMap<String, DdlValue> {
    BTreeMap::from([
        ("class".to_string(), DdlValue::from("SimpleStrategy")),
        ("replication_factor".to_string(), DdlValue::Int(1)),
    ])
}

impl Profile {
    /// Replication descriptor as a DDL map literal.
    pub fn replication_repr(&self) -> String {
        ddl_map_repr(&self.replication)
    }

    /// The replication strategy class, if declared as a string.
    pub fn replication_class(&self) -> Option<&str> {
        match self.replication.get("class") {
            Some(DdlValue::String(class)) => Some(class.as_str()),
            _ => None,
        }
    }

    /// Whether the profile points at an in-memory database.
    pub fn is_in_memory(&self) -> bool {
        self.database == IN_MEMORY
    }

    /// Database path to open, resolving relative files against `base`.
    pub fn database_path(&self, base: &Path) -> String {
        if self.is_in_memory() {
            return IN_MEMORY.to_string();
        }
        let path = Path::new(&self.database);
        if path.is_absolute() {
            self.database.clone()
        } else {
            base.join(path).display().to_string()
        }
    }
}
