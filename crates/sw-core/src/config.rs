//! Configuration types and parsing for stepwise.yml

use crate::error::{CoreError, CoreResult};
use crate::identifier::{KeyspaceName, TableName};
use crate::profile::{Profile, DEFAULT_PROFILE};
use crate::version::VersionTable;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Config file names searched for in a project directory, in order.
pub const CONFIG_FILE_NAMES: &[&str] = &["stepwise.yml", "stepwise.yaml"];

/// Environment variable consulted when no profile is given on the command line.
pub const PROFILE_ENV_VAR: &str = "SW_PROFILE";

const DEFAULT_NEW_MIGRATION_NAME: &str = "v{{ next_version }}_{{ desc }}";

const DEFAULT_NEW_MIGRATION_TEXT: &str = "\
/* Migration for keyspace {{ keyspace }}.
   Version {{ next_version }} - {{ date }}

   {{ full_desc }} */
";

const DEFAULT_NEW_EXECUTABLE_MIGRATION_TEXT: &str = "\
// Migration for keyspace {{ keyspace }}.
// Version {{ next_version }} - {{ date }}
// {{ full_desc }}
//
// Compile this function into the host binary and register it in its
// ScriptRegistry under this file's name.

pub fn execute(session: &dyn sw_db::Session) -> Result<(), sw_migrate::ScriptError> {
    session.execute(\"SELECT 1\")?;
    Ok(())
}
";

/// Main project configuration from stepwise.yml
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Keyspace (DuckDB schema) managed by this project
    pub keyspace: KeyspaceName,

    /// Directory holding migration files, relative to the config file
    pub migrations_path: String,

    /// Table storing the version history
    #[serde(default = "default_migrations_table")]
    pub migrations_table: TableName,

    /// Template for the base name of generated migrations
    #[serde(default = "default_new_migration_name")]
    pub new_migration_name: String,

    /// Template for the body of generated declarative migrations
    #[serde(default = "default_new_migration_text")]
    pub new_migration_text: String,

    /// Template for the body of generated executable migrations
    #[serde(default = "default_new_executable_migration_text")]
    pub new_executable_migration_text: String,

    /// Named profiles (e.g., dev, staging, prod). `dev` always exists.
    #[serde(default)]
    pub profiles: BTreeMap<String, Profile>,
}

fn default_migrations_table() -> TableName {
    TableName::new("database_migrations")
}

fn default_new_migration_name() -> String {
    DEFAULT_NEW_MIGRATION_NAME.to_string()
}

fn default_new_migration_text() -> String {
    DEFAULT_NEW_MIGRATION_TEXT.to_string()
}

fn default_new_executable_migration_text() -> String {
    DEFAULT_NEW_EXECUTABLE_MIGRATION_TEXT.to_string()
}

impl Config {
    /// Load configuration from a file path
    pub fn load(path: &Path) -> CoreResult<Self> {
        if !path.exists() {
            return Err(CoreError::ConfigNotFound {
                path: path.display().to_string(),
            });
        }

        let content = std::fs::read_to_string(path).map_err(|e| CoreError::IoWithPath {
            path: path.display().to_string(),
            source: e,
        })?;
        Self::from_yaml(&content).map_err(|e| match e {
            CoreError::ConfigParseError { message, .. } => CoreError::ConfigParseError {
                path: path.display().to_string(),
                message,
            },
            other => other,
        })
    }

    /// Parse and validate configuration from YAML text
    pub fn from_yaml(content: &str) -> CoreResult<Self> {
        let mut config: Config =
            serde_yaml::from_str(content).map_err(|e| CoreError::ConfigParseError {
                path: "<string>".to_string(),
                message: e.to_string(),
            })?;
        config
            .profiles
            .entry(DEFAULT_PROFILE.to_string())
            .or_default();
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a project directory
    /// Looks for stepwise.yml or stepwise.yaml
    pub fn load_from_dir(dir: &Path) -> CoreResult<Self> {
        Self::load(&Self::find_in_dir(dir)?)
    }

    /// Locate the config file in a project directory
    pub fn find_in_dir(dir: &Path) -> CoreResult<PathBuf> {
        CONFIG_FILE_NAMES
            .iter()
            .map(|name| dir.join(name))
            .find(|path| path.exists())
            .ok_or_else(|| CoreError::ConfigNotFound {
                path: dir.join(CONFIG_FILE_NAMES[0]).display().to_string(),
            })
    }

    /// Validate the configuration
    fn validate(&self) -> CoreResult<()> {
        if self.migrations_path.trim().is_empty() {
            return Err(CoreError::ConfigInvalid {
                key: "migrations_path".to_string(),
                message: "Key is mandatory and cannot be empty".to_string(),
            });
        }

        for (name, profile) in &self.profiles {
            let key = format!("profiles.{name}.replication.class");
            match profile.replication_class() {
                Some(class) if !class.is_empty() => {}
                _ if profile.replication.contains_key("class") => {
                    return Err(CoreError::ConfigInvalid {
                        key,
                        message: "Replication class must be a non-empty string".to_string(),
                    })
                }
                _ => {
                    return Err(CoreError::ConfigInvalid {
                        key,
                        message: "Key is mandatory".to_string(),
                    })
                }
            }
        }

        let env = minijinja::Environment::new();
        for (key, template) in [
            ("new_migration_name", &self.new_migration_name),
            ("new_migration_text", &self.new_migration_text),
            (
                "new_executable_migration_text",
                &self.new_executable_migration_text,
            ),
        ] {
            env.template_from_str(template)
                .map_err(|e| CoreError::Template {
                    key: key.to_string(),
                    message: e.to_string(),
                })?;
        }

        Ok(())
    }

    /// Get absolute migrations directory relative to a project root
    pub fn migrations_path_absolute(&self, root: &Path) -> PathBuf {
        root.join(&self.migrations_path)
    }

    /// Location of the version-history table
    pub fn version_table(&self) -> VersionTable {
        VersionTable::new(self.keyspace.clone(), self.migrations_table.clone())
    }

    /// Get the list of available profile names
    pub fn available_profiles(&self) -> Vec<&str> {
        self.profiles.keys().map(|s| s.as_str()).collect()
    }

    /// Get profile configuration by name
    pub fn profile(&self, name: &str) -> CoreResult<&Profile> {
        self.profiles
            .get(name)
            .ok_or_else(|| CoreError::UnknownProfile {
                name: name.to_string(),
                available: self.available_profiles().join(", "),
            })
    }

    /// Resolve profile from CLI flag or SW_PROFILE environment variable
    ///
    /// Priority: CLI flag > SW_PROFILE env var > `dev`
    pub fn resolve_profile(cli_profile: Option<&str>) -> String {
        cli_profile
            .map(String::from)
            .or_else(|| std::env::var(PROFILE_ENV_VAR).ok())
            .unwrap_or_else(|| DEFAULT_PROFILE.to_string())
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
