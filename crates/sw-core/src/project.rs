//! Project discovery and loading

use crate::config::Config;
use crate::error::{CoreError, CoreResult};
use crate::migration::{Migration, DEFAULT_PATTERNS};
use crate::profile::Profile;
use std::path::{Path, PathBuf};

/// Represents a Stepwise project: a config file plus its migrations
#[derive(Debug)]
pub struct Project {
    /// Directory containing the config file; relative paths resolve against it
    pub root: PathBuf,

    /// Path of the loaded config file
    pub config_path: PathBuf,

    /// Project configuration
    pub config: Config,

    /// Migrations discovered in the project, in version order
    pub migrations: Vec<Migration>,
}

impl Project {
    /// Load a project from a directory containing stepwise.yml
    pub fn load(path: &Path) -> CoreResult<Self> {
        let root = absolute(path)?;

        if !root.is_dir() {
            return Err(CoreError::ProjectNotFound {
                path: root.display().to_string(),
            });
        }

        let config_path = Config::find_in_dir(&root)?;
        Self::load_with_config(&config_path)
    }

    /// Load a project from an explicit config file path
    pub fn load_with_config(config_path: &Path) -> CoreResult<Self> {
        let config_path = absolute(config_path)?;
        let config = Config::load(&config_path)?;
        let root = config_path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();

        let migrations =
            Migration::load_all(&config.migrations_path_absolute(&root), DEFAULT_PATTERNS)?;
        log::debug!(
            "Loaded {} migrations from {}",
            migrations.len(),
            config.migrations_path_absolute(&root).display()
        );

        Ok(Self {
            root,
            config_path,
            config,
            migrations,
        })
    }

    /// Get the migrations directory path
    pub fn migrations_dir(&self) -> PathBuf {
        self.config.migrations_path_absolute(&self.root)
    }

    /// Version number of the last local migration (0 when there are none)
    pub fn latest_version(&self) -> usize {
        self.migrations.len()
    }

    /// Get a profile by name
    pub fn profile(&self, name: &str) -> CoreResult<&Profile> {
        self.config.profile(name)
    }

    /// Database path for a profile, resolved against the project root
    pub fn database_path(&self, profile: &Profile) -> String {
        profile.database_path(&self.root)
    }
}

fn absolute(path: &Path) -> CoreResult<PathBuf> {
    if path.is_absolute() {
        Ok(path.to_path_buf())
    } else {
        Ok(std::env::current_dir()?.join(path))
    }
}

#[cfg(test)]
#[path = "project_test.rs"]
mod tests;
