//! Runtime context for CLI commands

use anyhow::{Context, Result};
use sw_core::{Config, Profile, Project};
use sw_db::DuckDbBackend;
use sw_migrate::Migrator;

use crate::cli::GlobalArgs;

/// Runtime context containing the loaded project, profile and store connection
pub(crate) struct RuntimeContext {
    /// The loaded project
    pub project: Project,

    /// Name of the resolved profile
    pub profile_name: String,

    /// The resolved profile
    pub profile: Profile,

    /// Database path the backend was opened with
    pub database_path: String,

    /// Store connection
    pub backend: DuckDbBackend,
}

impl RuntimeContext {
    /// Load the project, resolve the profile and connect to its database
    pub fn new(global: &GlobalArgs) -> Result<Self> {
        let project = load_project(global)?;

        let profile_name = Config::resolve_profile(global.profile.as_deref());
        let profile = project
            .profile(&profile_name)
            .context("Failed to resolve profile")?
            .clone();

        let database_path = project.database_path(&profile);
        log::debug!(
            "Using profile '{}' with database {}",
            profile_name,
            database_path
        );
        let backend = DuckDbBackend::new(&database_path).context("Failed to connect to database")?;

        Ok(Self {
            project,
            profile_name,
            profile,
            database_path,
            backend,
        })
    }

    /// Migrator over this context's store and migrations
    pub fn migrator(&self) -> Migrator<'_> {
        Migrator::new(
            &self.backend,
            self.project.config.version_table(),
            &self.profile,
            &self.project.migrations,
        )
    }
}

/// Load a project from `--config` if given, otherwise from the project directory.
pub(crate) fn load_project(global: &GlobalArgs) -> Result<Project> {
    match &global.config {
        Some(config_path) => {
            Project::load_with_config(config_path).context("Failed to load configuration file")
        }
        None => Project::load(&global.project_dir).context("Failed to load project"),
    }
}
