//! Scaffolding for new migration files.

use crate::error::{CoreError, CoreResult};
use crate::migration::MigrationFormat;
use crate::project::Project;
use chrono::{DateTime, SecondsFormat, Utc};
use std::io::Write;
use std::path::PathBuf;

/// Replace each run of non-word characters with a single `_`.
pub fn clean_description(description: &str) -> String {
    let mut out = String::with_capacity(description.len());
    let mut in_run = false;
    for c in description.chars() {
        if c.is_alphanumeric() || c == '_' {
            out.push(c);
            in_run = false;
        } else if !in_run {
            out.push('_');
            in_run = true;
        }
    }
    out
}

/// Create the next migration file in the project's migrations directory.
///
/// The file name and body are rendered from the configured templates with
/// `desc`, `full_desc`, `next_version`, `date` and `keyspace` in scope.
/// Returns the path written. An existing file is never overwritten.
pub fn generate(
    project: &Project,
    description: &str,
    format: MigrationFormat,
    now: DateTime<Utc>,
) -> CoreResult<PathBuf> {
    let config = &project.config;
    let ctx = minijinja::context! {
        desc => clean_description(description),
        full_desc => description,
        next_version => project.latest_version() + 1,
        date => now.to_rfc3339_opts(SecondsFormat::Secs, false),
        keyspace => config.keyspace.as_str(),
    };

    let (text_key, text_template) = match format {
        MigrationFormat::Declarative => ("new_migration_text", &config.new_migration_text),
        MigrationFormat::Executable => (
            "new_executable_migration_text",
            &config.new_executable_migration_text,
        ),
    };

    let env = minijinja::Environment::new();
    let render = |key: &str, template: &str| {
        env.render_str(template, &ctx)
            .map_err(|e| CoreError::Template {
                key: key.to_string(),
                message: e.to_string(),
            })
    };

    let name = render("new_migration_name", &config.new_migration_name)?;
    let content = render(text_key, text_template)?;

    let dir = project.migrations_dir();
    std::fs::create_dir_all(&dir).map_err(|e| CoreError::IoWithPath {
        path: dir.display().to_string(),
        source: e,
    })?;

    let path = dir.join(format!("{}.{}", name.trim(), format.extension()));
    let mut file = std::fs::OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(&path)
        .map_err(|e| match e.kind() {
            std::io::ErrorKind::AlreadyExists => CoreError::MigrationExists {
                path: path.display().to_string(),
            },
            _ => CoreError::IoWithPath {
                path: path.display().to_string(),
                source: e,
            },
        })?;
    writeln!(file, "{content}").map_err(|e| CoreError::IoWithPath {
        path: path.display().to_string(),
        source: e,
    })?;

    log::info!("Created migration {}", path.display());
    Ok(path)
}

#[cfg(test)]
#[path = "generate_test.rs"]
mod tests;
