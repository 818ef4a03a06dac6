//! Generate command implementation

use anyhow::{Context, Result};
use chrono::Utc;
use sw_core::MigrationFormat;

use crate::cli::{GenerateArgs, GlobalArgs};
use crate::context::load_project;

/// Execute the generate command
pub(crate) fn execute(args: &GenerateArgs, global: &GlobalArgs) -> Result<()> {
    let project = load_project(global)?;

    let format = if args.executable {
        MigrationFormat::Executable
    } else {
        MigrationFormat::Declarative
    };

    let path = sw_core::generate(&project, &args.description, format, Utc::now())
        .context("Failed to generate migration")?;

    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());
    println!("{}", file_name);
    Ok(())
}
