//! Migrate command implementation

use anyhow::Result;

use crate::cli::{GlobalArgs, MigrateArgs};
use crate::commands::common::{confirm, print_applied};
use crate::context::RuntimeContext;

/// Execute the migrate command
pub(crate) fn execute(args: &MigrateArgs, global: &GlobalArgs) -> Result<()> {
    let ctx = RuntimeContext::new(global)?;

    if !confirm("migrate", args.yes)? {
        println!("Aborted.");
        return Ok(());
    }

    println!(
        "Migrating keyspace '{}' in {} (profile: {})",
        ctx.project.config.keyspace, ctx.database_path, ctx.profile_name
    );
    if args.force {
        log::warn!("Force mode: a failed last migration will be retried");
    }

    let applied = ctx
        .migrator()
        .migrate(args.version.as_deref(), args.force)?;
    print_applied(&applied);
    Ok(())
}
