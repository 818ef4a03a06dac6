//! Reset command implementation

use anyhow::Result;

use crate::cli::{GlobalArgs, ResetArgs};
use crate::commands::common::{confirm, print_applied};
use crate::context::RuntimeContext;

/// Execute the reset command
pub(crate) fn execute(args: &ResetArgs, global: &GlobalArgs) -> Result<()> {
    let ctx = RuntimeContext::new(global)?;

    if !confirm("reset", args.yes)? {
        println!("Aborted.");
        return Ok(());
    }

    println!(
        "Resetting keyspace '{}' in {} (profile: {})",
        ctx.project.config.keyspace, ctx.database_path, ctx.profile_name
    );
    let applied = ctx.migrator().reset(args.version.as_deref())?;
    print_applied(&applied);
    Ok(())
}
