//! Baseline command implementation

use anyhow::Result;

use crate::cli::{BaselineArgs, GlobalArgs};
use crate::commands::common::print_applied;
use crate::context::RuntimeContext;

/// Execute the baseline command
pub(crate) fn execute(args: &BaselineArgs, global: &GlobalArgs) -> Result<()> {
    let ctx = RuntimeContext::new(global)?;

    println!(
        "Baselining keyspace '{}' (profile: {})",
        ctx.project.config.keyspace, ctx.profile_name
    );
    let applied = ctx.migrator().baseline(args.version.as_deref())?;
    print_applied(&applied);
    Ok(())
}
