//! cli::commands::branch
//!
//! Create a local branch at the tip of a base branch.
//!
//! # Example
//!
//! ```bash
//! # Branch off the configured base (master by default)
//! fh branch create feature-x
//!
//! # Work on a fresh export of a snapshot
//! fh branch create feature-x --from /src/repo --repo-path /work/repo
//! ```

use anyhow::{Context as _, Result};

use super::helpers;
use crate::cli::args::WorkTreeArgs;
use crate::cli::Context;
use crate::orchestrator::{branch_created_status, BranchPolicy};
use crate::ui::output;

/// Run `branch create`.
///
/// # Arguments
///
/// * `ctx` - CLI context
/// * `name` - Branch to create or move
/// * `base` - Base branch override
/// * `keep_existing` - Fail instead of moving an existing branch
/// * `worktree` - Working tree location and optional snapshot
pub fn create_branch(
    ctx: &Context,
    name: &str,
    base: Option<&str>,
    keep_existing: bool,
    worktree: &WorkTreeArgs,
) -> Result<()> {
    let verbosity = ctx.verbosity();
    let new_branch = helpers::branch_arg(name)?;

    let orchestrator = helpers::open_orchestrator(ctx, worktree)?;
    let config = ctx.load_config(Some(orchestrator.work_dir()))?;
    let base = helpers::base_branch(base, &config)?;

    let policy = if keep_existing {
        BranchPolicy::KeepExisting
    } else {
        BranchPolicy::Overwrite
    };

    let branch_ref = orchestrator
        .ensure_local_branch(&base, &new_branch, policy)
        .with_context(|| format!("failed to create branch '{}' from '{}'", new_branch, base))?;

    output::result(branch_created_status(&new_branch));
    output::detail("ref", &branch_ref.name, verbosity);
    output::detail("commit", &branch_ref.oid, verbosity);
    Ok(())
}
