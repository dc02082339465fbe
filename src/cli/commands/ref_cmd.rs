//! cli::commands::ref_cmd
//!
//! Create a branch on the remote at the tip of another remote branch.

use anyhow::{Context as _, Result};

use super::helpers;
use crate::cli::args::RemoteArgs;
use crate::cli::Context;
use crate::forge::ops::create_remote_branch;
use crate::ui::output;

/// Run `ref create`.
pub fn create_ref(
    ctx: &Context,
    new_branch: &str,
    base: Option<&str>,
    remote: &RemoteArgs,
) -> Result<()> {
    let verbosity = ctx.verbosity();
    let new_branch = helpers::branch_arg(new_branch)?;
    let (forge, config) = helpers::github_forge(ctx, remote)?;
    let base = helpers::base_branch(base, &config)?;

    let created = helpers::runtime()?
        .block_on(create_remote_branch(&forge, &base, &new_branch))
        .with_context(|| {
            format!(
                "failed to create '{}' from '{}' in {}/{}",
                new_branch,
                base,
                forge.owner(),
                forge.repo()
            )
        })?;

    output::result(format!("created remote branch {}", new_branch));
    output::detail("ref", &created.refname, verbosity);
    output::detail("commit", &created.sha, verbosity);
    Ok(())
}
