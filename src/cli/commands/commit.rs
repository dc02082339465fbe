//! cli::commands::commit
//!
//! Stage every working-tree change and commit it onto a branch.

use anyhow::{bail, Context as _, Result};

use super::helpers;
use crate::cli::args::WorkTreeArgs;
use crate::cli::Context;
use crate::core::config::Config;
use crate::core::types::Identity;
use crate::orchestrator::COMMITTED_STATUS;
use crate::ui::output;

/// Run `commit`.
pub fn commit(
    ctx: &Context,
    branch: &str,
    title: &str,
    author_name: Option<&str>,
    author_email: Option<&str>,
    worktree: &WorkTreeArgs,
) -> Result<()> {
    let verbosity = ctx.verbosity();
    let branch = helpers::branch_arg(branch)?;

    let orchestrator = helpers::open_orchestrator(ctx, worktree)?;
    let config = ctx.load_config(Some(orchestrator.work_dir()))?;
    let identity = resolve_identity(author_name, author_email, &config)?;

    let record = orchestrator
        .commit_all_changes(&branch, title, &identity)
        .with_context(|| format!("failed to commit onto '{}'", branch))?;

    output::result(COMMITTED_STATUS);
    output::detail("commit", &record.oid, verbosity);
    if let Some(parent) = &record.parent {
        output::detail("parent", parent, verbosity);
    }
    output::detail(
        "author",
        format!("{} <{}>", record.author_name, record.author_email),
        verbosity,
    );
    Ok(())
}

/// Commit identity: each half from its flag, else from config.
fn resolve_identity(
    name: Option<&str>,
    email: Option<&str>,
    config: &Config,
) -> Result<Identity> {
    let (config_name, config_email) = config.author_fields();
    match (name.or(config_name), email.or(config_email)) {
        (Some(name), Some(email)) => {
            Identity::new(name, email).context("invalid commit identity")
        }
        _ => bail!(
            "commit identity is incomplete; pass --author-name and --author-email \
             or set [author] in the config file"
        ),
    }
}
