//! cli::commands
//!
//! Command dispatch and handlers.
//!
//! # Architecture
//!
//! Each command handler:
//! 1. Resolves defaults from flags, config, and the repository
//! 2. Calls the orchestrator, forge, or version module
//! 3. Formats and displays output
//!
//! # Async Commands
//!
//! GitHub commands (file, pr, ref, version) involve network I/O. Each one
//! creates a tokio runtime and blocks on it, so every command is one-shot
//! and returns only when its requests are done.

mod branch;
mod commit;
mod file;
mod helpers;
mod pr;
mod ref_cmd;
mod version_cmd;

pub use branch::create_branch;
pub use commit::commit;
pub use file::get_file;
pub use pr::{create_pr, PrOptions};
pub use ref_cmd::create_ref;
pub use version_cmd::{check_version, update_version, FeedArgs};

use crate::cli::args::{BranchAction, Command, FileAction, PrAction, RefAction, VersionAction};
use crate::cli::Context;
use anyhow::Result;

/// Dispatch a parsed command to its handler.
pub fn dispatch(command: Command, ctx: &Context) -> Result<()> {
    match command {
        Command::Branch { action } => match action {
            BranchAction::Create {
                name,
                base,
                keep_existing,
                worktree,
            } => create_branch(ctx, &name, base.as_deref(), keep_existing, &worktree),
        },
        Command::Commit {
            branch,
            title,
            author_name,
            author_email,
            worktree,
        } => commit(
            ctx,
            &branch,
            &title,
            author_name.as_deref(),
            author_email.as_deref(),
            &worktree,
        ),
        Command::File { action } => match action {
            FileAction::Get {
                branch,
                path,
                remote,
            } => get_file(ctx, &branch, &path, &remote),
        },
        Command::Pr { action } => match action {
            PrAction::Create {
                title,
                head,
                base,
                body,
                draft,
                remote,
            } => create_pr(
                ctx,
                PrOptions {
                    title: &title,
                    head: &head,
                    base: base.as_deref(),
                    body: body.as_deref(),
                    draft,
                },
                &remote,
            ),
        },
        Command::Ref { action } => match action {
            RefAction::Create {
                new_branch,
                base,
                remote,
            } => create_ref(ctx, &new_branch, base.as_deref(), &remote),
        },
        Command::Version { action } => match action {
            VersionAction::Check {
                config_path,
                feed_owner,
                feed_repo,
                token,
            } => check_version(
                ctx,
                config_path.as_deref(),
                FeedArgs {
                    owner: feed_owner.as_deref(),
                    repo: feed_repo.as_deref(),
                    token: token.as_deref(),
                },
            ),
            VersionAction::Update {
                config_path,
                to,
                feed_owner,
                feed_repo,
                token,
            } => update_version(
                ctx,
                config_path.as_deref(),
                to.as_deref(),
                FeedArgs {
                    owner: feed_owner.as_deref(),
                    repo: feed_repo.as_deref(),
                    token: token.as_deref(),
                },
            ),
        },
    }
}
