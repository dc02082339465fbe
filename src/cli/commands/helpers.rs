//! cli::commands::helpers
//!
//! Default resolution shared by the command handlers.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context as _, Result};

use crate::auth::{StaticTokenProvider, TokenProvider, TokenSource, DEFAULT_TOKEN_ENV};
use crate::cli::args::{RemoteArgs, WorkTreeArgs};
use crate::cli::Context;
use crate::core::config::Config;
use crate::core::types::BranchName;
use crate::forge::github::GitHubForge;
use crate::git::Git;
use crate::orchestrator::Orchestrator;

/// Working tree a local command runs in: `--repo-path`, else the cwd.
pub(super) fn work_dir(ctx: &Context, worktree: &WorkTreeArgs) -> Result<PathBuf> {
    match &worktree.repo_path {
        Some(path) => Ok(path.clone()),
        None => ctx.cwd(),
    }
}

/// Open the orchestrator, exporting `--from` into the working tree first.
pub(super) fn open_orchestrator(ctx: &Context, worktree: &WorkTreeArgs) -> Result<Orchestrator> {
    let dir = work_dir(ctx, worktree)?;
    match &worktree.from {
        Some(snapshot) => Orchestrator::from_snapshot(snapshot, &dir).with_context(|| {
            format!(
                "failed to prepare '{}' from snapshot '{}'",
                dir.display(),
                snapshot.display()
            )
        }),
        None => Orchestrator::open(&dir)
            .with_context(|| format!("failed to open repository at '{}'", dir.display())),
    }
}

/// Parse a branch name given on the command line.
pub(super) fn branch_arg(name: &str) -> Result<BranchName> {
    BranchName::new(name).with_context(|| format!("invalid branch name '{}'", name))
}

/// Base branch from the flag, else config.
pub(super) fn base_branch(flag: Option<&str>, config: &Config) -> Result<BranchName> {
    match flag {
        Some(name) => branch_arg(name),
        None => Ok(config.base_branch()),
    }
}

/// Token provider for `--token`, falling back to `GITHUB_TOKEN`.
///
/// Fails early when no token can be read so the user is not left with an
/// opaque 401.
pub(super) fn token_provider(token: Option<&str>) -> Result<Arc<dyn TokenProvider>> {
    let source = match token {
        Some(spec) => TokenSource::parse(spec)?,
        None => TokenSource::default(),
    };
    let described = source.describe();
    let provider = StaticTokenProvider::new(source);
    if !provider.is_authenticated() {
        bail!(
            "no GitHub token available from {}; pass --token or set {}",
            described,
            DEFAULT_TOKEN_ENV
        );
    }
    Ok(Arc::new(provider))
}

/// Token provider for anonymous-capable endpoints.
///
/// Without `--token`, the default variable is used only if it is set.
pub(super) fn optional_token_provider(
    token: Option<&str>,
) -> Result<Option<Arc<dyn TokenProvider>>> {
    if token.is_some() {
        return token_provider(token).map(Some);
    }
    let provider = StaticTokenProvider::new(TokenSource::default());
    if provider.is_authenticated() {
        Ok(Some(Arc::new(provider)))
    } else {
        Ok(None)
    }
}

/// Configuration for a remote command, layered with the enclosing repository's file.
pub(super) fn remote_config(ctx: &Context) -> Result<(Config, Option<Git>)> {
    let cwd = ctx.cwd()?;
    let git = Git::discover(&cwd).ok();
    let repo_dir = git.as_ref().and_then(|g| g.work_dir().ok()).map(|p| p.to_path_buf());
    let config = ctx.load_config(repo_dir.as_deref())?;
    Ok((config, git))
}

/// Owner and repository name: flags, then config, then the origin remote.
pub(super) fn resolve_target(
    remote: &RemoteArgs,
    config: &Config,
    git: Option<&Git>,
) -> Result<(String, String)> {
    let origin = match git {
        Some(git) if remote.owner.is_none() || remote.repo.is_none() => {
            git.github_origin().ok().flatten()
        }
        _ => None,
    };

    let owner = remote
        .owner
        .clone()
        .or_else(|| config.owner().map(str::to_string))
        .or_else(|| origin.as_ref().map(|(o, _)| o.clone()));
    let repo = remote
        .repo
        .clone()
        .or_else(|| config.repo().map(str::to_string))
        .or_else(|| origin.as_ref().map(|(_, r)| r.clone()));

    match (owner, repo) {
        (Some(owner), Some(repo)) => Ok((owner, repo)),
        _ => bail!(
            "cannot determine the GitHub repository; pass --owner and --repo, \
             set [github] in the config file, or run inside a clone with a GitHub origin"
        ),
    }
}

/// Build the GitHub forge for a remote command.
pub(super) fn github_forge(ctx: &Context, remote: &RemoteArgs) -> Result<(GitHubForge, Config)> {
    let (config, git) = remote_config(ctx)?;
    let (owner, repo) = resolve_target(remote, &config, git.as_ref())?;
    let provider = token_provider(remote.token.as_deref())?;

    let mut forge = GitHubForge::new(provider, owner, repo).with_retry_policy(config.retry_policy());
    if let Some(api_base) = config.api_base() {
        forge = forge.with_api_base(api_base);
    }
    Ok((forge, config))
}

/// Runtime that drives one command's network calls to completion.
pub(super) fn runtime() -> Result<tokio::runtime::Runtime> {
    tokio::runtime::Runtime::new().context("failed to start async runtime")
}
