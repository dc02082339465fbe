//! cli::commands::version_cmd
//!
//! Upstream release tracking for a version-config document.
//!
//! # Example
//!
//! ```bash
//! # Prints "Create PR" when upstream has a newer release
//! fh version check --config clusters/dev/istio-version.yaml
//!
//! # Record the latest release, then commit and open a PR
//! fh version update --config clusters/dev/istio-version.yaml
//! fh commit bump-istio --title "Bump istio"
//! ```

use std::path::{Path, PathBuf};

use anyhow::{Context as _, Result};

use super::helpers;
use crate::cli::Context;
use crate::core::config::Config;
use crate::release::{Release, ReleaseFeed};
use crate::ui::output;
use crate::version::{compare, parse_version, VersionDocument};

/// Release feed flags.
#[derive(Debug, Clone, Copy, Default)]
pub struct FeedArgs<'a> {
    pub owner: Option<&'a str>,
    pub repo: Option<&'a str>,
    pub token: Option<&'a str>,
}

/// Run `version check`.
///
/// Prints `Create PR` or `No PR needed`.
pub fn check_version(ctx: &Context, config_path: Option<&Path>, feed: FeedArgs<'_>) -> Result<()> {
    let verbosity = ctx.verbosity();
    let (config, _git) = helpers::remote_config(ctx)?;
    let path = document_path(ctx, config_path, &config)?;

    let document = VersionDocument::load(&path)?;
    let release = fetch_latest(&config, feed)?;

    let decision = compare(&release.tag_name, document.version())?;
    output::detail("latest", decision.latest(), verbosity);
    output::detail("local", decision.local(), verbosity);
    output::result(decision.pr_message());
    Ok(())
}

/// Run `version update`.
///
/// With `--to` the given version is recorded as is. Otherwise the latest
/// release is recorded if it is newer than the document's version.
pub fn update_version(
    ctx: &Context,
    config_path: Option<&Path>,
    to: Option<&str>,
    feed: FeedArgs<'_>,
) -> Result<()> {
    let (config, _git) = helpers::remote_config(ctx)?;
    let path = document_path(ctx, config_path, &config)?;
    let mut document = VersionDocument::load(&path)?;
    let previous = document.version().to_string();

    let target = match to {
        Some(version) => {
            parse_version(version)?;
            version.to_string()
        }
        None => {
            let release = fetch_latest(&config, feed)?;
            let decision = compare(&release.tag_name, &previous)?;
            if !decision.needs_update() {
                output::result(format!("data.version already at {}", previous));
                return Ok(());
            }
            release.tag_name
        }
    };

    document.set_version(&target)?;
    document.save(&path)?;
    output::result(format!("updated data.version from {} to {}", previous, target));
    Ok(())
}

/// Document path from the flag, else config; relative to `--cwd`.
fn document_path(ctx: &Context, flag: Option<&Path>, config: &Config) -> Result<PathBuf> {
    let path = match flag {
        Some(path) => path.to_path_buf(),
        None => PathBuf::from(config.version_config_path()),
    };
    if path.is_absolute() {
        Ok(path)
    } else {
        Ok(ctx.cwd()?.join(path))
    }
}

fn fetch_latest(config: &Config, feed: FeedArgs<'_>) -> Result<Release> {
    let (default_owner, default_repo) = config.release_source();
    let owner = feed.owner.unwrap_or(default_owner);
    let repo = feed.repo.unwrap_or(default_repo);

    let mut release_feed = ReleaseFeed::new(helpers::optional_token_provider(feed.token)?)
        .with_retry_policy(config.retry_policy());
    if let Some(api_base) = config.api_base() {
        release_feed = release_feed.with_api_base(api_base);
    }

    helpers::runtime()?
        .block_on(release_feed.latest(owner, repo))
        .with_context(|| format!("failed to fetch the latest release of {}/{}", owner, repo))
}
