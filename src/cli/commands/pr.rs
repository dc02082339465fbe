//! cli::commands::pr
//!
//! Open a pull request.
//!
//! # Example
//!
//! ```bash
//! fh pr create --title "Bump istio to 1.22.0" --head bump-istio
//! fh pr create --title "WIP" --head feature-x --base develop --draft
//! ```

use anyhow::{Context as _, Result};

use super::helpers;
use crate::cli::args::RemoteArgs;
use crate::cli::Context;
use crate::forge::ops::{open_pull_request, PR_CREATED_STATUS};
use crate::forge::CreatePrRequest;
use crate::ui::output;

/// Options for `pr create`.
#[derive(Debug, Clone, Copy)]
pub struct PrOptions<'a> {
    pub title: &'a str,
    pub head: &'a str,
    pub base: Option<&'a str>,
    pub body: Option<&'a str>,
    pub draft: bool,
}

/// Run `pr create`.
///
/// Prints the status line, then the PR number and URL.
pub fn create_pr(ctx: &Context, opts: PrOptions<'_>, remote: &RemoteArgs) -> Result<()> {
    let verbosity = ctx.verbosity();
    let (forge, config) = helpers::github_forge(ctx, remote)?;
    let default_base = config.base_branch();

    let request = CreatePrRequest {
        head: opts.head.to_string(),
        base: opts.base.unwrap_or_default().to_string(),
        title: opts.title.to_string(),
        body: opts.body.map(str::to_string),
        draft: opts.draft,
    };

    let pr = helpers::runtime()?
        .block_on(open_pull_request(&forge, request, &default_base))
        .with_context(|| {
            format!(
                "failed to open pull request from '{}' in {}/{}",
                opts.head,
                forge.owner(),
                forge.repo()
            )
        })?;

    output::result(PR_CREATED_STATUS);
    output::print(format!("#{} {}", pr.number, pr.url), verbosity);
    if pr.is_draft {
        output::detail("state", "draft", verbosity);
    }
    Ok(())
}
