//! cli::commands::file
//!
//! Print a file's content as stored on a remote branch.
//!
//! The content is printed exactly as GitHub encodes it (base64, with the
//! API's line breaks) so it can be piped to `base64 -d`.

use anyhow::{Context as _, Result};

use super::helpers;
use crate::cli::args::RemoteArgs;
use crate::cli::Context;
use crate::forge::ops::fetch_remote_file_content;

/// Run `file get`.
pub fn get_file(ctx: &Context, branch: &str, path: &str, remote: &RemoteArgs) -> Result<()> {
    let branch = helpers::branch_arg(branch)?;
    let (forge, _config) = helpers::github_forge(ctx, remote)?;

    let content = helpers::runtime()?
        .block_on(fetch_remote_file_content(&forge, &branch, path))
        .with_context(|| {
            format!(
                "failed to fetch '{}' from {}/{}@{}",
                path,
                forge.owner(),
                forge.repo(),
                branch
            )
        })?;

    print!("{}", content);
    if !content.ends_with('\n') {
        println!();
    }
    Ok(())
}
