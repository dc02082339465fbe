//! release
//!
//! Latest published release of an upstream GitHub repository.
//!
//! `GET /repos/{owner}/{repo}/releases/latest` skips drafts and
//! prereleases, so the tag it returns is the newest stable one. The
//! endpoint works without a token for public repositories; a token only
//! raises the rate limit.
//!
//! # Example
//!
//! ```ignore
//! use forgehand::release::ReleaseFeed;
//!
//! let feed = ReleaseFeed::new(None);
//! let release = feed.latest("istio", "istio").await?;
//! println!("latest istio is {}", release.tag_name);
//! ```

use std::sync::Arc;

use reqwest::StatusCode;
use serde::Deserialize;
use tracing::debug;

use crate::auth::TokenProvider;
use crate::forge::http::ApiClient;
use crate::forge::{ForgeError, RetryPolicy};

/// A published release.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Release {
    /// Git tag of the release, e.g. `1.22.0`
    pub tag_name: String,
    /// Display name; may be empty
    #[serde(default)]
    pub name: Option<String>,
}

/// Reads releases through the GitHub REST API.
#[derive(Debug)]
pub struct ReleaseFeed {
    api: ApiClient,
}

impl ReleaseFeed {
    /// Feed on `api.github.com`, authenticated when a provider is given.
    pub fn new(token_provider: Option<Arc<dyn TokenProvider>>) -> Self {
        Self {
            api: ApiClient::new(token_provider),
        }
    }

    /// Use a custom API base URL.
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api = self.api.with_api_base(api_base);
        self
    }

    /// Use a custom timeout and retry policy.
    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.api = self.api.with_retry_policy(retry);
        self
    }

    /// Latest stable release of `owner/repo`.
    ///
    /// # Errors
    ///
    /// - [`ForgeError::NotFound`] if the repository has no published release
    /// - [`ForgeError::ApiError`] if the response is not a release object
    pub async fn latest(&self, owner: &str, repo: &str) -> Result<Release, ForgeError> {
        let url = self
            .api
            .endpoint(["repos", owner, repo, "releases", "latest"])?;

        let release: Release = self
            .api
            .execute(
                "latest release",
                |client| client.get(url.clone()),
                |failure| match failure.status {
                    StatusCode::NOT_FOUND => {
                        ForgeError::NotFound(format!("no published release for {}/{}", owner, repo))
                    }
                    _ => failure.into_forge_error(),
                },
            )
            .await?;

        debug!(owner, repo, tag = %release.tag_name, "latest release");
        Ok(release)
    }
}
