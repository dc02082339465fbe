//! forge::github
//!
//! GitHub forge implementation using the REST API.
//!
//! # Design
//!
//! This module implements the `Forge` trait for one GitHub repository:
//! - `GET  /repos/{owner}/{repo}/git/ref/heads/{branch}` for branch lookup
//! - `POST /repos/{owner}/{repo}/git/refs` for branch creation
//! - `GET  /repos/{owner}/{repo}/contents/{path}?ref=...` for file content
//! - `POST /repos/{owner}/{repo}/pulls` for pull requests
//!
//! Transport concerns (headers, timeouts, retries) live in
//! [`ApiClient`](super::http::ApiClient). Lookups are retried; the two
//! POSTs are sent once.
//!
//! # Example
//!
//! ```ignore
//! use forgehand::auth::{StaticTokenProvider, TokenSource};
//! use forgehand::forge::github::GitHubForge;
//! use std::sync::Arc;
//!
//! let provider = Arc::new(StaticTokenProvider::new(TokenSource::default()));
//! let forge = GitHubForge::new(provider, "adore-me", "daggerverse");
//! let pr = forge.create_pr(request).await?;
//! ```

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::{StatusCode, Url};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::http::{ApiClient, HttpFailure};
use super::traits::{CreatePrRequest, FileContent, Forge, ForgeError, PullRequest, RemoteRef};
use super::RetryPolicy;
use crate::auth::TokenProvider;
use crate::core::types::{BranchName, Oid, RefName};

/// GitHub forge implementation.
pub struct GitHubForge {
    /// Authenticated JSON transport
    api: ApiClient,
    /// Repository owner (user or organization)
    owner: String,
    /// Repository name
    repo: String,
}

impl std::fmt::Debug for GitHubForge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GitHubForge")
            .field("owner", &self.owner)
            .field("repo", &self.repo)
            .field("api", &self.api)
            .finish()
    }
}

impl GitHubForge {
    /// Create a forge for `owner/repo` on `api.github.com`.
    pub fn new(
        provider: Arc<dyn TokenProvider>,
        owner: impl Into<String>,
        repo: impl Into<String>,
    ) -> Self {
        Self {
            api: ApiClient::new(Some(provider)),
            owner: owner.into(),
            repo: repo.into(),
        }
    }

    /// Use a custom API base URL (e.g., `https://github.example.com/api/v3`).
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api = self.api.with_api_base(api_base);
        self
    }

    /// Use a custom timeout and retry policy.
    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.api = self.api.with_retry_policy(retry);
        self
    }

    /// Create a GitHub forge from a remote URL.
    ///
    /// Returns `None` if the URL is not a GitHub URL.
    pub fn from_remote_url(url: &str, provider: Arc<dyn TokenProvider>) -> Option<Self> {
        let (owner, repo) = parse_github_url(url)?;
        Some(Self::new(provider, owner, repo))
    }

    /// Get the repository owner.
    pub fn owner(&self) -> &str {
        &self.owner
    }

    /// Get the repository name.
    pub fn repo(&self) -> &str {
        &self.repo
    }

    /// URL for a repository endpoint; `path` segments are encoded one by one.
    fn repo_url<'a>(&'a self, path: impl IntoIterator<Item = &'a str>) -> Result<Url, ForgeError> {
        let prefix = ["repos", self.owner.as_str(), self.repo.as_str()];
        self.api.endpoint(prefix.into_iter().chain(path))
    }
}

#[async_trait]
impl Forge for GitHubForge {
    fn name(&self) -> &'static str {
        "github"
    }

    async fn get_branch_ref(&self, branch: &BranchName) -> Result<RemoteRef, ForgeError> {
        let refname = RefName::for_branch(branch);
        let url = self.repo_url(["git", "ref", "heads"].into_iter().chain(branch.as_str().split('/')))?;

        let found: GitHubRefResponse = self
            .api
            .execute(
                "get branch ref",
                |client| client.get(url.clone()),
                |failure| match failure.status {
                    StatusCode::NOT_FOUND => ForgeError::RefNotFound {
                        refname: refname.to_string(),
                    },
                    _ => failure.into_forge_error(),
                },
            )
            .await?;

        found.try_into()
    }

    async fn create_branch_ref(
        &self,
        branch: &BranchName,
        sha: &Oid,
    ) -> Result<RemoteRef, ForgeError> {
        let url = self.repo_url(["git", "refs"])?;
        let body = CreateRefBody {
            ref_name: RefName::for_branch(branch).to_string(),
            sha: sha.to_string(),
        };

        let created: GitHubRefResponse = self
            .api
            .execute_once(
                "create branch ref",
                |client| client.post(url.clone()).json(&body),
                HttpFailure::into_forge_error,
            )
            .await?;

        created.try_into()
    }

    async fn get_file_content(&self, path: &str, at: &RefName) -> Result<FileContent, ForgeError> {
        let path = path.trim_start_matches('/');
        let url = self.repo_url(std::iter::once("contents").chain(path.split('/')))?;
        let branch = at
            .branch_name()
            .map(String::from)
            .unwrap_or_else(|| at.to_string());
        let not_found = || ForgeError::ContentNotFound {
            path: path.to_string(),
            branch: branch.clone(),
        };

        let value: Value = self
            .api
            .execute(
                "get file content",
                |client| client.get(url.clone()).query(&[("ref", at.as_str())]),
                |failure| match failure.status {
                    StatusCode::NOT_FOUND => not_found(),
                    _ => failure.into_forge_error(),
                },
            )
            .await?;

        // Directories come back as a JSON array of entries.
        if !value.is_object() {
            return Err(not_found());
        }
        let file: GitHubContent = serde_json::from_value(value).map_err(|_| not_found())?;
        if file.content_type != "file" {
            return Err(not_found());
        }
        let content = file.content.ok_or_else(not_found)?;

        Ok(FileContent {
            path: file.path,
            sha: file.sha,
            encoding: file.encoding.unwrap_or_else(|| "base64".to_string()),
            content,
        })
    }

    async fn create_pr(&self, request: CreatePrRequest) -> Result<PullRequest, ForgeError> {
        let url = self.repo_url(["pulls"])?;

        let body = CreatePrBody {
            head: &request.head,
            base: &request.base,
            title: &request.title,
            body: request.body.as_deref(),
            draft: request.draft,
        };

        let pr: GitHubPullRequest = self
            .api
            .execute_once(
                "create pull request",
                |client| client.post(url.clone()).json(&body),
                |failure| ForgeError::PullRequestCreation {
                    status: failure.status.as_u16(),
                    body: failure.body,
                },
            )
            .await?;

        Ok(pr.into())
    }
}

// --------------------------------------------------------------------------
// GitHub API Types
// --------------------------------------------------------------------------

/// Request body for creating a PR.
#[derive(Serialize)]
struct CreatePrBody<'a> {
    head: &'a str,
    base: &'a str,
    title: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    body: Option<&'a str>,
    draft: bool,
}

/// Request body for creating a ref.
#[derive(Serialize)]
struct CreateRefBody {
    #[serde(rename = "ref")]
    ref_name: String,
    sha: String,
}

/// Git reference response format.
#[derive(Deserialize)]
struct GitHubRefResponse {
    #[serde(rename = "ref")]
    ref_name: String,
    object: GitHubObject,
}

#[derive(Deserialize)]
struct GitHubObject {
    sha: String,
}

impl TryFrom<GitHubRefResponse> for RemoteRef {
    type Error = ForgeError;

    fn try_from(gh: GitHubRefResponse) -> Result<Self, Self::Error> {
        let invalid = |e: crate::core::types::TypeError| ForgeError::ApiError {
            status: 200,
            message: format!("unexpected ref in response: {}", e),
        };
        Ok(RemoteRef {
            refname: RefName::new(gh.ref_name).map_err(invalid)?,
            sha: Oid::new(gh.object.sha).map_err(invalid)?,
        })
    }
}

/// Contents API entry (files only carry `content`).
#[derive(Deserialize)]
struct GitHubContent {
    #[serde(rename = "type")]
    content_type: String,
    path: String,
    sha: String,
    encoding: Option<String>,
    content: Option<String>,
}

/// GitHub PR response format.
#[derive(Deserialize)]
struct GitHubPullRequest {
    number: u64,
    html_url: String,
    #[serde(default)]
    draft: bool,
    head: GitHubBranchRef,
    base: GitHubBranchRef,
    title: String,
}

/// GitHub ref (head/base) format.
#[derive(Deserialize)]
struct GitHubBranchRef {
    #[serde(rename = "ref")]
    ref_name: String,
}

impl From<GitHubPullRequest> for PullRequest {
    fn from(pr: GitHubPullRequest) -> Self {
        PullRequest {
            number: pr.number,
            url: pr.html_url,
            is_draft: pr.draft,
            head: pr.head.ref_name,
            base: pr.base.ref_name,
            title: pr.title,
        }
    }
}

// --------------------------------------------------------------------------
// URL Parsing
// --------------------------------------------------------------------------

/// Parse a GitHub remote URL to extract owner and repo.
///
/// Supports both SSH and HTTPS formats:
/// - `git@github.com:owner/repo.git`
/// - `https://github.com/owner/repo.git`
/// - `https://github.com/owner/repo`
///
/// # Example
///
/// ```
/// use forgehand::forge::github::parse_github_url;
///
/// let (owner, repo) = parse_github_url("git@github.com:adore-me/daggerverse.git").unwrap();
/// assert_eq!(owner, "adore-me");
/// assert_eq!(repo, "daggerverse");
/// ```
pub fn parse_github_url(url: &str) -> Option<(String, String)> {
    let rest = url
        .strip_prefix("git@github.com:")
        .or_else(|| url.strip_prefix("https://github.com/"))
        .or_else(|| url.strip_prefix("http://github.com/"))
        .or_else(|| url.strip_prefix("ssh://git@github.com/"))?;

    let rest = rest.trim_end_matches('/');
    let rest = rest.strip_suffix(".git").unwrap_or(rest);
    let (owner, repo) = rest.split_once('/')?;
    if owner.is_empty() || repo.is_empty() || repo.contains('/') {
        return None;
    }
    Some((owner.to_string(), repo.to_string()))
}
