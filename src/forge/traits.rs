//! forge::traits
//!
//! Forge trait definition for the GitHub REST operations this tool needs.
//!
//! # Design
//!
//! The `Forge` trait is async because forge operations involve network I/O.
//! An implementation is bound to one `owner/repo` at construction time, so
//! the methods only name branches, paths and pull request fields.
//!
//! # Example
//!
//! ```ignore
//! use forgehand::forge::{CreatePrRequest, Forge, ForgeError};
//!
//! async fn open(forge: &dyn Forge) -> Result<(), ForgeError> {
//!     let pr = forge.create_pr(CreatePrRequest {
//!         head: "upgrade-istio".to_string(),
//!         base: "master".to_string(),
//!         title: "Upgrade istio to 1.22.0".to_string(),
//!         body: None,
//!         draft: false,
//!     }).await?;
//!     println!("Created PR #{}: {}", pr.number, pr.url);
//!     Ok(())
//! }
//! ```

use async_trait::async_trait;
use thiserror::Error;

use crate::core::types::{BranchName, Oid, RefName};

/// Errors from forge operations.
///
/// These error types map to common failure modes when talking to GitHub.
#[derive(Debug, Clone, Error)]
pub enum ForgeError {
    /// Authentication is required but not available.
    #[error("authentication required")]
    AuthRequired,

    /// Authentication failed (invalid token, expired, insufficient permissions).
    #[error("authentication failed: {0}")]
    AuthFailed(String),

    /// The requested resource was not found.
    #[error("not found: {0}")]
    NotFound(String),

    /// A branch reference does not exist on the remote.
    #[error("reference not found: {refname}")]
    RefNotFound {
        /// Full ref name that was looked up
        refname: String,
    },

    /// The path does not name a file on the given branch.
    #[error("file '{path}' not found on branch '{branch}'")]
    ContentNotFound {
        /// Repository path that was requested
        path: String,
        /// Branch the lookup was made on
        branch: String,
    },

    /// Rate limit exceeded.
    #[error("rate limited")]
    RateLimited,

    /// API returned an error.
    #[error("API error: {status} - {message}")]
    ApiError {
        /// HTTP status code
        status: u16,
        /// Error message from the API
        message: String,
    },

    /// Pull request creation was rejected; `body` is the raw response.
    #[error("failed to create pull request (status {status}): {body}")]
    PullRequestCreation {
        /// HTTP status code
        status: u16,
        /// Response body exactly as returned
        body: String,
    },

    /// Network or connection error.
    #[error("network error: {0}")]
    NetworkError(String),

    /// The configured API base cannot be used to build request URLs.
    #[error("invalid API URL: {0}")]
    InvalidUrl(String),
}

impl ForgeError {
    /// Whether repeating the same request may succeed.
    ///
    /// Transport failures, rate limiting and server errors are transient;
    /// everything else is a definitive answer.
    pub fn is_retryable(&self) -> bool {
        match self {
            ForgeError::NetworkError(_) | ForgeError::RateLimited => true,
            ForgeError::ApiError { status, .. } | ForgeError::PullRequestCreation { status, .. } => {
                *status >= 500
            }
            _ => false,
        }
    }
}

/// A branch reference as reported by the remote.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteRef {
    /// Full ref name (`refs/heads/<branch>`)
    pub refname: RefName,
    /// Commit the ref points at
    pub sha: Oid,
}

/// File content as returned by the contents API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileContent {
    /// Repository path of the file
    pub path: String,
    /// Blob SHA
    pub sha: String,
    /// Content encoding, `base64` for regular files
    pub encoding: String,
    /// Encoded content exactly as sent (GitHub wraps it at 60 columns)
    pub content: String,
}

/// Request to create a pull request.
#[derive(Debug, Clone)]
pub struct CreatePrRequest {
    /// Head branch name (the branch with changes)
    pub head: String,
    /// Base branch name (the branch to merge into)
    pub base: String,
    /// PR title
    pub title: String,
    /// PR body/description
    pub body: Option<String>,
    /// Create as draft
    pub draft: bool,
}

/// Pull request information returned from the forge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PullRequest {
    /// PR number
    pub number: u64,
    /// PR URL (web URL for viewing)
    pub url: String,
    /// Whether the PR is a draft
    pub is_draft: bool,
    /// Head branch name
    pub head: String,
    /// Base branch name
    pub base: String,
    /// PR title
    pub title: String,
}

/// The Forge trait for talking to a hosting service.
///
/// # Thread Safety
///
/// Implementations must be `Send + Sync` to allow use across async tasks.
///
/// # Error Handling
///
/// All methods return `Result<T, ForgeError>`. Callers should handle:
/// - `AuthRequired` / `AuthFailed`: supply a token with the right scopes
/// - `RefNotFound` / `ContentNotFound`: the named branch or file is absent
/// - `RateLimited`: back off and retry
/// - `PullRequestCreation`: show the response body to the user
/// - `NetworkError`: check connectivity
#[async_trait]
pub trait Forge: Send + Sync {
    /// Get the forge name (e.g., "github").
    fn name(&self) -> &'static str;

    /// Look up `refs/heads/<branch>`.
    ///
    /// # Errors
    ///
    /// - `RefNotFound` if the branch does not exist
    async fn get_branch_ref(&self, branch: &BranchName) -> Result<RemoteRef, ForgeError>;

    /// Create `refs/heads/<branch>` pointing at `sha`.
    ///
    /// # Errors
    ///
    /// - `ApiError` with status 422 if the ref already exists
    async fn create_branch_ref(&self, branch: &BranchName, sha: &Oid)
        -> Result<RemoteRef, ForgeError>;

    /// Fetch a file's content at a given ref.
    ///
    /// # Errors
    ///
    /// - `ContentNotFound` if the path is missing or is not a file
    async fn get_file_content(&self, path: &str, at: &RefName)
        -> Result<FileContent, ForgeError>;

    /// Create a new pull request.
    ///
    /// # Errors
    ///
    /// - `PullRequestCreation` for any rejection, carrying the raw body
    async fn create_pr(&self, request: CreatePrRequest) -> Result<PullRequest, ForgeError>;
}
