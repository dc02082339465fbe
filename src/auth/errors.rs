//! auth::errors
//!
//! Token retrieval errors.
//!
//! Error messages name where a token was looked for, never the token
//! itself.
//!
//! # Example
//!
//! ```
//! use forgehand::auth::AuthError;
//!
//! let err = AuthError::NotFound("environment variable GITHUB_TOKEN".to_string());
//! assert!(err.to_string().contains("GITHUB_TOKEN"));
//! ```

use std::path::PathBuf;

use thiserror::Error;

/// Errors from token retrieval.
#[derive(Debug, Error)]
pub enum AuthError {
    /// No token exists at the named source.
    #[error("no GitHub token found in {0}")]
    NotFound(String),

    /// The source exists but holds only whitespace.
    #[error("GitHub token from {0} is empty")]
    Empty(String),

    /// A token file could not be read.
    #[error("failed to read token file '{path}': {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A token source specification could not be parsed.
    #[error("invalid token source: {0}")]
    InvalidSource(String),
}

impl AuthError {
    /// Whether supplying a token (flag, env var or file) would fix this.
    pub fn needs_token(&self) -> bool {
        matches!(self, AuthError::NotFound(_) | AuthError::Empty(_))
    }
}
