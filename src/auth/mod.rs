//! auth - GitHub token retrieval
//!
//! Forge adapters ask a [`TokenProvider`] for a bearer token on every
//! request. The shipped provider, [`StaticTokenProvider`], reads the token
//! once from a [`TokenSource`]: an environment variable, a file, or a value
//! passed on the command line.
//!
//! # Security
//!
//! Tokens never appear in:
//! - logs (including `--debug`)
//! - error messages
//! - debug output
//!
//! Types holding a token implement a custom `Debug` that redacts it.
//!
//! # Example
//!
//! ```ignore
//! use forgehand::auth::{StaticTokenProvider, TokenProvider, TokenSource};
//!
//! let provider = StaticTokenProvider::new(TokenSource::parse("env:CI_TOKEN")?);
//! let token = provider.bearer_token().await?;
//! ```

mod errors;
mod provider;
mod source;

pub use errors::AuthError;
pub use provider::{StaticTokenProvider, DEFAULT_HOST};
pub use source::{TokenSource, DEFAULT_TOKEN_ENV};

/// Trait for providing bearer tokens to forge adapters.
///
/// Implementors must never log or otherwise expose token values.
#[async_trait::async_trait]
pub trait TokenProvider: Send + Sync {
    /// Returns a bearer token.
    ///
    /// # Errors
    ///
    /// - [`AuthError::NotFound`] if no token exists at the source
    /// - [`AuthError::Empty`] if the token is blank
    /// - [`AuthError::Read`] if a token file cannot be read
    async fn bearer_token(&self) -> Result<String, AuthError>;

    /// Check if a token is available.
    fn is_authenticated(&self) -> bool;

    /// Get the host this provider authenticates for.
    fn host(&self) -> &str;
}
