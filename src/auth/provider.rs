//! auth::provider
//!
//! Token provider backed by a [`TokenSource`].

use std::sync::OnceLock;

use super::{AuthError, TokenProvider, TokenSource};

/// Default GitHub host.
pub const DEFAULT_HOST: &str = "github.com";

/// Provides a token read once from a [`TokenSource`].
///
/// The source is resolved lazily on the first [`bearer_token`] call and the
/// value is reused afterwards.
///
/// [`bearer_token`]: TokenProvider::bearer_token
pub struct StaticTokenProvider {
    host: String,
    source: TokenSource,
    resolved: OnceLock<String>,
}

impl StaticTokenProvider {
    /// Provider for `github.com` reading from `source`.
    pub fn new(source: TokenSource) -> Self {
        Self::for_host(DEFAULT_HOST, source)
    }

    /// Provider for a specific host (GitHub Enterprise).
    pub fn for_host(host: impl Into<String>, source: TokenSource) -> Self {
        Self {
            host: host.into(),
            source,
            resolved: OnceLock::new(),
        }
    }

    /// Provider holding an already known token.
    pub fn from_token(token: impl Into<String>) -> Self {
        Self::new(TokenSource::Literal(token.into()))
    }

    fn token(&self) -> Result<&str, AuthError> {
        if let Some(token) = self.resolved.get() {
            return Ok(token.as_str());
        }
        let token = self.source.resolve()?;
        Ok(self.resolved.get_or_init(|| token).as_str())
    }
}

#[async_trait::async_trait]
impl TokenProvider for StaticTokenProvider {
    async fn bearer_token(&self) -> Result<String, AuthError> {
        self.token().map(str::to_string)
    }

    fn is_authenticated(&self) -> bool {
        self.token().is_ok()
    }

    fn host(&self) -> &str {
        &self.host
    }
}

// Custom Debug to avoid exposing tokens
impl std::fmt::Debug for StaticTokenProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StaticTokenProvider")
            .field("host", &self.host)
            .field("source", &self.source)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn literal_token_is_returned() {
        let provider = StaticTokenProvider::from_token("ghp_abc");
        assert_eq!(provider.bearer_token().await.unwrap(), "ghp_abc");
        assert!(provider.is_authenticated());
        assert_eq!(provider.host(), "github.com");
    }

    #[tokio::test]
    async fn missing_env_is_unauthenticated() {
        let provider =
            StaticTokenProvider::new(TokenSource::Env("FORGEHAND_TEST_PROVIDER_UNSET".into()));
        assert!(!provider.is_authenticated());
        assert!(matches!(
            provider.bearer_token().await,
            Err(AuthError::NotFound(_))
        ));
    }

    #[test]
    fn debug_never_shows_token() {
        let provider = StaticTokenProvider::from_token("ghp_supersecret");
        provider.is_authenticated();
        let debug = format!("{:?}", provider);
        assert!(!debug.contains("ghp_supersecret"));
        assert!(debug.contains("github.com"));
    }
}
