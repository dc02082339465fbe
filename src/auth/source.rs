//! auth::source
//!
//! Where a bearer token comes from.
//!
//! A source is written as `env:NAME`, `file:PATH`, or the token itself.
//! When no source is given, `$GITHUB_TOKEN` is used.

use std::fmt;
use std::fs;
use std::path::PathBuf;
use std::str::FromStr;

use super::AuthError;

/// Environment variable read when no token source is given.
pub const DEFAULT_TOKEN_ENV: &str = "GITHUB_TOKEN";

/// A place to read a GitHub token from.
#[derive(Clone, PartialEq, Eq)]
pub enum TokenSource {
    /// Read the named environment variable.
    Env(String),
    /// Read the file at this path; surrounding whitespace is trimmed.
    File(PathBuf),
    /// The token value itself.
    Literal(String),
}

impl TokenSource {
    /// Parse a source specification.
    ///
    /// # Example
    ///
    /// ```
    /// use forgehand::auth::TokenSource;
    ///
    /// let source = TokenSource::parse("env:CI_TOKEN").unwrap();
    /// assert_eq!(source, TokenSource::Env("CI_TOKEN".into()));
    /// assert!(TokenSource::parse("env:").is_err());
    /// ```
    pub fn parse(spec: &str) -> Result<Self, AuthError> {
        if let Some(name) = spec.strip_prefix("env:") {
            if name.is_empty() {
                return Err(AuthError::InvalidSource(
                    "'env:' needs a variable name".into(),
                ));
            }
            return Ok(TokenSource::Env(name.to_string()));
        }
        if let Some(path) = spec.strip_prefix("file:") {
            if path.is_empty() {
                return Err(AuthError::InvalidSource("'file:' needs a path".into()));
            }
            return Ok(TokenSource::File(PathBuf::from(path)));
        }
        if spec.trim().is_empty() {
            return Err(AuthError::InvalidSource("token cannot be empty".into()));
        }
        Ok(TokenSource::Literal(spec.to_string()))
    }

    /// Resolve to a token value.
    ///
    /// # Errors
    ///
    /// - [`AuthError::NotFound`] if the variable is unset or not unicode
    /// - [`AuthError::Read`] if the file cannot be read
    /// - [`AuthError::Empty`] if the value is blank
    pub fn resolve(&self) -> Result<String, AuthError> {
        let raw = match self {
            TokenSource::Env(name) => {
                std::env::var(name).map_err(|_| AuthError::NotFound(self.describe()))?
            }
            TokenSource::File(path) => fs::read_to_string(path).map_err(|e| AuthError::Read {
                path: path.clone(),
                source: e,
            })?,
            TokenSource::Literal(value) => value.clone(),
        };

        let token = raw.trim();
        if token.is_empty() {
            return Err(AuthError::Empty(self.describe()));
        }
        Ok(token.to_string())
    }

    /// Human-readable location, safe to print.
    pub fn describe(&self) -> String {
        match self {
            TokenSource::Env(name) => format!("environment variable {}", name),
            TokenSource::File(path) => format!("file {}", path.display()),
            TokenSource::Literal(_) => "command-line value".to_string(),
        }
    }
}

impl Default for TokenSource {
    fn default() -> Self {
        TokenSource::Env(DEFAULT_TOKEN_ENV.to_string())
    }
}

impl FromStr for TokenSource {
    type Err = AuthError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Debug for TokenSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenSource::Env(name) => f.debug_tuple("Env").field(name).finish(),
            TokenSource::File(path) => f.debug_tuple("File").field(path).finish(),
            TokenSource::Literal(_) => f.debug_tuple("Literal").field(&"[REDACTED]").finish(),
        }
    }
}
