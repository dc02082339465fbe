//! core::config::schema
//!
//! Configuration file schema.
//!
//! The global file and the repository file share one schema; every field is
//! optional so that a repository file only needs to carry its overrides.
//!
//! # Example
//!
//! ```toml
//! [github]
//! owner = "adore-me"
//! repo = "daggerverse"
//! base_branch = "main"
//!
//! [author]
//! name = "Release Bot"
//! email = "release-bot@example.com"
//!
//! [network]
//! timeout_secs = 30
//! max_attempts = 3
//! backoff_ms = 500
//!
//! [release]
//! owner = "istio"
//! repo = "istio"
//!
//! [version]
//! config_path = "clusters/dev/istio-version.yaml"
//! ```

use serde::{Deserialize, Serialize};

use super::ConfigError;
use crate::core::types::{BranchName, Identity};

/// One configuration file (global or repository scope).
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct ConfigFile {
    /// Target repository on GitHub
    pub github: Option<GitHubSection>,

    /// Identity stamped on orchestrated commits
    pub author: Option<AuthorSection>,

    /// Timeout and retry policy for network calls
    pub network: Option<NetworkSection>,

    /// Upstream release feed to track
    pub release: Option<ReleaseSection>,

    /// Version-config document location
    pub version: Option<VersionSection>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct GitHubSection {
    pub owner: Option<String>,
    pub repo: Option<String>,
    pub base_branch: Option<String>,
    /// API base URL, for GitHub Enterprise (`https://github.example.com/api/v3`)
    pub api_base: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct AuthorSection {
    pub name: Option<String>,
    pub email: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct NetworkSection {
    pub timeout_secs: Option<u64>,
    pub max_attempts: Option<u32>,
    pub backoff_ms: Option<u64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct ReleaseSection {
    pub owner: Option<String>,
    pub repo: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct VersionSection {
    pub config_path: Option<String>,
}

/// Take `over` when set, otherwise keep `base`.
fn pick<T>(base: Option<T>, over: Option<T>) -> Option<T> {
    over.or(base)
}

/// Merge two optional sections field by field.
fn merge_section<T, F>(base: Option<T>, over: Option<T>, merge: F) -> Option<T>
where
    F: FnOnce(T, T) -> T,
{
    match (base, over) {
        (Some(b), Some(o)) => Some(merge(b, o)),
        (b, o) => o.or(b),
    }
}

impl ConfigFile {
    /// Layer `over` on top of `self`; set fields in `over` win.
    pub fn merged_with(self, over: ConfigFile) -> ConfigFile {
        ConfigFile {
            github: merge_section(self.github, over.github, |b, o| GitHubSection {
                owner: pick(b.owner, o.owner),
                repo: pick(b.repo, o.repo),
                base_branch: pick(b.base_branch, o.base_branch),
                api_base: pick(b.api_base, o.api_base),
            }),
            author: merge_section(self.author, over.author, |b, o| AuthorSection {
                name: pick(b.name, o.name),
                email: pick(b.email, o.email),
            }),
            network: merge_section(self.network, over.network, |b, o| NetworkSection {
                timeout_secs: pick(b.timeout_secs, o.timeout_secs),
                max_attempts: pick(b.max_attempts, o.max_attempts),
                backoff_ms: pick(b.backoff_ms, o.backoff_ms),
            }),
            release: merge_section(self.release, over.release, |b, o| ReleaseSection {
                owner: pick(b.owner, o.owner),
                repo: pick(b.repo, o.repo),
            }),
            version: merge_section(self.version, over.version, |b, o| VersionSection {
                config_path: pick(b.config_path, o.config_path),
            }),
        }
    }

    /// Validate the configuration values.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` naming the first bad key.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(github) = &self.github {
            if let Some(base) = &github.base_branch {
                BranchName::new(base.as_str()).map_err(|e| {
                    ConfigError::InvalidValue(format!("github.base_branch: {}", e))
                })?;
            }
            if let Some(api_base) = &github.api_base {
                if !api_base.starts_with("http://") && !api_base.starts_with("https://") {
                    return Err(ConfigError::InvalidValue(format!(
                        "github.api_base must be an http(s) URL, got '{}'",
                        api_base
                    )));
                }
            }
            for (key, value) in [("owner", &github.owner), ("repo", &github.repo)] {
                if let Some(v) = value {
                    if v.is_empty() || v.contains('/') {
                        return Err(ConfigError::InvalidValue(format!(
                            "github.{} must be a single path segment, got '{}'",
                            key, v
                        )));
                    }
                }
            }
        }

        if let Some(AuthorSection {
            name: Some(name),
            email: Some(email),
        }) = &self.author
        {
            Identity::new(name.as_str(), email.as_str())
                .map_err(|e| ConfigError::InvalidValue(format!("author: {}", e)))?;
        }

        if let Some(network) = &self.network {
            if network.max_attempts == Some(0) {
                return Err(ConfigError::InvalidValue(
                    "network.max_attempts must be at least 1".into(),
                ));
            }
            if network.timeout_secs == Some(0) {
                return Err(ConfigError::InvalidValue(
                    "network.timeout_secs must be at least 1".into(),
                ));
            }
        }

        Ok(())
    }
}
