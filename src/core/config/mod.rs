//! core::config
//!
//! Configuration schema and loading.
//!
//! # Precedence
//!
//! Values are resolved in this order (later overrides earlier):
//! 1. Built-in defaults
//! 2. Global config file
//! 3. Repository config file
//! 4. CLI flags (applied by the command handlers, not here)
//!
//! # Global Config Locations
//!
//! Searched in order:
//! 1. `$FORGEHAND_CONFIG` if set
//! 2. `$XDG_CONFIG_HOME/forgehand/config.toml`
//! 3. `~/.forgehand/config.toml`
//!
//! # Repo Config Location
//!
//! `.git/forgehand/config.toml` inside the working repository.
//!
//! # Example
//!
//! ```no_run
//! use forgehand::core::config::Config;
//! use std::path::Path;
//!
//! let config = Config::load(Some(Path::new("/path/to/repo"))).unwrap();
//! println!("base branch: {}", config.base_branch());
//! ```

pub mod schema;

pub use schema::{
    AuthorSection, ConfigFile, GitHubSection, NetworkSection, ReleaseSection, VersionSection,
};

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use thiserror::Error;

use crate::core::types::{BranchName, Identity};
use crate::forge::RetryPolicy;

/// Base branch used when neither config nor flags name one.
pub const DEFAULT_BASE_BRANCH: &str = "master";

/// Release feed tracked when none is configured.
pub const DEFAULT_RELEASE_OWNER: &str = "istio";
pub const DEFAULT_RELEASE_REPO: &str = "istio";

/// Version-config document read when none is configured.
pub const DEFAULT_VERSION_CONFIG: &str = "./test-data/istio-version.yaml";

/// Errors from configuration operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file '{path}': {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config file '{path}': {message}")]
    ParseError { path: PathBuf, message: String },

    #[error("invalid config value: {0}")]
    InvalidValue(String),
}

/// Merged configuration from all sources.
///
/// Accessors apply the built-in defaults, so callers never see an unset
/// value for keys that have one.
#[derive(Debug, Clone, Default)]
pub struct Config {
    file: ConfigFile,
    global_path: Option<PathBuf>,
    repo_path: Option<PathBuf>,
}

impl Config {
    /// Load configuration from the default locations.
    ///
    /// If `repo_path` is provided, the repository file is layered on top of
    /// the global one. Missing files are not an error.
    pub fn load(repo_path: Option<&Path>) -> Result<Self, ConfigError> {
        let global = Self::find_global();
        let repo = repo_path
            .map(Self::repo_config_path)
            .filter(|p| p.exists());
        Self::load_from(global.as_deref(), repo.as_deref())
    }

    /// Load configuration from explicit file paths.
    ///
    /// Unlike [`Config::load`], a path that is given but does not exist is
    /// a read error.
    pub fn load_from(global: Option<&Path>, repo: Option<&Path>) -> Result<Self, ConfigError> {
        let global_file = global.map(Self::read_file).transpose()?.unwrap_or_default();
        let repo_file = repo.map(Self::read_file).transpose()?.unwrap_or_default();

        global_file.validate()?;
        repo_file.validate()?;

        let file = global_file.merged_with(repo_file);
        file.validate()?;

        Ok(Config {
            file,
            global_path: global.map(Path::to_path_buf),
            repo_path: repo.map(Path::to_path_buf),
        })
    }

    /// Build a config directly from a parsed file (tests and embedding).
    pub fn from_file(file: ConfigFile) -> Result<Self, ConfigError> {
        file.validate()?;
        Ok(Config {
            file,
            ..Default::default()
        })
    }

    /// Locate the global config file, if any exists.
    fn find_global() -> Option<PathBuf> {
        let mut candidates = Vec::new();
        if let Ok(path) = std::env::var("FORGEHAND_CONFIG") {
            candidates.push(PathBuf::from(path));
        }
        if let Ok(xdg_home) = std::env::var("XDG_CONFIG_HOME") {
            candidates.push(PathBuf::from(xdg_home).join("forgehand/config.toml"));
        }
        if let Some(home) = dirs::home_dir() {
            candidates.push(home.join(".forgehand/config.toml"));
        }
        candidates.into_iter().find(|p| p.exists())
    }

    fn read_file(path: &Path) -> Result<ConfigFile, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            source: e,
        })?;

        toml::from_str(&contents).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    /// Canonical repo config path: `.git/forgehand/config.toml`.
    pub fn repo_config_path(repo_path: &Path) -> PathBuf {
        repo_path.join(".git/forgehand/config.toml")
    }

    // =========================================================================
    // Accessors with defaults
    // =========================================================================

    fn github(&self) -> Option<&GitHubSection> {
        self.file.github.as_ref()
    }

    /// Repository owner on GitHub.
    pub fn owner(&self) -> Option<&str> {
        self.github().and_then(|g| g.owner.as_deref())
    }

    /// Repository name on GitHub.
    pub fn repo(&self) -> Option<&str> {
        self.github().and_then(|g| g.repo.as_deref())
    }

    /// Base branch; defaults to `master`.
    pub fn base_branch(&self) -> BranchName {
        self.github()
            .and_then(|g| g.base_branch.as_deref())
            .and_then(|b| BranchName::new(b).ok())
            .unwrap_or_else(|| {
                BranchName::new(DEFAULT_BASE_BRANCH).expect("default base branch is valid")
            })
    }

    /// GitHub API base URL, if overridden.
    pub fn api_base(&self) -> Option<&str> {
        self.github().and_then(|g| g.api_base.as_deref())
    }

    /// Configured commit identity.
    ///
    /// `None` when either half is missing; the caller must then get both
    /// from flags.
    pub fn identity(&self) -> Option<Identity> {
        let author = self.file.author.as_ref()?;
        match (&author.name, &author.email) {
            (Some(name), Some(email)) => Identity::new(name.as_str(), email.as_str()).ok(),
            _ => None,
        }
    }

    /// Partially configured identity fields, for merging with flags.
    pub fn author_fields(&self) -> (Option<&str>, Option<&str>) {
        match &self.file.author {
            Some(a) => (a.name.as_deref(), a.email.as_deref()),
            None => (None, None),
        }
    }

    /// Network retry and timeout policy.
    pub fn retry_policy(&self) -> RetryPolicy {
        let defaults = RetryPolicy::default();
        let Some(network) = &self.file.network else {
            return defaults;
        };
        RetryPolicy {
            max_attempts: network.max_attempts.unwrap_or(defaults.max_attempts),
            initial_backoff: network
                .backoff_ms
                .map(Duration::from_millis)
                .unwrap_or(defaults.initial_backoff),
            request_timeout: network
                .timeout_secs
                .map(Duration::from_secs)
                .unwrap_or(defaults.request_timeout),
        }
    }

    /// Upstream release feed `(owner, repo)`; defaults to `istio/istio`.
    pub fn release_source(&self) -> (&str, &str) {
        let release = self.file.release.as_ref();
        (
            release
                .and_then(|r| r.owner.as_deref())
                .unwrap_or(DEFAULT_RELEASE_OWNER),
            release
                .and_then(|r| r.repo.as_deref())
                .unwrap_or(DEFAULT_RELEASE_REPO),
        )
    }

    /// Version-config document path.
    pub fn version_config_path(&self) -> &str {
        self.file
            .version
            .as_ref()
            .and_then(|v| v.config_path.as_deref())
            .unwrap_or(DEFAULT_VERSION_CONFIG)
    }

    /// Path the global config was loaded from.
    pub fn global_config_loaded_from(&self) -> Option<&Path> {
        self.global_path.as_deref()
    }

    /// Path the repository config was loaded from.
    pub fn repo_config_loaded_from(&self) -> Option<&Path> {
        self.repo_path.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn empty_config_uses_defaults() {
        let config = Config::default();

        assert_eq!(config.base_branch().as_str(), "master");
        assert!(config.owner().is_none());
        assert!(config.identity().is_none());
        assert_eq!(config.release_source(), ("istio", "istio"));
        assert_eq!(config.version_config_path(), DEFAULT_VERSION_CONFIG);
        assert_eq!(config.retry_policy(), RetryPolicy::default());
    }

    #[test]
    fn load_from_explicit_files_applies_precedence() {
        let temp = TempDir::new().unwrap();
        let global = temp.path().join("global.toml");
        let repo = temp.path().join("repo.toml");

        fs::write(
            &global,
            r#"
            [github]
            owner = "adore-me"
            base_branch = "master"

            [author]
            name = "Release Bot"
            email = "bot@example.com"
            "#,
        )
        .unwrap();
        fs::write(
            &repo,
            r#"
            [github]
            repo = "daggerverse"
            base_branch = "main"
            "#,
        )
        .unwrap();

        let config = Config::load_from(Some(&global), Some(&repo)).unwrap();

        assert_eq!(config.owner(), Some("adore-me"));
        assert_eq!(config.repo(), Some("daggerverse"));
        assert_eq!(config.base_branch().as_str(), "main");
        assert_eq!(
            config.identity().unwrap().to_string(),
            "Release Bot <bot@example.com>"
        );
        assert_eq!(config.global_config_loaded_from(), Some(global.as_path()));
        assert_eq!(config.repo_config_loaded_from(), Some(repo.as_path()));
    }

    #[test]
    fn load_picks_up_repo_file() {
        let temp = TempDir::new().unwrap();
        let dir = temp.path().join(".git/forgehand");
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("config.toml"), "[release]\nowner = \"envoyproxy\"\n").unwrap();

        let config = Config::load(Some(temp.path())).unwrap();

        assert_eq!(config.release_source(), ("envoyproxy", "istio"));
        assert!(config.repo_config_loaded_from().is_some());
    }

    #[test]
    fn missing_explicit_file_is_read_error() {
        let temp = TempDir::new().unwrap();
        let result = Config::load_from(Some(&temp.path().join("nope.toml")), None);
        assert!(matches!(result, Err(ConfigError::ReadError { .. })));
    }

    #[test]
    fn malformed_file_is_parse_error() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("bad.toml");
        fs::write(&path, "[github\nowner = ").unwrap();

        let result = Config::load_from(Some(&path), None);
        assert!(matches!(result, Err(ConfigError::ParseError { .. })));
    }

    #[test]
    fn network_section_builds_retry_policy() {
        let config = Config::from_file(ConfigFile {
            network: Some(NetworkSection {
                timeout_secs: Some(5),
                max_attempts: Some(1),
                backoff_ms: None,
            }),
            ..Default::default()
        })
        .unwrap();

        let policy = config.retry_policy();
        assert_eq!(policy.max_attempts, 1);
        assert_eq!(policy.request_timeout, Duration::from_secs(5));
        assert_eq!(
            policy.initial_backoff,
            RetryPolicy::default().initial_backoff
        );
    }

    #[test]
    fn half_configured_author_is_not_an_identity() {
        let config = Config::from_file(ConfigFile {
            author: Some(AuthorSection {
                name: Some("Bot".into()),
                email: None,
            }),
            ..Default::default()
        })
        .unwrap();

        assert!(config.identity().is_none());
        assert_eq!(config.author_fields(), (Some("Bot"), None));
    }
}
