//! version
//!
//! Version tracking for a version-config document.
//!
//! A version-config document is a YAML file (usually a Kubernetes
//! ConfigMap) whose `data.version` field records the deployed version of
//! an upstream project. [`compare`] decides whether the latest upstream
//! release is newer than that value.
//!
//! Versions are parsed leniently: a leading `v` is dropped and a missing
//! minor or patch component counts as `0`, so `v1.22` reads as `1.22.0`.
//!
//! # Example
//!
//! ```
//! use forgehand::version::{compare, UpdateDecision};
//!
//! let decision = compare("1.22.1", "1.21.3").unwrap();
//! assert!(decision.needs_update());
//! assert_eq!(decision.pr_message(), "Create PR");
//! ```

mod document;

pub use document::VersionDocument;

use std::path::PathBuf;

use semver::Version;
use thiserror::Error;

/// Errors from version tracking.
#[derive(Debug, Error)]
pub enum VersionError {
    /// A version string or document could not be parsed.
    #[error("{0}")]
    Parse(String),

    #[error("failed to read '{path}': {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write '{path}': {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Parse a version string, accepting `v` prefixes and short forms.
///
/// # Example
///
/// ```
/// use forgehand::version::parse_version;
///
/// assert_eq!(parse_version("v1.22").unwrap().to_string(), "1.22.0");
/// assert_eq!(parse_version("1.22.0-beta.1").unwrap().to_string(), "1.22.0-beta.1");
/// assert!(parse_version("latest").is_err());
/// ```
pub fn parse_version(input: &str) -> Result<Version, VersionError> {
    let trimmed = input.trim();
    let bare = trimmed
        .strip_prefix('v')
        .or_else(|| trimmed.strip_prefix('V'))
        .unwrap_or(trimmed);

    // Split off pre-release / build metadata before padding the core.
    let split = bare.find(['-', '+']).unwrap_or(bare.len());
    let (core, suffix) = bare.split_at(split);

    let padded = match core.matches('.').count() {
        0 => format!("{}.0.0{}", core, suffix),
        1 => format!("{}.0{}", core, suffix),
        _ => bare.to_string(),
    };

    Version::parse(&padded)
        .map_err(|e| VersionError::Parse(format!("invalid version '{}': {}", input, e)))
}

/// Outcome of comparing the latest release with the recorded version.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdateDecision {
    /// The latest release is strictly newer.
    NewerAvailable { latest: Version, local: Version },
    /// The recorded version is the latest release or newer.
    UpToDate { latest: Version, local: Version },
}

impl UpdateDecision {
    pub fn needs_update(&self) -> bool {
        matches!(self, UpdateDecision::NewerAvailable { .. })
    }

    pub fn latest(&self) -> &Version {
        match self {
            UpdateDecision::NewerAvailable { latest, .. } | UpdateDecision::UpToDate { latest, .. } => {
                latest
            }
        }
    }

    pub fn local(&self) -> &Version {
        match self {
            UpdateDecision::NewerAvailable { local, .. } | UpdateDecision::UpToDate { local, .. } => {
                local
            }
        }
    }

    /// One-line verdict for CI logs.
    pub fn pr_message(&self) -> &'static str {
        if self.needs_update() {
            "Create PR"
        } else {
            "No PR needed"
        }
    }
}

/// Compare the latest release tag with the locally recorded version.
///
/// # Errors
///
/// [`VersionError::Parse`] naming which side failed to parse.
pub fn compare(latest: &str, local: &str) -> Result<UpdateDecision, VersionError> {
    let latest = parse_version(latest)
        .map_err(|e| VersionError::Parse(format!("failed to parse latest version: {}", e)))?;
    let local = parse_version(local)
        .map_err(|e| VersionError::Parse(format!("failed to parse local version: {}", e)))?;

    Ok(if latest > local {
        UpdateDecision::NewerAvailable { latest, local }
    } else {
        UpdateDecision::UpToDate { latest, local }
    })
}
