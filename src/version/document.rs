//! version::document
//!
//! The YAML document that records the deployed version.
//!
//! Only `data.version` is read or written. The value is taken as written,
//! so an unquoted `1.20` stays `1.20` rather than becoming the float `1.2`.
//!
//! When `data` is a block mapping, a rewrite replaces just the text of the
//! `version` scalar (keeping its quote style) and leaves comments and the
//! rest of the file byte for byte. Flow-style documents such as
//! `data: {version: 1.0.0}` are re-serialized instead, which drops comments.

use std::fs;
use std::ops::Range;
use std::path::Path;

use semver::Version;
use serde_yaml::{Mapping, Value};

use super::{parse_version, VersionError};

const DATA_KEY: &str = "data";
const VERSION_KEY: &str = "version";

/// A parsed version-config document.
#[derive(Debug, Clone, PartialEq)]
pub struct VersionDocument {
    source: String,
    version: String,
}

impl VersionDocument {
    /// Parse a document from YAML text.
    ///
    /// # Errors
    ///
    /// [`VersionError::Parse`] if the YAML is malformed or `data.version`
    /// is missing, empty, or not a scalar.
    pub fn parse(contents: &str) -> Result<Self, VersionError> {
        let root: Value = serde_yaml::from_str(contents)
            .map_err(|e| VersionError::Parse(format!("failed to parse YAML: {}", e)))?;

        let raw = root
            .get(DATA_KEY)
            .and_then(|data| data.get(VERSION_KEY))
            .ok_or_else(|| VersionError::Parse("document has no data.version field".into()))?;

        let version = match raw {
            Value::String(s) => s.clone(),
            Value::Number(n) => locate_version(contents)
                .map(|span| contents[span].to_string())
                .unwrap_or_else(|| n.to_string()),
            _ => {
                return Err(VersionError::Parse(
                    "data.version must be a string".into(),
                ))
            }
        };
        if version.trim().is_empty() {
            return Err(VersionError::Parse("data.version is empty".into()));
        }

        Ok(Self {
            source: contents.to_string(),
            version,
        })
    }

    /// Read and parse the document at `path`.
    pub fn load(path: &Path) -> Result<Self, VersionError> {
        let contents = fs::read_to_string(path).map_err(|e| VersionError::Read {
            path: path.to_path_buf(),
            source: e,
        })?;
        Self::parse(&contents)
    }

    /// The recorded version, as written.
    pub fn version(&self) -> &str {
        &self.version
    }

    /// The recorded version, parsed.
    pub fn parsed_version(&self) -> Result<Version, VersionError> {
        parse_version(&self.version)
    }

    /// Replace `data.version`.
    pub fn set_version(&mut self, version: &str) -> Result<(), VersionError> {
        match locate_version(&self.source) {
            Some(span) => {
                let scalar = render_scalar(&self.source[span.clone()], version);
                self.source.replace_range(span, &scalar);
            }
            None => self.source = reserialize_with(&self.source, version)?,
        }
        self.version = version.to_string();
        Ok(())
    }

    /// The document as YAML text.
    pub fn to_yaml(&self) -> Result<String, VersionError> {
        Ok(self.source.clone())
    }

    /// Write the document to `path`.
    pub fn save(&self, path: &Path) -> Result<(), VersionError> {
        fs::write(path, &self.source).map_err(|e| VersionError::Write {
            path: path.to_path_buf(),
            source: e,
        })
    }
}

/// Byte range of the `data.version` scalar when `data` is a top-level
/// block mapping and the value sits on the key's line.
fn locate_version(source: &str) -> Option<Range<usize>> {
    let mut offset = 0;
    let mut in_data = false;
    let mut child_indent = None;

    for line in source.split_inclusive('\n') {
        let start = offset;
        offset += line.len();

        let content = line.trim_end_matches(['\n', '\r']);
        let trimmed = content.trim_start();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        let indent = content.len() - trimmed.len();

        if indent == 0 {
            in_data = trimmed
                .strip_prefix("data:")
                .map(|rest| {
                    let rest = rest.trim();
                    rest.is_empty() || rest.starts_with('#')
                })
                .unwrap_or(false);
            child_indent = None;
            continue;
        }
        if !in_data || *child_indent.get_or_insert(indent) != indent {
            continue;
        }

        let Some(rest) = trimmed.strip_prefix("version:") else {
            continue;
        };
        if !rest.is_empty() && !rest.starts_with([' ', '\t']) {
            continue;
        }
        let value = rest.trim_start();
        let value_start = start + content.len() - value.len();
        return scalar_len(value).map(|len| value_start..value_start + len);
    }
    None
}

/// Length of a single-line scalar at the start of `value`.
///
/// `None` for block scalars, anchors, tags, flow collections and quoted
/// strings that continue on the next line.
fn scalar_len(value: &str) -> Option<usize> {
    let bytes = value.as_bytes();
    match bytes.first()? {
        b'#' | b'|' | b'>' | b'&' | b'*' | b'!' | b'{' | b'[' => None,
        b'"' => {
            let mut i = 1;
            while i < bytes.len() {
                match bytes[i] {
                    b'\\' => i += 2,
                    b'"' => return Some(i + 1),
                    _ => i += 1,
                }
            }
            None
        }
        b'\'' => {
            let mut i = 1;
            while i < bytes.len() {
                if bytes[i] == b'\'' {
                    if bytes.get(i + 1) == Some(&b'\'') {
                        i += 2;
                        continue;
                    }
                    return Some(i + 1);
                }
                i += 1;
            }
            None
        }
        _ => {
            let end = [" #", "\t#"]
                .iter()
                .filter_map(|marker| value.find(marker))
                .min()
                .unwrap_or(value.len());
            Some(value[..end].trim_end().len())
        }
    }
}

/// `version` written in the quote style of `existing`.
fn render_scalar(existing: &str, version: &str) -> String {
    let double = || format!("\"{}\"", version.replace('\\', "\\\\").replace('"', "\\\""));
    match existing.as_bytes().first() {
        Some(b'"') => double(),
        Some(b'\'') => format!("'{}'", version.replace('\'', "''")),
        _ if is_plain_version(version) => version.to_string(),
        _ => double(),
    }
}

/// Text that reads back as the same string when left unquoted.
fn is_plain_version(version: &str) -> bool {
    version.starts_with(|c: char| c.is_ascii_digit() || c == 'v')
        && version
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '+' | '_'))
}

/// Full re-serialization with `data.version` set, for layouts the line
/// scan cannot edit in place.
fn reserialize_with(source: &str, version: &str) -> Result<String, VersionError> {
    let mut root: Value = serde_yaml::from_str(source)
        .map_err(|e| VersionError::Parse(format!("failed to parse YAML: {}", e)))?;
    let root_map = root
        .as_mapping_mut()
        .ok_or_else(|| VersionError::Parse("document root is not a mapping".into()))?;

    let data = root_map
        .entry(Value::String(DATA_KEY.into()))
        .or_insert_with(|| Value::Mapping(Mapping::new()))
        .as_mapping_mut()
        .ok_or_else(|| VersionError::Parse("data is not a mapping".into()))?;

    data.insert(
        Value::String(VERSION_KEY.into()),
        Value::String(version.to_string()),
    );
    serde_yaml::to_string(&root)
        .map_err(|e| VersionError::Parse(format!("failed to serialize YAML: {}", e)))
}
