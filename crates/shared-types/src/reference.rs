//! Document locators of the form `scheme://bucket/path`

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ReferenceError {
    #[error("Invalid document reference '{0}': expected scheme://bucket/path")]
    MissingScheme(String),

    #[error("Invalid document reference '{0}': scheme is empty or malformed")]
    InvalidScheme(String),

    #[error("Invalid document reference '{0}': bucket is empty")]
    MissingBucket(String),

    #[error("Invalid document reference '{0}': object path is empty")]
    MissingPath(String),
}

/// Immutable locator for the source document of a run
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DocumentReference {
    raw: String,
    scheme: String,
    bucket: String,
    path: String,
}

impl DocumentReference {
    pub fn parse(input: &str) -> Result<Self, ReferenceError> {
        let raw = input.trim();

        let (scheme, rest) = raw
            .split_once("://")
            .ok_or_else(|| ReferenceError::MissingScheme(raw.to_string()))?;

        let scheme_ok = !scheme.is_empty()
            && scheme
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'));
        if !scheme_ok {
            return Err(ReferenceError::InvalidScheme(raw.to_string()));
        }

        let (bucket, path) = match rest.split_once('/') {
            Some(parts) => parts,
            None if rest.is_empty() => return Err(ReferenceError::MissingBucket(raw.to_string())),
            None => return Err(ReferenceError::MissingPath(raw.to_string())),
        };

        if bucket.is_empty() {
            return Err(ReferenceError::MissingBucket(raw.to_string()));
        }
        if path.is_empty() || path.ends_with('/') {
            return Err(ReferenceError::MissingPath(raw.to_string()));
        }

        Ok(Self {
            raw: raw.to_string(),
            scheme: scheme.to_ascii_lowercase(),
            bucket: bucket.to_string(),
            path: path.to_string(),
        })
    }

    /// Lower-cased scheme, e.g. "gs"
    pub fn scheme(&self) -> &str {
        &self.scheme
    }

    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    /// Object path inside the bucket, without a leading slash
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Last path segment
    pub fn file_name(&self) -> &str {
        self.path.rsplit('/').next().unwrap_or(&self.path)
    }

    /// Lower-cased extension of the file name, if any
    pub fn extension(&self) -> Option<String> {
        let name = self.file_name();
        let (stem, ext) = name.rsplit_once('.')?;
        if stem.is_empty() || ext.is_empty() {
            return None;
        }
        Some(ext.to_ascii_lowercase())
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }
}

impl fmt::Display for DocumentReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

impl FromStr for DocumentReference {
    type Err = ReferenceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for DocumentReference {
    type Error = ReferenceError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<DocumentReference> for String {
    fn from(reference: DocumentReference) -> Self {
        reference.raw
    }
}
