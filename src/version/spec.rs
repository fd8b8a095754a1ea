//! The version slot of a coordinate.
//!
//! A dependency does not always name a concrete version. [`VersionSpec`] captures the
//! forms Maven allows: a literal, the symbolic `RELEASE`/`LATEST` tokens, a range, and
//! `MANAGED` (take whatever the active dependency management says).

use super::{VersionRange, parse_version_range};
use crate::core::MvnrError;
use std::fmt;

/// A requested version, before resolution against repository metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VersionSpec {
    /// A concrete version string, kept verbatim.
    Literal(String),
    /// Highest released (non-snapshot) version.
    Release,
    /// Highest version, snapshots included.
    Latest,
    /// Version supplied by dependency management.
    Managed,
    /// Highest available version inside the range.
    Range(VersionRange),
}

impl VersionSpec {
    /// Classify version text.
    ///
    /// The symbolic tokens are case-insensitive. Text starting with `[` or `(` must be a
    /// valid range.
    ///
    /// # Errors
    ///
    /// Fails on empty text or an invalid range.
    pub fn parse(text: &str) -> Result<Self, MvnrError> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Err(MvnrError::MalformedVersion {
                version: text.to_string(),
            });
        }
        if trimmed.eq_ignore_ascii_case("RELEASE") {
            return Ok(Self::Release);
        }
        if trimmed.eq_ignore_ascii_case("LATEST") {
            return Ok(Self::Latest);
        }
        if trimmed.eq_ignore_ascii_case("MANAGED") {
            return Ok(Self::Managed);
        }
        if trimmed.starts_with('[') || trimmed.starts_with('(') {
            let range = parse_version_range(trimmed)?;
            // "[1.2]" pins a single version, no metadata lookup needed
            if let Some(exact) = range.exact_version() {
                return Ok(Self::Literal(exact.as_str().to_string()));
            }
            return Ok(Self::Range(range));
        }
        Ok(Self::Literal(trimmed.to_string()))
    }

    /// Whether selecting a version needs the artifact's published version list.
    #[must_use]
    pub const fn needs_metadata(&self) -> bool {
        matches!(self, Self::Release | Self::Latest | Self::Range(_))
    }

    /// The literal version text, if this spec is already concrete.
    #[must_use]
    pub fn literal(&self) -> Option<&str> {
        match self {
            Self::Literal(text) => Some(text),
            _ => None,
        }
    }
}

impl fmt::Display for VersionSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Literal(text) => f.write_str(text),
            Self::Release => f.write_str("RELEASE"),
            Self::Latest => f.write_str("LATEST"),
            Self::Managed => f.write_str("MANAGED"),
            Self::Range(range) => write!(f, "{range}"),
        }
    }
}
