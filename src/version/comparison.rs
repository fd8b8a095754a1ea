//! Version comparison utilities.
//!
//! This module provides helpers over collections of version strings, used when picking a
//! concrete version out of repository metadata, and a separate SemVer 1.x comparator for
//! contexts that declare semantic versioning explicitly.
//!
//! # Examples
//!
//! ```rust,no_run
//! use mvnr_cli::version::comparison::{VersionComparator, compare_semver};
//! use std::cmp::Ordering;
//!
//! let versions = vec!["1.0.0".to_string(), "1.5.0".to_string(), "2.0.0-SNAPSHOT".to_string()];
//! assert_eq!(VersionComparator::get_latest(&versions).as_deref(), Some("2.0.0-SNAPSHOT"));
//! assert_eq!(VersionComparator::get_latest_release(&versions).as_deref(), Some("1.5.0"));
//!
//! assert_eq!(compare_semver("1.0.0-alpha", "1.0.0"), Some(Ordering::Less));
//! ```

use super::{Version, VersionRange};
use regex::Regex;
use std::cmp::Ordering;
use std::sync::LazyLock;

static SEMVER_1X: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(0|[1-9]\d*)\.(0|[1-9]\d*)\.(0|[1-9]\d*)(?:-([0-9A-Za-z-]+))?$")
        .unwrap_or_else(|e| unreachable!("static semver pattern: {e}"))
});

/// Version comparison utilities over Maven-ordered version strings.
///
/// Unparseable entries (empty strings) are skipped rather than reported, since repository
/// metadata routinely contains junk.
pub struct VersionComparator;

impl VersionComparator {
    /// Returns the highest version, snapshots included.
    #[must_use]
    pub fn get_latest(versions: &[String]) -> Option<String> {
        Self::highest(versions.iter(), |_| true)
    }

    /// Returns the highest non-snapshot version.
    #[must_use]
    pub fn get_latest_release(versions: &[String]) -> Option<String> {
        Self::highest(versions.iter(), |v| !v.is_snapshot())
    }

    /// Returns the highest version contained in `range`.
    #[must_use]
    pub fn highest_matching(versions: &[String], range: &VersionRange) -> Option<String> {
        Self::highest(versions.iter(), |v| range.contains(v))
    }

    /// Sorts version strings ascending under Maven ordering; unparseable entries are dropped.
    #[must_use]
    pub fn sorted(versions: &[String]) -> Vec<String> {
        let mut parsed: Vec<Version> =
            versions.iter().filter_map(|v| Version::parse(v).ok()).collect();
        parsed.sort();
        parsed.into_iter().map(|v| v.as_str().to_string()).collect()
    }

    fn highest<'a>(
        versions: impl Iterator<Item = &'a String>,
        accept: impl Fn(&Version) -> bool,
    ) -> Option<String> {
        versions
            .filter_map(|text| Version::parse(text).ok())
            .filter(|v| accept(v))
            .max()
            .map(|v| v.as_str().to_string())
    }
}

/// Whether `text` is a SemVer 1.x version (`MAJOR.MINOR.PATCH[-prerelease]`).
#[must_use]
pub fn is_semver_1x(text: &str) -> bool {
    SEMVER_1X.is_match(text)
}

/// Compares two SemVer 1.x versions.
///
/// Major, minor, and patch compare numerically. A version without a pre-release tag has
/// higher precedence than the same version with one; pre-release tags compare in ASCII
/// order. Returns `None` if either side is not SemVer 1.x.
#[must_use]
pub fn compare_semver(a: &str, b: &str) -> Option<Ordering> {
    let left = SemVer1::parse(a)?;
    let right = SemVer1::parse(b)?;
    Some(left.cmp(&right))
}

#[derive(Debug, PartialEq, Eq)]
struct SemVer1<'a> {
    core: [&'a str; 3],
    pre: Option<&'a str>,
}

impl<'a> SemVer1<'a> {
    fn parse(text: &'a str) -> Option<Self> {
        let caps = SEMVER_1X.captures(text)?;
        let part = |i: usize| caps.get(i).map(|m| &text[m.range()]);
        Some(Self {
            core: [part(1)?, part(2)?, part(3)?],
            pre: part(4),
        })
    }
}

fn compare_numeric(a: &str, b: &str) -> Ordering {
    a.len().cmp(&b.len()).then_with(|| a.cmp(b))
}

impl Ord for SemVer1<'_> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.core
            .iter()
            .zip(other.core.iter())
            .map(|(a, b)| compare_numeric(a, b))
            .find(|o| *o != Ordering::Equal)
            .unwrap_or(Ordering::Equal)
            .then_with(|| match (self.pre, other.pre) {
                (None, None) => Ordering::Equal,
                (None, Some(_)) => Ordering::Greater,
                (Some(_), None) => Ordering::Less,
                (Some(a), Some(b)) => a.cmp(b),
            })
    }
}

impl PartialOrd for SemVer1<'_> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
