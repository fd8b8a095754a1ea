//! Maven version range syntax and membership.
//!
//! A range is a union of intervals, each written in bracket notation:
//!
//! | Syntax | Meaning |
//! |---|---|
//! | `[1.0,2.0]` | `1.0 <= v <= 2.0` |
//! | `[1.0,2.0)` | `1.0 <= v < 2.0` |
//! | `(,1.5]` | `v <= 1.5` |
//! | `[1.5,)` | `v >= 1.5` |
//! | `[1.2]` | exactly `1.2` |
//! | `(,1.0],[1.2,)` | `v <= 1.0` or `v >= 1.2` |
//!
//! A bare version such as `1.2` is a *recommended* version: it does not restrict
//! anything, but it is what mediation uses when nothing else decides.
//!
//! Profile activation uses a slightly different grammar, see [`parse_jdk_activation_range`].
//!
//! # Examples
//!
//! ```rust,no_run
//! use mvnr_cli::version::range::version_in_range;
//!
//! # fn example() -> Result<(), mvnr_cli::core::MvnrError> {
//! assert!(version_in_range("9", "[1.8,11]")?);
//! assert!(!version_in_range("11", "(1.8,11)")?);
//! assert!(version_in_range("17", "[11,)")?);
//! # Ok(())
//! # }
//! ```

use super::Version;
use crate::core::MvnrError;
use std::fmt;

/// One interval of a [`VersionRange`]. A missing bound is unbounded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Restriction {
    pub lower: Option<Version>,
    pub lower_inclusive: bool,
    pub upper: Option<Version>,
    pub upper_inclusive: bool,
}

impl Restriction {
    /// The unbounded restriction `(,)`.
    #[must_use]
    pub const fn everything() -> Self {
        Self {
            lower: None,
            lower_inclusive: false,
            upper: None,
            upper_inclusive: false,
        }
    }

    #[must_use]
    pub fn contains(&self, version: &Version) -> bool {
        if let Some(lower) = &self.lower {
            match lower.cmp(version) {
                std::cmp::Ordering::Greater => return false,
                std::cmp::Ordering::Equal if !self.lower_inclusive => return false,
                _ => {}
            }
        }
        if let Some(upper) = &self.upper {
            match upper.cmp(version) {
                std::cmp::Ordering::Less => return false,
                std::cmp::Ordering::Equal if !self.upper_inclusive => return false,
                _ => {}
            }
        }
        true
    }

    fn is_exact(&self) -> bool {
        self.lower_inclusive
            && self.upper_inclusive
            && self.lower.is_some()
            && self.lower == self.upper
    }
}

impl fmt::Display for Restriction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_exact() {
            if let Some(lower) = &self.lower {
                return write!(f, "[{lower}]");
            }
        }
        f.write_str(if self.lower_inclusive { "[" } else { "(" })?;
        if let Some(lower) = &self.lower {
            write!(f, "{lower}")?;
        }
        f.write_str(",")?;
        if let Some(upper) = &self.upper {
            write!(f, "{upper}")?;
        }
        f.write_str(if self.upper_inclusive { "]" } else { ")" })
    }
}

/// A parsed version range: either a recommended version or a union of restrictions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionRange {
    /// Set for the bare-version form; the restrictions are then `(,)`.
    pub recommended: Option<Version>,
    pub restrictions: Vec<Restriction>,
}

impl VersionRange {
    /// Parse range text, see [`parse_version_range`].
    pub fn parse(text: &str) -> Result<Self, MvnrError> {
        parse_version_range(text)
    }

    /// Whether any restriction contains `version`.
    #[must_use]
    pub fn contains(&self, version: &Version) -> bool {
        self.restrictions.iter().any(|r| r.contains(version))
    }

    /// True for bracketed ranges, false for a bare recommended version.
    #[must_use]
    pub fn has_restrictions(&self) -> bool {
        self.recommended.is_none()
    }

    /// The single pinned version of a `[1.2]` range.
    #[must_use]
    pub fn exact_version(&self) -> Option<&Version> {
        match self.restrictions.as_slice() {
            [only] if only.is_exact() => only.lower.as_ref(),
            _ => None,
        }
    }
}

impl fmt::Display for VersionRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(recommended) = &self.recommended {
            return write!(f, "{recommended}");
        }
        for (index, restriction) in self.restrictions.iter().enumerate() {
            if index > 0 {
                f.write_str(",")?;
            }
            write!(f, "{restriction}")?;
        }
        Ok(())
    }
}

fn invalid(range: &str, reason: impl Into<String>) -> MvnrError {
    MvnrError::InvalidVersionRange {
        range: range.to_string(),
        reason: reason.into(),
    }
}

fn parse_bound(range: &str, text: &str) -> Result<Option<Version>, MvnrError> {
    if text.is_empty() {
        return Ok(None);
    }
    if text.contains(['[', ']', '(', ')', ',']) {
        return Err(invalid(range, format!("unexpected character in bound '{text}'")));
    }
    Version::parse(text).map(Some)
}

/// Parse one bracketed interval, brackets included.
fn parse_restriction(range: &str, spec: &str) -> Result<Restriction, MvnrError> {
    let lower_inclusive = spec.starts_with('[');
    let upper_inclusive = spec.ends_with(']');
    let inner = spec[1..spec.len() - 1].trim();

    match inner.split_once(',') {
        None => {
            if !lower_inclusive || !upper_inclusive {
                return Err(invalid(range, "a single version must be surrounded by []"));
            }
            let version = parse_bound(range, inner)?
                .ok_or_else(|| invalid(range, "empty brackets"))?;
            Ok(Restriction {
                lower: Some(version.clone()),
                lower_inclusive: true,
                upper: Some(version),
                upper_inclusive: true,
            })
        }
        Some((lower_text, upper_text)) => {
            let lower = parse_bound(range, lower_text.trim())?;
            let upper = parse_bound(range, upper_text.trim())?;
            if let (Some(lower), Some(upper)) = (&lower, &upper) {
                if upper < lower {
                    return Err(invalid(range, "range defies version ordering"));
                }
            }
            Ok(Restriction {
                lower,
                lower_inclusive,
                upper,
                upper_inclusive,
            })
        }
    }
}

/// Parse Maven range syntax into a [`VersionRange`].
///
/// # Errors
///
/// Returns [`MvnrError::InvalidVersionRange`] for unbalanced brackets, a lower bound above
/// its upper bound, overlapping intervals, a single version in exclusive brackets, or
/// text trailing a bracketed interval. An empty string is a [`MvnrError::MalformedVersion`].
pub fn parse_version_range(text: &str) -> Result<VersionRange, MvnrError> {
    let range = text.trim();
    let mut process = range;
    let mut restrictions: Vec<Restriction> = Vec::new();
    let mut previous_upper: Option<Version> = None;

    while process.starts_with('[') || process.starts_with('(') {
        let close = process
            .find([')', ']'])
            .ok_or_else(|| invalid(range, "unbounded range, missing ']' or ')'"))?;
        let restriction = parse_restriction(range, &process[..=close])?;

        if !restrictions.is_empty() {
            // Intervals must be listed in order and must not overlap
            match (&previous_upper, &restriction.lower) {
                (Some(upper), Some(lower)) if lower >= upper => {}
                _ => return Err(invalid(range, "ranges overlap")),
            }
        }
        previous_upper = restriction.upper.clone();
        restrictions.push(restriction);

        process = process[close + 1..].trim_start();
        if let Some(rest) = process.strip_prefix(',') {
            process = rest.trim_start();
        }
    }

    if process.is_empty() {
        if restrictions.is_empty() {
            return Err(MvnrError::MalformedVersion {
                version: text.to_string(),
            });
        }
        return Ok(VersionRange {
            recommended: None,
            restrictions,
        });
    }

    if !restrictions.is_empty() {
        return Err(invalid(range, "only fully-qualified sets are allowed after an interval"));
    }
    let recommended = parse_bound(range, process)?
        .ok_or_else(|| invalid(range, "empty version"))?;
    Ok(VersionRange {
        recommended: Some(recommended),
        restrictions: vec![Restriction::everything()],
    })
}

/// Test whether `version` lies in `range`, both given as text.
///
/// # Errors
///
/// Fails if either side does not parse.
pub fn version_in_range(version: &str, range: &str) -> Result<bool, MvnrError> {
    let version = Version::parse(version)?;
    Ok(parse_version_range(range)?.contains(&version))
}

/// A JDK predicate from a profile's `<activation><jdk>` element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JdkActivation {
    negated: bool,
    matcher: JdkMatcher,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum JdkMatcher {
    Exact(Version),
    Range(VersionRange),
}

impl JdkActivation {
    /// Evaluate against the JDK version of the environment.
    #[must_use]
    pub fn matches(&self, jdk: &Version) -> bool {
        let hit = match &self.matcher {
            JdkMatcher::Exact(expected) => expected == jdk,
            JdkMatcher::Range(range) => range.contains(jdk),
        };
        hit != self.negated
    }

    #[must_use]
    pub const fn is_negated(&self) -> bool {
        self.negated
    }
}

/// Parse a JDK activation expression.
///
/// Accepts a bare version (exact match under Maven ordering, so `1.8` matches `1.8.0`), a
/// bracketed range, and a leading `!` that negates either form.
///
/// # Errors
///
/// Fails on an empty expression or an invalid range.
pub fn parse_jdk_activation_range(text: &str) -> Result<JdkActivation, MvnrError> {
    let trimmed = text.trim();
    let (negated, body) = match trimmed.strip_prefix('!') {
        Some(rest) => (true, rest.trim()),
        None => (false, trimmed),
    };
    if body.is_empty() {
        return Err(invalid(text, "empty JDK expression"));
    }

    let matcher = if body.starts_with('[') || body.starts_with('(') {
        JdkMatcher::Range(parse_version_range(body)?)
    } else {
        if body.contains(['[', ']', '(', ')', ',']) {
            return Err(invalid(text, "bare JDK version must not contain range syntax"));
        }
        JdkMatcher::Exact(Version::parse(body)?)
    };
    Ok(JdkActivation {
        negated,
        matcher,
    })
}
