//! Maven version parsing, ordering, and range arithmetic.
//!
//! This module implements the version model that dependency mediation relies on. Maven
//! versions are deliberately permissive: almost any string parses into *some* ordered
//! value, so the interesting part is the ordering, not validation.
//!
//! # Module Organization
//!
//! - [`Version`] - A parsed Maven version with a total order
//! - [`comparison`] - Comparison helpers and the SemVer 1.x comparator
//! - [`range`] - Interval syntax (`[1.0,2.0)`), membership, and JDK activation ranges
//! - [`spec`] - The version slot of a coordinate: literal, `RELEASE`, `LATEST`, managed, or range
//!
//! # Ordering Rules
//!
//! A version is split into items at `.`, `-`, and at every transition between digits and
//! letters. A `-` (and a digit/letter transition) opens a nested sub-list, so
//! `1.0-beta-2` becomes `[1, [beta, [2]]]`.
//!
//! - Numeric items compare numerically, with arbitrary precision
//! - Qualifiers follow `alpha < beta < milestone < rc == cr < snapshot < "" == ga == final
//!   == release < sp`
//! - Unknown qualifiers sort after every known one, alphabetically among themselves
//! - `a1`, `b1`, `m1` are shorthand for `alpha-1`, `beta-1`, `milestone-1`
//! - Trailing zeros and empty qualifiers are insignificant: `1.0 == 1.0.0 == 1-0 == 1.0-ga`
//!
//! # Examples
//!
//! ```rust,no_run
//! use mvnr_cli::version::Version;
//!
//! # fn example() -> Result<(), mvnr_cli::core::MvnrError> {
//! let rc = Version::parse("1.0-rc1")?;
//! let ga = Version::parse("1.0")?;
//! assert!(rc < ga);
//! assert_eq!(Version::parse("1.0.0")?, ga);
//! # Ok(())
//! # }
//! ```

use crate::core::MvnrError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

pub mod comparison;
pub mod range;
pub mod spec;

pub use comparison::{VersionComparator, compare_semver, is_semver_1x};
pub use range::{
    JdkActivation, Restriction, VersionRange, parse_jdk_activation_range, parse_version_range,
    version_in_range,
};
pub use spec::VersionSpec;

/// Known qualifiers in ascending order. The empty string is the release tier.
const QUALIFIERS: [&str; 7] = ["alpha", "beta", "milestone", "rc", "snapshot", "", "sp"];

/// Comparable form of the empty (release) qualifier.
const RELEASE_INDEX: &str = "5";

/// A parsed Maven version.
///
/// The original text is kept for display; ordering, equality, and hashing use the
/// normalized item list so that `1.0` and `1.0.0` are the same version.
#[derive(Debug, Clone)]
pub struct Version {
    original: String,
    items: ListItem,
    canonical: String,
}

impl Version {
    /// Parse a version string.
    ///
    /// # Errors
    ///
    /// Returns [`MvnrError::MalformedVersion`] only when the input is empty or
    /// whitespace. Every other string parses.
    pub fn parse(text: &str) -> Result<Self, MvnrError> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Err(MvnrError::MalformedVersion {
                version: text.to_string(),
            });
        }

        let items = parse_items(&trimmed.to_lowercase());
        let canonical = items.to_string();
        Ok(Self {
            original: trimmed.to_string(),
            items,
            canonical,
        })
    }

    /// The version text as it was written.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.original
    }

    /// Normalized item form, e.g. `1-rc-1` for `1.0.0-RC1`.
    #[must_use]
    pub fn canonical(&self) -> &str {
        &self.canonical
    }

    /// Whether this is a `-SNAPSHOT` development version.
    #[must_use]
    pub fn is_snapshot(&self) -> bool {
        self.original.to_lowercase().ends_with("snapshot")
    }
}

impl FromStr for Version {
    type Err = MvnrError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.original)
    }
}

impl Ord for Version {
    fn cmp(&self, other: &Self) -> Ordering {
        self.items.compare_list(&other.items)
    }
}

impl PartialOrd for Version {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Version {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Version {}

impl Hash for Version {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.canonical.hash(state);
    }
}

impl Serialize for Version {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.original)
    }
}

impl<'de> Deserialize<'de> for Version {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        Self::parse(&text).map_err(serde::de::Error::custom)
    }
}

/// One element of a parsed version.
#[derive(Debug, Clone)]
enum Item {
    /// Decimal digits without leading zeros; `"0"` for zero.
    Int(String),
    /// Qualifier after alias expansion, lower case.
    Str(String),
    List(ListItem),
}

#[derive(Debug, Clone, Default)]
struct ListItem(Vec<Item>);

impl Item {
    fn int(digits: &str) -> Self {
        let stripped = digits.trim_start_matches('0');
        if stripped.is_empty() {
            Self::Int("0".to_string())
        } else {
            Self::Int(stripped.to_string())
        }
    }

    fn string(value: &str, followed_by_digit: bool) -> Self {
        let expanded = if followed_by_digit && value.len() == 1 {
            match value {
                "a" => "alpha",
                "b" => "beta",
                "m" => "milestone",
                other => other,
            }
        } else {
            value
        };
        let aliased = match expanded {
            "ga" | "final" | "release" => "",
            "cr" => "rc",
            other => other,
        };
        Self::Str(aliased.to_string())
    }

    fn is_null(&self) -> bool {
        match self {
            Self::Int(digits) => digits == "0",
            Self::Str(value) => comparable_qualifier(value) == RELEASE_INDEX,
            Self::List(list) => list.0.is_empty(),
        }
    }

    /// Compare against another item, or against "nothing" when the other side is shorter.
    fn compare(&self, other: Option<&Item>) -> Ordering {
        match (self, other) {
            (Self::Int(digits), None) => {
                if digits == "0" {
                    Ordering::Equal
                } else {
                    Ordering::Greater
                }
            }
            (Self::Int(a), Some(Self::Int(b))) => a.len().cmp(&b.len()).then_with(|| a.cmp(b)),
            (Self::Int(_), Some(_)) => Ordering::Greater,

            (Self::Str(value), None) => comparable_qualifier(value).as_str().cmp(RELEASE_INDEX),
            (Self::Str(_), Some(Self::Int(_) | Self::List(_))) => Ordering::Less,
            (Self::Str(a), Some(Self::Str(b))) => {
                comparable_qualifier(a).cmp(&comparable_qualifier(b))
            }

            // every item counts, so `1-0.1` is above `1` and `1-0.alpha` below it
            (Self::List(list), None) => list
                .0
                .iter()
                .map(|item| item.compare(None))
                .find(|ordering| *ordering != Ordering::Equal)
                .unwrap_or(Ordering::Equal),
            (Self::List(_), Some(Self::Int(_))) => Ordering::Less,
            (Self::List(_), Some(Self::Str(_))) => Ordering::Greater,
            (Self::List(a), Some(Self::List(b))) => a.compare_list(b),
        }
    }
}

/// Maps a qualifier to a string whose natural order is the qualifier order.
fn comparable_qualifier(value: &str) -> String {
    match QUALIFIERS.iter().position(|q| *q == value) {
        Some(index) => index.to_string(),
        None => format!("{}-{value}", QUALIFIERS.len()),
    }
}

impl ListItem {
    fn compare_list(&self, other: &ListItem) -> Ordering {
        let mut left = self.0.iter();
        let mut right = other.0.iter();
        loop {
            let ordering = match (left.next(), right.next()) {
                (None, None) => return Ordering::Equal,
                (Some(l), r) => l.compare(r),
                (None, Some(r)) => r.compare(None).reverse(),
            };
            if ordering != Ordering::Equal {
                return ordering;
            }
        }
    }

    /// Drop null items from the tail, looking through nested lists but stopping at the
    /// first significant scalar.
    fn normalize(&mut self) {
        let mut index = self.0.len();
        while index > 0 {
            index -= 1;
            if self.0[index].is_null() {
                self.0.remove(index);
            } else if !matches!(self.0[index], Item::List(_)) {
                break;
            }
        }
    }

    fn push(&mut self, item: Item) {
        self.0.push(item);
    }
}

impl fmt::Display for ListItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (index, item) in self.0.iter().enumerate() {
            if index > 0 {
                f.write_str(if matches!(item, Item::List(_)) { "-" } else { "." })?;
            }
            match item {
                Item::Int(digits) => f.write_str(digits)?,
                Item::Str(value) => f.write_str(value)?,
                Item::List(list) => write!(f, "{list}")?,
            }
        }
        Ok(())
    }
}

/// Tokenizer state: the list currently being filled is the last entry of `stack`.
struct ItemParser {
    stack: Vec<ListItem>,
}

impl ItemParser {
    fn new() -> Self {
        Self {
            stack: vec![ListItem::default()],
        }
    }

    fn current(&mut self) -> &mut ListItem {
        let last = self.stack.len() - 1;
        &mut self.stack[last]
    }

    fn add(&mut self, item: Item) {
        self.current().push(item);
    }

    fn open_sublist(&mut self) {
        self.stack.push(ListItem::default());
    }

    /// Normalize every open list innermost-first and fold it into its parent.
    fn finish(mut self) -> ListItem {
        while self.stack.len() > 1 {
            let mut inner = self.stack.pop().unwrap_or_default();
            inner.normalize();
            self.current().push(Item::List(inner));
        }
        let mut root = self.stack.pop().unwrap_or_default();
        root.normalize();
        root
    }
}

fn parse_token(token: &str, is_digit: bool) -> Item {
    if is_digit {
        Item::int(token)
    } else {
        Item::string(token, false)
    }
}

fn parse_items(version: &str) -> ListItem {
    let mut parser = ItemParser::new();
    let chars: Vec<char> = version.chars().collect();
    let mut is_digit = false;
    let mut start = 0;

    for (i, &c) in chars.iter().enumerate() {
        let token = || chars[start..i].iter().collect::<String>();
        match c {
            '.' => {
                if i == start {
                    parser.add(Item::int("0"));
                } else {
                    parser.add(parse_token(&token(), is_digit));
                }
                start = i + 1;
            }
            '-' => {
                if i == start {
                    parser.add(Item::int("0"));
                } else {
                    parser.add(parse_token(&token(), is_digit));
                }
                start = i + 1;
                parser.open_sublist();
            }
            c if c.is_ascii_digit() => {
                if !is_digit && i > start {
                    parser.add(Item::string(&token(), true));
                    start = i;
                    parser.open_sublist();
                }
                is_digit = true;
            }
            _ => {
                if is_digit && i > start {
                    parser.add(parse_token(&token(), true));
                    start = i;
                    parser.open_sublist();
                }
                is_digit = false;
            }
        }
    }

    if chars.len() > start {
        let token: String = chars[start..].iter().collect();
        parser.add(parse_token(&token, is_digit));
    }

    parser.finish()
}
