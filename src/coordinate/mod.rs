//! Artifact coordinates: identity, addressing, and their textual form.
//!
//! The canonical text form is `groupId:artifactId[:version][:classifier][:packaging]`,
//! optionally followed by `!` to mark the coordinate *raw* (exempt from dependency
//! management). Empty positional slots mean "absent", so `org.example:app:1.0::pom`
//! has no classifier and `pom` packaging.
//!
//! When fields are omitted, a bare token after the artifact id is classified with the
//! [`heuristics`]: `org.example:app:sources` is a classifier, `org.example:app:1.0` a
//! version.
//!
//! # Identity
//!
//! Mediation groups artifacts by [`ArtifactKey`] `(groupId, artifactId, classifier,
//! packaging)`. Descriptor fetching and memoization use [`Gav`] `(groupId, artifactId,
//! version)`.
//!
//! # Examples
//!
//! ```rust,no_run
//! use mvnr_cli::coordinate::Coordinate;
//!
//! # fn example() -> Result<(), mvnr_cli::core::MvnrError> {
//! let coordinate = Coordinate::parse("org.example:app:1.0.0:natives-linux")?;
//! assert_eq!(coordinate.classifier(), Some("natives-linux"));
//! assert_eq!(coordinate.to_string(), "org.example:app:1.0.0:natives-linux");
//! # Ok(())
//! # }
//! ```

use crate::core::MvnrError;
use crate::version::VersionSpec;
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

pub mod endpoint;
pub mod heuristics;

pub use endpoint::Endpoint;
pub use heuristics::{looks_like_classifier, looks_like_main_class, looks_like_version};

/// Default packaging when none is given.
pub const DEFAULT_PACKAGING: &str = "jar";

/// Dependency scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Scope {
    #[default]
    Compile,
    Provided,
    Runtime,
    Test,
    System,
    /// Only meaningful in `dependencyManagement` with `pom` packaging (BOM import).
    Import,
}

impl Scope {
    /// Scopes whose dependencies are followed transitively.
    #[must_use]
    pub const fn is_transitive(self) -> bool {
        matches!(self, Self::Compile | Self::Runtime)
    }

    /// Scope a child dependency gets when reached through a parent with `self` scope.
    ///
    /// Returns `None` when the child is not part of the parent's transitive closure.
    #[must_use]
    pub const fn propagate(self, child: Self) -> Option<Self> {
        match (self, child) {
            (Self::Compile, Self::Compile) => Some(Self::Compile),
            (Self::Compile | Self::Runtime, Self::Runtime)
            | (Self::Runtime, Self::Compile) => Some(Self::Runtime),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Compile => "compile",
            Self::Provided => "provided",
            Self::Runtime => "runtime",
            Self::Test => "test",
            Self::System => "system",
            Self::Import => "import",
        }
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Scope {
    type Err = MvnrError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "" | "compile" => Ok(Self::Compile),
            "provided" => Ok(Self::Provided),
            "runtime" => Ok(Self::Runtime),
            "test" => Ok(Self::Test),
            "system" => Ok(Self::System),
            "import" => Ok(Self::Import),
            other => Err(MvnrError::Other {
                message: format!("Unknown dependency scope '{other}'"),
            }),
        }
    }
}

/// Mediation identity of an artifact.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct ArtifactKey {
    pub group_id: String,
    pub artifact_id: String,
    pub classifier: Option<String>,
    pub packaging: String,
}

impl fmt::Display for ArtifactKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.group_id, self.artifact_id, self.packaging)?;
        if let Some(classifier) = &self.classifier {
            write!(f, ":{classifier}")?;
        }
        Ok(())
    }
}

/// `groupId:artifactId:version`, the address of a descriptor.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Gav {
    pub group_id: String,
    pub artifact_id: String,
    pub version: String,
}

impl Gav {
    pub fn new(
        group_id: impl Into<String>,
        artifact_id: impl Into<String>,
        version: impl Into<String>,
    ) -> Self {
        Self {
            group_id: group_id.into(),
            artifact_id: artifact_id.into(),
            version: version.into(),
        }
    }
}

impl fmt::Display for Gav {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.group_id, self.artifact_id, self.version)
    }
}

/// An artifact coordinate.
///
/// Values are immutable; the `with_*` methods return modified copies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Coordinate {
    group_id: String,
    artifact_id: String,
    version: Option<VersionSpec>,
    classifier: Option<String>,
    packaging: String,
    scope: Scope,
    optional: bool,
    raw: bool,
}

fn malformed(text: &str, reason: impl Into<String>) -> MvnrError {
    MvnrError::MalformedCoordinate {
        coordinate: text.to_string(),
        reason: reason.into(),
    }
}

fn validate_id(text: &str, field: &str, value: &str) -> Result<(), MvnrError> {
    if value.is_empty() {
        return Err(malformed(text, format!("{field} must not be empty")));
    }
    if value.chars().any(|c| c.is_whitespace() || matches!(c, '/' | '\\' | '@' | '+')) {
        return Err(malformed(text, format!("{field} '{value}' contains invalid characters")));
    }
    Ok(())
}

fn non_empty(token: Option<&&str>) -> Option<String> {
    token.map(|t| t.trim()).filter(|t| !t.is_empty()).map(str::to_string)
}

impl Coordinate {
    /// Create a coordinate with default packaging and scope and no version.
    ///
    /// # Errors
    ///
    /// Fails if either id is empty or contains separator characters.
    pub fn new(
        group_id: impl Into<String>,
        artifact_id: impl Into<String>,
    ) -> Result<Self, MvnrError> {
        let group_id = group_id.into();
        let artifact_id = artifact_id.into();
        let text = format!("{group_id}:{artifact_id}");
        validate_id(&text, "groupId", &group_id)?;
        validate_id(&text, "artifactId", &artifact_id)?;
        Ok(Self {
            group_id,
            artifact_id,
            version: None,
            classifier: None,
            packaging: DEFAULT_PACKAGING.to_string(),
            scope: Scope::Compile,
            optional: false,
            raw: false,
        })
    }

    /// Parse `groupId:artifactId[:version][:classifier][:packaging][!]`.
    ///
    /// # Errors
    ///
    /// Returns [`MvnrError::MalformedCoordinate`] for fewer than two or more than five
    /// fields, empty ids, or an invalid version range.
    pub fn parse(text: &str) -> Result<Self, MvnrError> {
        let trimmed = text.trim();
        let (body, raw) = match trimmed.strip_suffix('!') {
            Some(body) => (body, true),
            None => (trimmed, false),
        };

        let parts: Vec<&str> = body.split(':').collect();
        if parts.len() < 2 {
            return Err(malformed(text, "expected at least groupId:artifactId"));
        }
        if parts.len() > 5 {
            return Err(malformed(text, "too many ':'-separated fields"));
        }

        let mut coordinate = Self::new(parts[0].trim(), parts[1].trim())
            .map_err(|_| malformed(text, "groupId and artifactId must be non-empty identifiers"))?;
        coordinate.raw = raw;

        let mut rest = &parts[2..];
        if let Some(first) = rest.first() {
            let first = first.trim();
            let skip_version =
                !first.is_empty() && !looks_like_version(first) && looks_like_classifier(first);
            if !skip_version {
                if !first.is_empty() {
                    let spec =
                        VersionSpec::parse(first).map_err(|e| malformed(text, e.to_string()))?;
                    coordinate.version = Some(spec);
                }
                rest = &rest[1..];
            }
        }
        if rest.len() > 2 {
            return Err(malformed(text, "too many fields after classifier"));
        }
        coordinate.classifier = non_empty(rest.first());
        if let Some(packaging) = non_empty(rest.get(1)) {
            coordinate.packaging = packaging;
        }
        Ok(coordinate)
    }

    #[must_use]
    pub fn group_id(&self) -> &str {
        &self.group_id
    }

    #[must_use]
    pub fn artifact_id(&self) -> &str {
        &self.artifact_id
    }

    #[must_use]
    pub const fn version(&self) -> Option<&VersionSpec> {
        self.version.as_ref()
    }

    #[must_use]
    pub fn classifier(&self) -> Option<&str> {
        self.classifier.as_deref()
    }

    #[must_use]
    pub fn packaging(&self) -> &str {
        &self.packaging
    }

    #[must_use]
    pub const fn scope(&self) -> Scope {
        self.scope
    }

    #[must_use]
    pub const fn is_optional(&self) -> bool {
        self.optional
    }

    /// Raw coordinates are not subject to dependency management.
    #[must_use]
    pub const fn is_raw(&self) -> bool {
        self.raw
    }

    #[must_use]
    pub fn with_version(mut self, version: VersionSpec) -> Self {
        self.version = Some(version);
        self
    }

    #[must_use]
    pub fn with_classifier(mut self, classifier: Option<String>) -> Self {
        self.classifier = classifier.filter(|c| !c.is_empty());
        self
    }

    #[must_use]
    pub fn with_packaging(mut self, packaging: impl Into<String>) -> Self {
        self.packaging = packaging.into();
        self
    }

    #[must_use]
    pub const fn with_scope(mut self, scope: Scope) -> Self {
        self.scope = scope;
        self
    }

    #[must_use]
    pub const fn with_optional(mut self, optional: bool) -> Self {
        self.optional = optional;
        self
    }

    #[must_use]
    pub const fn with_raw(mut self, raw: bool) -> Self {
        self.raw = raw;
        self
    }

    /// Mediation identity.
    #[must_use]
    pub fn key(&self) -> ArtifactKey {
        ArtifactKey {
            group_id: self.group_id.clone(),
            artifact_id: self.artifact_id.clone(),
            classifier: self.classifier.clone(),
            packaging: self.packaging.clone(),
        }
    }

    /// Descriptor address, available once the version is a literal.
    #[must_use]
    pub fn gav(&self) -> Option<Gav> {
        let version = self.version.as_ref()?.literal()?;
        Some(Gav::new(&self.group_id, &self.artifact_id, version))
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.group_id, self.artifact_id)?;

        let packaging = (self.packaging != DEFAULT_PACKAGING).then_some(self.packaging.as_str());
        let classifier = self.classifier.as_deref();

        if self.version.is_some() || classifier.is_some() || packaging.is_some() {
            f.write_str(":")?;
            if let Some(version) = &self.version {
                write!(f, "{version}")?;
            }
        }
        if classifier.is_some() || packaging.is_some() {
            write!(f, ":{}", classifier.unwrap_or_default())?;
        }
        if let Some(packaging) = packaging {
            write!(f, ":{packaging}")?;
        }
        if self.raw {
            f.write_str("!")?;
        }
        Ok(())
    }
}

impl FromStr for Coordinate {
    type Err = MvnrError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Serialize for Coordinate {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}
