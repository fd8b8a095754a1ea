//! Resolved dependency edges.

use crate::coordinate::{ArtifactKey, Coordinate, Gav, Scope};
use crate::version::VersionSpec;
use serde::Serialize;
use std::collections::BTreeSet;
use std::fmt;

/// `groupId:artifactId` pattern removed from a dependency's subtree. Either part may be `*`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct Exclusion {
    pub group_id: String,
    pub artifact_id: String,
}

impl Exclusion {
    pub fn new(group_id: impl Into<String>, artifact_id: impl Into<String>) -> Self {
        Self {
            group_id: group_id.into(),
            artifact_id: artifact_id.into(),
        }
    }

    #[must_use]
    pub fn matches(&self, group_id: &str, artifact_id: &str) -> bool {
        (self.group_id == "*" || self.group_id == group_id)
            && (self.artifact_id == "*" || self.artifact_id == artifact_id)
    }
}

impl fmt::Display for Exclusion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.group_id, self.artifact_id)
    }
}

/// A dependency after interpolation and management back-fill.
///
/// `version` is the declared version text, which may still be a range or a symbolic
/// token until the resolver picks a concrete version. In dependency-management entries
/// that only carry scope or exclusions it is empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Dependency {
    pub group_id: String,
    pub artifact_id: String,
    pub version: String,
    pub packaging: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub classifier: Option<String>,
    pub scope: Scope,
    pub optional: bool,
    #[serde(skip_serializing_if = "BTreeSet::is_empty")]
    pub exclusions: BTreeSet<Exclusion>,
}

impl Dependency {
    /// A compile-scope `jar` dependency with no exclusions.
    pub fn new(
        group_id: impl Into<String>,
        artifact_id: impl Into<String>,
        version: impl Into<String>,
    ) -> Self {
        Self {
            group_id: group_id.into(),
            artifact_id: artifact_id.into(),
            version: version.into(),
            packaging: crate::coordinate::DEFAULT_PACKAGING.to_string(),
            classifier: None,
            scope: Scope::Compile,
            optional: false,
            exclusions: BTreeSet::new(),
        }
    }

    /// Build from a root coordinate and a concrete version.
    #[must_use]
    pub fn from_coordinate(coordinate: &Coordinate, version: impl Into<String>) -> Self {
        Self {
            group_id: coordinate.group_id().to_string(),
            artifact_id: coordinate.artifact_id().to_string(),
            version: version.into(),
            packaging: coordinate.packaging().to_string(),
            classifier: coordinate.classifier().map(str::to_string),
            scope: coordinate.scope(),
            optional: coordinate.is_optional(),
            exclusions: BTreeSet::new(),
        }
    }

    #[must_use]
    pub fn key(&self) -> ArtifactKey {
        ArtifactKey {
            group_id: self.group_id.clone(),
            artifact_id: self.artifact_id.clone(),
            classifier: self.classifier.clone(),
            packaging: self.packaging.clone(),
        }
    }

    /// Address of this dependency's own descriptor.
    #[must_use]
    pub fn gav(&self) -> Gav {
        Gav::new(&self.group_id, &self.artifact_id, &self.version)
    }

    #[must_use]
    pub fn has_version(&self) -> bool {
        !self.version.is_empty()
    }

    /// Classify the version text.
    pub fn version_spec(&self) -> Result<VersionSpec, crate::core::MvnrError> {
        VersionSpec::parse(&self.version)
    }

    /// Whether an exclusion set removes this dependency.
    #[must_use]
    pub fn is_excluded_by<'a>(&self, exclusions: impl IntoIterator<Item = &'a Exclusion>) -> bool {
        exclusions.into_iter().any(|e| e.matches(&self.group_id, &self.artifact_id))
    }

    #[must_use]
    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = version.into();
        self
    }

    #[must_use]
    pub const fn with_scope(mut self, scope: Scope) -> Self {
        self.scope = scope;
        self
    }

    #[must_use]
    pub fn with_classifier(mut self, classifier: impl Into<String>) -> Self {
        self.classifier = Some(classifier.into());
        self
    }

    #[must_use]
    pub fn with_packaging(mut self, packaging: impl Into<String>) -> Self {
        self.packaging = packaging.into();
        self
    }

    #[must_use]
    pub const fn with_optional(mut self, optional: bool) -> Self {
        self.optional = optional;
        self
    }

    #[must_use]
    pub fn with_exclusion(mut self, exclusion: Exclusion) -> Self {
        self.exclusions.insert(exclusion);
        self
    }
}

/// `groupId:artifactId:packaging[:classifier]:version:scope`
impl fmt::Display for Dependency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.group_id, self.artifact_id, self.packaging)?;
        if let Some(classifier) = &self.classifier {
            write!(f, ":{classifier}")?;
        }
        write!(f, ":{}:{}", self.version, self.scope)?;
        if self.optional {
            f.write_str(" (optional)")?;
        }
        Ok(())
    }
}
