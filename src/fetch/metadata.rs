//! Published version lists (`maven-metadata.xml`).

use crate::core::MvnrError;
use crate::version::{Version, VersionComparator, VersionSpec};
use quick_xml::de::from_reader;
use serde::Deserialize;

/// Versions published for one `groupId:artifactId`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArtifactMetadata {
    pub group_id: String,
    pub artifact_id: String,
    /// Published versions, in the order the repository lists them.
    pub versions: Vec<String>,
    pub latest: Option<String>,
    pub release: Option<String>,
    pub last_updated: Option<String>,
}

#[derive(Debug, Deserialize)]
struct MetadataDocument {
    #[serde(rename = "groupId", default)]
    group_id: String,
    #[serde(rename = "artifactId", default)]
    artifact_id: String,
    #[serde(default)]
    versioning: Option<VersioningDocument>,
}

#[derive(Debug, Deserialize)]
struct VersioningDocument {
    latest: Option<String>,
    release: Option<String>,
    #[serde(default)]
    versions: VersionsDocument,
    #[serde(rename = "lastUpdated")]
    last_updated: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct VersionsDocument {
    #[serde(rename = "version", default)]
    items: Vec<String>,
}

impl ArtifactMetadata {
    /// Metadata synthesized from a bare version list.
    pub fn from_versions<I, S>(group_id: &str, artifact_id: &str, versions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut metadata = Self {
            group_id: group_id.to_string(),
            artifact_id: artifact_id.to_string(),
            ..Self::default()
        };
        for version in versions {
            metadata.add_version(version.into());
        }
        metadata
    }

    /// Parse a `maven-metadata.xml` document.
    ///
    /// # Errors
    ///
    /// Returns [`MvnrError::MalformedDescriptor`] if the XML does not decode.
    pub fn parse(label: &str, bytes: &[u8]) -> Result<Self, MvnrError> {
        let document: MetadataDocument =
            from_reader(bytes).map_err(|e| MvnrError::MalformedDescriptor {
                coordinate: label.to_string(),
                reason: format!("invalid maven-metadata.xml: {e}"),
            })?;
        let versioning = document.versioning;
        Ok(Self {
            group_id: document.group_id,
            artifact_id: document.artifact_id,
            versions: versioning
                .as_ref()
                .map(|v| v.versions.items.iter().map(|s| s.trim().to_string()).collect())
                .unwrap_or_default(),
            latest: versioning.as_ref().and_then(|v| v.latest.clone()),
            release: versioning.as_ref().and_then(|v| v.release.clone()),
            last_updated: versioning.and_then(|v| v.last_updated),
        })
    }

    pub fn add_version(&mut self, version: String) {
        if !self.versions.contains(&version) {
            self.versions.push(version);
        }
    }

    /// Fold another listing for the same artifact into this one.
    ///
    /// Version lists are unioned. `latest`/`release` keep the higher of the two, and
    /// `last_updated` the most recent.
    pub fn merge(&mut self, other: Self) {
        for version in other.versions {
            self.add_version(version);
        }
        self.latest = higher(self.latest.take(), other.latest);
        self.release = higher(self.release.take(), other.release);
        self.last_updated = self.last_updated.take().max(other.last_updated);
    }

    /// Pick the concrete version a spec resolves to.
    ///
    /// `RELEASE` prefers the advertised release and falls back to the highest
    /// non-snapshot; `LATEST` likewise with the advertised latest. Ranges take the
    /// highest contained version. `MANAGED` never resolves from metadata.
    #[must_use]
    pub fn select(&self, spec: &VersionSpec) -> Option<String> {
        match spec {
            VersionSpec::Literal(text) => Some(text.clone()),
            VersionSpec::Release => self
                .release
                .clone()
                .filter(|r| !r.is_empty())
                .or_else(|| VersionComparator::get_latest_release(&self.versions)),
            VersionSpec::Latest => self
                .latest
                .clone()
                .filter(|l| !l.is_empty())
                .or_else(|| VersionComparator::get_latest(&self.versions)),
            VersionSpec::Range(range) => VersionComparator::highest_matching(&self.versions, range),
            VersionSpec::Managed => None,
        }
    }
}

fn higher(a: Option<String>, b: Option<String>) -> Option<String> {
    match (a, b) {
        (Some(a), Some(b)) => match (Version::parse(&a), Version::parse(&b)) {
            (Ok(va), Ok(vb)) if vb > va => Some(b),
            _ => Some(a),
        },
        (a, b) => a.or(b),
    }
}
