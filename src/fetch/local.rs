//! Maven local repository on disk.
//!
//! Layout:
//! `<root>/<groupId with dots as slashes>/<artifactId>/<version>/<artifactId>-<version>.pom`.
//! Version listings come from any `maven-metadata*.xml` in the artifact directory
//! (`maven-metadata-local.xml`, `maven-metadata-central.xml`, ...), merged with the
//! version directories that actually contain a POM, in ascending Maven order.

use super::{ArtifactMetadata, FetchError, PomFetcher};
use crate::coordinate::Gav;
use crate::version::VersionComparator;
use futures::future::BoxFuture;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// A local repository directory such as `~/.m2/repository`.
#[derive(Debug, Clone)]
pub struct LocalRepository {
    root: PathBuf,
}

impl LocalRepository {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
        }
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Directory holding every version of `groupId:artifactId`.
    #[must_use]
    pub fn artifact_dir(&self, group_id: &str, artifact_id: &str) -> PathBuf {
        let mut dir = self.root.clone();
        dir.extend(group_id.split('.'));
        dir.push(artifact_id);
        dir
    }

    /// Path of the POM for `gav`.
    #[must_use]
    pub fn pom_path(&self, gav: &Gav) -> PathBuf {
        self.artifact_dir(&gav.group_id, &gav.artifact_id)
            .join(&gav.version)
            .join(format!("{}-{}.pom", gav.artifact_id, gav.version))
    }

    async fn read_listing(
        &self,
        group_id: &str,
        artifact_id: &str,
    ) -> Result<Option<ArtifactMetadata>, FetchError> {
        let dir = self.artifact_dir(group_id, artifact_id);
        let mut entries = match tokio::fs::read_dir(&dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(source) => return Err(FetchError::Io { path: dir, source }),
        };

        let mut listing: Option<ArtifactMetadata> = None;
        let mut found = Vec::new();
        let io_error = |source| FetchError::Io {
            path: dir.clone(),
            source,
        };
        while let Some(entry) = entries.next_entry().await.map_err(io_error)? {
            let path = entry.path();
            let name = entry.file_name().to_string_lossy().into_owned();
            if name.starts_with("maven-metadata") && name.ends_with(".xml") {
                let bytes = tokio::fs::read(&path).await.map_err(|source| FetchError::Io {
                    path: path.clone(),
                    source,
                })?;
                match ArtifactMetadata::parse(&path.to_string_lossy(), &bytes) {
                    Ok(parsed) => match listing.as_mut() {
                        Some(existing) => existing.merge(parsed),
                        None => listing = Some(parsed),
                    },
                    Err(e) => warn!("Ignoring unreadable metadata {}: {e}", path.display()),
                }
            } else {
                let pom = path.join(format!("{artifact_id}-{name}.pom"));
                if tokio::fs::metadata(&pom).await.is_ok_and(|m| m.is_file()) {
                    found.push(name);
                }
            }
        }

        if listing.is_none() && found.is_empty() {
            return Ok(None);
        }
        let found = VersionComparator::sorted(&found);
        let mut metadata = listing.unwrap_or_default();
        metadata.group_id = group_id.to_string();
        metadata.artifact_id = artifact_id.to_string();
        for version in found {
            metadata.add_version(version);
        }
        debug!(
            "Local repository lists {} versions of {group_id}:{artifact_id}",
            metadata.versions.len()
        );
        Ok(Some(metadata))
    }
}

impl PomFetcher for LocalRepository {
    fn fetch<'a>(&'a self, gav: &'a Gav) -> BoxFuture<'a, Result<Option<Vec<u8>>, FetchError>> {
        Box::pin(async move {
            let path = self.pom_path(gav);
            match tokio::fs::read(&path).await {
                Ok(bytes) => Ok(Some(bytes)),
                Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
                Err(source) => Err(FetchError::Io { path, source }),
            }
        })
    }

    fn metadata<'a>(
        &'a self,
        group_id: &'a str,
        artifact_id: &'a str,
    ) -> BoxFuture<'a, Result<Option<ArtifactMetadata>, FetchError>> {
        Box::pin(self.read_listing(group_id, artifact_id))
    }
}
