//! In-memory repository.

use super::{ArtifactMetadata, FetchError, PomFetcher};
use crate::coordinate::Gav;
use dashmap::DashMap;
use futures::future::BoxFuture;
use std::collections::{HashMap, HashSet};
use std::time::Duration;

/// Descriptors and version listings held in memory.
///
/// Version listings are derived from the registered descriptors unless set explicitly
/// with [`MemoryRepository::with_versions`] or [`MemoryRepository::with_metadata`].
///
/// # Examples
///
/// ```rust,no_run
/// use mvnr_cli::fetch::MemoryRepository;
///
/// let repository = MemoryRepository::new()
///     .with_pom("org.example:lib:1.0.0", "<project><artifactId>lib</artifactId></project>")
///     .with_versions("org.example:lib", ["1.0.0", "1.5.0", "2.0.0"]);
/// ```
#[derive(Debug, Default)]
pub struct MemoryRepository {
    poms: HashMap<Gav, Vec<u8>>,
    metadata: HashMap<(String, String), ArtifactMetadata>,
    failures: HashSet<Gav>,
    delay: Option<Duration>,
    requests: DashMap<Gav, usize>,
}

fn gav_from(text: &str) -> Gav {
    let mut parts = text.splitn(3, ':');
    Gav::new(
        parts.next().unwrap_or_default(),
        parts.next().unwrap_or_default(),
        parts.next().unwrap_or_default(),
    )
}

impl MemoryRepository {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the descriptor of `groupId:artifactId:version`.
    #[must_use]
    pub fn with_pom(mut self, coordinate: &str, pom: impl Into<Vec<u8>>) -> Self {
        let gav = gav_from(coordinate);
        self.listing(&gav).add_version(gav.version.clone());
        self.poms.insert(gav, pom.into());
        self
    }

    /// Publish versions of `groupId:artifactId` without registering descriptors.
    #[must_use]
    pub fn with_versions<I, S>(mut self, coordinate: &str, versions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let gav = gav_from(coordinate);
        let entry = self.listing(&gav);
        for version in versions {
            entry.add_version(version.into());
        }
        self
    }

    /// Replace the version listing of an artifact.
    #[must_use]
    pub fn with_metadata(mut self, metadata: ArtifactMetadata) -> Self {
        self.metadata
            .insert((metadata.group_id.clone(), metadata.artifact_id.clone()), metadata);
        self
    }

    /// Make fetching `groupId:artifactId:version` fail with a transient error.
    #[must_use]
    pub fn with_failure(mut self, coordinate: &str) -> Self {
        self.failures.insert(gav_from(coordinate));
        self
    }

    /// Delay every response.
    #[must_use]
    pub const fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// How many times the descriptor of `groupId:artifactId:version` was requested.
    #[must_use]
    pub fn request_count(&self, coordinate: &str) -> usize {
        self.requests.get(&gav_from(coordinate)).map_or(0, |count| *count)
    }

    fn listing(&mut self, gav: &Gav) -> &mut ArtifactMetadata {
        self.metadata
            .entry((gav.group_id.clone(), gav.artifact_id.clone()))
            .or_insert_with(|| ArtifactMetadata {
                group_id: gav.group_id.clone(),
                artifact_id: gav.artifact_id.clone(),
                ..ArtifactMetadata::default()
            })
    }

    async fn pause(&self) {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
    }
}

impl PomFetcher for MemoryRepository {
    fn fetch<'a>(&'a self, gav: &'a Gav) -> BoxFuture<'a, Result<Option<Vec<u8>>, FetchError>> {
        Box::pin(async move {
            *self.requests.entry(gav.clone()).or_insert(0) += 1;
            self.pause().await;
            if self.failures.contains(gav) {
                return Err(FetchError::Transient(format!("repository unavailable for {gav}")));
            }
            Ok(self.poms.get(gav).cloned())
        })
    }

    fn metadata<'a>(
        &'a self,
        group_id: &'a str,
        artifact_id: &'a str,
    ) -> BoxFuture<'a, Result<Option<ArtifactMetadata>, FetchError>> {
        Box::pin(async move {
            self.pause().await;
            Ok(self
                .metadata
                .get(&(group_id.to_string(), artifact_id.to_string()))
                .cloned())
        })
    }
}
