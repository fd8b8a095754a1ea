//! Write-once fetch cache.
//!
//! Each key owns a `tokio::sync::OnceCell`. Concurrent requests for the same key wait on
//! the same cell, so the underlying fetcher runs once. A failed fetch leaves the cell
//! empty, so a transient error for one root does not stick for the next request.

use super::{ArtifactMetadata, FetchError, PomFetcher};
use crate::coordinate::Gav;
use crate::core::MvnrError;
use dashmap::DashMap;
use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tokio::sync::OnceCell;
use tracing::debug;

type Slot<T> = Arc<OnceCell<Option<Arc<T>>>>;

/// Read-through cache in front of a [`PomFetcher`].
pub struct FetchCache {
    fetcher: Arc<dyn PomFetcher>,
    descriptors: DashMap<Gav, Slot<Vec<u8>>>,
    metadata: DashMap<(String, String), Slot<ArtifactMetadata>>,
    timeout: Option<Duration>,
    fetches: AtomicUsize,
}

impl std::fmt::Debug for FetchCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FetchCache")
            .field("descriptors", &self.descriptors.len())
            .field("metadata", &self.metadata.len())
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

impl FetchCache {
    pub fn new(fetcher: Arc<dyn PomFetcher>) -> Self {
        Self {
            fetcher,
            descriptors: DashMap::new(),
            metadata: DashMap::new(),
            timeout: None,
            fetches: AtomicUsize::new(0),
        }
    }

    /// Abandon any single fetch that takes longer than `timeout`.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Descriptor bytes of `gav`, or `None` if the repository does not have it.
    ///
    /// # Errors
    ///
    /// Returns [`MvnrError::FetchFailure`] when the fetcher fails or times out.
    pub async fn descriptor(&self, gav: &Gav) -> Result<Option<Arc<Vec<u8>>>, MvnrError> {
        let slot = self.descriptors.entry(gav.clone()).or_default().clone();
        let value = slot
            .get_or_try_init(|| async {
                self.fetches.fetch_add(1, Ordering::Relaxed);
                debug!("Fetching descriptor {gav}");
                let bytes = self.bounded(self.fetcher.fetch(gav)).await.map_err(|e| {
                    MvnrError::FetchFailure {
                        coordinate: gav.to_string(),
                        reason: e.to_string(),
                    }
                })?;
                if bytes.is_none() {
                    debug!("Descriptor {gav} not found");
                }
                Ok::<_, MvnrError>(bytes.map(Arc::new))
            })
            .await?;
        Ok(value.clone())
    }

    /// Published versions of `groupId:artifactId`, or `None` if unknown.
    ///
    /// # Errors
    ///
    /// Returns [`MvnrError::FetchFailure`] when the fetcher fails or times out.
    pub async fn metadata(
        &self,
        group_id: &str,
        artifact_id: &str,
    ) -> Result<Option<Arc<ArtifactMetadata>>, MvnrError> {
        let key = (group_id.to_string(), artifact_id.to_string());
        let slot = self.metadata.entry(key).or_default().clone();
        let value = slot
            .get_or_try_init(|| async {
                self.fetches.fetch_add(1, Ordering::Relaxed);
                debug!("Fetching version metadata for {group_id}:{artifact_id}");
                let metadata = self
                    .bounded(self.fetcher.metadata(group_id, artifact_id))
                    .await
                    .map_err(|e| MvnrError::FetchFailure {
                        coordinate: format!("{group_id}:{artifact_id}"),
                        reason: e.to_string(),
                    })?;
                Ok::<_, MvnrError>(metadata.map(Arc::new))
            })
            .await?;
        Ok(value.clone())
    }

    /// Number of calls that reached the underlying fetcher.
    #[must_use]
    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::Relaxed)
    }

    async fn bounded<T>(
        &self,
        fetch: impl Future<Output = Result<T, FetchError>>,
    ) -> Result<T, FetchError> {
        match self.timeout {
            Some(limit) => tokio::time::timeout(limit, fetch)
                .await
                .map_err(|_| FetchError::Timeout(limit))?,
            None => fetch.await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::MemoryRepository;
    use futures::future::join_all;

    fn repository() -> MemoryRepository {
        MemoryRepository::new()
            .with_pom(
                "org.example:lib:1.0.0",
                "<project><artifactId>lib</artifactId></project>",
            )
            .with_failure("org.example:flaky:1.0")
    }

    #[tokio::test]
    async fn test_concurrent_requests_fetch_once() {
        let cache = FetchCache::new(Arc::new(repository()));
        let gav = Gav::new("org.example", "lib", "1.0.0");
        let results = join_all((0..8).map(|_| cache.descriptor(&gav))).await;
        assert!(results.iter().all(|r| matches!(r, Ok(Some(_)))));
        assert_eq!(cache.fetch_count(), 1);
    }

    #[tokio::test]
    async fn test_not_found_is_cached_as_none() {
        let cache = FetchCache::new(Arc::new(repository()));
        let gav = Gav::new("org.example", "missing", "1.0");
        assert!(cache.descriptor(&gav).await.unwrap().is_none());
        assert!(cache.descriptor(&gav).await.unwrap().is_none());
        assert_eq!(cache.fetch_count(), 1);
    }

    #[tokio::test]
    async fn test_failure_is_not_cached() {
        let cache = FetchCache::new(Arc::new(repository()));
        let gav = Gav::new("org.example", "flaky", "1.0");
        let err = cache.descriptor(&gav).await.unwrap_err();
        assert!(matches!(err, MvnrError::FetchFailure { .. }));
        let _ = cache.descriptor(&gav).await;
        assert_eq!(cache.fetch_count(), 2);
    }

    #[tokio::test]
    async fn test_timeout_reported_as_fetch_failure() {
        let slow = repository().with_delay(Duration::from_millis(200));
        let cache = FetchCache::new(Arc::new(slow)).with_timeout(Some(Duration::from_millis(10)));
        let err = cache
            .descriptor(&Gav::new("org.example", "lib", "1.0.0"))
            .await
            .unwrap_err();
        match err {
            MvnrError::FetchFailure { reason, .. } => assert!(reason.contains("timed out")),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_metadata_cached() {
        let cache = FetchCache::new(Arc::new(repository()));
        let first = cache.metadata("org.example", "lib").await.unwrap().unwrap();
        let second = cache.metadata("org.example", "lib").await.unwrap().unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(first.versions, ["1.0.0"]);
    }
}
