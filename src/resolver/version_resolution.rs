//! Turning requested versions into concrete ones.

use crate::core::MvnrError;
use crate::fetch::FetchCache;
use crate::version::VersionSpec;
use tracing::debug;

/// A concrete version plus the request it came from, when that was not a literal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct SelectedVersion {
    pub version: String,
    pub requested: Option<String>,
}

/// Pick the concrete version `spec` denotes for `groupId:artifactId`.
///
/// Literals need no lookup. `RELEASE`, `LATEST` and ranges consult the published version
/// list. `MANAGED` cannot be answered here; callers substitute management first.
///
/// # Errors
///
/// [`MvnrError::UnresolvedVersion`] when nothing is published or nothing matches, and
/// [`MvnrError::FetchFailure`] when the listing cannot be read.
pub(crate) async fn select_version(
    cache: &FetchCache,
    group_id: &str,
    artifact_id: &str,
    spec: &VersionSpec,
) -> Result<SelectedVersion, MvnrError> {
    let coordinate = format!("{group_id}:{artifact_id}:{spec}");
    if !spec.needs_metadata() {
        return match spec.literal() {
            Some(literal) => Ok(SelectedVersion {
                version: literal.to_string(),
                requested: None,
            }),
            None => Err(MvnrError::UnresolvedVersion {
                coordinate,
                reason: "MANAGED requires a dependency management entry".to_string(),
            }),
        };
    }

    let metadata = cache.metadata(group_id, artifact_id).await?.ok_or_else(|| {
        MvnrError::UnresolvedVersion {
            coordinate: coordinate.clone(),
            reason: "no published versions found".to_string(),
        }
    })?;
    let version = metadata.select(spec).ok_or_else(|| MvnrError::UnresolvedVersion {
        coordinate: coordinate.clone(),
        reason: format!(
            "none of the {} published versions matches",
            metadata.versions.len()
        ),
    })?;
    debug!("Selected {version} for {coordinate}");
    Ok(SelectedVersion {
        version,
        requested: Some(spec.to_string()),
    })
}

/// Parse version text and select a concrete version for it.
///
/// # Errors
///
/// As [`select_version`], plus [`MvnrError::InvalidVersionRange`] or
/// [`MvnrError::MalformedVersion`] for unparseable text.
pub(crate) async fn select_version_text(
    cache: &FetchCache,
    group_id: &str,
    artifact_id: &str,
    text: &str,
) -> Result<SelectedVersion, MvnrError> {
    let spec = VersionSpec::parse(text)?;
    let mut selected = select_version(cache, group_id, artifact_id, &spec).await?;
    // "[1.2]" parses to a literal but was still a request
    if selected.requested.is_none() && selected.version != text.trim() {
        selected.requested = Some(text.trim().to_string());
    }
    Ok(selected)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::MemoryRepository;
    use std::sync::Arc;

    fn cache() -> FetchCache {
        FetchCache::new(Arc::new(
            MemoryRepository::new().with_versions("org.example:lib", ["1.0.0", "1.5.0", "2.0.0"]),
        ))
    }

    #[tokio::test]
    async fn test_range_selects_highest_contained() {
        let selected = select_version_text(&cache(), "org.example", "lib", "[1.0,2.0)")
            .await
            .unwrap();
        assert_eq!(selected.version, "1.5.0");
        assert_eq!(selected.requested.as_deref(), Some("[1.0,2.0)"));
    }

    #[tokio::test]
    async fn test_literal_needs_no_metadata() {
        let cache = cache();
        let selected = select_version_text(&cache, "org.example", "other", "3.0").await.unwrap();
        assert_eq!(selected.version, "3.0");
        assert!(selected.requested.is_none());
        assert_eq!(cache.fetch_count(), 0);
    }

    #[tokio::test]
    async fn test_exact_bracket_records_request() {
        let selected =
            select_version_text(&cache(), "org.example", "lib", "[1.5.0]").await.unwrap();
        assert_eq!(selected.version, "1.5.0");
        assert_eq!(selected.requested.as_deref(), Some("[1.5.0]"));
    }

    #[tokio::test]
    async fn test_unresolvable() {
        let cache = cache();
        let err = select_version_text(&cache, "org.example", "lib", "[3.0,)").await.unwrap_err();
        assert!(matches!(err, MvnrError::UnresolvedVersion { .. }));
        let err =
            select_version_text(&cache, "org.example", "nothing", "RELEASE").await.unwrap_err();
        assert!(matches!(err, MvnrError::UnresolvedVersion { .. }));
        let err = select_version(&cache, "org.example", "lib", &VersionSpec::Managed)
            .await
            .unwrap_err();
        assert!(matches!(err, MvnrError::UnresolvedVersion { .. }));
    }
}
