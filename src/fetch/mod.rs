//! Descriptor retrieval.
//!
//! The resolver never touches the network or disk itself. It asks a [`PomFetcher`] for
//! descriptor bytes and published version lists, and wraps it in a [`FetchCache`] so
//! that every `groupId:artifactId:version` is fetched at most once no matter how many
//! concurrent loads ask for it.
//!
//! A fetcher distinguishes three outcomes:
//! - `Ok(Some(bytes))` - the descriptor exists
//! - `Ok(None)` - the repository does not have it (not an I/O failure)
//! - `Err(FetchError)` - the repository could not be read
//!
//! Two implementations ship with the crate:
//! - [`MemoryRepository`] - descriptors registered in memory, for tests and embedding
//! - [`LocalRepository`] - a Maven local repository directory (`~/.m2/repository` layout)
//!
//! # Examples
//!
//! ```rust,no_run
//! use mvnr_cli::coordinate::Gav;
//! use mvnr_cli::fetch::{FetchCache, LocalRepository};
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), mvnr_cli::core::MvnrError> {
//! let cache = FetchCache::new(Arc::new(LocalRepository::new("/home/user/.m2/repository")));
//! let pom = cache.descriptor(&Gav::new("org.example", "lib", "1.5.0")).await?;
//! println!("found: {}", pom.is_some());
//! # Ok(())
//! # }
//! ```

use crate::coordinate::Gav;
use futures::future::BoxFuture;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

pub mod cache;
pub mod local;
pub mod memory;
pub mod metadata;

pub use cache::FetchCache;
pub use local::LocalRepository;
pub use memory::MemoryRepository;
pub use metadata::ArtifactMetadata;

/// Failure to read from a repository. A missing descriptor is not a failure.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Reading from disk failed
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The fetch did not complete in time
    #[error("timed out after {0:?}")]
    Timeout(Duration),

    /// Any other transient repository failure
    #[error("{0}")]
    Transient(String),
}

/// Source of descriptor bytes and version listings.
///
/// Implementations must be safe to call concurrently.
pub trait PomFetcher: Send + Sync {
    /// Fetch the POM of `gav`. `Ok(None)` means the repository does not have it.
    fn fetch<'a>(&'a self, gav: &'a Gav) -> BoxFuture<'a, Result<Option<Vec<u8>>, FetchError>>;

    /// List the published versions of `groupId:artifactId`, if known.
    fn metadata<'a>(
        &'a self,
        group_id: &'a str,
        artifact_id: &'a str,
    ) -> BoxFuture<'a, Result<Option<ArtifactMetadata>, FetchError>>;
}
