//! Transitive dependency resolution and mediation.
//!
//! This module turns a list of root coordinates into one conflict-free dependency list,
//! the way Maven does for a project's dependency tree.
//!
//! # Resolution Process
//!
//! 1. **External management**: every BOM passed by the caller is loaded and its
//!    effective dependency management merged, earlier BOMs winning per artifact. With
//!    [`ResolveOptions::managed`] set, the roots' own management is appended as well.
//! 2. **Roots**: each root's version is selected (literal, `RELEASE`/`LATEST`, range, or
//!    taken from the external management when omitted). Roots marked raw (`g:a:v!`)
//!    ignore external management for themselves and their subtree.
//! 3. **Expansion**: descriptors are loaded with their parents and BOM imports (see
//!    [`loader`]). Each node's effective direct dependencies are expanded breadth-first,
//!    narrowing scope (`compile` → `runtime` → nothing for `test`/`provided`/`system`),
//!    skipping optional dependencies below the first level, and removing anything
//!    excluded by an edge on the path from the root.
//! 4. **Mediation**: for each `(groupId, artifactId, classifier, packaging)` the
//!    shallowest occurrence wins, ties going to the earlier root and declaration (see
//!    [`mediation`]).
//!
//! # Concurrency
//!
//! Within one depth, descriptors are fetched and parsed concurrently (bounded by
//! [`ResolveOptions::max_concurrency`]) through a write-once [`FetchCache`], so each
//! `groupId:artifactId:version` is fetched at most once. Results are consumed in
//! visiting order, which keeps output byte-identical across runs. A resolution can be
//! abandoned through [`Resolver::resolve_until`]; it then fails with
//! [`MvnrError::Cancelled`] and returns nothing partial.
//!
//! # Error Handling
//!
//! Errors are [`anyhow::Error`]s wrapping an [`MvnrError`], with the inclusion chain as
//! context (`while resolving org.example:app:1.0 -> org.example:lib:1.5`). Use
//! `downcast_ref::<MvnrError>()` to match on the kind. Non-fatal problems (unresolved
//! properties in non-load-bearing positions, dropped test dependencies, missing
//! transitive descriptors) are returned in [`Resolution::warnings`].
//!
//! # Example Usage
//!
//! ```rust,no_run
//! use mvnr_cli::coordinate::Coordinate;
//! use mvnr_cli::fetch::LocalRepository;
//! use mvnr_cli::profile::ProfileConstraints;
//! use mvnr_cli::resolver::Resolver;
//! use std::sync::Arc;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let resolver = Resolver::new(Arc::new(LocalRepository::new("/home/user/.m2/repository")));
//! let roots = [Coordinate::parse("org.example:app:1.0.0")?];
//! let resolution = resolver.resolve(&roots, &ProfileConstraints::from_host(), &[]).await?;
//!
//! for dependency in &resolution.dependencies {
//!     println!("{dependency}");
//! }
//! print!("{}", resolution.render_tree());
//! # Ok(())
//! # }
//! ```

pub mod dependency_graph;
pub(crate) mod loader;
pub(crate) mod mediation;
pub(crate) mod version_resolution;

pub use dependency_graph::{DependencyNode, NodeStatus, render_tree};

use self::loader::ModelLoader;
use self::mediation::{Candidate, Mediation};
use self::version_resolution::select_version;
use crate::coordinate::{ArtifactKey, Coordinate, Gav};
use crate::core::MvnrError;
use crate::fetch::{FetchCache, PomFetcher};
use crate::model::{Dependency, Model};
use crate::profile::ProfileConstraints;
use crate::version::VersionSpec;
use anyhow::{Context, Result};
use serde::Serialize;
use std::collections::HashSet;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

/// Default bound on the parent/import chain of one descriptor.
pub const DEFAULT_MAX_PARENT_DEPTH: usize = 24;

/// Tuning knobs for one [`Resolver`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolveOptions {
    /// Treat the roots' own dependency management as global constraints.
    pub managed: bool,
    /// Follow optional dependencies below the first level.
    pub include_optional: bool,
    /// Upper bound on concurrent descriptor loads.
    pub max_concurrency: usize,
    /// Upper bound on the parent/import chain of one descriptor; longer chains are
    /// reported as cyclic.
    pub max_parent_depth: usize,
    /// Abandon any single fetch that takes longer than this.
    pub fetch_timeout: Option<Duration>,
}

impl Default for ResolveOptions {
    fn default() -> Self {
        let cores = std::thread::available_parallelism().map_or(4, std::num::NonZeroUsize::get);
        Self {
            managed: false,
            include_optional: false,
            max_concurrency: cores.max(4),
            max_parent_depth: DEFAULT_MAX_PARENT_DEPTH,
            fetch_timeout: None,
        }
    }
}

/// Outcome of [`Resolver::resolve`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Resolution {
    /// Mediated dependencies in discovery order, the roots first.
    pub dependencies: Vec<Dependency>,
    /// Every edge that was considered, one tree per root.
    pub tree: Vec<DependencyNode>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

impl Resolution {
    /// Mediated dependencies without the root entries.
    #[must_use]
    pub fn dependencies_of_roots(&self) -> &[Dependency] {
        let roots = self.tree.iter().filter(|node| !node.is_omitted()).count();
        &self.dependencies[roots.min(self.dependencies.len())..]
    }

    /// Find the selected entry for `groupId:artifactId`.
    #[must_use]
    pub fn find(&self, group_id: &str, artifact_id: &str) -> Option<&Dependency> {
        self.dependencies
            .iter()
            .find(|d| d.group_id == group_id && d.artifact_id == artifact_id)
    }

    /// `cargo tree`-style view of [`Resolution::tree`].
    #[must_use]
    pub fn render_tree(&self) -> String {
        render_tree(&self.tree)
    }
}

/// Resolves root coordinates against a [`PomFetcher`].
///
/// The fetch cache lives as long as the resolver and is shared by every call; models
/// and mediation state are private to each call.
pub struct Resolver {
    cache: Arc<FetchCache>,
    options: ResolveOptions,
}

impl Resolver {
    /// Create a resolver with default options.
    pub fn new(fetcher: Arc<dyn PomFetcher>) -> Self {
        Self::with_options(fetcher, ResolveOptions::default())
    }

    pub fn with_options(fetcher: Arc<dyn PomFetcher>, options: ResolveOptions) -> Self {
        let cache = FetchCache::new(fetcher).with_timeout(options.fetch_timeout);
        Self {
            cache: Arc::new(cache),
            options,
        }
    }

    #[must_use]
    pub const fn options(&self) -> &ResolveOptions {
        &self.options
    }

    #[must_use]
    pub fn cache(&self) -> &Arc<FetchCache> {
        &self.cache
    }

    /// Load one descriptor with its parent chain and imports attached.
    ///
    /// # Errors
    ///
    /// Returns the [`MvnrError`] of the first descriptor that fails to fetch or parse.
    pub async fn load_model(
        &self,
        gav: &Gav,
        constraints: &ProfileConstraints,
    ) -> Result<Arc<Model>> {
        let loader = self.loader(constraints);
        loader.load(gav).await.with_context(|| format!("while loading {gav}"))
    }

    /// Resolve `roots` into a mediated list plus the raw tree.
    ///
    /// `boms` supply version management for everything not managed by its own POM.
    ///
    /// # Errors
    ///
    /// Fails if a root, parent or BOM descriptor is missing or malformed, if an
    /// inheritance chain is cyclic, or if a version cannot be selected. The error names
    /// the chain of inclusion.
    pub async fn resolve(
        &self,
        roots: &[Coordinate],
        constraints: &ProfileConstraints,
        boms: &[Coordinate],
    ) -> Result<Resolution> {
        self.run(roots, constraints, boms, self.options.managed).await
    }

    /// Like [`Resolver::resolve`], but give up when `cancel` completes first.
    ///
    /// # Errors
    ///
    /// [`MvnrError::Cancelled`] when cancelled, otherwise as [`Resolver::resolve`].
    pub async fn resolve_until(
        &self,
        roots: &[Coordinate],
        constraints: &ProfileConstraints,
        boms: &[Coordinate],
        cancel: impl Future<Output = ()>,
    ) -> Result<Resolution> {
        tokio::select! {
            resolution = self.resolve(roots, constraints, boms) => resolution,
            () = cancel => {
                info!("Resolution cancelled");
                Err(MvnrError::Cancelled.into())
            }
        }
    }

    /// The mediated dependencies of `components`, without the components themselves.
    ///
    /// # Errors
    ///
    /// As [`Resolver::resolve`].
    pub async fn dependencies(
        &self,
        components: &[Coordinate],
        managed: bool,
        boms: &[Coordinate],
        constraints: &ProfileConstraints,
    ) -> Result<Vec<Dependency>> {
        let resolution = self.run(components, constraints, boms, managed).await?;
        Ok(resolution.dependencies_of_roots().to_vec())
    }

    fn loader<'a>(&'a self, constraints: &'a ProfileConstraints) -> ModelLoader<'a> {
        ModelLoader::new(
            &self.cache,
            constraints,
            self.options.max_parent_depth,
            self.options.max_concurrency,
        )
    }

    async fn run(
        &self,
        roots: &[Coordinate],
        constraints: &ProfileConstraints,
        boms: &[Coordinate],
        managed: bool,
    ) -> Result<Resolution> {
        let loader = self.loader(constraints);
        let mut management = self.bom_management(&loader, boms, constraints).await?;

        let mut candidates = Vec::with_capacity(roots.len());
        for root in roots {
            let (dependency, requested) = self
                .root_dependency(root, &management)
                .await
                .with_context(|| format!("while resolving {root}"))?;
            candidates.push(Candidate::root(dependency, requested, !root.is_raw()));
        }

        if managed {
            let mut keys: HashSet<ArtifactKey> = management.iter().map(Dependency::key).collect();
            for candidate in candidates.iter().filter(|c| c.managed) {
                let gav = candidate.dependency.gav();
                let model =
                    loader.load(&gav).await.with_context(|| format!("while resolving {gav}"))?;
                let own = model
                    .dependencies(true, constraints)
                    .with_context(|| format!("while resolving {gav}"))?;
                for entry in own.dependencies {
                    if keys.insert(entry.key()) {
                        management.push(entry);
                    }
                }
            }
        }
        debug!("Resolving {} roots with {} managed entries", roots.len(), management.len());

        let mediated = Mediation::new(
            &loader,
            &self.cache,
            constraints,
            &management,
            self.options.include_optional,
            self.options.max_concurrency,
        )
        .run(candidates)
        .await?;

        info!(
            "Resolved {} dependencies for {} roots",
            mediated.dependencies.len(),
            roots.len()
        );
        Ok(Resolution {
            dependencies: mediated.dependencies,
            tree: mediated.tree,
            warnings: mediated.warnings,
        })
    }

    /// Merged dependency management of the caller-supplied BOMs, earlier BOMs first.
    async fn bom_management(
        &self,
        loader: &ModelLoader<'_>,
        boms: &[Coordinate],
        constraints: &ProfileConstraints,
    ) -> Result<Vec<Dependency>> {
        let mut management = Vec::new();
        let mut keys: HashSet<ArtifactKey> = HashSet::new();
        for bom in boms {
            let spec = bom.version().cloned().unwrap_or(VersionSpec::Release);
            let selected = select_version(&self.cache, bom.group_id(), bom.artifact_id(), &spec)
                .await
                .with_context(|| format!("while importing BOM {bom}"))?;
            let gav = Gav::new(bom.group_id(), bom.artifact_id(), &selected.version);
            let model =
                loader.load(&gav).await.with_context(|| format!("while importing BOM {gav}"))?;
            let managed = model
                .dependencies(true, constraints)
                .with_context(|| format!("while importing BOM {gav}"))?;
            for entry in managed.dependencies {
                if keys.insert(entry.key()) {
                    management.push(entry);
                }
            }
        }
        Ok(management)
    }

    /// The root as a dependency with a concrete version.
    async fn root_dependency(
        &self,
        root: &Coordinate,
        management: &[Dependency],
    ) -> Result<(Dependency, Option<String>), MvnrError> {
        let spec = match root.version() {
            Some(VersionSpec::Managed) | None => {
                let key = root.key();
                let managed = (!root.is_raw())
                    .then(|| management.iter().find(|d| d.key() == key && d.has_version()))
                    .flatten();
                match managed {
                    Some(entry) => entry.version_spec()?,
                    None => {
                        return Err(MvnrError::UnresolvedVersion {
                            coordinate: root.to_string(),
                            reason: "no version given and none managed by the supplied BOMs"
                                .to_string(),
                        });
                    }
                }
            }
            Some(spec) => spec.clone(),
        };
        let selected =
            select_version(&self.cache, root.group_id(), root.artifact_id(), &spec).await?;
        Ok((Dependency::from_coordinate(root, selected.version), selected.requested))
    }
}

#[cfg(test)]
mod tests;
