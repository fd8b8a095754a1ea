//! Project object model.
//!
//! A [`Model`] wraps one parsed [`Pom`] together with the already-loaded models it
//! depends on: its parent (recursively) and the BOMs its dependency management imports.
//! Loading those collaborators is the resolver's job; a `Model` itself does no I/O.
//!
//! Everything a caller usually wants is *derived* on demand for a given
//! [`ProfileConstraints`]:
//!
//! - [`Model::effective_properties`] - properties merged over the parent chain, with
//!   active profiles and built-ins folded in
//! - [`Model::dependencies`] - the effective managed or direct dependency list
//!
//! Nothing derived is cached, so evaluating the same model under different constraints
//! is safe.
//!
//! # Example
//!
//! ```rust,no_run
//! use mvnr_cli::coordinate::Gav;
//! use mvnr_cli::model::Model;
//! use mvnr_cli::profile::ProfileConstraints;
//!
//! # fn example(bytes: &[u8]) -> Result<(), mvnr_cli::core::MvnrError> {
//! let model = Model::load(&Gav::new("org.example", "app", "1.0.0"), bytes)?;
//! let effective = model.dependencies(false, &ProfileConstraints::new())?;
//! for dependency in &effective.dependencies {
//!     println!("{dependency}");
//! }
//! # Ok(())
//! # }
//! ```

use crate::coordinate::Gav;
use crate::core::MvnrError;
use crate::profile::{ProfileConstraints, is_profile_active};
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use tracing::warn;

pub mod dependency;
mod effective;
pub mod interpolate;
pub mod pom;

pub use dependency::{Dependency, Exclusion};
pub use effective::EffectiveDependencies;
pub use interpolate::{Interpolated, interpolate};
pub use pom::{ParentRef, Pom, Profile, RawDependency, RawExclusion};

/// Property map. Ordered so that diagnostics are stable.
pub type Properties = BTreeMap<String, String>;

/// A project descriptor with its parent chain and imported BOMs attached.
#[derive(Debug, Clone)]
pub struct Model {
    gav: Gav,
    pom: Arc<Pom>,
    parent: Option<Arc<Model>>,
    imports: HashMap<Gav, Arc<Model>>,
}

impl Model {
    /// Parse descriptor bytes fetched for `gav`.
    ///
    /// The result has no parent or imports attached yet; see [`Model::with_parent`] and
    /// [`Model::with_imports`].
    ///
    /// # Errors
    ///
    /// Returns [`MvnrError::MalformedDescriptor`] if the bytes are not a POM.
    pub fn load(gav: &Gav, bytes: &[u8]) -> Result<Self, MvnrError> {
        let pom = Pom::parse(&gav.to_string(), bytes)?;
        if let Some(artifact_id) = &pom.artifact_id {
            if artifact_id != &gav.artifact_id {
                warn!("Descriptor fetched for {gav} declares artifactId '{artifact_id}'");
            }
        }
        Ok(Self::from_pom(gav.clone(), pom))
    }

    /// Wrap an already parsed POM.
    #[must_use]
    pub fn from_pom(gav: Gav, pom: Pom) -> Self {
        Self {
            gav,
            pom: Arc::new(pom),
            parent: None,
            imports: HashMap::new(),
        }
    }

    #[must_use]
    pub fn with_parent(mut self, parent: Arc<Model>) -> Self {
        self.parent = Some(parent);
        self
    }

    /// Attach BOMs imported anywhere in this model's inheritance chain.
    #[must_use]
    pub fn with_imports(mut self, imports: HashMap<Gav, Arc<Model>>) -> Self {
        self.imports = imports;
        self
    }

    #[must_use]
    pub const fn gav(&self) -> &Gav {
        &self.gav
    }

    #[must_use]
    pub fn pom(&self) -> &Pom {
        &self.pom
    }

    #[must_use]
    pub fn parent(&self) -> Option<&Arc<Model>> {
        self.parent.as_ref()
    }

    #[must_use]
    pub fn packaging(&self) -> &str {
        self.pom.packaging.as_deref().unwrap_or(crate::coordinate::DEFAULT_PACKAGING)
    }

    /// The declared `<parent>` coordinate, if any.
    #[must_use]
    pub fn parent_ref(&self) -> Option<Gav> {
        self.pom
            .parent
            .as_ref()
            .map(|p| Gav::new(&p.group_id, &p.artifact_id, &p.version))
    }

    /// This model and its ancestors, root ancestor first.
    #[must_use]
    pub fn lineage(&self) -> Vec<&Model> {
        let mut chain = Vec::new();
        let mut current = Some(self);
        while let Some(model) = current {
            chain.push(model);
            current = model.parent.as_deref();
        }
        chain.reverse();
        chain
    }

    /// Whether a profile of this model is active under `constraints`.
    ///
    /// Explicitly deactivated ids lose, explicitly activated ids win, and otherwise the
    /// activation rule decides. Malformed rules are logged and count as inactive.
    #[must_use]
    pub fn is_active_profile(&self, profile: &Profile, constraints: &ProfileConstraints) -> bool {
        is_profile_active(&profile.id, &profile.activation, constraints)
    }

    /// Profiles declared directly in this model's POM that are active.
    #[must_use]
    pub fn active_profiles<'a>(&'a self, constraints: &ProfileConstraints) -> Vec<&'a Profile> {
        self.pom
            .profiles
            .iter()
            .filter(|profile| self.is_active_profile(profile, constraints))
            .collect()
    }

    pub(crate) fn import(&self, gav: &Gav) -> Option<&Arc<Model>> {
        self.imports.get(gav)
    }
}
