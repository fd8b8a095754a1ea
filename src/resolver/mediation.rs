//! Nearest-wins mediation.
//!
//! The graph is walked breadth-first from the roots. Within one depth, candidates are
//! visited in the order their parents were visited and, per parent, in declaration
//! order, which is the same as left-to-right depth-first order over the roots. The
//! first candidate seen for an [`ArtifactKey`] therefore is the shallowest one, with
//! ties going to the earlier root and the earlier declaration. It is selected; every
//! later occurrence is recorded in the raw tree as a leaf and never expanded.
//!
//! Descriptors needed for the next depth are loaded concurrently, but their results are
//! consumed in visiting order so the output does not depend on fetch timing.

use super::dependency_graph::{DependencyNode, NodeStatus};
use super::loader::ModelLoader;
use super::version_resolution::select_version_text;
use crate::coordinate::{ArtifactKey, Gav};
use crate::core::MvnrError;
use crate::fetch::FetchCache;
use crate::model::{Dependency, Exclusion, Model};
use crate::profile::ProfileConstraints;
use anyhow::{Context, Result};
use futures::stream::{self, StreamExt};
use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;
use tracing::{debug, warn};

/// One edge waiting to be mediated.
#[derive(Debug, Clone)]
pub(crate) struct Candidate {
    pub dependency: Dependency,
    pub requested: Option<String>,
    pub depth: usize,
    /// Exclusions carried by every edge from the root down to and including this one.
    pub exclusions: Arc<BTreeSet<Exclusion>>,
    /// Descriptors from the root down to this one.
    pub chain: Arc<Vec<String>>,
    /// Whether caller-supplied management applies to this subtree.
    pub managed: bool,
    parent: Option<usize>,
}

impl Candidate {
    pub(crate) fn root(dependency: Dependency, requested: Option<String>, managed: bool) -> Self {
        let chain = Arc::new(vec![dependency.gav().to_string()]);
        Self {
            dependency,
            requested,
            depth: 0,
            exclusions: Arc::new(BTreeSet::new()),
            chain,
            managed,
            parent: None,
        }
    }

    fn context(&self) -> String {
        format!("while resolving {}", self.chain.join(" -> "))
    }

    fn expands(&self) -> bool {
        self.depth == 0 || self.dependency.scope.is_transitive()
    }
}

struct TreeSlot {
    dependency: Dependency,
    requested: Option<String>,
    status: NodeStatus,
    children: Vec<usize>,
}

/// Result of one mediation run.
pub(crate) struct Mediated {
    pub dependencies: Vec<Dependency>,
    pub tree: Vec<DependencyNode>,
    pub warnings: Vec<String>,
}

pub(crate) struct Mediation<'a> {
    loader: &'a ModelLoader<'a>,
    cache: &'a FetchCache,
    constraints: &'a ProfileConstraints,
    management: &'a [Dependency],
    management_index: HashMap<ArtifactKey, usize>,
    include_optional: bool,
    concurrency: usize,
    selected: HashMap<ArtifactKey, usize>,
    dependencies: Vec<Dependency>,
    arena: Vec<TreeSlot>,
    roots: Vec<usize>,
    warnings: Vec<String>,
}

impl<'a> Mediation<'a> {
    pub(crate) fn new(
        loader: &'a ModelLoader<'a>,
        cache: &'a FetchCache,
        constraints: &'a ProfileConstraints,
        management: &'a [Dependency],
        include_optional: bool,
        concurrency: usize,
    ) -> Self {
        let management_index =
            management.iter().enumerate().map(|(i, d)| (d.key(), i)).collect();
        Self {
            loader,
            cache,
            constraints,
            management,
            management_index,
            include_optional,
            concurrency: concurrency.max(1),
            selected: HashMap::new(),
            dependencies: Vec::new(),
            arena: Vec::new(),
            roots: Vec::new(),
            warnings: Vec::new(),
        }
    }

    pub(crate) async fn run(mut self, roots: Vec<Candidate>) -> Result<Mediated> {
        let mut level = roots;
        while !level.is_empty() {
            let mut expand: Vec<(usize, Candidate)> = Vec::new();
            for candidate in level {
                let (slot, selected) = self.record(&candidate);
                if selected && candidate.expands() {
                    expand.push((slot, candidate));
                }
            }

            let models = self.prefetch(&expand).await;
            let mut next = Vec::new();
            for (slot, candidate) in expand {
                let gav = candidate.dependency.gav();
                let loaded = match models.get(&gav) {
                    Some(Ok(model)) => model.clone(),
                    Some(Err(e)) => {
                        return Err(anyhow::Error::from(e.clone()).context(candidate.context()));
                    }
                    None => None,
                };
                let Some(model) = loaded else {
                    if candidate.depth == 0 {
                        return Err(anyhow::Error::from(MvnrError::DescriptorNotFound {
                            coordinate: gav.to_string(),
                        })
                        .context(candidate.context()));
                    }
                    self.warn(format!(
                        "Descriptor for {gav} not found; keeping it without dependencies ({})",
                        candidate.chain.join(" -> ")
                    ));
                    continue;
                };
                let children = self.children(&candidate, slot, &model).await?;
                next.extend(children);
            }
            level = next;
        }

        let tree = self.roots.iter().map(|&root| self.build_node(root)).collect();
        Ok(Mediated {
            dependencies: self.dependencies,
            tree,
            warnings: self.warnings,
        })
    }

    /// Put a candidate into the raw tree and select it if its key is new.
    fn record(&mut self, candidate: &Candidate) -> (usize, bool) {
        let key = candidate.dependency.key();
        let status = match self.selected.get(&key) {
            None => NodeStatus::Selected,
            Some(&index) if self.dependencies[index].version == candidate.dependency.version => {
                NodeStatus::Duplicate
            }
            Some(&index) => NodeStatus::Conflict {
                selected: self.dependencies[index].version.clone(),
            },
        };
        let selected = status == NodeStatus::Selected;
        if selected {
            self.selected.insert(key, self.dependencies.len());
            self.dependencies.push(candidate.dependency.clone());
        } else {
            debug!(
                "Omitting {} at depth {}: {:?}",
                candidate.dependency, candidate.depth, status
            );
        }

        let slot = self.arena.len();
        self.arena.push(TreeSlot {
            dependency: candidate.dependency.clone(),
            requested: candidate.requested.clone(),
            status,
            children: Vec::new(),
        });
        match candidate.parent {
            Some(parent) => self.arena[parent].children.push(slot),
            None => self.roots.push(slot),
        }
        (slot, selected)
    }

    /// Load the descriptors of every candidate about to be expanded.
    async fn prefetch(
        &self,
        expand: &[(usize, Candidate)],
    ) -> HashMap<Gav, Result<Option<Arc<Model>>, MvnrError>> {
        let mut gavs: Vec<Gav> = expand.iter().map(|(_, c)| c.dependency.gav()).collect();
        gavs.sort();
        gavs.dedup();
        let loader = self.loader;
        stream::iter(gavs)
            .map(|gav| async move {
                let result = loader.load_if_present(&gav).await;
                (gav, result)
            })
            .buffer_unordered(self.concurrency)
            .collect()
            .await
    }

    /// Mediation candidates for the dependencies of `parent`.
    async fn children(
        &mut self,
        parent: &Candidate,
        slot: usize,
        model: &Model,
    ) -> Result<Vec<Candidate>> {
        let effective = if parent.managed {
            model.dependencies_with_management(self.management, self.constraints)
        } else {
            model.dependencies(false, self.constraints)
        }
        .with_context(|| parent.context())?;
        self.warnings.extend(effective.warnings);

        let mut children = Vec::new();
        for mut dependency in effective.dependencies {
            if dependency.optional && parent.depth > 0 && !self.include_optional {
                debug!("Skipping optional {dependency} of {}", parent.dependency);
                continue;
            }
            if parent.depth > 0 {
                match parent.dependency.scope.propagate(dependency.scope) {
                    Some(scope) => dependency.scope = scope,
                    None => continue,
                }
            }
            if dependency.is_excluded_by(parent.exclusions.iter()) {
                debug!("Excluding {dependency} below {}", parent.dependency);
                continue;
            }

            let mut requested = None;
            if parent.managed && parent.depth > 0 {
                if let Some(entry) = self.managed_entry(&dependency.key()) {
                    if entry.has_version() && entry.version != dependency.version {
                        requested = Some(dependency.version.clone());
                        dependency.version.clone_from(&entry.version);
                    }
                }
            }

            let selected = select_version_text(
                self.cache,
                &dependency.group_id,
                &dependency.artifact_id,
                &dependency.version,
            )
            .await
            .with_context(|| {
                format!(
                    "{} -> {}:{}",
                    parent.context(),
                    dependency.group_id,
                    dependency.artifact_id
                )
            })?;
            if selected.requested.is_some() {
                requested = requested.or(selected.requested);
            }
            dependency.version = selected.version;

            let exclusions = if dependency.exclusions.is_empty() {
                Arc::clone(&parent.exclusions)
            } else {
                let mut merged = (*parent.exclusions).clone();
                merged.extend(dependency.exclusions.iter().cloned());
                Arc::new(merged)
            };
            let mut chain = (*parent.chain).clone();
            chain.push(dependency.gav().to_string());

            children.push(Candidate {
                dependency,
                requested,
                depth: parent.depth + 1,
                exclusions,
                chain: Arc::new(chain),
                managed: parent.managed,
                parent: Some(slot),
            });
        }
        Ok(children)
    }

    fn managed_entry(&self, key: &ArtifactKey) -> Option<&Dependency> {
        self.management_index.get(key).map(|&i| &self.management[i])
    }

    fn warn(&mut self, message: String) {
        warn!("{message}");
        self.warnings.push(message);
    }

    fn build_node(&self, index: usize) -> DependencyNode {
        let slot = &self.arena[index];
        DependencyNode {
            dependency: slot.dependency.clone(),
            requested: slot.requested.clone(),
            status: slot.status.clone(),
            children: slot.children.iter().map(|&child| self.build_node(child)).collect(),
        }
    }
}
