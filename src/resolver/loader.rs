//! Loading models with their parents and imported BOMs attached.
//!
//! A model is complete once its whole parent chain and every BOM imported anywhere in
//! that chain are loaded too. The walk carries an explicit stack of the descriptors
//! currently being loaded, so a descriptor that (directly or through a BOM) inherits
//! from itself is reported as [`MvnrError::CyclicInheritance`] instead of recursing
//! forever. Completed models are memoized for the lifetime of the loader, which is one
//! resolution call.

use crate::coordinate::Gav;
use crate::core::MvnrError;
use crate::fetch::FetchCache;
use crate::model::Model;
use crate::profile::ProfileConstraints;
use dashmap::DashMap;
use futures::future::BoxFuture;
use futures::stream::{self, StreamExt};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

pub(crate) struct ModelLoader<'a> {
    cache: &'a FetchCache,
    constraints: &'a ProfileConstraints,
    max_depth: usize,
    concurrency: usize,
    models: DashMap<Gav, Arc<Model>>,
}

impl<'a> ModelLoader<'a> {
    pub(crate) fn new(
        cache: &'a FetchCache,
        constraints: &'a ProfileConstraints,
        max_depth: usize,
        concurrency: usize,
    ) -> Self {
        Self {
            cache,
            constraints,
            max_depth,
            concurrency: concurrency.max(1),
            models: DashMap::new(),
        }
    }

    /// Load `gav`, failing with [`MvnrError::DescriptorNotFound`] if it does not exist.
    pub(crate) async fn load(&self, gav: &Gav) -> Result<Arc<Model>, MvnrError> {
        self.load_within(gav.clone(), Vec::new()).await
    }

    /// Load `gav` if the repository has it.
    ///
    /// Only the descriptor itself may be missing; a missing parent or BOM is still an
    /// error.
    pub(crate) async fn load_if_present(&self, gav: &Gav) -> Result<Option<Arc<Model>>, MvnrError> {
        if self.cache.descriptor(gav).await?.is_none() {
            return Ok(None);
        }
        self.load(gav).await.map(Some)
    }

    fn load_within(
        &self,
        gav: Gav,
        stack: Vec<Gav>,
    ) -> BoxFuture<'_, Result<Arc<Model>, MvnrError>> {
        Box::pin(async move {
            let cached = self.models.get(&gav).map(|model| Arc::clone(&model));
            if let Some(model) = cached {
                return Ok(model);
            }
            if let Some(start) = stack.iter().position(|entry| entry == &gav) {
                let chain: Vec<String> =
                    stack[start..].iter().chain([&gav]).map(ToString::to_string).collect();
                return Err(MvnrError::CyclicInheritance {
                    chain: chain.join(" -> "),
                });
            }
            // a chain longer than the bound is treated as a cycle we could not close
            if stack.len() > self.max_depth {
                let chain: Vec<String> =
                    stack.iter().chain([&gav]).map(ToString::to_string).collect();
                return Err(MvnrError::CyclicInheritance {
                    chain: chain.join(" -> "),
                });
            }

            let bytes = self.cache.descriptor(&gav).await?.ok_or_else(|| {
                MvnrError::DescriptorNotFound {
                    coordinate: gav.to_string(),
                }
            })?;
            let mut model = Model::load(&gav, &bytes)?;

            let mut stack = stack;
            stack.push(gav.clone());

            if let Some(parent) = model.parent_ref() {
                debug!("Loading parent {parent} of {gav}");
                let parent = self.load_within(parent, stack.clone()).await?;
                model = model.with_parent(parent);
            }

            let requests = model.import_requests(self.constraints)?;
            if !requests.is_empty() {
                debug!("{gav} imports {} BOMs", requests.len());
                let mut loaded: HashMap<Gav, Result<Arc<Model>, MvnrError>> =
                    stream::iter(requests.iter().cloned())
                        .map(|bom| {
                            let stack = stack.clone();
                            async move {
                                let result = self.load_within(bom.clone(), stack).await;
                                (bom, result)
                            }
                        })
                        .buffer_unordered(self.concurrency)
                        .collect()
                        .await;

                let mut imports = HashMap::new();
                // report the first failing import in declaration order
                for request in requests {
                    if let Some(result) = loaded.remove(&request) {
                        imports.insert(request, result?);
                    }
                }
                model = model.with_imports(imports);
            }

            let model = Arc::new(model);
            self.models.insert(gav, Arc::clone(&model));
            Ok(model)
        })
    }
}
