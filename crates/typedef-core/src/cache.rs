//! Descriptor cache keyed by domain type name
//!
//! Concurrent requests for the same name share one load. A failed load is
//! not remembered, so a later request retries it. Empty slots left by failed
//! loads are not counted as loaded.

use dashmap::DashMap;
use std::sync::Arc;
use tokio::sync::OnceCell;
use tracing::{debug, info};

use crate::error::{DescriptorLoadError, LoadResult};
use crate::loader::DescriptorLoader;
use crate::resolver::Resolver;
use crate::typedef::DomainTypeDescriptor;

type Slot = Arc<OnceCell<Arc<DomainTypeDescriptor>>>;

/// Loaded descriptors, shared across tasks
#[derive(Debug)]
pub struct DescriptorCache {
    loader: DescriptorLoader,
    slots: DashMap<String, Slot>,
}

impl DescriptorCache {
    pub fn new(loader: DescriptorLoader) -> Self {
        Self {
            loader,
            slots: DashMap::new(),
        }
    }

    pub fn loader(&self) -> &DescriptorLoader {
        &self.loader
    }

    /// The descriptor for `domain_type`, loading it on first use
    pub async fn get_or_load(&self, domain_type: &str) -> LoadResult<Arc<DomainTypeDescriptor>> {
        // Clone the slot out so no shard lock is held across the load
        let slot: Slot = self
            .slots
            .entry(domain_type.to_string())
            .or_default()
            .value()
            .clone();

        if let Some(descriptor) = slot.get() {
            debug!(domain_type, "Descriptor cache hit");
            return Ok(descriptor.clone());
        }

        // A failed load leaves the slot empty. The next waiter on the same
        // cell, or a later request, runs the load again.
        let descriptor = slot
            .get_or_try_init(|| async {
                let descriptor = self.loader.load(domain_type).await?;
                info!(domain_type, origin = %descriptor.origin(), "Cached domain type descriptor");
                Ok::<_, DescriptorLoadError>(Arc::new(descriptor))
            })
            .await?
            .clone();
        Ok(descriptor)
    }

    /// Resolver for `domain_type`, loading its descriptor on first use
    pub async fn resolver(&self, domain_type: &str) -> LoadResult<Resolver> {
        self.get_or_load(domain_type).await.map(Resolver::new)
    }

    /// Forget one descriptor. Returns true if it was loaded.
    ///
    /// Holders of the evicted descriptor keep their copy.
    pub fn evict(&self, domain_type: &str) -> bool {
        self.slots
            .remove(domain_type)
            .map(|(_, slot)| slot.initialized())
            .unwrap_or(false)
    }

    pub fn clear(&self) {
        self.slots.clear();
    }

    /// Number of loaded descriptors
    pub fn len(&self) -> usize {
        self.slots.iter().filter(|slot| slot.value().initialized()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Names of the loaded descriptors, sorted
    pub fn loaded(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .slots
            .iter()
            .filter(|slot| slot.value().initialized())
            .map(|slot| slot.key().clone())
            .collect();
        names.sort();
        names
    }
}
