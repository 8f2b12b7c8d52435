//! Descriptor Loader
//!
//! Fetches a descriptor through a [`DescriptorSource`] and validates it into
//! an immutable [`DomainTypeDescriptor`]. Reading the resource is the only
//! step that can block, so it is the only step bounded by a deadline.

use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

use crate::error::{DescriptorLoadError, LoadResult};
use crate::source::{BuiltinSource, DescriptorSource, DescriptorText, LocatorConfig};
use crate::typedef::{parse_descriptor, DomainTypeDescriptor};

/// Loads descriptors by domain type name
#[derive(Clone)]
pub struct DescriptorLoader {
    source: Arc<dyn DescriptorSource>,
    read_timeout: Option<Duration>,
}

impl std::fmt::Debug for DescriptorLoader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DescriptorLoader")
            .field("source", &self.source.describe())
            .field("read_timeout", &self.read_timeout)
            .finish()
    }
}

impl DescriptorLoader {
    /// Loader over an arbitrary source, with no read deadline
    pub fn new(source: Arc<dyn DescriptorSource>) -> Self {
        Self {
            source,
            read_timeout: None,
        }
    }

    /// Loader for a search policy
    pub fn from_config(config: &LocatorConfig) -> Self {
        Self {
            source: Arc::new(config.build_source()),
            read_timeout: config.read_timeout,
        }
    }

    /// Loader over the bundled descriptors only
    pub fn builtin() -> Self {
        Self::new(Arc::new(BuiltinSource))
    }

    pub fn with_read_timeout(mut self, timeout: Duration) -> Self {
        self.read_timeout = Some(timeout);
        self
    }

    /// Load and validate the descriptor for `domain_type`
    pub async fn load(&self, domain_type: &str) -> LoadResult<DomainTypeDescriptor> {
        let text = match self.read_timeout {
            Some(timeout) => self.fetch_with_deadline(domain_type, timeout).await?,
            None => self.fetch(domain_type).await?,
        };
        self.parse(domain_type, text)
    }

    /// Load with an explicit deadline for the resource read, overriding the
    /// loader's own
    pub async fn load_with_deadline(
        &self,
        domain_type: &str,
        timeout: Duration,
    ) -> LoadResult<DomainTypeDescriptor> {
        let text = self.fetch_with_deadline(domain_type, timeout).await?;
        self.parse(domain_type, text)
    }

    /// Domain types the configured sources can provide
    pub async fn available_domain_types(&self) -> LoadResult<Vec<String>> {
        self.source.available().await
    }

    async fn fetch(&self, domain_type: &str) -> LoadResult<DescriptorText> {
        debug!(domain_type, source = %self.source.describe(), "Locating descriptor");
        self.source
            .fetch(domain_type)
            .await?
            .ok_or_else(|| DescriptorLoadError::NotFound {
                domain_type: domain_type.to_string(),
                searched: self.source.describe(),
            })
    }

    async fn fetch_with_deadline(
        &self,
        domain_type: &str,
        timeout: Duration,
    ) -> LoadResult<DescriptorText> {
        match tokio::time::timeout(timeout, self.fetch(domain_type)).await {
            Ok(result) => result,
            Err(_) => {
                warn!(domain_type, ?timeout, "Timed out reading descriptor");
                Err(DescriptorLoadError::Timeout {
                    domain_type: domain_type.to_string(),
                    timeout,
                })
            }
        }
    }

    fn parse(&self, domain_type: &str, text: DescriptorText) -> LoadResult<DomainTypeDescriptor> {
        parse_descriptor(&text.text, &text.origin, Some(domain_type))
    }
}

/// Load a descriptor with the default search policy
/// (see [`LocatorConfig::from_env`])
pub async fn load_descriptor(domain_type: &str) -> LoadResult<DomainTypeDescriptor> {
    DescriptorLoader::from_config(&LocatorConfig::from_env())
        .load(domain_type)
        .await
}
