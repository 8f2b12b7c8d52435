//! # Domain Type Definitions
//!
//! Resolves a named domain type and a product version to the provisioning
//! directives for a new domain, and decides which discovered artifacts are
//! platform-internal and should be left out of a generated model.
//!
//! ## Modules
//!
//! - `typedef` - Descriptor schema, validated types and definition registry
//! - `version` - Product versions and the version-to-definition table
//! - `filter` - Compiled discover filters per resource-type path
//! - `resolver` - Directive resolution and exclusion queries
//! - `tokens` - `@@TOKEN@@` replacement in template paths
//! - `source` - Where descriptor text comes from (directories, builtins)
//! - `loader` - Fetch and validate a descriptor by name
//! - `cache` - Process-wide descriptor cache with single-flight loads
//! - `error` - Load and resolve errors

pub mod cache;
pub mod error;
pub mod filter;
pub mod loader;
pub mod resolver;
pub mod source;
pub mod tokens;
pub mod typedef;
pub mod version;

// Re-export commonly used types
pub use cache::DescriptorCache;
pub use error::{DescriptorLoadError, LoadResult, ResolveError, ResolveResult};
pub use filter::{FilterPattern, FilterRegistry, FilterRule};
pub use loader::{load_descriptor, DescriptorLoader};
pub use resolver::{
    is_excluded, resolve_directives, resolve_version, ResolvedDomainType, ResolvedTemplates,
    Resolver,
};
pub use source::{
    BuiltinSource, DescriptorSource, DescriptorText, DirectorySource, LayeredSource, LocatorConfig,
};
pub use tokens::TokenContext;
pub use typedef::*;
pub use version::{ProductVersion, VersionEntry, VersionMatch, VersionTable};
