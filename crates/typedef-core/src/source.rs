//! Descriptor sources
//!
//! Where descriptor text comes from. A descriptor for domain type `X` is the
//! resource `X.json`, looked up in configured directories and then in the
//! descriptors bundled with this crate.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

use crate::error::{DescriptorLoadError, LoadResult};

/// Environment variable naming a custom configuration directory.
/// Descriptors are read from its `typedefs/` subdirectory.
pub const CUSTOM_CONFIG_ENV: &str = "WDT_CUSTOM_CONFIG";

/// Subdirectory holding descriptor files
pub const TYPEDEFS_DIR: &str = "typedefs";

const DESCRIPTOR_EXTENSION: &str = "json";

/// Default deadline for reading one descriptor resource
pub const DEFAULT_READ_TIMEOUT: Duration = Duration::from_secs(30);

/// Descriptors bundled with the crate
const BUILTIN_TYPEDEFS: &[(&str, &str)] = &[
    ("WLS", include_str!("../typedefs/WLS.json")),
    ("JRF", include_str!("../typedefs/JRF.json")),
    ("RestrictedJRF", include_str!("../typedefs/RestrictedJRF.json")),
];

/// Raw descriptor text and where it came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DescriptorText {
    pub domain_type: String,
    /// File path or `builtin:<name>`
    pub origin: String,
    pub text: String,
}

/// A place descriptor resources can be read from
#[async_trait]
pub trait DescriptorSource: Send + Sync {
    /// Read the descriptor for `domain_type`.
    ///
    /// `Ok(None)` means this source has no such descriptor.
    async fn fetch(&self, domain_type: &str) -> LoadResult<Option<DescriptorText>>;

    /// Domain types this source can provide, sorted
    async fn available(&self) -> LoadResult<Vec<String>>;

    /// Short description used in not-found errors
    fn describe(&self) -> String;
}

/// Whether `name` can safely be used as a descriptor file stem
pub fn is_valid_domain_type_name(name: &str) -> bool {
    !name.is_empty()
        && !name.contains("..")
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'))
}

/// Descriptors stored as `<dir>/<domainType>.json`
#[derive(Debug, Clone)]
pub struct DirectorySource {
    dir: PathBuf,
}

impl DirectorySource {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn descriptor_path(&self, domain_type: &str) -> PathBuf {
        self.dir
            .join(format!("{}.{}", domain_type, DESCRIPTOR_EXTENSION))
    }
}

#[async_trait]
impl DescriptorSource for DirectorySource {
    async fn fetch(&self, domain_type: &str) -> LoadResult<Option<DescriptorText>> {
        if !is_valid_domain_type_name(domain_type) {
            return Ok(None);
        }

        let path = self.descriptor_path(domain_type);
        match tokio::fs::read_to_string(&path).await {
            Ok(text) => {
                debug!(domain_type, path = %path.display(), "Read descriptor file");
                Ok(Some(DescriptorText {
                    domain_type: domain_type.to_string(),
                    origin: path.display().to_string(),
                    text,
                }))
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(DescriptorLoadError::Io {
                domain_type: domain_type.to_string(),
                path,
                source: e,
            }),
        }
    }

    async fn available(&self) -> LoadResult<Vec<String>> {
        let pattern = format!(
            "{}{}*.{}",
            glob::Pattern::escape(&self.dir.display().to_string()),
            std::path::MAIN_SEPARATOR,
            DESCRIPTOR_EXTENSION
        );

        let entries = match glob::glob(&pattern) {
            Ok(entries) => entries,
            Err(e) => {
                warn!(pattern = %pattern, "Invalid descriptor glob: {}", e);
                return Ok(Vec::new());
            }
        };

        let mut names: Vec<String> = entries
            .filter_map(Result::ok)
            .filter(|p| p.is_file())
            .filter_map(|p| p.file_stem().and_then(|s| s.to_str()).map(str::to_string))
            .filter(|name| is_valid_domain_type_name(name))
            .collect();
        names.sort();
        Ok(names)
    }

    fn describe(&self) -> String {
        self.dir.display().to_string()
    }
}

/// Descriptors compiled into the crate
#[derive(Debug, Clone, Copy, Default)]
pub struct BuiltinSource;

impl BuiltinSource {
    /// Descriptor text for a bundled domain type
    pub fn text(domain_type: &str) -> Option<&'static str> {
        BUILTIN_TYPEDEFS
            .iter()
            .find(|(name, _)| *name == domain_type)
            .map(|(_, text)| *text)
    }
}

#[async_trait]
impl DescriptorSource for BuiltinSource {
    async fn fetch(&self, domain_type: &str) -> LoadResult<Option<DescriptorText>> {
        Ok(Self::text(domain_type).map(|text| DescriptorText {
            domain_type: domain_type.to_string(),
            origin: format!("builtin:{}", domain_type),
            text: text.to_string(),
        }))
    }

    async fn available(&self) -> LoadResult<Vec<String>> {
        let mut names: Vec<String> = BUILTIN_TYPEDEFS
            .iter()
            .map(|(name, _)| name.to_string())
            .collect();
        names.sort();
        Ok(names)
    }

    fn describe(&self) -> String {
        "builtin".to_string()
    }
}

/// Sources tried in order; the first one that has the descriptor wins
#[derive(Clone, Default)]
pub struct LayeredSource {
    sources: Vec<Arc<dyn DescriptorSource>>,
}

impl LayeredSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_source(mut self, source: impl DescriptorSource + 'static) -> Self {
        self.sources.push(Arc::new(source));
        self
    }

    pub fn len(&self) -> usize {
        self.sources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }
}

impl std::fmt::Debug for LayeredSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LayeredSource")
            .field("sources", &self.describe())
            .finish()
    }
}

#[async_trait]
impl DescriptorSource for LayeredSource {
    async fn fetch(&self, domain_type: &str) -> LoadResult<Option<DescriptorText>> {
        for source in &self.sources {
            if let Some(text) = source.fetch(domain_type).await? {
                return Ok(Some(text));
            }
        }
        Ok(None)
    }

    async fn available(&self) -> LoadResult<Vec<String>> {
        let mut names = Vec::new();
        for source in &self.sources {
            names.extend(source.available().await?);
        }
        names.sort();
        names.dedup();
        Ok(names)
    }

    fn describe(&self) -> String {
        self.sources
            .iter()
            .map(|s| s.describe())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// Where to look for descriptors and how long to wait for them
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocatorConfig {
    /// Directories searched in order for `<domainType>.json`
    pub search_dirs: Vec<PathBuf>,
    /// Fall back to the bundled descriptors
    pub use_builtin: bool,
    /// Deadline for reading one descriptor, `None` to wait indefinitely
    pub read_timeout: Option<Duration>,
}

impl Default for LocatorConfig {
    fn default() -> Self {
        Self {
            search_dirs: Vec::new(),
            use_builtin: true,
            read_timeout: Some(DEFAULT_READ_TIMEOUT),
        }
    }
}

impl LocatorConfig {
    /// Builtin descriptors only
    pub fn builtin_only() -> Self {
        Self::default()
    }

    /// The default search policy: `$WDT_CUSTOM_CONFIG/typedefs`, then the
    /// user configuration directory, then the builtins.
    pub fn from_env() -> Self {
        let custom = std::env::var_os(CUSTOM_CONFIG_ENV)
            .filter(|v| !v.is_empty())
            .map(PathBuf::from);
        Self::from_parts(custom, dirs::config_dir())
    }

    fn from_parts(custom_config: Option<PathBuf>, user_config: Option<PathBuf>) -> Self {
        let mut search_dirs = Vec::new();
        if let Some(dir) = custom_config {
            search_dirs.push(dir.join(TYPEDEFS_DIR));
        }
        if let Some(dir) = user_config {
            search_dirs.push(dir.join("wdt").join(TYPEDEFS_DIR));
        }
        Self {
            search_dirs,
            ..Self::default()
        }
    }

    pub fn with_search_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.search_dirs.push(dir.into());
        self
    }

    pub fn with_builtin(mut self, use_builtin: bool) -> Self {
        self.use_builtin = use_builtin;
        self
    }

    pub fn with_read_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.read_timeout = timeout;
        self
    }

    /// Build the layered source for this policy
    pub fn build_source(&self) -> LayeredSource {
        let mut source = LayeredSource::new();
        for dir in &self.search_dirs {
            source = source.with_source(DirectorySource::new(dir.clone()));
        }
        if self.use_builtin {
            source = source.with_source(BuiltinSource);
        }
        source
    }
}
