//! Validated domain type definitions
//!
//! These are built once by the loader and never mutated afterwards.

use serde::Serialize;
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use tracing::error;

use crate::filter::FilterRegistry;
use crate::version::VersionTable;

/// Reserved definition key marking a version as recognized but unsupported
pub const NOT_SUPPORTED: &str = "NOT_SUPPORTED";

/// Name of a directive bundle in a descriptor's `definitions` table
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct DefinitionKey(String);

impl DefinitionKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DefinitionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// What a version table entry points at
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VersionTarget {
    Definition(DefinitionKey),
    NotSupported,
}

impl VersionTarget {
    pub fn is_not_supported(&self) -> bool {
        matches!(self, Self::NotSupported)
    }
}

/// Legacy targeting mode for releases that predate server groups
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TargetingType {
    SetServerGroups,
    ApplyJrf,
}

impl TargetingType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SetServerGroups => "SET_SERVER_GROUPS",
            Self::ApplyJrf => "APPLY_JRF",
        }
    }
}

impl FromStr for TargetingType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "SET_SERVER_GROUPS" => Ok(Self::SetServerGroups),
            "APPLY_JRF" => Ok(Self::ApplyJrf),
            other => Err(format!(
                "unknown targeting {:?}, expected SET_SERVER_GROUPS or APPLY_JRF",
                other
            )),
        }
    }
}

impl fmt::Display for TargetingType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Domain topology profile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TopologyProfile {
    Compact,
    Expanded,
}

impl TopologyProfile {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Compact => "Compact",
            Self::Expanded => "Expanded",
        }
    }
}

impl FromStr for TopologyProfile {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Compact" => Ok(Self::Compact),
            "Expanded" => Ok(Self::Expanded),
            other => Err(format!(
                "unknown topology profile {:?}, expected Compact or Expanded",
                other
            )),
        }
    }
}

impl fmt::Display for TopologyProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Platform a post-create script is written for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScriptPlatform {
    Unix,
    Windows,
}

impl ScriptPlatform {
    /// The platform this process runs on
    pub fn current() -> Self {
        if cfg!(windows) {
            Self::Windows
        } else {
            Self::Unix
        }
    }

    /// Descriptor field holding the script for this platform
    pub fn field_name(&self) -> &'static str {
        match self {
            Self::Unix => "unixScript",
            Self::Windows => "windowsScript",
        }
    }
}

/// Scripts to run once the domain has been created
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PostCreateScript {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) unix_script: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) windows_script: Option<String>,
}

impl PostCreateScript {
    pub fn for_platform(&self, platform: ScriptPlatform) -> Option<&str> {
        match platform {
            ScriptPlatform::Unix => self.unix_script.as_deref(),
            ScriptPlatform::Windows => self.windows_script.as_deref(),
        }
    }
}

/// One directive bundle: the templates, server groups and schemas for a
/// set of product versions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DomainTypeDefinition {
    pub(crate) base_template: String,
    pub(crate) extension_templates: Vec<String>,
    pub(crate) custom_extension_templates: Vec<String>,
    pub(crate) server_groups_to_target: Vec<String>,
    pub(crate) dynamic_cluster_server_groups_to_target: Vec<String>,
    pub(crate) rcu_schemas: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) targeting: Option<TargetingType>,
    #[serde(rename = "postCreateDomainScript", skip_serializing_if = "Option::is_none")]
    pub(crate) post_create_script: Option<PostCreateScript>,
}

impl DomainTypeDefinition {
    pub fn base_template(&self) -> &str {
        &self.base_template
    }

    /// Extension templates in application order
    pub fn extension_templates(&self) -> &[String] {
        &self.extension_templates
    }

    pub fn custom_extension_templates(&self) -> &[String] {
        &self.custom_extension_templates
    }

    /// Server groups, unique, in descriptor order
    pub fn server_groups_to_target(&self) -> &[String] {
        &self.server_groups_to_target
    }

    pub fn dynamic_cluster_server_groups_to_target(&self) -> &[String] {
        &self.dynamic_cluster_server_groups_to_target
    }

    pub fn rcu_schemas(&self) -> &[String] {
        &self.rcu_schemas
    }

    pub fn targeting(&self) -> Option<TargetingType> {
        self.targeting
    }

    pub fn post_create_script(&self) -> Option<&PostCreateScript> {
        self.post_create_script.as_ref()
    }

    pub fn has_extension_templates(&self) -> bool {
        !self.extension_templates.is_empty()
    }

    /// An empty schema list means no database schemas are needed
    pub fn requires_rcu(&self) -> bool {
        !self.rcu_schemas.is_empty()
    }

    pub fn targets_server_group(&self, group: &str) -> bool {
        self.server_groups_to_target.iter().any(|g| g == group)
    }
}

/// Definitions of one descriptor, keyed by definition key
#[derive(Debug, Clone, Default)]
pub struct DefinitionRegistry {
    definitions: Vec<(DefinitionKey, DomainTypeDefinition)>,
    index: HashMap<DefinitionKey, usize>,
}

impl DefinitionRegistry {
    /// Build a registry; the caller has already rejected duplicate keys.
    pub(crate) fn new(definitions: Vec<(DefinitionKey, DomainTypeDefinition)>) -> Self {
        let index = definitions
            .iter()
            .enumerate()
            .map(|(i, (key, _))| (key.clone(), i))
            .collect();
        Self { definitions, index }
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }

    pub fn contains(&self, key: &DefinitionKey) -> bool {
        self.index.contains_key(key)
    }

    pub fn get(&self, key: &DefinitionKey) -> Option<&DomainTypeDefinition> {
        self.index.get(key).map(|&i| &self.definitions[i].1)
    }

    /// Keys in descriptor order
    pub fn keys(&self) -> impl Iterator<Item = &DefinitionKey> {
        self.definitions.iter().map(|(key, _)| key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&DefinitionKey, &DomainTypeDefinition)> {
        self.definitions.iter().map(|(key, def)| (key, def))
    }
}

/// A fully loaded and validated domain type descriptor.
///
/// Every definition key in the version table exists in the definition
/// registry, and every discover filter compiled. Queries against it cannot
/// fail on descriptor content.
#[derive(Debug, Clone)]
pub struct DomainTypeDescriptor {
    pub(crate) name: String,
    pub(crate) description: Option<String>,
    pub(crate) origin: String,
    pub(crate) topology_profile: Option<TopologyProfile>,
    pub(crate) versions: VersionTable,
    pub(crate) definitions: DefinitionRegistry,
    pub(crate) discover_filters: FilterRegistry,
}

impl DomainTypeDescriptor {
    /// Domain type name, e.g. `JRF`
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Where the descriptor was read from (a file path or `builtin:<name>`)
    pub fn origin(&self) -> &str {
        &self.origin
    }

    pub fn topology_profile(&self) -> Option<TopologyProfile> {
        self.topology_profile
    }

    pub fn versions(&self) -> &VersionTable {
        &self.versions
    }

    pub fn definitions(&self) -> &DefinitionRegistry {
        &self.definitions
    }

    pub fn discover_filters(&self) -> &FilterRegistry {
        &self.discover_filters
    }

    /// Definition for a key taken from this descriptor's own version table.
    ///
    /// Load-time validation guarantees the key exists; a miss is a defect.
    pub(crate) fn definition_for(&self, key: &DefinitionKey) -> &DomainTypeDefinition {
        match self.definitions.get(key) {
            Some(definition) => definition,
            None => {
                error!(
                    domain_type = %self.name,
                    key = %key,
                    "Version table references a definition that was not loaded"
                );
                panic!(
                    "domain type {} has no definition {} although its version table references it",
                    self.name, key
                );
            }
        }
    }
}
