//! Directive Resolver
//!
//! Answers "given domain type X and version V, what are the provisioning
//! directives?" and "is candidate N at resource-type path P excluded?".
//! Every query is a pure lookup over an already loaded descriptor.

use lazy_static::lazy_static;
use regex::Regex;
use std::sync::Arc;
use tracing::debug;

use crate::error::{ResolveError, ResolveResult};
use crate::filter::FilterPattern;
use crate::tokens::TokenContext;
use crate::typedef::{
    DefinitionKey, DomainTypeDefinition, DomainTypeDescriptor, ScriptPlatform, TargetingType,
    TopologyProfile, VersionTarget,
};
use crate::version::{ProductVersion, VersionMatch};

lazy_static! {
    static ref JRF_TEMPLATE_REGEX: Regex =
        Regex::new(r"^(.*jrf_template[0-9._]*\.jar)|^(Oracle JRF)$").unwrap();
    static ref RESTRICTED_JRF_TEMPLATE_REGEX: Regex =
        Regex::new(r"^(Oracle Restricted JRF)$").unwrap();
    /// First release that targets server groups instead of legacy targeting
    static ref SERVER_GROUPS_SINCE: ProductVersion =
        ProductVersion::from_components(vec![12, 2, 1]).unwrap();
}

/// Server group that marks a JRF domain
pub const JRF_SERVER_GROUP: &str = "JRF-MAN-SVR";

/// Map `version` to its definition key, or report it as unsupported.
///
/// Fails only when the version is absent from the table.
pub fn resolve_version<'a>(
    descriptor: &'a DomainTypeDescriptor,
    version: &str,
) -> ResolveResult<VersionMatch<'a>> {
    descriptor.versions().resolve(descriptor.name(), version)
}

/// Directives for `version` of the descriptor's domain type
pub fn resolve_directives<'a>(
    descriptor: &'a DomainTypeDescriptor,
    version: &str,
) -> ResolveResult<&'a DomainTypeDefinition> {
    resolve_entry(descriptor, version).map(|(_, _, definition)| definition)
}

/// Whether `name` at `resource_type_path` is a platform-internal artifact
pub fn is_excluded(
    descriptor: &DomainTypeDescriptor,
    resource_type_path: &str,
    name: &str,
) -> bool {
    descriptor.discover_filters().is_excluded(resource_type_path, name)
}

fn resolve_entry<'a>(
    descriptor: &'a DomainTypeDescriptor,
    version: &str,
) -> ResolveResult<(&'a ProductVersion, &'a DefinitionKey, &'a DomainTypeDefinition)> {
    let entry = descriptor.versions().entry_for(descriptor.name(), version)?;
    match &entry.target {
        VersionTarget::Definition(key) => {
            debug!(
                domain_type = %descriptor.name(),
                version = %entry.version,
                definition = %key,
                "Resolved domain type definition"
            );
            Ok((&entry.version, key, descriptor.definition_for(key)))
        }
        VersionTarget::NotSupported => {
            debug!(
                domain_type = %descriptor.name(),
                version = %entry.version,
                "Version is marked NOT_SUPPORTED"
            );
            Err(ResolveError::UnsupportedVersion {
                domain_type: descriptor.name().to_string(),
                version: entry.version.to_string(),
            })
        }
    }
}

/// Query handle for one loaded domain type.
///
/// Cheap to clone; clones share the same immutable descriptor and can be
/// used from any number of threads.
#[derive(Debug, Clone)]
pub struct Resolver {
    descriptor: Arc<DomainTypeDescriptor>,
}

impl Resolver {
    pub fn new(descriptor: impl Into<Arc<DomainTypeDescriptor>>) -> Self {
        Self {
            descriptor: descriptor.into(),
        }
    }

    pub fn descriptor(&self) -> &DomainTypeDescriptor {
        &self.descriptor
    }

    pub fn domain_type(&self) -> &str {
        self.descriptor.name()
    }

    /// Provisioning directives for a product version
    pub fn resolve(&self, version: &str) -> ResolveResult<&DomainTypeDefinition> {
        resolve_directives(&self.descriptor, version)
    }

    /// Directives for a version together with the descriptor-level settings
    /// that apply to it.
    ///
    /// Also rejects legacy targeting on releases that target server groups,
    /// and topology profiles on releases that predate them.
    pub fn resolve_domain_type(&self, version: &str) -> ResolveResult<ResolvedDomainType<'_>> {
        let (version, key, definition) = resolve_entry(&self.descriptor, version)?;
        let resolved = ResolvedDomainType {
            descriptor: &*self.descriptor,
            version,
            key,
            definition,
        };
        resolved.check_version_features()?;
        Ok(resolved)
    }

    pub fn is_excluded(&self, resource_type_path: &str, name: &str) -> bool {
        is_excluded(&self.descriptor, resource_type_path, name)
    }

    /// The discover filter that excludes `name`, for diagnostics
    pub fn matching_filter(&self, resource_type_path: &str, name: &str) -> Option<&FilterPattern> {
        self.descriptor
            .discover_filters()
            .matching_filter(resource_type_path, name)
    }

    /// Whether the whole folder at `resource_type_path` is filtered when no
    /// candidate name is given
    pub fn excludes_folder(&self, resource_type_path: &str) -> bool {
        self.descriptor
            .discover_filters()
            .excludes_folder(resource_type_path)
    }
}

/// A definition resolved for one version, with descriptor context
#[derive(Debug, Clone)]
pub struct ResolvedDomainType<'a> {
    descriptor: &'a DomainTypeDescriptor,
    version: &'a ProductVersion,
    key: &'a DefinitionKey,
    definition: &'a DomainTypeDefinition,
}

/// Template names with `@@TOKEN@@` placeholders substituted
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedTemplates {
    pub base_template: String,
    pub extension_templates: Vec<String>,
    pub custom_extension_templates: Vec<String>,
}

impl<'a> ResolvedDomainType<'a> {
    pub fn domain_type(&self) -> &'a str {
        self.descriptor.name()
    }

    pub fn version(&self) -> &'a ProductVersion {
        self.version
    }

    pub fn definition_key(&self) -> &'a DefinitionKey {
        self.key
    }

    pub fn definition(&self) -> &'a DomainTypeDefinition {
        self.definition
    }

    pub fn has_extension_templates(&self) -> bool {
        self.definition.has_extension_templates()
    }

    pub fn requires_rcu(&self) -> bool {
        self.definition.requires_rcu()
    }

    /// JRF domains apply the JRF template or target the JRF server group.
    /// Restricted JRF does not count.
    pub fn is_jrf_domain_type(&self) -> bool {
        if self.is_restricted_jrf_domain_type() {
            return false;
        }
        self.definition
            .extension_templates()
            .iter()
            .any(|t| JRF_TEMPLATE_REGEX.is_match(t))
            || self.definition.targets_server_group(JRF_SERVER_GROUP)
    }

    pub fn is_restricted_jrf_domain_type(&self) -> bool {
        self.definition
            .extension_templates()
            .iter()
            .any(|t| RESTRICTED_JRF_TEMPLATE_REGEX.is_match(t))
    }

    pub fn targeting(&self) -> Option<TargetingType> {
        self.definition.targeting()
    }

    pub fn topology_profile(&self) -> Option<TopologyProfile> {
        self.descriptor.topology_profile()
    }

    /// Post-create script for `platform`, unresolved
    pub fn post_create_script(&self, platform: ScriptPlatform) -> Option<&'a str> {
        self.definition
            .post_create_script()
            .and_then(|s| s.for_platform(platform))
    }

    /// Substitute tokens in the base, extension and custom extension templates.
    ///
    /// The stored definition is left untouched.
    pub fn resolve_paths(&self, tokens: &TokenContext) -> ResolveResult<ResolvedTemplates> {
        let resolve_all = |templates: &[String]| {
            templates
                .iter()
                .map(|t| self.replace_tokens(tokens, t))
                .collect::<ResolveResult<Vec<_>>>()
        };

        Ok(ResolvedTemplates {
            base_template: self.replace_tokens(tokens, self.definition.base_template())?,
            extension_templates: resolve_all(self.definition.extension_templates())?,
            custom_extension_templates: resolve_all(self.definition.custom_extension_templates())?,
        })
    }

    /// Post-create script for `platform` with tokens substituted
    pub fn resolve_post_create_script(
        &self,
        platform: ScriptPlatform,
        tokens: &TokenContext,
    ) -> ResolveResult<Option<String>> {
        match self.post_create_script(platform) {
            Some(script) => {
                let resolved = self.replace_tokens(tokens, script)?;
                debug!(
                    domain_type = %self.domain_type(),
                    definition = %self.key,
                    field = platform.field_name(),
                    script = %resolved,
                    "Resolved post-create script"
                );
                Ok(Some(resolved))
            }
            None => Ok(None),
        }
    }

    fn replace_tokens(&self, tokens: &TokenContext, text: &str) -> ResolveResult<String> {
        tokens
            .replace(text)
            .map_err(|token| ResolveError::UnresolvedToken {
                domain_type: self.domain_type().to_string(),
                text: text.to_string(),
                token,
            })
    }

    fn check_version_features(&self) -> ResolveResult<()> {
        let server_groups_supported = !self.version.is_before(&SERVER_GROUPS_SINCE);

        if let Some(targeting) = self.targeting() {
            if server_groups_supported {
                return Err(ResolveError::TargetingNotSupported {
                    domain_type: self.domain_type().to_string(),
                    definition: self.key.to_string(),
                    targeting: targeting.to_string(),
                    version: self.version.to_string(),
                });
            }
        }

        if let Some(profile) = self.topology_profile() {
            if !server_groups_supported {
                return Err(ResolveError::TopologyProfileNotSupported {
                    domain_type: self.domain_type().to_string(),
                    profile: profile.to_string(),
                    version: self.version.to_string(),
                });
            }
        }
        Ok(())
    }
}
