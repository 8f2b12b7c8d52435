//! Descriptor validation
//!
//! Turns a parsed [`RawDescriptor`] into an immutable
//! [`DomainTypeDescriptor`], checking every load-time invariant and compiling
//! every discover filter. Nothing is deferred to query time.

use std::collections::{HashMap, HashSet};
use tracing::{debug, info, warn};

use super::schema::{OrderedMap, RawDefinition, RawDescriptor};
use super::types::*;
use crate::error::{DescriptorLoadError, LoadResult};
use crate::filter::{FilterPattern, FilterRegistry, FilterRule};
use crate::version::{ProductVersion, VersionEntry, VersionTable};

/// Legacy `system-elements` keys and the resource-type paths they stand for
pub const SYSTEM_ELEMENT_PATHS: &[(&str, &str)] = &[
    ("apps", "/Application"),
    ("coherence-clusters", "/CoherenceClusterSystemResource"),
    ("datasources", "/JDBCSystemResource"),
    ("file-stores", "/FileStore"),
    ("jms", "/JMSSystemResource"),
    ("jms-server", "/JMSServer"),
    ("shared-libraries", "/Library"),
    ("shutdown-classes", "/ShutdownClass"),
    ("startup-classes", "/StartupClass"),
    ("wldf", "/WLDFSystemResource"),
];

/// Resource-type path for a legacy `system-elements` key
pub fn system_element_path(key: &str) -> Option<&'static str> {
    SYSTEM_ELEMENT_PATHS
        .iter()
        .find(|(legacy, _)| *legacy == key)
        .map(|(_, path)| *path)
}

/// Parse and validate descriptor text.
///
/// `expected` is the domain type name the caller asked for; when given, the
/// descriptor's own `name` must match it. `origin` only labels errors.
pub fn parse_descriptor(
    text: &str,
    origin: &str,
    expected: Option<&str>,
) -> LoadResult<DomainTypeDescriptor> {
    let label = expected.unwrap_or("<unnamed>");
    let raw: RawDescriptor =
        serde_json::from_str(text).map_err(|e| DescriptorLoadError::Parse {
            domain_type: label.to_string(),
            origin: origin.to_string(),
            message: e.to_string(),
        })?;

    let name = match raw.name.as_deref().map(str::trim) {
        Some(name) if !name.is_empty() => name.to_string(),
        _ => {
            return Err(invalid(label, origin, "missing required field 'name'"));
        }
    };

    let ctx = Context {
        domain_type: &name,
        origin,
    };

    if let Some(expected) = expected {
        if expected != name {
            return Err(ctx.invalid(format!(
                "descriptor is named {:?} but was loaded as domain type {:?}",
                name, expected
            )));
        }
    }

    let definitions = build_definitions(&ctx, raw.definitions)?;
    let versions = build_versions(&ctx, raw.versions, &definitions)?;
    let discover_filters = build_filters(&ctx, raw.discover_filters, raw.system_elements)?;

    let topology_profile = raw
        .topology_profile
        .as_deref()
        .map(|p| p.parse::<TopologyProfile>().map_err(|e| ctx.invalid(e)))
        .transpose()?;

    info!(
        domain_type = %name,
        origin = %origin,
        versions = versions.len(),
        definitions = definitions.len(),
        filters = discover_filters.len(),
        "Loaded domain type descriptor"
    );

    Ok(DomainTypeDescriptor {
        name,
        description: raw.description,
        origin: origin.to_string(),
        topology_profile,
        versions,
        definitions,
        discover_filters,
    })
}

struct Context<'a> {
    domain_type: &'a str,
    origin: &'a str,
}

impl Context<'_> {
    fn invalid(&self, reason: impl Into<String>) -> DescriptorLoadError {
        invalid(self.domain_type, self.origin, reason)
    }
}

fn invalid(domain_type: &str, origin: &str, reason: impl Into<String>) -> DescriptorLoadError {
    DescriptorLoadError::Validation {
        domain_type: domain_type.to_string(),
        origin: origin.to_string(),
        reason: reason.into(),
    }
}

fn build_definitions(
    ctx: &Context<'_>,
    raw: Option<OrderedMap<RawDefinition>>,
) -> LoadResult<DefinitionRegistry> {
    let raw = raw.ok_or_else(|| ctx.invalid("missing required field 'definitions'"))?;

    let mut seen = HashSet::new();
    let mut definitions = Vec::with_capacity(raw.0.len());
    for (key, def) in raw.0 {
        if key.trim().is_empty() {
            return Err(ctx.invalid("definition key must not be empty"));
        }
        if key == NOT_SUPPORTED {
            return Err(ctx.invalid(format!(
                "{} is reserved and cannot name a definition",
                NOT_SUPPORTED
            )));
        }
        if !seen.insert(key.clone()) {
            return Err(ctx.invalid(format!("definition {} is declared more than once", key)));
        }
        let definition = build_definition(ctx, &key, def)?;
        definitions.push((DefinitionKey::new(key), definition));
    }
    Ok(DefinitionRegistry::new(definitions))
}

fn build_definition(
    ctx: &Context<'_>,
    key: &str,
    raw: RawDefinition,
) -> LoadResult<DomainTypeDefinition> {
    let base_template = match raw.base_template {
        Some(base) if !base.trim().is_empty() => base,
        _ => {
            return Err(ctx.invalid(format!("definition {} has no baseTemplate", key)));
        }
    };

    let targeting = raw
        .targeting
        .as_deref()
        .map(|t| {
            t.parse::<TargetingType>()
                .map_err(|e| ctx.invalid(format!("definition {}: {}", key, e)))
        })
        .transpose()?;

    let post_create_script = raw.post_create_domain_script.map(|s| PostCreateScript {
        unix_script: s.unix_script,
        windows_script: s.windows_script,
    });

    Ok(DomainTypeDefinition {
        base_template,
        extension_templates: raw.extension_templates,
        custom_extension_templates: raw.custom_extension_templates,
        server_groups_to_target: dedup(raw.server_groups_to_target),
        dynamic_cluster_server_groups_to_target: dedup(raw.dynamic_cluster_server_groups_to_target),
        rcu_schemas: dedup(raw.rcu_schemas),
        targeting,
        post_create_script,
    })
}

/// Drop repeated elements, keeping the first occurrence
fn dedup(values: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::new();
    values
        .into_iter()
        .filter(|v| seen.insert(v.clone()))
        .collect()
}

fn build_versions(
    ctx: &Context<'_>,
    raw: Option<OrderedMap<String>>,
    definitions: &DefinitionRegistry,
) -> LoadResult<VersionTable> {
    let raw = raw.ok_or_else(|| ctx.invalid("missing required field 'versions'"))?;
    if raw.0.is_empty() {
        return Err(ctx.invalid("'versions' must list at least one version"));
    }

    let mut seen: HashMap<ProductVersion, String> = HashMap::new();
    let mut entries = Vec::with_capacity(raw.0.len());
    for (raw_version, key) in raw.0 {
        let version: ProductVersion = raw_version
            .parse()
            .map_err(|e| ctx.invalid(format!("version table: {}", e)))?;

        if let Some(previous) = seen.insert(version.clone(), raw_version.clone()) {
            return Err(ctx.invalid(format!(
                "versions {:?} and {:?} are the same version",
                previous, raw_version
            )));
        }

        let target = if key == NOT_SUPPORTED {
            VersionTarget::NotSupported
        } else {
            let key = DefinitionKey::new(key);
            if !definitions.contains(&key) {
                return Err(ctx.invalid(format!(
                    "version {} maps to definition {}, which is not in 'definitions'",
                    raw_version, key
                )));
            }
            VersionTarget::Definition(key)
        };

        entries.push(VersionEntry {
            raw: raw_version,
            version,
            target,
        });
    }

    for key in definitions.keys() {
        let referenced = entries
            .iter()
            .any(|e| matches!(&e.target, VersionTarget::Definition(k) if k == key));
        if !referenced {
            debug!(
                domain_type = %ctx.domain_type,
                definition = %key,
                "Definition is not referenced by any version"
            );
        }
    }

    Ok(VersionTable::new(entries))
}

fn build_filters(
    ctx: &Context<'_>,
    discover_filters: Option<OrderedMap<Vec<String>>>,
    system_elements: Option<OrderedMap<Vec<String>>>,
) -> LoadResult<FilterRegistry> {
    let entries = match (discover_filters, system_elements) {
        (Some(filters), legacy) => {
            if legacy.is_some() {
                info!(
                    domain_type = %ctx.domain_type,
                    origin = %ctx.origin,
                    "Descriptor has both discover-filters and system-elements; using discover-filters"
                );
            }
            filters.0
        }
        (None, Some(legacy)) => {
            warn!(
                domain_type = %ctx.domain_type,
                origin = %ctx.origin,
                "Descriptor uses deprecated system-elements; rename it to discover-filters"
            );
            translate_system_elements(ctx, legacy)?
        }
        (None, None) => Vec::new(),
    };

    let mut seen = HashSet::new();
    let mut rules = Vec::with_capacity(entries.len());
    for (path, patterns) in entries {
        if !path.starts_with('/') || path.len() < 2 {
            return Err(ctx.invalid(format!(
                "discover filter path {:?} must be a resource-type path such as /Application",
                path
            )));
        }
        if !seen.insert(path.clone()) {
            return Err(ctx.invalid(format!(
                "discover filters for {} are declared more than once",
                path
            )));
        }

        let compiled = patterns
            .iter()
            .map(|pattern| {
                FilterPattern::compile(pattern).map_err(|e| DescriptorLoadError::PatternCompile {
                    domain_type: ctx.domain_type.to_string(),
                    origin: ctx.origin.to_string(),
                    path: path.clone(),
                    pattern: pattern.clone(),
                    message: e.to_string(),
                })
            })
            .collect::<LoadResult<Vec<_>>>()?;

        rules.push(FilterRule::new(path, compiled));
    }
    Ok(FilterRegistry::new(rules))
}

fn translate_system_elements(
    ctx: &Context<'_>,
    legacy: OrderedMap<Vec<String>>,
) -> LoadResult<Vec<(String, Vec<String>)>> {
    legacy
        .0
        .into_iter()
        .map(|(key, patterns)| match system_element_path(&key) {
            Some(path) => Ok((path.to_string(), patterns)),
            None => Err(ctx.invalid(format!(
                "unknown system-elements key {:?}",
                key
            ))),
        })
        .collect()
}
