//! Domain type descriptor schema
//!
//! Wire format of a descriptor file, one per domain type:
//!
//! ```json
//! {
//!     "name": "JRF",
//!     "versions": { "12.2.1.4": "JRF_12CR2", "14.1.1": "NOT_SUPPORTED" },
//!     "definitions": { "JRF_12CR2": { "baseTemplate": "Basic WebLogic Server Domain" } },
//!     "discover-filters": { "/Application": [ "^em$" ] }
//! }
//! ```
//!
//! These types only describe structure. Invariants are checked when they are
//! turned into a [`DomainTypeDescriptor`](super::DomainTypeDescriptor).

use serde::{Deserialize, Deserializer};
use std::fmt;
use std::marker::PhantomData;

/// A JSON object read as a list of entries in document order.
///
/// Keeps duplicate keys so validation can report them instead of silently
/// keeping the last one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct OrderedMap<V>(pub Vec<(String, V)>);

impl<V> Default for OrderedMap<V> {
    fn default() -> Self {
        Self(Vec::new())
    }
}

impl<'de, V> Deserialize<'de> for OrderedMap<V>
where
    V: Deserialize<'de>,
{
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        use serde::de::{MapAccess, Visitor};

        struct EntriesVisitor<V>(PhantomData<V>);

        impl<'de, V> Visitor<'de> for EntriesVisitor<V>
        where
            V: Deserialize<'de>,
        {
            type Value = OrderedMap<V>;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("a JSON object")
            }

            fn visit_map<M>(self, mut map: M) -> Result<Self::Value, M::Error>
            where
                M: MapAccess<'de>,
            {
                let mut entries = Vec::with_capacity(map.size_hint().unwrap_or(0));
                while let Some((key, value)) = map.next_entry::<String, V>()? {
                    entries.push((key, value));
                }
                Ok(OrderedMap(entries))
            }
        }

        deserializer.deserialize_map(EntriesVisitor(PhantomData))
    }
}

/// Root of a descriptor file
#[derive(Debug, Deserialize)]
pub(crate) struct RawDescriptor {
    pub name: Option<String>,

    #[serde(default)]
    pub description: Option<String>,

    /// Version string to definition key (or `NOT_SUPPORTED`)
    pub versions: Option<OrderedMap<String>>,

    pub definitions: Option<OrderedMap<RawDefinition>>,

    #[serde(rename = "discover-filters")]
    pub discover_filters: Option<OrderedMap<Vec<String>>>,

    /// Pre-`discover-filters` layout keyed by short names such as `apps`
    #[serde(rename = "system-elements")]
    pub system_elements: Option<OrderedMap<Vec<String>>>,

    #[serde(rename = "topologyProfile")]
    pub topology_profile: Option<String>,
}

/// One entry of `definitions`
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RawDefinition {
    pub base_template: Option<String>,

    #[serde(default)]
    pub extension_templates: Vec<String>,

    #[serde(default)]
    pub custom_extension_templates: Vec<String>,

    #[serde(default)]
    pub server_groups_to_target: Vec<String>,

    #[serde(default)]
    pub dynamic_cluster_server_groups_to_target: Vec<String>,

    #[serde(default)]
    pub rcu_schemas: Vec<String>,

    pub targeting: Option<String>,

    pub post_create_domain_script: Option<RawPostCreateScript>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RawPostCreateScript {
    pub unix_script: Option<String>,
    pub windows_script: Option<String>,
}
