//! Version Mapper
//!
//! Maps a requested product version to the definition key listed for it in a
//! descriptor's version table. Matching is exact on the normalized version:
//! an unlisted patch release does not inherit a neighbouring entry.

use serde::Serialize;
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use crate::error::{ResolveError, ResolveResult};
use crate::typedef::{DefinitionKey, VersionTarget};

/// A dot-delimited numeric product version such as `12.2.1.3`.
///
/// The normalized form drops leading zeros from each component, so
/// `12.02.1` and `12.2.1` are the same version.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ProductVersion {
    components: Vec<u32>,
}

/// Why a string is not a product version
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidVersion(String);

impl fmt::Display for InvalidVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?} is not a dot-delimited numeric version", self.0)
    }
}

impl std::error::Error for InvalidVersion {}

impl ProductVersion {
    /// Build a version from its numeric components
    pub fn from_components(components: impl Into<Vec<u32>>) -> Option<Self> {
        let components = components.into();
        if components.is_empty() {
            None
        } else {
            Some(Self { components })
        }
    }

    pub fn components(&self) -> &[u32] {
        &self.components
    }

    /// True if this version sorts before `other` component-wise
    pub fn is_before(&self, other: &ProductVersion) -> bool {
        self < other
    }
}

impl FromStr for ProductVersion {
    type Err = InvalidVersion;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(InvalidVersion(s.to_string()));
        }

        let mut components = Vec::new();
        for part in trimmed.split('.') {
            // u32::from_str accepts a leading '+', which is not a version digit
            if part.is_empty() || !part.bytes().all(|b| b.is_ascii_digit()) {
                return Err(InvalidVersion(s.to_string()));
            }
            let value = part.parse::<u32>().map_err(|_| InvalidVersion(s.to_string()))?;
            components.push(value);
        }
        Ok(Self { components })
    }
}

impl fmt::Display for ProductVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for component in &self.components {
            if !first {
                f.write_str(".")?;
            }
            write!(f, "{}", component)?;
            first = false;
        }
        Ok(())
    }
}

impl Serialize for ProductVersion {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// One row of a version table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionEntry {
    /// Version exactly as written in the descriptor
    pub raw: String,
    pub version: ProductVersion,
    pub target: VersionTarget,
}

/// Outcome of mapping a version that is present in the table
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VersionMatch<'a> {
    /// The version maps to a definition bundle
    Definition(&'a DefinitionKey),
    /// The version is listed as `NOT_SUPPORTED`
    Unsupported(ProductVersion),
}

/// Version table of one descriptor, in descriptor order
#[derive(Debug, Clone, Default)]
pub struct VersionTable {
    entries: Vec<VersionEntry>,
    index: HashMap<ProductVersion, usize>,
}

impl VersionTable {
    /// Build a table; the caller has already rejected duplicate versions.
    pub(crate) fn new(entries: Vec<VersionEntry>) -> Self {
        let index = entries
            .iter()
            .enumerate()
            .map(|(i, e)| (e.version.clone(), i))
            .collect();
        Self { entries, index }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in descriptor order
    pub fn entries(&self) -> impl Iterator<Item = &VersionEntry> {
        self.entries.iter()
    }

    /// Look up a version string. Unparseable input is simply absent.
    pub fn lookup(&self, version: &str) -> Option<&VersionEntry> {
        let version = version.parse::<ProductVersion>().ok()?;
        self.index.get(&version).map(|&i| &self.entries[i])
    }

    /// Known versions in ascending order, normalized
    pub fn known_versions(&self) -> Vec<String> {
        let mut versions: Vec<&ProductVersion> = self.entries.iter().map(|e| &e.version).collect();
        versions.sort();
        versions.into_iter().map(ProductVersion::to_string).collect()
    }

    /// Versions that map to a definition (not `NOT_SUPPORTED`), ascending
    pub fn supported_versions(&self) -> Vec<String> {
        let mut versions: Vec<&ProductVersion> = self
            .entries
            .iter()
            .filter(|e| !e.target.is_not_supported())
            .map(|e| &e.version)
            .collect();
        versions.sort();
        versions.into_iter().map(ProductVersion::to_string).collect()
    }

    /// The table entry for a version string, or an unknown-version error
    /// listing the known versions.
    pub fn entry_for(&self, domain_type: &str, version: &str) -> ResolveResult<&VersionEntry> {
        self.lookup(version).ok_or_else(|| ResolveError::UnknownVersion {
            domain_type: domain_type.to_string(),
            version: version.trim().to_string(),
            known: self.known_versions(),
        })
    }

    /// Map a version string to its definition key.
    ///
    /// A version marked `NOT_SUPPORTED` is a normal outcome here; only a
    /// version missing from the table is an error.
    pub fn resolve(&self, domain_type: &str, version: &str) -> ResolveResult<VersionMatch<'_>> {
        let entry = self.entry_for(domain_type, version)?;
        Ok(match &entry.target {
            VersionTarget::Definition(key) => VersionMatch::Definition(key),
            VersionTarget::NotSupported => VersionMatch::Unsupported(entry.version.clone()),
        })
    }
}
