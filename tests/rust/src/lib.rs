//! Shared test utilities and fixtures for the domain type integration tests.

pub use typedef_core::{
    DescriptorCache, DescriptorLoadError, DescriptorLoader, DomainTypeDescriptor, LocatorConfig,
    ResolveError, Resolver,
};

/// Install a test subscriber once; repeated calls are no-ops.
///
/// Honors `RUST_LOG`, defaulting to debug output for the resolver crate.
pub fn init_tracing() {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,typedef_core=debug"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_test_writer()
        .try_init();
}

/// Descriptor fixtures
pub mod fixtures {
    use serde_json::{json, Value};
    use typedef_core::{parse_descriptor, DomainTypeDescriptor, LoadResult};

    /// A small but complete descriptor in the current layout
    pub fn custom_descriptor_json(name: &str) -> Value {
        json!({
            "name": name,
            "description": format!("Test domain type: {}", name),
            "versions": {
                "12.2.1.4": "CUSTOM_12CR2",
                "14.1.1": "NOT_SUPPORTED",
                "14.1.2": "CUSTOM_14"
            },
            "definitions": {
                "CUSTOM_12CR2": {
                    "baseTemplate": "Basic WebLogic Server Domain",
                    "extensionTemplates": [ "Oracle JRF" ],
                    "customExtensionTemplates": [ "@@ORACLE_HOME@@/custom/templates/acme.jar" ],
                    "serverGroupsToTarget": [ "JRF-MAN-SVR", "JRF-MAN-SVR", "ACME-SVR" ],
                    "rcuSchemas": [ "STB", "MDS" ],
                    "postCreateDomainScript": {
                        "unixScript": "@@DOMAIN_HOME@@/bin/acme.sh",
                        "windowsScript": "@@DOMAIN_HOME@@\\bin\\acme.cmd"
                    }
                },
                "CUSTOM_14": {
                    "baseTemplate": "Basic WebLogic Server Domain",
                    "extensionTemplates": [ ]
                }
            },
            "discover-filters": {
                "/Application": [ "^acme-internal.*", "^em$" ],
                "/Library": [ ]
            }
        })
    }

    /// The same filters written in the legacy `system-elements` layout
    pub fn legacy_descriptor_json(name: &str) -> Value {
        json!({
            "name": name,
            "versions": { "12.2.1.4": "LEGACY" },
            "definitions": {
                "LEGACY": { "baseTemplate": "Basic WebLogic Server Domain" }
            },
            "system-elements": {
                "apps": [ "^acme-internal.*", "^em$" ],
                "shared-libraries": [ ]
            }
        })
    }

    /// Parse a fixture as if it were loaded for domain type `name`
    pub fn parse(name: &str, json: &Value) -> LoadResult<DomainTypeDescriptor> {
        parse_descriptor(&json.to_string(), &format!("fixture:{}", name), Some(name))
    }
}

/// Descriptor directory helpers
pub mod files {
    use serde_json::Value;
    use std::path::{Path, PathBuf};
    use tempfile::TempDir;

    /// A temporary directory of `<name>.json` descriptor files
    pub struct TypedefDir {
        _temp: TempDir,
        path: PathBuf,
    }

    impl TypedefDir {
        pub fn new() -> Self {
            let temp = TempDir::new().expect("Failed to create temp dir");
            let path = temp.path().to_path_buf();
            Self { _temp: temp, path }
        }

        pub fn path(&self) -> &Path {
            &self.path
        }

        /// Write a descriptor as `<name>.json`
        pub fn write(&self, name: &str, json: &Value) -> PathBuf {
            self.write_raw(name, &serde_json::to_string_pretty(json).expect("serialize fixture"))
        }

        /// Write arbitrary text as `<name>.json`
        pub fn write_raw(&self, name: &str, text: &str) -> PathBuf {
            let file = self.path.join(format!("{}.json", name));
            std::fs::write(&file, text).expect("Failed to write descriptor");
            tracing::debug!(path = %file.display(), "Wrote test descriptor");
            file
        }
    }

    impl Default for TypedefDir {
        fn default() -> Self {
            Self::new()
        }
    }
}
