//! Error types for descriptor loading and directive resolution

use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Errors raised while locating, parsing or validating a domain type descriptor.
///
/// All of these are fatal for the domain type: no resolver can be built
/// from a descriptor that failed to load.
#[derive(Debug, Error)]
pub enum DescriptorLoadError {
    /// The descriptor text is not well-formed for the descriptor schema
    #[error("domain type {domain_type}: failed to parse descriptor {origin}: {message}")]
    Parse {
        domain_type: String,
        origin: String,
        message: String,
    },

    /// The descriptor parsed but violates a load-time invariant
    #[error("domain type {domain_type}: invalid descriptor {origin}: {reason}")]
    Validation {
        domain_type: String,
        origin: String,
        reason: String,
    },

    /// A discover filter pattern is not a valid regular expression
    #[error(
        "domain type {domain_type}: discover filter for {path} in {origin} has invalid pattern {pattern:?}: {message}"
    )]
    PatternCompile {
        domain_type: String,
        origin: String,
        path: String,
        pattern: String,
        message: String,
    },

    /// No configured source has a descriptor for the domain type
    #[error("no descriptor found for domain type {domain_type} (searched {searched})")]
    NotFound { domain_type: String, searched: String },

    /// The descriptor resource exists but could not be read
    #[error("failed to read descriptor for domain type {domain_type} from {}: {source}", .path.display())]
    Io {
        domain_type: String,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Reading the descriptor resource did not finish before the deadline
    #[error("timed out after {timeout:?} reading descriptor for domain type {domain_type}")]
    Timeout {
        domain_type: String,
        timeout: Duration,
    },
}

impl DescriptorLoadError {
    /// Name of the domain type the failed load was for
    pub fn domain_type(&self) -> &str {
        match self {
            Self::Parse { domain_type, .. }
            | Self::Validation { domain_type, .. }
            | Self::PatternCompile { domain_type, .. }
            | Self::NotFound { domain_type, .. }
            | Self::Io { domain_type, .. }
            | Self::Timeout { domain_type, .. } => domain_type,
        }
    }

    /// True for the parse/validation/pattern failures of the descriptor content itself
    pub fn is_content_error(&self) -> bool {
        matches!(
            self,
            Self::Parse { .. } | Self::Validation { .. } | Self::PatternCompile { .. }
        )
    }
}

/// Result type for descriptor loading
pub type LoadResult<T> = Result<T, DescriptorLoadError>;

/// Errors raised while resolving directives for a product version.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolveError {
    /// The version is not listed in the descriptor's version table
    #[error(
        "domain type {domain_type} does not recognize version {version} (known versions: {})",
        .known.join(", ")
    )]
    UnknownVersion {
        domain_type: String,
        version: String,
        known: Vec<String>,
    },

    /// The version is listed but explicitly marked as not supported
    #[error("domain type {domain_type} does not support version {version}")]
    UnsupportedVersion { domain_type: String, version: String },

    /// The definition uses legacy targeting on a version that targets server groups
    #[error(
        "domain type {domain_type} definition {definition} sets targeting {targeting}, which is not allowed for version {version}"
    )]
    TargetingNotSupported {
        domain_type: String,
        definition: String,
        targeting: String,
        version: String,
    },

    /// The descriptor sets a topology profile on a version that has none
    #[error(
        "domain type {domain_type} sets topology profile {profile}, which is not allowed for version {version}"
    )]
    TopologyProfileNotSupported {
        domain_type: String,
        profile: String,
        version: String,
    },

    /// A template or script references a token with no value
    #[error("domain type {domain_type}: {text:?} references unknown token @@{token}@@")]
    UnresolvedToken {
        domain_type: String,
        text: String,
        token: String,
    },
}

impl ResolveError {
    /// Name of the domain type the failed resolution was for
    pub fn domain_type(&self) -> &str {
        match self {
            Self::UnknownVersion { domain_type, .. }
            | Self::UnsupportedVersion { domain_type, .. }
            | Self::TargetingNotSupported { domain_type, .. }
            | Self::TopologyProfileNotSupported { domain_type, .. }
            | Self::UnresolvedToken { domain_type, .. } => domain_type,
        }
    }
}

/// Result type for directive resolution
pub type ResolveResult<T> = Result<T, ResolveError>;
