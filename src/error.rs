//! Error types for the blacklist generator.

use thiserror::Error;

/// Failure to retrieve one source.
///
/// The variants only matter for logging: the aggregator records every one of
/// them the same way (source marked failed, run continues).
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("Network error fetching {name}: {cause}")]
    Network { name: String, cause: String },

    #[error("HTTP {status} fetching {name}")]
    Status { name: String, status: u16 },

    #[error("Response for {name} too large: {size} bytes (max: {limit} bytes)")]
    TooLarge {
        name: String,
        size: usize,
        limit: usize,
    },

    #[error("Unexpected error fetching {name}: {cause}")]
    Unexpected { name: String, cause: String },
}

impl FetchError {
    /// Name of the source that failed
    pub fn source_name(&self) -> &str {
        match self {
            Self::Network { name, .. }
            | Self::Status { name, .. }
            | Self::TooLarge { name, .. }
            | Self::Unexpected { name, .. } => name,
        }
    }

    /// Whether the failure came from the transport rather than from the content
    pub fn is_network(&self) -> bool {
        matches!(self, Self::Network { .. } | Self::Status { .. })
    }
}

/// One or more list invariants were violated. No artifact may be written.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("List validation failed:\n{}", .messages.join("\n"))]
pub struct ValidationError {
    pub messages: Vec<String>,
}

/// Configuration problems detected before any source is fetched.
#[derive(Error, Debug)]
pub enum BlacklistError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Duplicate source name: {0}")]
    DuplicateSource(String),

    #[error("Source '{name}' URL must use http:// or https://: {url}")]
    InvalidUrl { name: String, url: String },
}
