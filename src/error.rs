//! Error handling types and utilities.

use thiserror::Error;

/// A specialized Result type for apidocs-mcp I/O boundaries.
///
/// This is an alias for `anyhow::Result` with context added via `.context()` and
/// `.with_context()` where documents and manifests are read from disk.
pub type Result<T> = anyhow::Result<T>;

/// A source document that could not be decoded at all.
///
/// Only the affected source ends up empty; other sources in the same batch are
/// parsed and indexed normally.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("document root is not a mapping")]
    NotAnObject,
    #[error("document is not valid UTF-8: {0}")]
    Encoding(#[from] std::string::FromUtf8Error),
}

/// A malformed search request.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvalidQuery {
    #[error("empty query")]
    EmptyQuery,
    #[error("limit must be positive, got {limit}")]
    NonPositiveLimit { limit: i64 },
}

/// A lookup that matched nothing.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NotFound {
    #[error("endpoint '{key}' not found")]
    Endpoint { key: String },
    #[error("API '{api_name}' not found")]
    Api {
        api_name: String,
        suggestions: Vec<String>,
    },
    #[error("section '{section}' not found in API '{api_name}'")]
    Section {
        api_name: String,
        section: String,
        suggestions: Vec<String>,
    },
}

impl NotFound {
    /// Closest known names, best first.
    pub fn suggestions(&self) -> &[String] {
        match self {
            Self::Endpoint { .. } => &[],
            Self::Api { suggestions, .. } | Self::Section { suggestions, .. } => suggestions,
        }
    }
}

/// Any query-time failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueryError {
    #[error(transparent)]
    Invalid(#[from] InvalidQuery),
    #[error(transparent)]
    NotFound(#[from] NotFound),
}
