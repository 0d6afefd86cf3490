//! Error types for document loading and extraction.

use thiserror::Error;

/// Errors raised while loading an OpenAPI document.
///
/// Problems inside `components.schemas` are not errors: they are recorded
/// as [`MalformedEntry`](crate::MalformedEntry) values and extraction goes on.
#[derive(Debug, Error)]
pub enum ExtractError {
    /// File I/O failure.
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// JSON parsing failure.
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// YAML parsing failure.
    #[error("YAML error: {0}")]
    YamlError(#[from] serde_yaml::Error),

    /// The document root is not a mapping.
    #[error("OpenAPI document root must be an object, found {0}")]
    InvalidDocument(&'static str),
}

/// Convenience alias for results with [`ExtractError`].
pub type Result<T> = std::result::Result<T, ExtractError>;
