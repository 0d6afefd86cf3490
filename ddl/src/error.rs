//! Error types for the DDL pipeline.

use specql_core::{CoreError, ValidationError};
use specql_extract::{DanglingReference, ExtractError, MalformedEntry};
use thiserror::Error;

/// Errors raised while generating DDL.
#[derive(Debug, Error)]
pub enum DdlError {
    /// Configuration or dialect/format selection failure.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// Document loading failure.
    #[error(transparent)]
    Extract(#[from] ExtractError),

    /// References to missing schemas, reported together with any entries
    /// skipped during extraction.
    #[error(
        "unresolved schema model: {} dangling reference(s), {} malformed entry(s)",
        .dangling.len(),
        .malformed.len()
    )]
    Unresolved {
        dangling: Vec<DanglingReference>,
        malformed: Vec<MalformedEntry>,
    },

    /// The extracted model failed structural validation.
    #[error("invalid schema model: {}", join(.0))]
    Invalid(Vec<ValidationError>),

    /// Two schemas map to the same table name.
    #[error("duplicate table name: {0}")]
    DuplicateTable(String),

    /// JSON serialization failure.
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// YAML serialization failure.
    #[error("YAML error: {0}")]
    YamlError(#[from] serde_yaml::Error),
}

fn join(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Convenience alias for results with [`DdlError`].
pub type Result<T> = std::result::Result<T, DdlError>;
