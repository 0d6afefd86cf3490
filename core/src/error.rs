//! Error types for model and configuration operations.

use thiserror::Error;

/// Errors raised by the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    /// File I/O failure while reading or writing configuration.
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// YAML parsing or serialization failure.
    #[error("YAML error: {0}")]
    YamlError(#[from] serde_yaml::Error),

    /// The requested database dialect has no emitter.
    #[error("unsupported dialect '{0}': expected one of postgresql, mysql, mariadb, sqlite, mssql")]
    UnsupportedDialect(String),

    /// The requested output format is not implemented.
    #[error("unsupported output format '{0}': expected one of sql, json, yaml")]
    UnsupportedFormat(String),
}

/// Convenience alias for results with [`CoreError`].
pub type Result<T> = std::result::Result<T, CoreError>;
