//! Pipeline configuration.
//!
//! Defines the YAML-serializable record that selects the target dialect and
//! the policies applied while translating schemas into tables. Every field
//! has a default, so a partial file (or an empty one) is valid.
//!
//! # Example YAML
//!
//! ```yaml
//! dialect: postgresql
//! naming_strategy: schema_id
//! schema_strategy: one_table_per_schema
//! many_to_many: symmetric_arrays
//! complex_properties: native_json_or_drop
//! custom_names:
//!   User: app_users
//! allow_dangling: false
//! ```

use std::collections::BTreeMap;
use std::io::{BufReader, BufWriter};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::Dialect;
use crate::error::Result;

/// How a schema name becomes a table identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum NamingStrategy {
    /// Identifier derived from the schema's declared `title`.
    SchemaTitle,
    /// The schema key, lower-cased.
    #[default]
    SchemaId,
    /// Caller-supplied mapping.
    Custom,
}

/// Whether related structures become separate tables or are flattened.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SchemaStrategy {
    /// Every object schema becomes exactly one table.
    #[default]
    OneTablePerSchema,
    /// Inline objects and scalar references are flattened into the parent.
    Denormalized,
}

/// When a pairwise reference is upgraded to a join table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ManyToManyPolicy {
    /// Only references carrying an explicit `x-join-table`.
    ExplicitJoinTable,
    /// Only pairs of schemas holding array references to each other.
    #[default]
    SymmetricArrays,
}

/// What happens to array/object properties on dialects without native JSON.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ComplexPropertyPolicy {
    /// Native JSON column where available, otherwise dropped with a warning.
    #[default]
    NativeJsonOrDrop,
    /// Native JSON column where available, otherwise a text column.
    TextFallback,
}

/// Configuration record for one pipeline run.
///
/// # Examples
///
/// ```
/// use specql_core::{Dialect, ManyToManyPolicy, PipelineConfig};
///
/// let config: PipelineConfig = serde_yaml::from_str("dialect: sqlite").unwrap();
/// assert_eq!(config.dialect, Dialect::Sqlite);
/// assert_eq!(config.many_to_many, ManyToManyPolicy::SymmetricArrays);
/// assert!(!config.allow_dangling);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub dialect: Dialect,
    pub naming_strategy: NamingStrategy,
    pub schema_strategy: SchemaStrategy,
    pub many_to_many: ManyToManyPolicy,
    pub complex_properties: ComplexPropertyPolicy,
    /// Schema name → table name, consulted by [`NamingStrategy::Custom`].
    pub custom_names: BTreeMap<String, String>,
    /// Drop references to unknown schemas with a warning instead of failing.
    pub allow_dangling: bool,
}

impl PipelineConfig {
    /// Creates the default configuration for a dialect.
    pub fn for_dialect(dialect: Dialect) -> Self {
        Self {
            dialect,
            ..Self::default()
        }
    }

    /// Loads configuration from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns [`IoError`](crate::CoreError::IoError) if the file cannot
    /// be read, or [`YamlError`](crate::CoreError::YamlError) if parsing
    /// fails.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let file = std::fs::File::open(path)?;
        let reader = BufReader::new(file);
        let config = serde_yaml::from_reader(reader)?;
        Ok(config)
    }

    /// Saves the configuration as YAML.
    ///
    /// # Errors
    ///
    /// Returns [`IoError`](crate::CoreError::IoError) if the file cannot
    /// be written, or [`YamlError`](crate::CoreError::YamlError) if
    /// serialization fails.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let file = std::fs::File::create(path)?;
        let writer = BufWriter::new(file);
        serde_yaml::to_writer(writer, self)?;
        Ok(())
    }
}
