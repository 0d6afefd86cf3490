//! Output formatting for generation results.

use std::str::FromStr;

use specql_core::CoreError;

use crate::error::Result;
use crate::pipeline::Generation;

/// Supported output formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "clap", derive(clap::ValueEnum))]
pub enum OutputFormat {
    /// DDL script, statements separated by blank lines.
    #[default]
    Sql,
    /// The relational model as JSON.
    Json,
    /// The relational model as YAML.
    Yaml,
}

impl FromStr for OutputFormat {
    type Err = CoreError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "sql" | "ddl" => Ok(Self::Sql),
            "json" => Ok(Self::Json),
            "yaml" | "yml" => Ok(Self::Yaml),
            _ => Err(CoreError::UnsupportedFormat(s.to_string())),
        }
    }
}

/// Formats a generation result in the requested output format.
pub fn format_generation(generation: &Generation, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Sql => Ok(generation.script()),
        OutputFormat::Json => Ok(serde_json::to_string_pretty(&generation.database)?),
        OutputFormat::Yaml => Ok(serde_yaml::to_string(&generation.database)?),
    }
}
