//! Table naming policy.
//!
//! [`TableNaming`] is the injected policy that turns a [`Schema`] into a
//! table identifier. Each [`NamingStrategy`] has its own variant so the
//! configured strategy is always honored.

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::{NamingStrategy, PipelineConfig, Schema};

type NameFn = dyn Fn(&Schema) -> String + Send + Sync;

/// Maps schemas to table names.
///
/// # Examples
///
/// ```
/// use specql_core::{Schema, TableNaming};
///
/// let schema = Schema::new("BlogPost").with_title("Blog Post");
/// assert_eq!(TableNaming::SchemaId.table_name(&schema), "blogpost");
/// assert_eq!(TableNaming::SchemaTitle.table_name(&schema), "blog_post");
///
/// let prefixed = TableNaming::custom(|s| format!("app_{}", s.name.to_lowercase()));
/// assert_eq!(prefixed.table_name(&schema), "app_blogpost");
/// ```
#[derive(Clone, Default)]
pub enum TableNaming {
    /// Identifier built from the declared title; schemas without a usable
    /// title fall back to their key.
    SchemaTitle,
    /// The schema key, lower-cased.
    #[default]
    SchemaId,
    /// Caller-supplied mapping function.
    Custom(Arc<NameFn>),
}

impl TableNaming {
    /// Wraps a caller-supplied mapping function.
    pub fn custom(f: impl Fn(&Schema) -> String + Send + Sync + 'static) -> Self {
        Self::Custom(Arc::new(f))
    }

    /// Builds the policy selected by a configuration.
    ///
    /// [`NamingStrategy::Custom`] uses `custom_names` as the mapping; schemas
    /// missing from it keep their lower-cased key.
    pub fn from_config(config: &PipelineConfig) -> Self {
        match config.naming_strategy {
            NamingStrategy::SchemaTitle => Self::SchemaTitle,
            NamingStrategy::SchemaId => Self::SchemaId,
            NamingStrategy::Custom => Self::from_map(config.custom_names.clone()),
        }
    }

    /// Custom naming backed by an explicit schema-name → table-name map.
    pub fn from_map(names: BTreeMap<String, String>) -> Self {
        Self::custom(move |schema| {
            names
                .get(&schema.name)
                .cloned()
                .unwrap_or_else(|| schema.name.to_lowercase())
        })
    }

    /// Returns the table name for a schema.
    pub fn table_name(&self, schema: &Schema) -> String {
        match self {
            Self::SchemaId => schema.name.to_lowercase(),
            Self::SchemaTitle => schema
                .title
                .as_deref()
                .map(to_identifier)
                .filter(|name| !name.is_empty())
                .unwrap_or_else(|| schema.name.to_lowercase()),
            Self::Custom(f) => f(schema),
        }
    }
}

impl std::fmt::Debug for TableNaming {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::SchemaTitle => f.write_str("SchemaTitle"),
            Self::SchemaId => f.write_str("SchemaId"),
            Self::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

/// Converts free text into a lower-case snake_case identifier.
///
/// Runs of characters outside `[A-Za-z0-9]` collapse into one underscore;
/// leading and trailing underscores are trimmed. An identifier starting with
/// a digit is prefixed with `t_`.
///
/// # Examples
///
/// ```
/// use specql_core::to_identifier;
///
/// assert_eq!(to_identifier("Order Line-Item"), "order_line_item");
/// assert_eq!(to_identifier("  2024 Report "), "t_2024_report");
/// assert_eq!(to_identifier("***"), "");
/// ```
pub fn to_identifier(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut pending_sep = false;
    for c in text.chars() {
        if c.is_ascii_alphanumeric() {
            if pending_sep && !out.is_empty() {
                out.push('_');
            }
            pending_sep = false;
            out.push(c.to_ascii_lowercase());
        } else {
            pending_sep = true;
        }
    }
    if out.starts_with(|c: char| c.is_ascii_digit()) {
        out.insert_str(0, "t_");
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_title_falls_back_to_key() {
        let untitled = Schema::new("Invoice");
        assert_eq!(TableNaming::SchemaTitle.table_name(&untitled), "invoice");

        let symbols_only = Schema::new("Invoice").with_title("!!!");
        assert_eq!(TableNaming::SchemaTitle.table_name(&symbols_only), "invoice");
    }

    #[test]
    fn test_from_config_honors_each_strategy() {
        let schema = Schema::new("User").with_title("Application User");
        let mut config = PipelineConfig::default();

        config.naming_strategy = NamingStrategy::SchemaId;
        assert_eq!(TableNaming::from_config(&config).table_name(&schema), "user");

        config.naming_strategy = NamingStrategy::SchemaTitle;
        assert_eq!(
            TableNaming::from_config(&config).table_name(&schema),
            "application_user"
        );

        config.naming_strategy = NamingStrategy::Custom;
        config
            .custom_names
            .insert("User".to_string(), "members".to_string());
        assert_eq!(TableNaming::from_config(&config).table_name(&schema), "members");
    }

    #[test]
    fn test_custom_map_keeps_unmapped_keys() {
        let naming = TableNaming::from_map(BTreeMap::new());
        assert_eq!(naming.table_name(&Schema::new("Tag")), "tag");
    }
}
