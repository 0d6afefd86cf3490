//! End-to-end generation: document in, DDL and relational model out.
//!
//! Extraction and resolution run once per document. Lowering to a dialect
//! only reads the resolved schemas, so [`generate_all`] fans the dialects
//! out across threads.

use rayon::prelude::*;
use serde_json::Value;
use specql_core::{DatabaseSchema, Dialect, PipelineConfig, TableNaming};
use specql_extract::{DanglingReference, MalformedEntry, ResolvedSchemas, extract_with_naming};
use tracing::{info, warn};

use crate::emit::{emit, render_script};
use crate::error::{DdlError, Result};
use crate::queries::{QueryFile, generate_queries};
use crate::synthesize::{SynthesisWarning, Synthesizer};

/// Everything produced for one dialect.
#[derive(Debug, Clone, PartialEq)]
pub struct Generation {
    pub dialect: Dialect,
    pub database: DatabaseSchema,
    /// DDL statements in execution order.
    pub statements: Vec<String>,
    pub warnings: Vec<SynthesisWarning>,
    /// Entries skipped during extraction.
    pub malformed: Vec<MalformedEntry>,
    /// Dropped references; only non-empty when dangling references are allowed.
    pub dangling: Vec<DanglingReference>,
}

impl Generation {
    /// The DDL script, statements separated by blank lines.
    pub fn script(&self) -> String {
        render_script(&self.statements)
    }

    /// Sample queries for every entity table.
    pub fn queries(&self) -> Vec<QueryFile> {
        generate_queries(&self.database, self.dialect)
    }
}

/// Generates DDL for the configured dialect.
///
/// # Errors
///
/// - [`DdlError::Invalid`] if the extracted model fails validation.
/// - [`DdlError::Unresolved`] if any reference points at a missing schema
///   and `allow_dangling` is off. Every dangling reference and malformed
///   entry is included.
/// - [`DdlError::DuplicateTable`] if two tables end up with the same name.
///
/// # Examples
///
/// ```
/// use serde_json::json;
/// use specql_core::PipelineConfig;
/// use specql_ddl::generate;
///
/// let document = json!({
///     "components": { "schemas": {
///         "Tag": { "type": "object", "properties": { "label": { "type": "string" } } }
///     } }
/// });
///
/// let generation = generate(&document, &PipelineConfig::default()).unwrap();
/// assert_eq!(generation.statements.len(), 1);
/// assert!(generation.script().contains("label VARCHAR(255) NULL"));
/// ```
pub fn generate(document: &Value, config: &PipelineConfig) -> Result<Generation> {
    generate_with_naming(document, config, &TableNaming::from_config(config))
}

/// Generates DDL with a caller-supplied naming policy.
pub fn generate_with_naming(
    document: &Value,
    config: &PipelineConfig,
    naming: &TableNaming,
) -> Result<Generation> {
    let resolved = prepare(document, config, naming)?;
    lower(&resolved, config, naming, config.dialect)
}

/// Generates DDL for several dialects from one extraction.
///
/// Results come back in the order of `dialects`.
pub fn generate_all(
    document: &Value,
    config: &PipelineConfig,
    dialects: &[Dialect],
) -> Result<Vec<Generation>> {
    let naming = TableNaming::from_config(config);
    let resolved = prepare(document, config, &naming)?;
    dialects
        .par_iter()
        .map(|dialect| lower(&resolved, config, &naming, *dialect))
        .collect()
}

/// Extracts, validates and resolves a document, applying the dangling
/// reference policy.
pub fn prepare(
    document: &Value,
    config: &PipelineConfig,
    naming: &TableNaming,
) -> Result<ResolvedSchemas> {
    let resolved = extract_with_naming(document, config, naming);

    if !resolved.invalid.is_empty() {
        return Err(DdlError::Invalid(resolved.invalid));
    }
    if !resolved.dangling.is_empty() {
        if !config.allow_dangling {
            return Err(DdlError::Unresolved {
                dangling: resolved.dangling,
                malformed: resolved.malformed,
            });
        }
        for dangling in &resolved.dangling {
            warn!(%dangling, "Dropping dangling reference");
        }
    }

    info!(
        schemas = resolved.schemas.len(),
        malformed = resolved.malformed.len(),
        dangling = resolved.dangling.len(),
        "Resolved schema model"
    );
    Ok(resolved)
}

/// Lowers resolved schemas to one dialect.
pub fn lower(
    resolved: &ResolvedSchemas,
    config: &PipelineConfig,
    naming: &TableNaming,
    dialect: Dialect,
) -> Result<Generation> {
    let synthesis = Synthesizer::new(&resolved.schemas, naming, dialect)
        .complex_properties(config.complex_properties)
        .synthesize()?;
    let statements = emit(&synthesis.database, dialect);

    info!(
        %dialect,
        tables = synthesis.database.tables.len(),
        statements = statements.len(),
        warnings = synthesis.warnings.len(),
        "Generated DDL"
    );

    Ok(Generation {
        dialect,
        database: synthesis.database,
        statements,
        warnings: synthesis.warnings,
        malformed: resolved.malformed.clone(),
        dangling: resolved.dangling.clone(),
    })
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use specql_core::{SchemaStrategy, ValidationError};

    use super::*;

    fn blog() -> Value {
        json!({
            "components": { "schemas": {
                "Post": {
                    "type": "object",
                    "properties": {
                        "title": { "type": "string" },
                        "author": { "$ref": "#/components/schemas/Person" }
                    }
                },
                "Broken": [1]
            } }
        })
    }

    #[test]
    fn test_dangling_references_fail_with_full_report() {
        let err = generate(&blog(), &PipelineConfig::default()).unwrap_err();
        match err {
            DdlError::Unresolved {
                dangling,
                malformed,
            } => {
                assert_eq!(dangling.len(), 1);
                assert_eq!(dangling[0].target, "Person");
                assert_eq!(malformed.len(), 1);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_allow_dangling_drops_reference() {
        let config = PipelineConfig {
            allow_dangling: true,
            ..PipelineConfig::default()
        };
        let generation = generate(&blog(), &config).unwrap();

        assert_eq!(generation.dangling.len(), 1);
        assert_eq!(generation.malformed.len(), 1);
        let post = generation.database.table("post").unwrap();
        assert!(post.column("person_id").is_none());
    }

    #[test]
    fn test_property_shadowing_foreign_key_still_generates() {
        let document = json!({
            "components": { "schemas": {
                "Post": {
                    "type": "object",
                    "properties": {
                        "user_id": { "type": "integer" },
                        "user": { "$ref": "#/components/schemas/User" }
                    }
                },
                "User": { "type": "object" }
            } }
        });
        let generation = generate(&document, &PipelineConfig::default()).unwrap();

        let post = generation.database.table("post").unwrap();
        assert_eq!(
            post.column_names(),
            ["id", "created_at", "updated_at", "user_id", "user_id_2"]
        );
        assert!(
            generation
                .statements
                .iter()
                .any(|s| s.contains("FOREIGN KEY (user_id_2)\n  REFERENCES \"user\"(id);"))
        );
    }

    #[test]
    fn test_flattened_name_clash_is_rejected() {
        let document = json!({
            "components": { "schemas": {
                "Event": {
                    "type": "object",
                    "properties": {
                        "meta": {
                            "type": "object",
                            "properties": { "source": { "type": "string" } }
                        },
                        "meta_source": { "type": "string" }
                    }
                }
            } }
        });
        let config = PipelineConfig {
            schema_strategy: SchemaStrategy::Denormalized,
            ..PipelineConfig::default()
        };
        match generate(&document, &config).unwrap_err() {
            DdlError::Invalid(errors) => assert_eq!(
                errors,
                [ValidationError::DuplicateProperty {
                    schema: "Event".to_string(),
                    property: "meta_source".to_string(),
                }]
            ),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_generate_all_keeps_dialect_order() {
        let config = PipelineConfig {
            allow_dangling: true,
            ..PipelineConfig::default()
        };
        let dialects = [Dialect::Sqlite, Dialect::PostgreSql, Dialect::MsSql];
        let generations = generate_all(&blog(), &config, &dialects).unwrap();

        let order: Vec<Dialect> = generations.iter().map(|g| g.dialect).collect();
        assert_eq!(order, dialects);
        assert!(generations[0].script().contains("PRIMARY KEY AUTOINCREMENT"));
        assert!(generations[2].script().contains("IDENTITY(1,1)"));
    }
}
