//! OpenAPI schema extraction and relationship resolution.
//!
//! This crate turns a parsed OpenAPI document into the intermediate model
//! from `specql-core`: one [`Schema`] per object schema under
//! `components.schemas`, with references split out as relations.
//!
//! # Main entry points
//!
//! - [`load_document`] / [`parse_document`]: read JSON or YAML with key
//!   order preserved.
//! - [`extract_schemas`] / [`extract_with_options`]: walk the schema map.
//! - [`resolve_relationships`]: classify many-to-many pairs, place
//!   one-to-many foreign keys, and collect dangling references.
//! - [`flatten_references`]: inline scalar references for the denormalized
//!   strategy.
//! - [`extract`]: all of the above driven by a [`PipelineConfig`].
//!
//! # Example
//!
//! ```
//! use specql_core::{PipelineConfig, RelationKind};
//! use specql_extract::{DocumentFormat, extract, parse_document};
//!
//! let yaml = r#"
//! openapi: 3.0.3
//! components:
//!   schemas:
//!     Post:
//!       type: object
//!       properties:
//!         title: { type: string }
//!         tags:
//!           type: array
//!           items: { $ref: '#/components/schemas/Tag' }
//!     Tag:
//!       type: object
//!       properties:
//!         label: { type: string }
//!         posts:
//!           type: array
//!           items: { $ref: '#/components/schemas/Post' }
//! "#;
//!
//! let document = parse_document(yaml, DocumentFormat::Yaml).unwrap();
//! let resolved = extract(&document, &PipelineConfig::default());
//!
//! assert!(resolved.dangling.is_empty());
//! let post = &resolved.schemas[0];
//! assert_eq!(post.relations[0].kind, RelationKind::ManyToMany);
//! assert_eq!(post.relations[0].join_table.as_deref(), Some("post_tag"));
//! ```
//!
//! [`Schema`]: specql_core::Schema

pub mod denormalize;
pub mod error;
pub mod extractor;
pub mod loader;
pub mod report;
pub mod resolver;

pub use denormalize::flatten_references;
pub use error::{ExtractError, Result};
pub use extractor::{ExtractOptions, Extraction, extract_schemas, extract_with_options};
pub use loader::{DocumentFormat, load_document, parse_document};
pub use report::{DanglingReference, MalformedEntry};
pub use resolver::{Resolution, resolve_relationships};

use specql_core::{
    PipelineConfig, Schema, SchemaStrategy, TableNaming, ValidationError, validate_schemas,
};

/// Schemas with resolved relations, plus everything found along the way.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResolvedSchemas {
    /// Schemas in document order, `relations` replaced by the resolved set.
    pub schemas: Vec<Schema>,
    pub malformed: Vec<MalformedEntry>,
    pub dangling: Vec<DanglingReference>,
    /// Structural problems in the extracted model, checked before resolution
    /// adds inverse relations.
    pub invalid: Vec<ValidationError>,
}

/// Extracts and resolves a document using the configured naming policy.
pub fn extract(document: &serde_json::Value, config: &PipelineConfig) -> ResolvedSchemas {
    extract_with_naming(document, config, &TableNaming::from_config(config))
}

/// Extracts and resolves a document with an explicit naming policy.
///
/// Under [`SchemaStrategy::Denormalized`], inline objects and scalar
/// references are flattened before resolution, so only array references
/// remain as relations.
pub fn extract_with_naming(
    document: &serde_json::Value,
    config: &PipelineConfig,
    naming: &TableNaming,
) -> ResolvedSchemas {
    let Extraction { schemas, malformed } =
        extract_with_options(document, &ExtractOptions::from_config(config));

    let schemas = match config.schema_strategy {
        SchemaStrategy::Denormalized => flatten_references(&schemas),
        SchemaStrategy::OneTablePerSchema => schemas,
    };

    let invalid = validate_schemas(&schemas);
    let resolution = resolve_relationships(&schemas, config.many_to_many, naming);
    ResolvedSchemas {
        schemas: resolution.apply(&schemas),
        malformed,
        dangling: resolution.dangling,
        invalid,
    }
}
