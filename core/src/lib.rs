//! Core model types for translating OpenAPI schema definitions into a
//! relational database design.
//!
//! This crate defines two layers of data:
//!
//! - The **intermediate schema model**, a database-agnostic view of the
//!   OpenAPI `components.schemas` section: [`Schema`], [`SchemaProperty`],
//!   [`PropertyConstraints`] and [`SchemaRelation`].
//! - The **relational model** produced for one target [`Dialect`]:
//!   [`Table`], [`Column`], [`Index`], [`ForeignKey`] and [`Relationship`],
//!   bundled as a [`DatabaseSchema`].
//!
//! It also carries the pipeline configuration ([`PipelineConfig`]), the
//! table naming policy ([`TableNaming`]) and structural validation of the
//! intermediate model ([`validate_schemas`]).
//!
//! # Example
//!
//! ```
//! use specql_core::*;
//!
//! let mut user = Schema::new("User");
//! user.properties.push(SchemaProperty::new("name", AbstractType::String).required());
//! user.relations.push(SchemaRelation::new(RelationKind::OneToOne, "team", "Team"));
//!
//! assert_eq!(user.relations[0].foreign_key, "team_id");
//! assert_eq!(TableNaming::SchemaId.table_name(&user), "user");
//! assert!(validate_schemas(&[user]).is_empty());
//! ```

mod config;
mod dialect;
mod error;
mod model;
mod naming;
mod types;
mod validate;

pub use config::{
    ComplexPropertyPolicy, ManyToManyPolicy, NamingStrategy, PipelineConfig, SchemaStrategy,
};
pub use dialect::Dialect;
pub use error::{CoreError, Result};
pub use model::{
    Column, DatabaseSchema, ForeignKey, Index, ReferentialAction, Relationship,
    RelationshipKind, Table, TableKind,
};
pub use naming::{TableNaming, to_identifier};
pub use types::*;
pub use validate::{ValidationError, validate_schemas};
