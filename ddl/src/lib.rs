//! Dialect-aware table synthesis and DDL emission.
//!
//! This crate lowers the resolved schema model from `specql-extract` into
//! tables and SQL for PostgreSQL, MySQL, MariaDB, SQLite and MSSQL.
//!
//! # Main entry points
//!
//! - [`generate`]: document and configuration in, [`Generation`] out.
//! - [`generate_all`]: one extraction, several dialects in parallel.
//! - [`Synthesizer`]: resolved schemas to a [`DatabaseSchema`].
//! - [`emit`]: a [`DatabaseSchema`] to ordered DDL statements.
//! - [`map_type`] and [`build_constraints`]: the per-column building blocks.
//!
//! # Example
//!
//! ```
//! use serde_json::json;
//! use specql_core::{Dialect, PipelineConfig};
//! use specql_ddl::generate;
//!
//! let document = json!({
//!     "openapi": "3.0.3",
//!     "components": { "schemas": {
//!         "User": {
//!             "type": "object",
//!             "required": ["name"],
//!             "properties": {
//!                 "name": { "type": "string", "maxLength": 50 },
//!                 "email": { "type": "string", "format": "email", "x-unique": true }
//!             }
//!         }
//!     } }
//! });
//!
//! let config = PipelineConfig::for_dialect(Dialect::PostgreSql);
//! let generation = generate(&document, &config).unwrap();
//! let sql = generation.script();
//!
//! assert!(sql.starts_with("CREATE TABLE \"user\" ("));
//! assert!(sql.contains("name VARCHAR(255) NOT NULL CHECK (LENGTH(name) <= 50)"));
//! assert!(sql.contains("email VARCHAR(255) NULL UNIQUE"));
//! ```
//!
//! [`DatabaseSchema`]: specql_core::DatabaseSchema

pub mod constraints;
pub mod emit;
pub mod error;
pub mod ident;
pub mod output;
pub mod pipeline;
pub mod queries;
pub mod synthesize;
pub mod types;

pub use constraints::build_constraints;
pub use emit::{create_table, emit, render_script};
pub use error::{DdlError, Result};
pub use ident::{quote_ident, quote_literal};
pub use output::{OutputFormat, format_generation};
pub use pipeline::{Generation, generate, generate_all, generate_with_naming, lower, prepare};
pub use queries::{QueryFile, generate_queries};
pub use synthesize::{Synthesis, SynthesisWarning, Synthesizer, format_default};
pub use types::{
    identity_clause, key_type, map_type, map_type_name, refine_type, text_type, timestamp_default,
};
