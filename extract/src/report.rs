//! Findings collected while extracting and resolving schemas.
//!
//! Neither finding stops the walk. Malformed entries are skipped; dangling
//! references are gathered across the whole document so a caller can
//! report all of them at once.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// An entry under `components.schemas` that could not be read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Error)]
#[error("malformed schema entry {}: {reason}", location(.schema, .property))]
pub struct MalformedEntry {
    pub schema: String,
    /// Offending property, when the problem is below the schema level.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub property: Option<String>,
    pub reason: String,
}

impl MalformedEntry {
    pub(crate) fn schema(schema: &str, reason: impl Into<String>) -> Self {
        Self {
            schema: schema.to_string(),
            property: None,
            reason: reason.into(),
        }
    }

    pub(crate) fn property(schema: &str, property: &str, reason: impl Into<String>) -> Self {
        Self {
            schema: schema.to_string(),
            property: Some(property.to_string()),
            reason: reason.into(),
        }
    }

    /// `Schema` or `Schema.property`.
    pub fn location(&self) -> String {
        location(&self.schema, &self.property)
    }
}

fn location(schema: &str, property: &Option<String>) -> String {
    match property {
        Some(property) => format!("{schema}.{property}"),
        None => schema.to_string(),
    }
}

/// A relation whose target schema does not exist in the document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Error)]
#[error("{schema}.{property} references unknown schema {target}")]
pub struct DanglingReference {
    pub schema: String,
    pub property: String,
    pub target: String,
}
