//! Structural validation of extracted schemas.
//!
//! Catches problems that would otherwise surface as broken DDL: empty or
//! duplicate schema names and duplicate member names. A plain property that
//! shares its name with a relation's foreign key is not an error; table
//! synthesis renames the foreign-key column. Unlike a fail-fast check,
//! every problem is collected so a caller can report them in one pass.
//!
//! # Examples
//!
//! ```
//! use specql_core::*;
//!
//! let user = Schema::new("User")
//!     .with_property(SchemaProperty::new("email", AbstractType::String));
//! assert!(validate_schemas(&[user.clone()]).is_empty());
//!
//! let errors = validate_schemas(&[user.clone(), user]);
//! assert_eq!(errors, vec![ValidationError::DuplicateSchema("User".to_string())]);
//! ```

use std::collections::HashSet;

use thiserror::Error;

use crate::Schema;

/// Schema validation errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// Schema name is empty or whitespace-only.
    #[error("schema name cannot be empty")]
    EmptySchemaName,
    /// Two schemas share a name.
    #[error("duplicate schema: {0}")]
    DuplicateSchema(String),
    /// A property has an empty name.
    #[error("schema {0} has a property with an empty name")]
    EmptyPropertyName(String),
    /// Two members of the same schema share a name.
    #[error("duplicate property in schema {schema}: {property}")]
    DuplicateProperty { schema: String, property: String },
}

/// Validates a sequence of extracted schemas, collecting every problem.
pub fn validate_schemas(schemas: &[Schema]) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    let mut seen_schemas: HashSet<&str> = HashSet::new();

    for schema in schemas {
        let name = schema.name.trim();
        if name.is_empty() {
            errors.push(ValidationError::EmptySchemaName);
            continue;
        }
        if !seen_schemas.insert(name) {
            errors.push(ValidationError::DuplicateSchema(name.to_string()));
        }
        errors.extend(validate_members(schema));
    }

    errors
}

fn validate_members(schema: &Schema) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    let mut seen: HashSet<&str> = HashSet::new();

    let member_names = schema
        .properties
        .iter()
        .map(|p| p.name.as_str())
        .chain(schema.relations.iter().map(|r| r.property.as_str()));

    for member in member_names {
        if member.trim().is_empty() {
            errors.push(ValidationError::EmptyPropertyName(schema.name.clone()));
            continue;
        }
        if !seen.insert(member) {
            errors.push(ValidationError::DuplicateProperty {
                schema: schema.name.clone(),
                property: member.to_string(),
            });
        }
    }

    errors
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{AbstractType, RelationKind, SchemaProperty, SchemaRelation};

    #[test]
    fn test_empty_schema_name_is_rejected() {
        let errors = validate_schemas(&[Schema::new("  ")]);
        assert_eq!(errors, vec![ValidationError::EmptySchemaName]);
    }

    #[test]
    fn test_duplicate_member_across_properties_and_relations() {
        let schema = Schema::new("Post")
            .with_property(SchemaProperty::new("author", AbstractType::String))
            .with_relation(SchemaRelation::new(RelationKind::OneToOne, "author", "User"));

        let errors = validate_schemas(&[schema]);
        assert_eq!(
            errors,
            vec![ValidationError::DuplicateProperty {
                schema: "Post".to_string(),
                property: "author".to_string(),
            }]
        );
    }

    #[test]
    fn test_property_named_like_foreign_key_is_valid() {
        let schema = Schema::new("Post")
            .with_property(SchemaProperty::new("user_id", AbstractType::Integer))
            .with_relation(SchemaRelation::new(RelationKind::OneToOne, "user", "User"));

        assert!(validate_schemas(&[schema]).is_empty());
    }

    #[test]
    fn test_collects_errors_from_every_schema() {
        let a = Schema::new("A")
            .with_property(SchemaProperty::new("x", AbstractType::String))
            .with_property(SchemaProperty::new("x", AbstractType::String));
        let b = Schema::new("");

        let errors = validate_schemas(&[a, b]);
        assert_eq!(errors.len(), 2);
    }
}
