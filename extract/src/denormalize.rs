//! Reference flattening for the denormalized strategy.
//!
//! A scalar reference is replaced by copies of the target's plain
//! properties, prefixed with the referencing property name. Flattening goes
//! one level deep; references held by the target are not followed. Array
//! references stay relations, as do self-references and references to
//! unknown schemas (those are reported during resolution).
//!
//! Copies keep the target's length, value and pattern checks but drop
//! uniqueness: many rows may reference the same target row.

use std::collections::HashMap;

use specql_core::{PropertyConstraints, RelationKind, Schema, SchemaProperty};
use tracing::debug;

/// Flattens scalar references into prefixed properties.
///
/// # Examples
///
/// ```
/// use specql_core::*;
/// use specql_extract::flatten_references;
///
/// let address = Schema::new("Address")
///     .with_property(SchemaProperty::new("city", AbstractType::String).required());
/// let user = Schema::new("User").with_relation(
///     SchemaRelation::new(RelationKind::OneToOne, "home", "Address").required(),
/// );
///
/// let flat = flatten_references(&[user, address]);
/// assert!(flat[0].relations.is_empty());
/// assert_eq!(flat[0].properties[0].name, "home_city");
/// assert!(flat[0].properties[0].required);
/// ```
pub fn flatten_references(schemas: &[Schema]) -> Vec<Schema> {
    let by_name: HashMap<&str, &Schema> = schemas
        .iter()
        .rev()
        .map(|schema| (schema.name.as_str(), schema))
        .collect();

    schemas
        .iter()
        .map(|schema| {
            let mut flat = Schema {
                relations: Vec::new(),
                ..schema.clone()
            };
            for relation in &schema.relations {
                let target = by_name
                    .get(relation.target_schema.as_str())
                    .filter(|target| target.name != schema.name);
                match (relation.kind, target) {
                    (RelationKind::OneToOne, Some(target)) => {
                        debug!(
                            schema = %schema.name,
                            property = %relation.property,
                            target = %target.name,
                            "Flattening reference"
                        );
                        flat.properties
                            .extend(target.properties.iter().map(|property| SchemaProperty {
                                name: format!("{}_{}", relation.property, property.name),
                                required: relation.required && property.required,
                                constraints: property
                                    .constraints
                                    .clone()
                                    .and_then(|c| PropertyConstraints { unique: None, ..c }.normalized()),
                                ..property.clone()
                            }));
                    }
                    _ => flat.relations.push(relation.clone()),
                }
            }
            flat
        })
        .collect()
}
