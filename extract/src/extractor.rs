//! Schema extraction from OpenAPI `components.schemas`.
//!
//! Walks the schema map in document order and converts every object schema
//! into a [`Schema`]. Plain properties become [`SchemaProperty`] values;
//! properties that point at another schema through `$ref` (directly, through
//! a single-entry `allOf`, or as array `items`) become [`SchemaRelation`]
//! values instead, so a reference never shows up as a plain property.
//!
//! Extraction is permissive: entries that are not well-formed are skipped
//! and recorded as [`MalformedEntry`] values, and non-object top-level
//! schemas (enums, aliases, primitives) are ignored.
//!
//! # Vendor extensions
//!
//! - `x-unique: true` (or a bare `unique: true`) marks a property unique.
//! - `x-foreign-key: <column>` overrides a relation's foreign-key column.
//! - `x-join-table: <name>` requests a join table for a relation.

use serde_json::{Map, Number, Value};
use specql_core::{
    AbstractType, PipelineConfig, PropertyConstraints, RelationKind, Schema, SchemaProperty,
    SchemaRelation, SchemaStrategy,
};
use tracing::{debug, info, warn};

use crate::loader::value_kind;
use crate::report::MalformedEntry;

/// Options controlling the extraction walk.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExtractOptions {
    /// Flatten inline object properties into `<prop>_<sub>` properties
    /// instead of keeping them as one JSON property.
    pub flatten_inline_objects: bool,
}

impl ExtractOptions {
    /// Derives the options implied by a pipeline configuration.
    pub fn from_config(config: &PipelineConfig) -> Self {
        Self {
            flatten_inline_objects: config.schema_strategy == SchemaStrategy::Denormalized,
        }
    }
}

/// Result of walking one document.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Extraction {
    /// Object schemas in document order.
    pub schemas: Vec<Schema>,
    /// Entries that were skipped because they could not be read.
    pub malformed: Vec<MalformedEntry>,
}

/// Extracts schemas with default options.
///
/// # Examples
///
/// ```
/// use serde_json::json;
/// use specql_core::RelationKind;
/// use specql_extract::extract_schemas;
///
/// let document = json!({
///     "components": {
///         "schemas": {
///             "Post": {
///                 "type": "object",
///                 "required": ["title"],
///                 "properties": {
///                     "title": { "type": "string", "maxLength": 120 },
///                     "author": { "$ref": "#/components/schemas/User" },
///                     "comments": {
///                         "type": "array",
///                         "items": { "$ref": "#/components/schemas/Comment" }
///                     }
///                 }
///             },
///             "Status": { "type": "string", "enum": ["draft", "live"] }
///         }
///     }
/// });
///
/// let extraction = extract_schemas(&document);
/// assert_eq!(extraction.schemas.len(), 1);
///
/// let post = &extraction.schemas[0];
/// assert_eq!(post.properties.len(), 1);
/// assert!(post.properties[0].required);
/// assert_eq!(post.relations[0].kind, RelationKind::OneToOne);
/// assert_eq!(post.relations[0].foreign_key, "user_id");
/// assert_eq!(post.relations[1].kind, RelationKind::OneToMany);
/// ```
pub fn extract_schemas(document: &Value) -> Extraction {
    extract_with_options(document, &ExtractOptions::default())
}

/// Extracts schemas from a parsed OpenAPI document.
pub fn extract_with_options(document: &Value, options: &ExtractOptions) -> Extraction {
    let mut extraction = Extraction::default();

    let Some(entries) = document.pointer("/components/schemas") else {
        debug!("Document has no components.schemas");
        return extraction;
    };
    let Some(entries) = entries.as_object() else {
        warn!(found = value_kind(entries), "components.schemas is not an object");
        extraction.malformed.push(MalformedEntry::schema(
            "components.schemas",
            format!("expected an object, found {}", value_kind(entries)),
        ));
        return extraction;
    };

    for (name, entry) in entries {
        let walker = SchemaWalker {
            schema: name,
            options,
        };
        match walker.walk(entry, &mut extraction.malformed) {
            Some(schema) => extraction.schemas.push(schema),
            None => continue,
        }
    }

    info!(
        schemas = extraction.schemas.len(),
        malformed = extraction.malformed.len(),
        "Extracted schemas"
    );
    extraction
}

#[derive(Default)]
struct Members {
    properties: Vec<SchemaProperty>,
    relations: Vec<SchemaRelation>,
}

struct SchemaWalker<'a> {
    schema: &'a str,
    options: &'a ExtractOptions,
}

impl SchemaWalker<'_> {
    fn walk(&self, entry: &Value, malformed: &mut Vec<MalformedEntry>) -> Option<Schema> {
        let Some(definition) = entry.as_object() else {
            self.reject(
                malformed,
                format!("expected a schema object, found {}", value_kind(entry)),
            );
            return None;
        };
        if self.schema.trim().is_empty() {
            self.reject(malformed, "schema name cannot be empty");
            return None;
        }
        if !is_object_schema(definition) {
            debug!(schema = self.schema, "Skipping non-object schema");
            return None;
        }

        let required = match required_names(definition) {
            Ok(required) => required,
            Err(reason) => {
                self.reject(malformed, reason);
                return None;
            }
        };
        let properties = match definition.get("properties") {
            None => Map::new(),
            Some(Value::Object(properties)) => properties.clone(),
            Some(other) => {
                self.reject(
                    malformed,
                    format!("`properties` must be an object, found {}", value_kind(other)),
                );
                return None;
            }
        };

        let mut members = Members::default();
        self.collect(None, &properties, &required, true, &mut members, malformed);

        Some(Schema {
            name: self.schema.to_string(),
            title: definition
                .get("title")
                .and_then(Value::as_str)
                .map(String::from),
            properties: members.properties,
            relations: members.relations,
        })
    }

    fn collect(
        &self,
        prefix: Option<&str>,
        properties: &Map<String, Value>,
        required: &[&str],
        parent_required: bool,
        members: &mut Members,
        malformed: &mut Vec<MalformedEntry>,
    ) {
        for (key, definition) in properties {
            let name = match prefix {
                Some(prefix) => format!("{prefix}_{key}"),
                None => key.clone(),
            };
            let is_required = parent_required && required.contains(&key.as_str());

            let Some(definition) = definition.as_object() else {
                warn!(schema = self.schema, property = %name, "Skipping malformed property");
                malformed.push(MalformedEntry::property(
                    self.schema,
                    &name,
                    format!("expected a schema object, found {}", value_kind(definition)),
                ));
                continue;
            };

            match classify(definition) {
                Member::Reference(target) | Member::ArrayOfReferences(target)
                    if target.is_empty() =>
                {
                    malformed.push(MalformedEntry::property(
                        self.schema,
                        &name,
                        "`$ref` does not name a schema",
                    ));
                }
                Member::Reference(target) => members.relations.push(relation(
                    RelationKind::OneToOne,
                    &name,
                    target,
                    definition,
                    is_required,
                )),
                Member::ArrayOfReferences(target) => members.relations.push(relation(
                    RelationKind::OneToMany,
                    &name,
                    target,
                    definition,
                    is_required,
                )),
                Member::InlineObject(nested) if self.options.flatten_inline_objects => {
                    match required_names(definition) {
                        Ok(nested_required) => self.collect(
                            Some(&name),
                            nested,
                            &nested_required,
                            is_required,
                            members,
                            malformed,
                        ),
                        Err(reason) => {
                            malformed.push(MalformedEntry::property(self.schema, &name, reason));
                        }
                    }
                }
                Member::InlineObject(_) | Member::Plain => {
                    members
                        .properties
                        .push(self.plain_property(&name, definition, is_required));
                }
            }
        }
    }

    fn plain_property(
        &self,
        name: &str,
        definition: &Map<String, Value>,
        required: bool,
    ) -> SchemaProperty {
        let type_name = property_type(definition);
        let ty = AbstractType::from_openapi(type_name).unwrap_or_else(|| {
            debug!(
                schema = self.schema,
                property = name,
                type_name,
                "Unknown property type, treating as string"
            );
            AbstractType::String
        });

        let mut property = SchemaProperty::new(name, ty).with_constraints(constraints(definition));
        property.required = required;
        property.format = definition
            .get("format")
            .and_then(Value::as_str)
            .map(String::from);
        property.default_value = definition.get("default").cloned();
        property
    }

    fn reject(&self, malformed: &mut Vec<MalformedEntry>, reason: impl Into<String>) {
        let entry = MalformedEntry::schema(self.schema, reason);
        warn!(schema = self.schema, reason = %entry.reason, "Skipping malformed schema");
        malformed.push(entry);
    }
}

enum Member<'a> {
    Reference(&'a str),
    ArrayOfReferences(&'a str),
    InlineObject(&'a Map<String, Value>),
    Plain,
}

fn classify(definition: &Map<String, Value>) -> Member<'_> {
    if let Some(target) = reference_target(definition) {
        return Member::Reference(target);
    }
    match property_type(definition) {
        "array" => {
            let target = definition
                .get("items")
                .and_then(Value::as_object)
                .and_then(reference_target);
            match target {
                Some(target) => Member::ArrayOfReferences(target),
                None => Member::Plain,
            }
        }
        "object" => match definition.get("properties").and_then(Value::as_object) {
            Some(nested) => Member::InlineObject(nested),
            None => Member::Plain,
        },
        _ => Member::Plain,
    }
}

/// Returns the referenced schema name for a direct `$ref` or a
/// single-entry `allOf` wrapping one.
fn reference_target(definition: &Map<String, Value>) -> Option<&str> {
    if let Some(reference) = definition.get("$ref").and_then(Value::as_str) {
        return Some(reference_name(reference));
    }
    match definition.get("allOf").and_then(Value::as_array) {
        Some(all_of) if all_of.len() == 1 => all_of[0]
            .get("$ref")
            .and_then(Value::as_str)
            .map(reference_name),
        _ => None,
    }
}

/// Last path segment of a `$ref`.
fn reference_name(reference: &str) -> &str {
    reference.rsplit('/').next().unwrap_or(reference)
}

/// The effective `type` keyword, inferring `object`/`array` from structure
/// and defaulting to `string`.
fn property_type(definition: &Map<String, Value>) -> &str {
    match definition.get("type") {
        Some(Value::String(name)) => return name,
        Some(Value::Array(names)) => {
            if let Some(name) = names
                .iter()
                .filter_map(Value::as_str)
                .find(|name| *name != "null")
            {
                return name;
            }
        }
        _ => {}
    }
    if definition.contains_key("properties") {
        "object"
    } else if definition.contains_key("items") {
        "array"
    } else {
        "string"
    }
}

fn is_object_schema(definition: &Map<String, Value>) -> bool {
    match definition.get("type") {
        Some(_) => property_type(definition) == "object",
        None => definition.contains_key("properties"),
    }
}

fn required_names(definition: &Map<String, Value>) -> Result<Vec<&str>, String> {
    match definition.get("required") {
        None => Ok(Vec::new()),
        Some(Value::Array(names)) => names
            .iter()
            .map(|name| {
                name.as_str()
                    .ok_or_else(|| "`required` must list property names".to_string())
            })
            .collect(),
        Some(other) => Err(format!(
            "`required` must be an array, found {}",
            value_kind(other)
        )),
    }
}

fn relation(
    kind: RelationKind,
    name: &str,
    target: &str,
    definition: &Map<String, Value>,
    required: bool,
) -> SchemaRelation {
    let mut relation = SchemaRelation::new(kind, name, target);
    if let Some(foreign_key) = definition.get("x-foreign-key").and_then(Value::as_str) {
        relation = relation.with_foreign_key(foreign_key);
    }
    if let Some(join_table) = definition.get("x-join-table").and_then(Value::as_str) {
        relation = relation.with_join_table(join_table);
    }
    relation.required = required;
    relation
}

fn constraints(definition: &Map<String, Value>) -> PropertyConstraints {
    PropertyConstraints {
        unique: definition
            .get("x-unique")
            .or_else(|| definition.get("unique"))
            .and_then(Value::as_bool),
        min_length: definition.get("minLength").and_then(Value::as_u64),
        max_length: definition.get("maxLength").and_then(Value::as_u64),
        minimum: number(definition, "minimum"),
        maximum: number(definition, "maximum"),
        pattern: definition
            .get("pattern")
            .and_then(Value::as_str)
            .map(String::from),
    }
}

fn number(definition: &Map<String, Value>, key: &str) -> Option<Number> {
    match definition.get(key) {
        Some(Value::Number(number)) => Some(number.clone()),
        _ => None,
    }
}
