//! Intermediate schema model.
//!
//! These types describe OpenAPI `components.schemas` entries after
//! extraction, before any database dialect is chosen. They are built once
//! per pipeline run and only read afterwards.

use serde::{Deserialize, Serialize};

/// Dialect-independent classification of a property's data.
///
/// The set is closed so every dialect mapping can be written as an
/// exhaustive `match`.
///
/// # Examples
///
/// ```
/// use specql_core::AbstractType;
///
/// assert_eq!(AbstractType::from_openapi("number"), Some(AbstractType::Decimal));
/// assert_eq!(AbstractType::from_openapi("array"), Some(AbstractType::Json));
/// assert_eq!(AbstractType::from_openapi("uuid-ish"), None);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AbstractType {
    Integer,
    Bigint,
    Decimal,
    Float,
    String,
    Text,
    Boolean,
    Date,
    Timestamp,
    /// Arrays, inline objects, and free-form JSON.
    Json,
    Blob,
}

impl AbstractType {
    /// Every abstract type, in declaration order.
    pub const ALL: [AbstractType; 11] = [
        AbstractType::Integer,
        AbstractType::Bigint,
        AbstractType::Decimal,
        AbstractType::Float,
        AbstractType::String,
        AbstractType::Text,
        AbstractType::Boolean,
        AbstractType::Date,
        AbstractType::Timestamp,
        AbstractType::Json,
        AbstractType::Blob,
    ];

    /// Maps an OpenAPI `type` keyword (or a literal abstract tag) to an
    /// abstract type.
    ///
    /// Returns `None` for names that are neither.
    pub fn from_openapi(type_name: &str) -> Option<Self> {
        let ty = match type_name {
            "integer" => Self::Integer,
            "bigint" => Self::Bigint,
            "number" | "decimal" => Self::Decimal,
            "float" => Self::Float,
            "string" => Self::String,
            "text" => Self::Text,
            "boolean" => Self::Boolean,
            "date" => Self::Date,
            "timestamp" => Self::Timestamp,
            "array" | "object" | "json" => Self::Json,
            "blob" => Self::Blob,
            _ => return None,
        };
        Some(ty)
    }

    /// Returns the snake_case tag name.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Integer => "integer",
            Self::Bigint => "bigint",
            Self::Decimal => "decimal",
            Self::Float => "float",
            Self::String => "string",
            Self::Text => "text",
            Self::Boolean => "boolean",
            Self::Date => "date",
            Self::Timestamp => "timestamp",
            Self::Json => "json",
            Self::Blob => "blob",
        }
    }

    /// Whether length and pattern checks apply to this type.
    pub fn is_string_like(self) -> bool {
        matches!(self, Self::String | Self::Text)
    }

    /// Whether value-bound checks apply to this type.
    pub fn is_numeric(self) -> bool {
        matches!(
            self,
            Self::Integer | Self::Bigint | Self::Decimal | Self::Float
        )
    }

    /// Whether this type holds structured data (arrays or objects).
    pub fn is_complex(self) -> bool {
        matches!(self, Self::Json)
    }
}

impl std::fmt::Display for AbstractType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Validation keywords copied from an OpenAPI property.
///
/// Absent fields impose no constraint. An empty bag is never stored on a
/// property; use [`PropertyConstraints::normalized`] to collapse it to `None`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PropertyConstraints {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unique: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_length: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_length: Option<u64>,
    /// Kept as the document's number so integer bounds stay exact.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub minimum: Option<serde_json::Number>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub maximum: Option<serde_json::Number>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
}

impl PropertyConstraints {
    /// Returns `true` when no keyword is present.
    pub fn is_empty(&self) -> bool {
        self.unique.is_none()
            && self.min_length.is_none()
            && self.max_length.is_none()
            && self.minimum.is_none()
            && self.maximum.is_none()
            && self.pattern.is_none()
    }

    /// Collapses an empty bag to `None`.
    ///
    /// # Examples
    ///
    /// ```
    /// use specql_core::PropertyConstraints;
    ///
    /// assert_eq!(PropertyConstraints::default().normalized(), None);
    ///
    /// let bounded = PropertyConstraints { max_length: Some(50), ..Default::default() };
    /// assert!(bounded.normalized().is_some());
    /// ```
    pub fn normalized(self) -> Option<Self> {
        if self.is_empty() { None } else { Some(self) }
    }

    /// Returns `true` when the property is marked unique.
    pub fn is_unique(&self) -> bool {
        self.unique.unwrap_or(false)
    }
}

/// A plain (non-reference) property of a [`Schema`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchemaProperty {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: AbstractType,
    /// OpenAPI `format` keyword, used to refine the column type.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    pub required: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_value: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub constraints: Option<PropertyConstraints>,
}

impl SchemaProperty {
    /// Creates an optional property with no format, default, or constraints.
    pub fn new(name: impl Into<String>, ty: AbstractType) -> Self {
        Self {
            name: name.into(),
            ty,
            format: None,
            required: false,
            default_value: None,
            constraints: None,
        }
    }

    /// Marks the property as required.
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Sets the OpenAPI `format`.
    pub fn with_format(mut self, format: &str) -> Self {
        self.format = Some(format.to_string());
        self
    }

    /// Sets the default value.
    pub fn with_default(mut self, value: serde_json::Value) -> Self {
        self.default_value = Some(value);
        self
    }

    /// Sets the constraints, dropping an empty bag.
    pub fn with_constraints(mut self, constraints: PropertyConstraints) -> Self {
        self.constraints = constraints.normalized();
        self
    }

    /// Returns `true` when `constraints.unique` is set.
    pub fn is_unique(&self) -> bool {
        self.constraints
            .as_ref()
            .is_some_and(PropertyConstraints::is_unique)
    }
}

/// Cardinality of a relation between two schemas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RelationKind {
    OneToOne,
    OneToMany,
    ManyToOne,
    ManyToMany,
}

impl RelationKind {
    /// Whether the relation stores a foreign-key column on the owning table.
    pub fn is_to_one(self) -> bool {
        matches!(self, Self::OneToOne | Self::ManyToOne)
    }
}

/// A reference from one schema to another, looked up by name.
///
/// `target_schema` is a weak reference: it is resolved against the set of
/// extracted schemas later, so a missing target is representable and can be
/// reported instead of failing mid-walk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaRelation {
    #[serde(rename = "type")]
    pub kind: RelationKind,
    /// Property that declared the reference.
    pub property: String,
    pub target_schema: String,
    pub foreign_key: String,
    /// Join table name. Extraction may carry an `x-join-table` request here;
    /// after resolution it is only set for [`RelationKind::ManyToMany`].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub join_table: Option<String>,
    /// Whether the declaring property is listed in `required`.
    #[serde(default)]
    pub required: bool,
}

impl SchemaRelation {
    /// Creates a relation with the derived `<target>_id` foreign key.
    pub fn new(kind: RelationKind, property: impl Into<String>, target: impl Into<String>) -> Self {
        let target = target.into();
        Self {
            kind,
            property: property.into(),
            foreign_key: Self::default_foreign_key(&target),
            target_schema: target,
            join_table: None,
            required: false,
        }
    }

    /// Derives the foreign-key column name for a target schema.
    ///
    /// # Examples
    ///
    /// ```
    /// use specql_core::SchemaRelation;
    ///
    /// assert_eq!(SchemaRelation::default_foreign_key("BlogPost"), "blogpost_id");
    /// ```
    pub fn default_foreign_key(target: &str) -> String {
        format!("{}_id", target.to_lowercase())
    }

    /// Returns `true` when the foreign key differs from the derived default.
    pub fn has_custom_foreign_key(&self) -> bool {
        self.foreign_key != Self::default_foreign_key(&self.target_schema)
    }

    /// Overrides the foreign-key column name.
    pub fn with_foreign_key(mut self, foreign_key: impl Into<String>) -> Self {
        self.foreign_key = foreign_key.into();
        self
    }

    /// Sets an explicit join table name.
    pub fn with_join_table(mut self, join_table: impl Into<String>) -> Self {
        self.join_table = Some(join_table.into());
        self
    }

    /// Marks the declaring property as required.
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }
}

/// One OpenAPI object schema after extraction.
///
/// References to other schemas live in `relations`, never in `properties`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Schema {
    /// The `components.schemas` key.
    pub name: String,
    /// The schema's declared `title`, used by title-based naming.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    pub properties: Vec<SchemaProperty>,
    #[serde(default)]
    pub relations: Vec<SchemaRelation>,
}

impl Schema {
    /// Creates an empty schema.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            title: None,
            properties: Vec::new(),
            relations: Vec::new(),
        }
    }

    /// Sets the declared title.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Adds a property.
    pub fn with_property(mut self, property: SchemaProperty) -> Self {
        self.properties.push(property);
        self
    }

    /// Adds a relation.
    pub fn with_relation(mut self, relation: SchemaRelation) -> Self {
        self.relations.push(relation);
        self
    }

    /// Finds a plain property by name.
    pub fn find_property(&self, name: &str) -> Option<&SchemaProperty> {
        self.properties.iter().find(|p| p.name == name)
    }

    /// Finds a relation by its declaring property name.
    pub fn find_relation(&self, property: &str) -> Option<&SchemaRelation> {
        self.relations.iter().find(|r| r.property == property)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_openapi_primitive_maps_to_a_tag() {
        for name in ["integer", "number", "string", "boolean", "array", "object"] {
            assert!(AbstractType::from_openapi(name).is_some(), "{name}");
        }
    }

    #[test]
    fn test_tag_names_roundtrip_through_from_openapi() {
        for ty in AbstractType::ALL {
            assert_eq!(AbstractType::from_openapi(ty.as_str()), Some(ty));
        }
    }

    #[test]
    fn test_relation_kind_serializes_camel_case() {
        let json = serde_json::to_string(&RelationKind::ManyToMany).unwrap();
        assert_eq!(json, "\"manyToMany\"");
    }

    #[test]
    fn test_with_constraints_drops_empty_bag() {
        let prop = SchemaProperty::new("name", AbstractType::String)
            .with_constraints(PropertyConstraints::default());
        assert!(prop.constraints.is_none());

        let json = serde_json::to_value(&prop).unwrap();
        assert!(json.get("constraints").is_none());
    }

    #[test]
    fn test_custom_foreign_key_detection() {
        let rel = SchemaRelation::new(RelationKind::OneToOne, "owner", "User");
        assert!(!rel.has_custom_foreign_key());
        assert!(rel.with_foreign_key("owner_user_id").has_custom_foreign_key());
    }
}
