//! Table synthesis.
//!
//! Lowers resolved schemas into the relational model for one dialect.
//! Every entity table starts with `id`, `created_at` and `updated_at`,
//! followed by one column per plain property and then one foreign-key
//! column per to-one relation, both in source order. Many-to-many relations
//! add no column to either side; they produce one join table per pair
//! whose two foreign-key columns form a composite primary key.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use specql_core::{
    AbstractType, Column, ComplexPropertyPolicy, DatabaseSchema, Dialect, ForeignKey, Index,
    ReferentialAction, RelationKind, Relationship, RelationshipKind, Schema, SchemaProperty,
    SchemaRelation, Table, TableKind, TableNaming,
};
use thiserror::Error;
use tracing::{debug, warn};

use crate::constraints::build_constraints;
use crate::error::{DdlError, Result};
use crate::ident::quote_literal;
use crate::types::{key_type, map_type, refine_type, text_type, timestamp_default};

/// A property that could not be represented as a column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Error)]
#[error("dropped {table}.{column}: {reason}")]
pub struct SynthesisWarning {
    pub table: String,
    pub column: String,
    pub reason: String,
}

/// Output of [`Synthesizer::synthesize`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Synthesis {
    pub database: DatabaseSchema,
    pub warnings: Vec<SynthesisWarning>,
}

/// Builds tables for a set of resolved schemas.
///
/// # Examples
///
/// ```
/// use specql_core::*;
/// use specql_ddl::Synthesizer;
///
/// let user = Schema::new("User")
///     .with_property(SchemaProperty::new("name", AbstractType::String).required());
/// let schemas = [user];
/// let naming = TableNaming::default();
///
/// let synthesizer = Synthesizer::new(&schemas, &naming, Dialect::PostgreSql);
/// let mut warnings = Vec::new();
/// let table = synthesizer.synthesize_table(&schemas[0], &schemas[0].relations, &mut warnings);
///
/// assert_eq!(table.name, "user");
/// assert_eq!(table.column_names(), ["id", "created_at", "updated_at", "name"]);
/// assert!(!table.column("name").unwrap().nullable);
/// ```
#[derive(Debug)]
pub struct Synthesizer<'a> {
    schemas: &'a [Schema],
    dialect: Dialect,
    complex: ComplexPropertyPolicy,
    tables: HashMap<&'a str, String>,
}

impl<'a> Synthesizer<'a> {
    /// Creates a synthesizer, naming every schema's table up front.
    pub fn new(schemas: &'a [Schema], naming: &TableNaming, dialect: Dialect) -> Self {
        let mut tables = HashMap::new();
        for schema in schemas {
            tables
                .entry(schema.name.as_str())
                .or_insert_with(|| naming.table_name(schema));
        }
        Self {
            schemas,
            dialect,
            complex: ComplexPropertyPolicy::default(),
            tables,
        }
    }

    /// Sets how array and object properties are stored.
    pub fn complex_properties(mut self, policy: ComplexPropertyPolicy) -> Self {
        self.complex = policy;
        self
    }

    /// Table name for a schema; unknown schemas get their lower-cased name.
    pub fn table_name(&self, schema: &str) -> String {
        self.tables
            .get(schema)
            .cloned()
            .unwrap_or_else(|| schema.to_lowercase())
    }

    /// Builds every entity table, the join tables, and the relationship list.
    ///
    /// # Errors
    ///
    /// Returns [`DdlError::DuplicateTable`] if two schemas, or a schema and
    /// a join table, map to the same table name.
    pub fn synthesize(&self) -> Result<Synthesis> {
        let mut synthesis = Synthesis::default();
        let mut names: HashSet<String> = HashSet::new();

        for schema in self.schemas {
            let table = self.synthesize_table(schema, &schema.relations, &mut synthesis.warnings);
            if !names.insert(table.name.clone()) {
                return Err(DdlError::DuplicateTable(table.name));
            }
            synthesis.database.tables.push(table);
        }

        let mut join_tables: HashSet<String> = HashSet::new();
        for schema in self.schemas {
            for relation in &schema.relations {
                if relation.kind != RelationKind::ManyToMany {
                    continue;
                }
                let join = self.join_table(schema, relation);
                if !join_tables.insert(join.name.clone()) {
                    continue;
                }
                if !names.insert(join.name.clone()) {
                    return Err(DdlError::DuplicateTable(join.name));
                }
                debug!(table = %join.name, "Synthesized join table");
                synthesis.database.tables.push(join);
            }
        }

        synthesis.database.relationships = self.relationships();
        Ok(synthesis)
    }

    /// Builds the entity table for one schema.
    ///
    /// Properties that cannot be stored are skipped and reported in
    /// `warnings`.
    pub fn synthesize_table(
        &self,
        schema: &Schema,
        relations: &[SchemaRelation],
        warnings: &mut Vec<SynthesisWarning>,
    ) -> Table {
        let name = self.table_name(&schema.name);
        let mut columns = self.audit_columns();
        let mut indices = Vec::new();

        for property in &schema.properties {
            let Some(column) = self.property_column(&name, property, warnings) else {
                continue;
            };
            if column.unique {
                indices.push(Index {
                    name: format!("{name}_{}_unique", column.name),
                    columns: vec![column.name.clone()],
                    unique: true,
                });
            }
            columns.push(column);
        }

        let taken = columns.iter().map(|c| c.name.clone()).collect();
        for (relation, column_name) in foreign_key_columns(taken, relations) {
            let target = self.table_name(&relation.target_schema);
            let mut column = Column::new(&column_name, key_type(self.dialect));
            column.nullable = !relation.required;
            column.foreign_key = Some(ForeignKey::to_id(target));
            indices.push(Index {
                name: format!("idx_{name}_{column_name}"),
                columns: vec![column_name],
                unique: false,
            });
            columns.push(column);
        }

        Table {
            name,
            kind: TableKind::Entity,
            columns,
            indices,
        }
    }

    /// Builds the join table for a many-to-many relation declared on `schema`.
    pub fn join_table(&self, schema: &Schema, relation: &SchemaRelation) -> Table {
        let source = self.table_name(&schema.name);
        let target = self.table_name(&relation.target_schema);
        let name = relation
            .join_table
            .clone()
            .unwrap_or_else(|| format!("{source}_{target}"));

        let source_column = format!("{source}_id");
        let target_column = if source == target {
            format!("related_{target}_id")
        } else {
            format!("{target}_id")
        };

        let key = |column: String, table: &str| {
            let mut column = Column::new(column, key_type(self.dialect)).not_null();
            column.primary_key = true;
            column.foreign_key =
                Some(ForeignKey::to_id(table).on_delete(ReferentialAction::Cascade));
            column
        };

        Table {
            name,
            kind: TableKind::Join,
            columns: vec![key(source_column, &source), key(target_column, &target)],
            indices: Vec::new(),
        }
    }

    fn audit_columns(&self) -> Vec<Column> {
        let mut id = Column::new("id", key_type(self.dialect)).not_null();
        id.primary_key = true;
        id.auto_increment = true;

        let timestamp = |name: &str| {
            let mut column =
                Column::new(name, map_type(AbstractType::Timestamp, None, self.dialect))
                    .not_null();
            column.default = Some(timestamp_default(self.dialect).to_string());
            column
        };

        vec![id, timestamp("created_at"), timestamp("updated_at")]
    }

    /// Whether a property gets a column under the current dialect and policy.
    fn keeps_property(&self, property: &SchemaProperty) -> bool {
        !refine_type(property.ty, property.format.as_deref()).is_complex()
            || self.dialect.supports_native_json()
            || self.complex == ComplexPropertyPolicy::TextFallback
    }

    fn property_column(
        &self,
        table: &str,
        property: &SchemaProperty,
        warnings: &mut Vec<SynthesisWarning>,
    ) -> Option<Column> {
        if !self.keeps_property(property) {
            warn!(
                table,
                column = %property.name,
                dialect = %self.dialect,
                "Dropping complex property"
            );
            warnings.push(SynthesisWarning {
                table: table.to_string(),
                column: property.name.clone(),
                reason: format!("{} has no native JSON type", self.dialect),
            });
            return None;
        }

        let refined = refine_type(property.ty, property.format.as_deref());
        let ty = if refined.is_complex() && !self.dialect.supports_native_json() {
            text_type(self.dialect)
        } else {
            map_type(property.ty, property.format.as_deref(), self.dialect)
        };

        let mut column = Column::new(&property.name, ty);
        column.nullable = !property.required;
        column.unique = property.is_unique();
        column.default = property
            .default_value
            .as_ref()
            .map(|value| format_default(value, self.dialect));
        column.constraints = build_constraints(property, self.dialect);
        Some(column)
    }

    fn relationships(&self) -> Vec<Relationship> {
        let mut relationships = Vec::new();
        for schema in self.schemas {
            let from_table = self.table_name(&schema.name);
            for relation in &schema.relations {
                let to_table = self.table_name(&relation.target_schema);
                let (foreign_key, through_table) = match relation.kind {
                    RelationKind::ManyToMany => (
                        None,
                        Some(
                            relation
                                .join_table
                                .clone()
                                .unwrap_or_else(|| format!("{from_table}_{to_table}")),
                        ),
                    ),
                    RelationKind::OneToMany => (self.inverse_column(schema, relation), None),
                    RelationKind::OneToOne | RelationKind::ManyToOne => {
                        (self.column_for(schema, relation), None)
                    }
                };
                relationships.push(Relationship {
                    from_table: from_table.clone(),
                    to_table,
                    kind: RelationshipKind::from(relation.kind),
                    foreign_key,
                    through_table,
                });
            }
        }
        relationships
    }

    /// Foreign-key column a to-one relation received on its own table.
    fn column_for(&self, schema: &Schema, relation: &SchemaRelation) -> Option<String> {
        let taken = ["id", "created_at", "updated_at"]
            .into_iter()
            .map(String::from)
            .chain(
                schema
                    .properties
                    .iter()
                    .filter(|p| self.keeps_property(p))
                    .map(|p| p.name.clone()),
            )
            .collect();
        foreign_key_columns(taken, &schema.relations)
            .into_iter()
            .find(|(r, _)| std::ptr::eq(*r, relation))
            .map(|(_, column)| column)
    }

    /// Foreign-key column holding a one-to-many relation on the target table.
    fn inverse_column(&self, schema: &Schema, relation: &SchemaRelation) -> Option<String> {
        let target = self
            .schemas
            .iter()
            .find(|s| s.name == relation.target_schema)?;
        let back = target
            .relations
            .iter()
            .filter(|r| r.kind == RelationKind::ManyToOne && r.target_schema == schema.name);
        let chosen = back
            .clone()
            .find(|r| r.property == relation.property)
            .or_else(|| back.clone().next())?;
        self.column_for(target, chosen)
    }
}

/// Assigns a column name to every to-one relation, avoiding collisions with
/// `taken` and with each other.
///
/// A clashing foreign key falls back to `<property>_id`, then to the
/// foreign key with a numeric suffix.
fn foreign_key_columns(
    mut taken: HashSet<String>,
    relations: &[SchemaRelation],
) -> Vec<(&SchemaRelation, String)> {
    let mut assigned = Vec::new();

    for relation in relations.iter().filter(|r| r.kind.is_to_one()) {
        let mut name = relation.foreign_key.clone();
        if taken.contains(&name) {
            name = format!("{}_id", relation.property.to_lowercase());
        }
        let mut suffix = 2;
        while taken.contains(&name) {
            name = format!("{}_{suffix}", relation.foreign_key);
            suffix += 1;
        }
        if name != relation.foreign_key {
            debug!(
                property = %relation.property,
                foreign_key = %relation.foreign_key,
                column = %name,
                "Renamed clashing foreign-key column"
            );
        }
        taken.insert(name.clone());
        assigned.push((relation, name));
    }
    assigned
}

/// Renders a default value as a SQL literal.
///
/// # Examples
///
/// ```
/// use serde_json::json;
/// use specql_core::Dialect;
/// use specql_ddl::format_default;
///
/// assert_eq!(format_default(&json!("it's"), Dialect::MySql), "'it''s'");
/// assert_eq!(format_default(&json!(true), Dialect::PostgreSql), "TRUE");
/// assert_eq!(format_default(&json!(true), Dialect::Sqlite), "1");
/// assert_eq!(format_default(&json!(2.5), Dialect::MsSql), "2.5");
/// assert_eq!(format_default(&json!(["a"]), Dialect::PostgreSql), "'[\"a\"]'");
/// ```
pub fn format_default(value: &Value, dialect: Dialect) -> String {
    match value {
        Value::Null => "NULL".to_string(),
        Value::Bool(flag) => match (dialect, flag) {
            (Dialect::PostgreSql, true) => "TRUE".to_string(),
            (Dialect::PostgreSql, false) => "FALSE".to_string(),
            (_, true) => "1".to_string(),
            (_, false) => "0".to_string(),
        },
        Value::Number(number) => number.to_string(),
        Value::String(text) => quote_literal(text),
        Value::Array(_) | Value::Object(_) => quote_literal(&value.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use specql_core::PropertyConstraints;

    use super::*;

    fn synthesize(schemas: &[Schema], dialect: Dialect) -> Synthesis {
        Synthesizer::new(schemas, &TableNaming::default(), dialect)
            .synthesize()
            .unwrap()
    }

    #[test]
    fn test_primitive_schema_has_three_plus_n_columns() {
        let schema = Schema::new("Item")
            .with_property(SchemaProperty::new("a", AbstractType::Integer))
            .with_property(SchemaProperty::new("b", AbstractType::Boolean))
            .with_property(SchemaProperty::new("c", AbstractType::Date));

        let table = &synthesize(&[schema], Dialect::MySql).database.tables[0];
        assert_eq!(
            table.column_names(),
            ["id", "created_at", "updated_at", "a", "b", "c"]
        );
        assert_eq!(table.primary_key().len(), 1);
        assert!(table.columns[0].auto_increment);
        assert_eq!(
            table.column("created_at").unwrap().default.as_deref(),
            Some("CURRENT_TIMESTAMP")
        );
    }

    #[test]
    fn test_unique_index_and_fk_columns() {
        let post = Schema::new("Post")
            .with_property(
                SchemaProperty::new("slug", AbstractType::String)
                    .required()
                    .with_constraints(PropertyConstraints {
                        unique: Some(true),
                        ..Default::default()
                    }),
            )
            .with_relation(
                SchemaRelation::new(RelationKind::ManyToOne, "author", "User").required(),
            );
        let user = Schema::new("User");

        let synthesis = synthesize(&[post, user], Dialect::PostgreSql);
        let table = &synthesis.database.tables[0];

        assert_eq!(table.column_names().last(), Some(&"user_id"));
        let fk = table.column("user_id").unwrap();
        assert!(!fk.nullable);
        assert_eq!(fk.ty, "INTEGER");
        assert_eq!(fk.foreign_key.as_ref().unwrap().table, "user");

        let index_names: Vec<&str> = table.indices.iter().map(|i| i.name.as_str()).collect();
        assert_eq!(index_names, ["post_slug_unique", "idx_post_user_id"]);
    }

    #[test]
    fn test_colliding_foreign_keys_use_property_names() {
        let post = Schema::new("Post")
            .with_relation(SchemaRelation::new(RelationKind::OneToOne, "author", "User"))
            .with_relation(SchemaRelation::new(RelationKind::OneToOne, "editor", "User"));
        let schemas = [post, Schema::new("User")];

        let synthesis = synthesize(&schemas, Dialect::Sqlite);
        let table = &synthesis.database.tables[0];
        assert_eq!(
            table.column_names(),
            ["id", "created_at", "updated_at", "user_id", "editor_id"]
        );
        let keys: Vec<Option<&str>> = synthesis
            .database
            .relationships
            .iter()
            .map(|r| r.foreign_key.as_deref())
            .collect();
        assert_eq!(keys, [Some("user_id"), Some("editor_id")]);
    }

    #[test]
    fn test_foreign_key_renamed_around_plain_property() {
        let post = Schema::new("Post")
            .with_property(SchemaProperty::new("user_id", AbstractType::Integer))
            .with_relation(SchemaRelation::new(RelationKind::OneToOne, "user", "User"));
        let schemas = [post, Schema::new("User")];

        let synthesis = synthesize(&schemas, Dialect::PostgreSql);
        let table = &synthesis.database.tables[0];
        assert_eq!(
            table.column_names(),
            ["id", "created_at", "updated_at", "user_id", "user_id_2"]
        );
        assert!(table.column("user_id").unwrap().foreign_key.is_none());
        assert_eq!(
            table.column("user_id_2").unwrap().foreign_key.as_ref().unwrap().table,
            "user"
        );
        assert_eq!(
            synthesis.database.relationships[0].foreign_key.as_deref(),
            Some("user_id_2")
        );
    }

    #[test]
    fn test_many_to_many_produces_one_join_table() {
        let post = Schema::new("Post").with_relation(
            SchemaRelation::new(RelationKind::ManyToMany, "tags", "Tag").with_join_table("post_tag"),
        );
        let tag = Schema::new("Tag").with_relation(
            SchemaRelation::new(RelationKind::ManyToMany, "posts", "Post")
                .with_join_table("post_tag"),
        );

        let synthesis = synthesize(&[post, tag], Dialect::PostgreSql);
        let db = &synthesis.database;

        assert_eq!(db.tables.len(), 3);
        assert_eq!(db.tables[0].columns.len(), 3);
        assert_eq!(db.tables[1].columns.len(), 3);

        let join: Vec<&Table> = db.join_tables().collect();
        assert_eq!(join.len(), 1);
        assert_eq!(join[0].name, "post_tag");
        assert_eq!(join[0].column_names(), ["post_id", "tag_id"]);
        assert_eq!(join[0].primary_key().len(), 2);
    }

    #[test]
    fn test_self_referencing_join_table() {
        let user = Schema::new("User").with_relation(SchemaRelation::new(
            RelationKind::ManyToMany,
            "friends",
            "User",
        ));
        let synthesis = synthesize(&[user], Dialect::PostgreSql);
        let join = synthesis.database.join_tables().next().unwrap();
        assert_eq!(join.name, "user_user");
        assert_eq!(join.column_names(), ["user_id", "related_user_id"]);
    }

    #[test]
    fn test_complex_property_policy() {
        let schema = Schema::new("Doc")
            .with_property(SchemaProperty::new("meta", AbstractType::Json))
            .with_property(SchemaProperty::new("title", AbstractType::String));
        let schemas = [schema];
        let naming = TableNaming::default();

        let synthesis = synthesize(&schemas, Dialect::PostgreSql);
        assert_eq!(synthesis.database.tables[0].column("meta").unwrap().ty, "JSONB");
        assert!(synthesis.warnings.is_empty());

        let synthesis = synthesize(&schemas, Dialect::Sqlite);
        assert!(synthesis.database.tables[0].column("meta").is_none());
        assert_eq!(
            synthesis.warnings[0].to_string(),
            "dropped doc.meta: sqlite has no native JSON type"
        );

        let synthesis = Synthesizer::new(&schemas, &naming, Dialect::MsSql)
            .complex_properties(ComplexPropertyPolicy::TextFallback)
            .synthesize()
            .unwrap();
        assert_eq!(synthesis.database.tables[0].column("meta").unwrap().ty, "NVARCHAR(MAX)");
        assert!(synthesis.warnings.is_empty());
    }

    #[test]
    fn test_one_to_many_relationship_points_at_inverse_column() {
        let user = Schema::new("User")
            .with_relation(SchemaRelation::new(RelationKind::OneToMany, "posts", "Post"));
        let post = Schema::new("Post").with_relation(SchemaRelation::new(
            RelationKind::ManyToOne,
            "posts",
            "User",
        ));

        let synthesis = synthesize(&[user, post], Dialect::PostgreSql);
        let rel = &synthesis.database.relationships[0];
        assert_eq!(rel.kind, RelationshipKind::OneToMany);
        assert_eq!(rel.to_table, "post");
        assert_eq!(rel.foreign_key.as_deref(), Some("user_id"));
        assert!(synthesis.database.tables[0].column("post_id").is_none());
    }

    #[test]
    fn test_duplicate_table_names_are_rejected() {
        let schemas = [Schema::new("User"), Schema::new("user")];
        let err = Synthesizer::new(&schemas, &TableNaming::default(), Dialect::PostgreSql)
            .synthesize()
            .unwrap_err();
        assert!(matches!(err, DdlError::DuplicateTable(name) if name == "user"));
    }

    #[test]
    fn test_defaults_are_rendered() {
        let schema = Schema::new("Flag")
            .with_property(
                SchemaProperty::new("enabled", AbstractType::Boolean)
                    .with_default(serde_json::json!(false)),
            );
        let synthesis = synthesize(&[schema], Dialect::MySql);
        assert_eq!(
            synthesis.database.tables[0].column("enabled").unwrap().default.as_deref(),
            Some("0")
        );
    }
}
