//! Relational model produced for a single target dialect.
//!
//! Column types and defaults are already rendered for the dialect the
//! tables were synthesized for; switching dialects means synthesizing again.

use serde::{Deserialize, Serialize};

/// Action taken on a referencing row when the referenced row changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReferentialAction {
    Cascade,
    SetNull,
    Restrict,
    NoAction,
}

impl ReferentialAction {
    /// Returns the SQL keyword sequence.
    pub fn as_sql(self) -> &'static str {
        match self {
            Self::Cascade => "CASCADE",
            Self::SetNull => "SET NULL",
            Self::Restrict => "RESTRICT",
            Self::NoAction => "NO ACTION",
        }
    }
}

/// Foreign-key target of a column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForeignKey {
    pub table: String,
    pub column: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub on_delete: Option<ReferentialAction>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub on_update: Option<ReferentialAction>,
}

impl ForeignKey {
    /// References the `id` column of `table`.
    pub fn to_id(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            column: "id".to_string(),
            on_delete: None,
            on_update: None,
        }
    }

    /// Sets the `ON DELETE` action.
    pub fn on_delete(mut self, action: ReferentialAction) -> Self {
        self.on_delete = Some(action);
        self
    }
}

/// A table column with its dialect-rendered type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Column {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: String,
    pub nullable: bool,
    #[serde(default)]
    pub primary_key: bool,
    /// Surrogate key generated by the database.
    #[serde(default)]
    pub auto_increment: bool,
    #[serde(default)]
    pub unique: bool,
    /// Rendered SQL default expression.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<String>,
    /// Ordered inline constraint clauses (`UNIQUE`, `CHECK (...)`).
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub constraints: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub foreign_key: Option<ForeignKey>,
}

impl Column {
    /// Creates a nullable column without keys, default, or constraints.
    pub fn new(name: impl Into<String>, ty: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ty: ty.into(),
            nullable: true,
            primary_key: false,
            auto_increment: false,
            unique: false,
            default: None,
            constraints: Vec::new(),
            foreign_key: None,
        }
    }

    /// Marks the column `NOT NULL`.
    pub fn not_null(mut self) -> Self {
        self.nullable = false;
        self
    }
}

/// A table index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Index {
    pub name: String,
    pub columns: Vec<String>,
    #[serde(default)]
    pub unique: bool,
}

/// Distinguishes schema-backed tables from synthesized join tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum TableKind {
    #[default]
    Entity,
    Join,
}

/// A database table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Table {
    pub name: String,
    #[serde(default)]
    pub kind: TableKind,
    pub columns: Vec<Column>,
    #[serde(default)]
    pub indices: Vec<Index>,
}

impl Table {
    /// Finds a column by name.
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Returns the column names in order.
    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    /// Returns the primary-key columns in order.
    pub fn primary_key(&self) -> Vec<&Column> {
        self.columns.iter().filter(|c| c.primary_key).collect()
    }
}

/// Cardinality of a table-level relationship.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RelationshipKind {
    OneToOne,
    OneToMany,
    ManyToOne,
    ManyToMany,
}

impl From<crate::RelationKind> for RelationshipKind {
    fn from(kind: crate::RelationKind) -> Self {
        match kind {
            crate::RelationKind::OneToOne => Self::OneToOne,
            crate::RelationKind::OneToMany => Self::OneToMany,
            crate::RelationKind::ManyToOne => Self::ManyToOne,
            crate::RelationKind::ManyToMany => Self::ManyToMany,
        }
    }
}

/// A relationship between two tables, for downstream generators.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Relationship {
    pub from_table: String,
    pub to_table: String,
    #[serde(rename = "type")]
    pub kind: RelationshipKind,
    /// Column holding the reference: on `from_table` for to-one kinds, on
    /// `to_table` for one-to-many.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub foreign_key: Option<String>,
    /// Join table, for many-to-many.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub through_table: Option<String>,
}

/// Complete relational design for one dialect.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatabaseSchema {
    pub tables: Vec<Table>,
    pub relationships: Vec<Relationship>,
}

impl DatabaseSchema {
    /// Finds a table by name.
    pub fn table(&self, name: &str) -> Option<&Table> {
        self.tables.iter().find(|t| t.name == name)
    }

    /// Iterates over join tables.
    pub fn join_tables(&self) -> impl Iterator<Item = &Table> {
        self.tables.iter().filter(|t| t.kind == TableKind::Join)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_relationship_kind_serializes_screaming_case() {
        let json = serde_json::to_string(&RelationshipKind::ManyToOne).unwrap();
        assert_eq!(json, "\"MANY_TO_ONE\"");
    }

    #[test]
    fn test_referential_action_sql() {
        assert_eq!(ReferentialAction::SetNull.as_sql(), "SET NULL");
        assert_eq!(ReferentialAction::NoAction.as_sql(), "NO ACTION");
    }

    #[test]
    fn test_column_serializes_type_field() {
        let column = Column::new("name", "TEXT").not_null();
        let json = serde_json::to_value(&column).unwrap();
        assert_eq!(json["type"], "TEXT");
        assert_eq!(json["nullable"], false);
        assert!(json.get("constraints").is_none());
    }
}
