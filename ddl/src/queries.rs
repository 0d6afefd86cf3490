//! Sample query generation.
//!
//! Produces one SQL file per entity table with starter queries: select,
//! paginated select, insert, update, delete, text search, and one join query
//! per relationship. Parameters use `:name` placeholders.

use serde::Serialize;
use specql_core::{Column, DatabaseSchema, Dialect, Relationship, RelationshipKind, Table, TableKind};

use crate::ident::quote_ident;
use crate::types::timestamp_default;

const AUDIT_COLUMNS: [&str; 2] = ["created_at", "updated_at"];

/// Sample queries for one table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QueryFile {
    pub table: String,
    /// Suggested file name, `<table>.sql`.
    pub file_name: String,
    pub sql: String,
}

/// Generates sample queries for every entity table.
///
/// # Examples
///
/// ```
/// use specql_core::*;
/// use specql_ddl::{Synthesizer, generate_queries};
///
/// let schemas = [Schema::new("Tag")
///     .with_property(SchemaProperty::new("label", AbstractType::String))];
/// let naming = TableNaming::default();
/// let database = Synthesizer::new(&schemas, &naming, Dialect::Sqlite)
///     .synthesize()
///     .unwrap()
///     .database;
///
/// let files = generate_queries(&database, Dialect::Sqlite);
/// assert_eq!(files[0].file_name, "tag.sql");
/// assert!(files[0].sql.contains("SELECT * FROM tag;"));
/// assert!(files[0].sql.contains("WHERE label LIKE :search;"));
/// ```
pub fn generate_queries(database: &DatabaseSchema, dialect: Dialect) -> Vec<QueryFile> {
    database
        .tables
        .iter()
        .filter(|t| t.kind == TableKind::Entity)
        .map(|table| QueryFile {
            table: table.name.clone(),
            file_name: format!("{}.sql", table.name),
            sql: table_queries(table, database, dialect),
        })
        .collect()
}

fn table_queries(table: &Table, database: &DatabaseSchema, dialect: Dialect) -> String {
    let name = quote_ident(&table.name, dialect);
    let now = timestamp_default(dialect);
    let data: Vec<&Column> = table
        .columns
        .iter()
        .filter(|c| !c.primary_key && !AUDIT_COLUMNS.contains(&c.name.as_str()))
        .collect();
    let data_names: Vec<String> = data
        .iter()
        .map(|c| quote_ident(&c.name, dialect).into_owned())
        .collect();

    let mut queries = Vec::new();

    let mut selected = vec!["id".to_string()];
    selected.extend(data_names.iter().cloned());
    queries.push(format!(
        "-- Basic select query\nSELECT * FROM {name};\n\n\
         -- Select with pagination\nSELECT * FROM {name}\n{};\n\n\
         -- Select with specific columns\nSELECT {}\nFROM {name};",
        paginate(dialect),
        selected.join(", ")
    ));

    let mut insert_columns: Vec<String> = AUDIT_COLUMNS.iter().map(|c| c.to_string()).collect();
    insert_columns.extend(data_names.iter().cloned());
    let mut insert_values = vec![now.to_string(), now.to_string()];
    insert_values.extend(data.iter().map(|c| format!(":{}", c.name)));
    queries.push(format!(
        "-- Insert new record\nINSERT INTO {name} ({})\nVALUES ({});",
        insert_columns.join(", "),
        insert_values.join(", ")
    ));

    let mut assignments: Vec<String> = data
        .iter()
        .zip(&data_names)
        .map(|(column, quoted)| format!("{quoted} = :{}", column.name))
        .collect();
    assignments.push(format!("updated_at = {now}"));
    queries.push(format!(
        "-- Update record\nUPDATE {name}\nSET {}\nWHERE id = :id;",
        assignments.join(",\n    ")
    ));

    queries.push(format!("-- Delete record\nDELETE FROM {name}\nWHERE id = :id;"));

    let searchable: Vec<String> = data
        .iter()
        .zip(&data_names)
        .filter(|(column, _)| column.foreign_key.is_none() && is_text(&column.ty))
        .map(|(_, quoted)| format!("{quoted} LIKE :search"))
        .collect();
    if !searchable.is_empty() {
        queries.push(format!(
            "-- Search in text columns\nSELECT *\nFROM {name}\nWHERE {};",
            searchable.join("\n   OR ")
        ));
    }

    for relationship in database
        .relationships
        .iter()
        .filter(|r| r.from_table == table.name)
    {
        if let Some(query) = join_query(relationship, database, dialect) {
            queries.push(query);
        }
    }

    let mut sql = queries.join("\n\n");
    sql.push('\n');
    sql
}

fn join_query(
    relationship: &Relationship,
    database: &DatabaseSchema,
    dialect: Dialect,
) -> Option<String> {
    let from = quote_ident(&relationship.from_table, dialect);
    let to = quote_ident(&relationship.to_table, dialect);

    let query = match relationship.kind {
        RelationshipKind::ManyToMany => {
            let through = database.table(relationship.through_table.as_deref()?)?;
            let (source, target) = join_columns(through, relationship)?;
            format!(
                "-- Get all {} for {}\nSELECT t.*\nFROM {to} t\nJOIN {} j ON j.{} = t.id\nWHERE j.{} = :id;",
                relationship.to_table,
                relationship.from_table,
                quote_ident(&through.name, dialect),
                quote_ident(target, dialect),
                quote_ident(source, dialect)
            )
        }
        RelationshipKind::OneToMany => {
            let column = relationship.foreign_key.as_deref()?;
            format!(
                "-- Get all {} for {}\nSELECT t.*\nFROM {to} t\nWHERE t.{} = :id;",
                relationship.to_table,
                relationship.from_table,
                quote_ident(column, dialect)
            )
        }
        RelationshipKind::OneToOne | RelationshipKind::ManyToOne => {
            let column = relationship.foreign_key.as_deref()?;
            format!(
                "-- Get {} for {}\nSELECT t.*\nFROM {to} t\nJOIN {from} s ON s.{} = t.id\nWHERE s.id = :id;",
                relationship.to_table,
                relationship.from_table,
                quote_ident(column, dialect)
            )
        }
    };
    Some(query)
}

/// `(source column, target column)` of a join table.
fn join_columns<'t>(through: &'t Table, relationship: &Relationship) -> Option<(&'t str, &'t str)> {
    let [first, second] = through.columns.as_slice() else {
        return None;
    };
    let points_to = |column: &Column, table: &str| {
        column.foreign_key.as_ref().is_some_and(|fk| fk.table == table)
    };
    if points_to(second, &relationship.to_table) && points_to(first, &relationship.from_table) {
        Some((first.name.as_str(), second.name.as_str()))
    } else {
        Some((second.name.as_str(), first.name.as_str()))
    }
}

fn paginate(dialect: Dialect) -> &'static str {
    match dialect {
        Dialect::MsSql => "ORDER BY created_at DESC\nOFFSET 0 ROWS FETCH NEXT 10 ROWS ONLY",
        _ => "ORDER BY created_at DESC\nLIMIT 10 OFFSET 0",
    }
}

fn is_text(ty: &str) -> bool {
    ty.contains("CHAR") || ty.contains("TEXT")
}
