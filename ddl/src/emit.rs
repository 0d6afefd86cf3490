//! DDL emission.
//!
//! Statements come out in four groups: entity `CREATE TABLE`s in input
//! order, join-table `CREATE TABLE`s, `CREATE INDEX`es, and finally one
//! `ALTER TABLE ... ADD CONSTRAINT ... FOREIGN KEY` per foreign-key column.
//! Deferring every foreign key to the end means no statement references a
//! table that has not been created yet.
//!
//! SQLite cannot add constraints to an existing table, so there foreign keys
//! are written inside `CREATE TABLE` as `FOREIGN KEY ... REFERENCES`
//! clauses. SQLite resolves those lazily, so forward references are legal.

use specql_core::{Column, DatabaseSchema, Dialect, ForeignKey, Index, Table, TableKind};

use crate::ident::quote_ident;
use crate::types::identity_clause;

/// Renders a database schema as an ordered list of DDL statements.
///
/// # Examples
///
/// ```
/// use specql_core::*;
/// use specql_ddl::{Synthesizer, emit};
///
/// let post = Schema::new("Post").with_relation(
///     SchemaRelation::new(RelationKind::ManyToOne, "author", "Author").required(),
/// );
/// let schemas = [post, Schema::new("Author")];
/// let naming = TableNaming::default();
/// let database = Synthesizer::new(&schemas, &naming, Dialect::MySql)
///     .synthesize()
///     .unwrap()
///     .database;
///
/// let statements = emit(&database, Dialect::MySql);
/// assert!(statements[0].starts_with("CREATE TABLE post ("));
/// assert!(statements[1].starts_with("CREATE TABLE author ("));
/// assert_eq!(statements[2], "CREATE INDEX idx_post_author_id ON post (author_id);");
/// assert_eq!(
///     statements[3],
///     "ALTER TABLE post\n  ADD CONSTRAINT fk_post_author_id\n  FOREIGN KEY (author_id)\n  REFERENCES author(id);"
/// );
/// ```
pub fn emit(database: &DatabaseSchema, dialect: Dialect) -> Vec<String> {
    let entities = database
        .tables
        .iter()
        .filter(|t| t.kind == TableKind::Entity);
    let joins = database.join_tables();

    let mut statements: Vec<String> = entities
        .chain(joins)
        .map(|table| create_table(table, dialect))
        .collect();

    for table in &database.tables {
        statements.extend(
            table
                .indices
                .iter()
                .filter(|index| !enforced_inline(table, index))
                .map(|index| create_index(table, index, dialect)),
        );
    }

    if dialect.supports_alter_add_constraint() {
        for table in &database.tables {
            statements.extend(table.columns.iter().filter_map(|column| {
                let foreign_key = column.foreign_key.as_ref()?;
                Some(add_foreign_key(table, column, foreign_key, dialect))
            }));
        }
    }

    statements
}

/// Joins statements into one script separated by blank lines.
pub fn render_script(statements: &[String]) -> String {
    statements.join("\n\n")
}

/// Renders the `CREATE TABLE` statement for one table.
///
/// # Examples
///
/// ```
/// use specql_core::{Column, Dialect, Table, TableKind};
/// use specql_ddl::create_table;
///
/// let mut id = Column::new("id", "INTEGER").not_null();
/// id.primary_key = true;
/// id.auto_increment = true;
/// let table = Table {
///     name: "order".to_string(),
///     kind: TableKind::Entity,
///     columns: vec![id, Column::new("note", "TEXT")],
///     indices: vec![],
/// };
///
/// assert_eq!(
///     create_table(&table, Dialect::Sqlite),
///     "CREATE TABLE \"order\" (\n  id INTEGER PRIMARY KEY AUTOINCREMENT,\n  note TEXT NULL\n);"
/// );
/// ```
pub fn create_table(table: &Table, dialect: Dialect) -> String {
    let primary_key = table.primary_key();
    let composite = primary_key.len() > 1;

    let mut lines: Vec<String> = table
        .columns
        .iter()
        .map(|column| column_definition(column, composite, dialect))
        .collect();

    if composite {
        let columns: Vec<String> = primary_key
            .iter()
            .map(|c| quote_ident(&c.name, dialect).into_owned())
            .collect();
        lines.push(format!("PRIMARY KEY ({})", columns.join(", ")));
    }

    if !dialect.supports_alter_add_constraint() {
        for column in &table.columns {
            if let Some(foreign_key) = &column.foreign_key {
                lines.push(format!(
                    "FOREIGN KEY ({}) {}",
                    quote_ident(&column.name, dialect),
                    references(foreign_key, dialect)
                ));
            }
        }
    }

    format!(
        "CREATE TABLE {} (\n  {}\n);",
        quote_ident(&table.name, dialect),
        lines.join(",\n  ")
    )
}

/// Clause order: name, type, key or nullability, default, constraints.
fn column_definition(column: &Column, composite: bool, dialect: Dialect) -> String {
    let mut parts: Vec<String> = vec![
        quote_ident(&column.name, dialect).into_owned(),
        column.ty.clone(),
    ];

    if column.primary_key && column.auto_increment && !composite {
        parts.push(identity_clause(dialect).to_string());
    } else if column.primary_key && !composite {
        parts.push("PRIMARY KEY".to_string());
    } else {
        parts.push(if column.nullable { "NULL" } else { "NOT NULL" }.to_string());
    }

    if let Some(default) = &column.default {
        parts.push(format!("DEFAULT {default}"));
    }
    parts.extend(column.constraints.iter().cloned());

    parts.join(" ")
}

fn references(foreign_key: &ForeignKey, dialect: Dialect) -> String {
    let mut clause = format!(
        "REFERENCES {}({})",
        quote_ident(&foreign_key.table, dialect),
        quote_ident(&foreign_key.column, dialect)
    );
    if let Some(action) = foreign_key.on_delete {
        clause.push_str(" ON DELETE ");
        clause.push_str(action.as_sql());
    }
    if let Some(action) = foreign_key.on_update {
        clause.push_str(" ON UPDATE ");
        clause.push_str(action.as_sql());
    }
    clause
}

/// A single-column unique index whose column already carries `UNIQUE`.
fn enforced_inline(table: &Table, index: &Index) -> bool {
    match index.columns.as_slice() {
        [column] if index.unique => table
            .column(column)
            .is_some_and(|c| c.constraints.iter().any(|clause| clause == "UNIQUE")),
        _ => false,
    }
}

fn create_index(table: &Table, index: &Index, dialect: Dialect) -> String {
    let columns: Vec<String> = index
        .columns
        .iter()
        .map(|c| quote_ident(c, dialect).into_owned())
        .collect();
    format!(
        "CREATE {}INDEX {} ON {} ({});",
        if index.unique { "UNIQUE " } else { "" },
        quote_ident(&index.name, dialect),
        quote_ident(&table.name, dialect),
        columns.join(", ")
    )
}

fn add_foreign_key(
    table: &Table,
    column: &Column,
    foreign_key: &ForeignKey,
    dialect: Dialect,
) -> String {
    let constraint = format!("fk_{}_{}", table.name, column.name);
    format!(
        "ALTER TABLE {}\n  ADD CONSTRAINT {}\n  FOREIGN KEY ({})\n  {};",
        quote_ident(&table.name, dialect),
        quote_ident(&constraint, dialect),
        quote_ident(&column.name, dialect),
        references(foreign_key, dialect)
    )
}
