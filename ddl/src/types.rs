//! Dialect type mapping.
//!
//! [`map_type`] is total: every [`AbstractType`] has a rendering on every
//! [`Dialect`], and the table below is an exhaustive `match`, so adding a
//! tag or a dialect is a compile error until every pair is covered.
//!
//! | tag       | PostgreSQL   | MySQL/MariaDB | SQLite  | MSSQL          |
//! |-----------|--------------|---------------|---------|----------------|
//! | integer   | INTEGER      | INT           | INTEGER | INT            |
//! | bigint    | BIGINT       | BIGINT        | INTEGER | BIGINT         |
//! | decimal   | DECIMAL      | DECIMAL       | REAL    | DECIMAL        |
//! | float     | REAL         | FLOAT         | REAL    | FLOAT          |
//! | string    | VARCHAR(255) | VARCHAR(255)  | TEXT    | NVARCHAR(255)  |
//! | text      | TEXT         | TEXT          | TEXT    | NVARCHAR(MAX)  |
//! | boolean   | BOOLEAN      | TINYINT(1)    | INTEGER | BIT            |
//! | date      | DATE         | DATE          | TEXT    | DATE           |
//! | timestamp | TIMESTAMP    | TIMESTAMP     | TEXT    | DATETIME2      |
//! | json      | JSONB        | JSON          | TEXT    | NVARCHAR(MAX)  |
//! | blob      | BYTEA        | BLOB          | BLOB    | VARBINARY(MAX) |

use specql_core::{AbstractType, Dialect};

/// Applies `format` refinements to an abstract type.
///
/// Only `integer`, `number` (decimal) and `string` are refined; every other
/// tag is returned unchanged.
///
/// # Examples
///
/// ```
/// use specql_core::AbstractType;
/// use specql_ddl::refine_type;
///
/// assert_eq!(refine_type(AbstractType::Integer, Some("int64")), AbstractType::Bigint);
/// assert_eq!(refine_type(AbstractType::Decimal, Some("double")), AbstractType::Float);
/// assert_eq!(refine_type(AbstractType::String, Some("date-time")), AbstractType::Timestamp);
/// assert_eq!(refine_type(AbstractType::Boolean, Some("date")), AbstractType::Boolean);
/// ```
pub fn refine_type(ty: AbstractType, format: Option<&str>) -> AbstractType {
    match (ty, format) {
        (AbstractType::Integer, Some("int64")) => AbstractType::Bigint,
        (AbstractType::Decimal, Some("float" | "double")) => AbstractType::Float,
        (AbstractType::String, Some("date-time")) => AbstractType::Timestamp,
        (AbstractType::String, Some("date")) => AbstractType::Date,
        (AbstractType::String, Some("binary" | "byte")) => AbstractType::Blob,
        _ => ty,
    }
}

/// Renders the column type for a property type and format.
///
/// # Examples
///
/// ```
/// use specql_core::{AbstractType, Dialect};
/// use specql_ddl::map_type;
///
/// assert_eq!(map_type(AbstractType::String, Some("email"), Dialect::PostgreSql), "VARCHAR(255)");
/// assert_eq!(map_type(AbstractType::String, Some("uuid"), Dialect::PostgreSql), "UUID");
/// assert_eq!(map_type(AbstractType::String, Some("uuid"), Dialect::MySql), "CHAR(36)");
/// assert_eq!(map_type(AbstractType::Boolean, None, Dialect::MsSql), "BIT");
/// ```
pub fn map_type(ty: AbstractType, format: Option<&str>, dialect: Dialect) -> &'static str {
    match (refine_type(ty, format), format) {
        (AbstractType::String, Some("uuid")) => uuid_type(dialect),
        (refined, _) => base_type(refined, dialect),
    }
}

/// Renders a column type from a type name, falling back to the dialect's
/// string type for names that are not abstract tags or OpenAPI types.
pub fn map_type_name(type_name: &str, format: Option<&str>, dialect: Dialect) -> &'static str {
    let ty = AbstractType::from_openapi(type_name).unwrap_or(AbstractType::String);
    map_type(ty, format, dialect)
}

fn base_type(ty: AbstractType, dialect: Dialect) -> &'static str {
    use AbstractType as T;
    use Dialect as D;

    match (dialect, ty) {
        (D::PostgreSql, T::Integer) => "INTEGER",
        (D::PostgreSql, T::Bigint) => "BIGINT",
        (D::PostgreSql, T::Decimal) => "DECIMAL",
        (D::PostgreSql, T::Float) => "REAL",
        (D::PostgreSql, T::String) => "VARCHAR(255)",
        (D::PostgreSql, T::Text) => "TEXT",
        (D::PostgreSql, T::Boolean) => "BOOLEAN",
        (D::PostgreSql, T::Date) => "DATE",
        (D::PostgreSql, T::Timestamp) => "TIMESTAMP",
        (D::PostgreSql, T::Json) => "JSONB",
        (D::PostgreSql, T::Blob) => "BYTEA",

        (D::MySql | D::MariaDb, T::Integer) => "INT",
        (D::MySql | D::MariaDb, T::Bigint) => "BIGINT",
        (D::MySql | D::MariaDb, T::Decimal) => "DECIMAL",
        (D::MySql | D::MariaDb, T::Float) => "FLOAT",
        (D::MySql | D::MariaDb, T::String) => "VARCHAR(255)",
        (D::MySql | D::MariaDb, T::Text) => "TEXT",
        (D::MySql | D::MariaDb, T::Boolean) => "TINYINT(1)",
        (D::MySql | D::MariaDb, T::Date) => "DATE",
        (D::MySql | D::MariaDb, T::Timestamp) => "TIMESTAMP",
        (D::MySql | D::MariaDb, T::Json) => "JSON",
        (D::MySql | D::MariaDb, T::Blob) => "BLOB",

        (D::Sqlite, T::Integer | T::Bigint | T::Boolean) => "INTEGER",
        (D::Sqlite, T::Decimal | T::Float) => "REAL",
        (D::Sqlite, T::String | T::Text | T::Date | T::Timestamp | T::Json) => "TEXT",
        (D::Sqlite, T::Blob) => "BLOB",

        (D::MsSql, T::Integer) => "INT",
        (D::MsSql, T::Bigint) => "BIGINT",
        (D::MsSql, T::Decimal) => "DECIMAL",
        (D::MsSql, T::Float) => "FLOAT",
        (D::MsSql, T::String) => "NVARCHAR(255)",
        (D::MsSql, T::Text) => "NVARCHAR(MAX)",
        (D::MsSql, T::Boolean) => "BIT",
        (D::MsSql, T::Date) => "DATE",
        (D::MsSql, T::Timestamp) => "DATETIME2",
        (D::MsSql, T::Json) => "NVARCHAR(MAX)",
        (D::MsSql, T::Blob) => "VARBINARY(MAX)",
    }
}

fn uuid_type(dialect: Dialect) -> &'static str {
    match dialect {
        Dialect::PostgreSql => "UUID",
        Dialect::MySql | Dialect::MariaDb => "CHAR(36)",
        Dialect::Sqlite => "TEXT",
        Dialect::MsSql => "UNIQUEIDENTIFIER",
    }
}

/// Integer type used for the surrogate key and every foreign-key column.
pub fn key_type(dialect: Dialect) -> &'static str {
    base_type(AbstractType::Integer, dialect)
}

/// Key-generation clause following the key type, including `PRIMARY KEY`.
///
/// # Examples
///
/// ```
/// use specql_core::Dialect;
/// use specql_ddl::identity_clause;
///
/// assert_eq!(identity_clause(Dialect::PostgreSql), "GENERATED ALWAYS AS IDENTITY PRIMARY KEY");
/// assert_eq!(identity_clause(Dialect::Sqlite), "PRIMARY KEY AUTOINCREMENT");
/// ```
pub fn identity_clause(dialect: Dialect) -> &'static str {
    match dialect {
        Dialect::PostgreSql => "GENERATED ALWAYS AS IDENTITY PRIMARY KEY",
        Dialect::MySql | Dialect::MariaDb => "AUTO_INCREMENT PRIMARY KEY",
        Dialect::Sqlite => "PRIMARY KEY AUTOINCREMENT",
        Dialect::MsSql => "IDENTITY(1,1) PRIMARY KEY",
    }
}

/// Default expression for the audit timestamp columns.
pub fn timestamp_default(dialect: Dialect) -> &'static str {
    match dialect {
        Dialect::MsSql => "GETDATE()",
        _ => "CURRENT_TIMESTAMP",
    }
}

/// Column type used for complex properties under the text fallback policy.
pub fn text_type(dialect: Dialect) -> &'static str {
    base_type(AbstractType::Text, dialect)
}
