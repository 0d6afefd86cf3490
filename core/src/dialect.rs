//! Target database dialects.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// A target database engine.
///
/// # Examples
///
/// ```
/// use specql_core::Dialect;
///
/// let dialect: Dialect = "postgres".parse().unwrap();
/// assert_eq!(dialect, Dialect::PostgreSql);
/// assert!("oracle".parse::<Dialect>().is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Dialect {
    #[default]
    #[serde(rename = "postgresql")]
    PostgreSql,
    #[serde(rename = "mysql")]
    MySql,
    /// MySQL-compatible variant.
    #[serde(rename = "mariadb")]
    MariaDb,
    Sqlite,
    #[serde(rename = "mssql")]
    MsSql,
}

impl Dialect {
    /// Every supported dialect.
    pub const ALL: [Dialect; 5] = [
        Dialect::PostgreSql,
        Dialect::MySql,
        Dialect::MariaDb,
        Dialect::Sqlite,
        Dialect::MsSql,
    ];

    /// Returns the canonical lowercase name.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::PostgreSql => "postgresql",
            Self::MySql => "mysql",
            Self::MariaDb => "mariadb",
            Self::Sqlite => "sqlite",
            Self::MsSql => "mssql",
        }
    }

    /// Whether the dialect is MySQL or a MySQL-compatible variant.
    pub fn is_mysql_family(self) -> bool {
        matches!(self, Self::MySql | Self::MariaDb)
    }

    /// Whether the dialect has a native JSON column type.
    pub fn supports_native_json(self) -> bool {
        matches!(self, Self::PostgreSql | Self::MySql | Self::MariaDb)
    }

    /// Whether foreign keys can be added with `ALTER TABLE ... ADD CONSTRAINT`.
    pub fn supports_alter_add_constraint(self) -> bool {
        !matches!(self, Self::Sqlite)
    }
}

impl std::fmt::Display for Dialect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Dialect {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "postgresql" | "postgres" | "pg" => Ok(Self::PostgreSql),
            "mysql" => Ok(Self::MySql),
            "mariadb" => Ok(Self::MariaDb),
            "sqlite" | "sqlite3" => Ok(Self::Sqlite),
            "mssql" | "sqlserver" => Ok(Self::MsSql),
            _ => Err(CoreError::UnsupportedDialect(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_roundtrips_canonical_names() {
        for dialect in Dialect::ALL {
            assert_eq!(dialect.as_str().parse::<Dialect>().unwrap(), dialect);
        }
    }

    #[test]
    fn test_unsupported_dialect_reports_name() {
        let err = "oracle".parse::<Dialect>().unwrap_err();
        assert!(matches!(err, CoreError::UnsupportedDialect(ref name) if name == "oracle"));
    }

    #[test]
    fn test_serde_names_match_as_str() {
        for dialect in Dialect::ALL {
            let json = serde_json::to_string(&dialect).unwrap();
            assert_eq!(json, format!("\"{}\"", dialect.as_str()));
        }
    }
}
