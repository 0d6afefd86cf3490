//! Identifier quoting.
//!
//! Names stay bare when they are plain identifiers. Reserved words and names
//! with characters outside `[A-Za-z0-9_]` are quoted in the dialect's style.

use std::borrow::Cow;
use std::sync::LazyLock;

use regex::Regex;
use specql_core::Dialect;

static PLAIN_IDENT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("static regex must compile")
});

/// Words that cannot be used as bare identifiers on at least one dialect.
const RESERVED: &[&str] = &[
    "add", "all", "alter", "and", "as", "asc", "between", "by", "case", "check", "column",
    "constraint", "create", "cross", "current_date", "current_time", "current_timestamp",
    "current_user", "default", "delete", "desc", "distinct", "drop", "else", "end", "exists",
    "foreign", "from", "full", "grant", "group", "having", "in", "index", "inner", "insert",
    "into", "is", "join", "key", "left", "like", "limit", "not", "null", "offset", "on", "or",
    "order", "outer", "primary", "references", "right", "select", "set", "table", "then", "to",
    "union", "unique", "update", "user", "using", "values", "when", "where", "with",
];

/// Returns `true` when `name` is reserved on some dialect.
pub fn is_reserved(name: &str) -> bool {
    let lower = name.to_ascii_lowercase();
    RESERVED.binary_search(&lower.as_str()).is_ok()
}

/// Quotes `name` for `dialect` when it cannot be used bare.
///
/// # Examples
///
/// ```
/// use specql_core::Dialect;
/// use specql_ddl::quote_ident;
///
/// assert_eq!(quote_ident("email", Dialect::PostgreSql), "email");
/// assert_eq!(quote_ident("user", Dialect::PostgreSql), "\"user\"");
/// assert_eq!(quote_ident("order", Dialect::MySql), "`order`");
/// assert_eq!(quote_ident("first name", Dialect::MsSql), "[first name]");
/// ```
pub fn quote_ident(name: &str, dialect: Dialect) -> Cow<'_, str> {
    if PLAIN_IDENT.is_match(name) && !is_reserved(name) {
        return Cow::Borrowed(name);
    }
    let quoted = match dialect {
        Dialect::MySql | Dialect::MariaDb => format!("`{}`", name.replace('`', "``")),
        Dialect::MsSql => format!("[{}]", name.replace(']', "]]")),
        Dialect::PostgreSql | Dialect::Sqlite => format!("\"{}\"", name.replace('"', "\"\"")),
    };
    Cow::Owned(quoted)
}

/// Quotes a SQL string literal, doubling embedded single quotes.
pub fn quote_literal(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reserved_list_is_sorted() {
        let mut sorted = RESERVED.to_vec();
        sorted.sort_unstable();
        assert_eq!(sorted, RESERVED);
    }

    #[test]
    fn test_reserved_is_case_insensitive() {
        assert!(is_reserved("ORDER"));
        assert!(is_reserved("User"));
        assert!(!is_reserved("username"));
    }

    #[test]
    fn test_embedded_quotes_are_doubled() {
        assert_eq!(quote_ident("a\"b", Dialect::Sqlite), "\"a\"\"b\"");
        assert_eq!(quote_ident("a`b", Dialect::MariaDb), "`a``b`");
        assert_eq!(quote_literal("it's"), "'it''s'");
    }

    #[test]
    fn test_leading_digit_is_quoted() {
        assert_eq!(quote_ident("1st", Dialect::PostgreSql), "\"1st\"");
    }
}
