//! Column constraint clauses.
//!
//! Clause order is fixed: `UNIQUE`, length bounds, value bounds, pattern.
//! Length and pattern checks only apply to string-like columns and value
//! bounds only to numeric ones, judged after `format` refinement, so a
//! `date-time` string never gets a `LENGTH` check.

use specql_core::{Dialect, SchemaProperty};

use crate::ident::{quote_ident, quote_literal};
use crate::types::refine_type;

/// Builds the ordered constraint clauses for a property.
///
/// # Examples
///
/// ```
/// use specql_core::*;
/// use specql_ddl::build_constraints;
///
/// let name = SchemaProperty::new("name", AbstractType::String).with_constraints(PropertyConstraints {
///     unique: Some(true),
///     max_length: Some(50),
///     pattern: Some("^[a-z]+$".to_string()),
///     ..Default::default()
/// });
///
/// assert_eq!(
///     build_constraints(&name, Dialect::PostgreSql),
///     ["UNIQUE", "CHECK (LENGTH(name) <= 50)", "CHECK (name ~ '^[a-z]+$')"]
/// );
/// assert_eq!(build_constraints(&name, Dialect::MsSql)[1], "CHECK (LEN(name) <= 50)");
/// ```
pub fn build_constraints(property: &SchemaProperty, dialect: Dialect) -> Vec<String> {
    let Some(constraints) = &property.constraints else {
        return Vec::new();
    };

    let column = quote_ident(&property.name, dialect);
    let ty = refine_type(property.ty, property.format.as_deref());
    let mut clauses = Vec::new();

    if constraints.is_unique() {
        clauses.push("UNIQUE".to_string());
    }

    if ty.is_string_like() {
        let length = length_function(dialect);
        if let Some(min) = constraints.min_length {
            clauses.push(format!("CHECK ({length}({column}) >= {min})"));
        }
        if let Some(max) = constraints.max_length {
            clauses.push(format!("CHECK ({length}({column}) <= {max})"));
        }
    }

    if ty.is_numeric() {
        if let Some(min) = &constraints.minimum {
            clauses.push(format!("CHECK ({column} >= {min})"));
        }
        if let Some(max) = &constraints.maximum {
            clauses.push(format!("CHECK ({column} <= {max})"));
        }
    }

    if ty.is_string_like() {
        if let Some(pattern) = &constraints.pattern {
            let op = match dialect {
                Dialect::PostgreSql => "~",
                _ => "REGEXP",
            };
            clauses.push(format!("CHECK ({column} {op} {})", quote_literal(pattern)));
        }
    }

    clauses
}

fn length_function(dialect: Dialect) -> &'static str {
    match dialect {
        Dialect::MsSql => "LEN",
        _ => "LENGTH",
    }
}

#[cfg(test)]
mod tests {
    use serde_json::Number;
    use specql_core::{AbstractType, PropertyConstraints};

    use super::*;

    fn with(ty: AbstractType, constraints: PropertyConstraints) -> SchemaProperty {
        SchemaProperty::new("value", ty).with_constraints(constraints)
    }

    #[test]
    fn test_no_constraints_no_clauses() {
        let prop = SchemaProperty::new("value", AbstractType::String);
        assert!(build_constraints(&prop, Dialect::PostgreSql).is_empty());
    }

    #[test]
    fn test_full_order() {
        let prop = with(
            AbstractType::String,
            PropertyConstraints {
                pattern: Some("^x".to_string()),
                max_length: Some(9),
                min_length: Some(1),
                unique: Some(true),
                ..Default::default()
            },
        );
        assert_eq!(
            build_constraints(&prop, Dialect::MySql),
            [
                "UNIQUE",
                "CHECK (LENGTH(value) >= 1)",
                "CHECK (LENGTH(value) <= 9)",
                "CHECK (value REGEXP '^x')",
            ]
        );
    }

    #[test]
    fn test_numeric_bounds() {
        let prop = with(
            AbstractType::Integer,
            PropertyConstraints {
                minimum: Some(Number::from(0u64)),
                maximum: Number::from_f64(99.5),
                max_length: Some(3),
                ..Default::default()
            },
        );
        assert_eq!(
            build_constraints(&prop, Dialect::Sqlite),
            ["CHECK (value >= 0)", "CHECK (value <= 99.5)"]
        );
    }

    #[test]
    fn test_large_integer_bounds_render_exactly() {
        let prop = with(
            AbstractType::Bigint,
            PropertyConstraints {
                minimum: Some(Number::from(-9_007_199_254_740_993i64)),
                maximum: Some(Number::from(9_007_199_254_740_993u64)),
                ..Default::default()
            },
        );
        assert_eq!(
            build_constraints(&prop, Dialect::PostgreSql),
            [
                "CHECK (value >= -9007199254740993)",
                "CHECK (value <= 9007199254740993)",
            ]
        );
    }

    #[test]
    fn test_mssql_text_length_check_uses_nvarchar_max() {
        let prop = with(
            AbstractType::Text,
            PropertyConstraints {
                max_length: Some(4000),
                ..Default::default()
            },
        );
        assert_eq!(
            crate::types::map_type(prop.ty, None, Dialect::MsSql),
            "NVARCHAR(MAX)"
        );
        assert_eq!(
            build_constraints(&prop, Dialect::MsSql),
            ["CHECK (LEN(value) <= 4000)"]
        );
    }

    #[test]
    fn test_length_suppressed_for_refined_string_formats() {
        let prop = with(
            AbstractType::String,
            PropertyConstraints {
                max_length: Some(30),
                ..Default::default()
            },
        )
        .with_format("date-time");
        assert!(build_constraints(&prop, Dialect::PostgreSql).is_empty());
    }

    #[test]
    fn test_unique_false_emits_nothing() {
        let prop = with(
            AbstractType::Boolean,
            PropertyConstraints {
                unique: Some(false),
                ..Default::default()
            },
        );
        assert!(build_constraints(&prop, Dialect::PostgreSql).is_empty());
    }

    #[test]
    fn test_pattern_quotes_are_escaped_and_column_quoted() {
        let prop = SchemaProperty::new("order", AbstractType::Text).with_constraints(
            PropertyConstraints {
                pattern: Some("^[^']+$".to_string()),
                ..Default::default()
            },
        );
        assert_eq!(
            build_constraints(&prop, Dialect::PostgreSql),
            ["CHECK (\"order\" ~ '^[^'']+$')"]
        );
    }
}
