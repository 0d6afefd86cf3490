//! OpenAPI document loading.
//!
//! Documents are read as JSON or YAML into a [`serde_json::Value`] with
//! key order preserved, so `components.schemas` and each schema's
//! `properties` are walked in the order they were written.
//!
//! ```no_run
//! use specql_extract::load_document;
//!
//! let document = load_document("openapi.yaml").unwrap();
//! assert!(document.get("components").is_some());
//! ```

use std::path::Path;

use serde_json::Value;
use tracing::debug;

use crate::error::{ExtractError, Result};

/// Serialization format of an OpenAPI document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    Json,
    Yaml,
}

impl DocumentFormat {
    /// Picks the format from a file extension, if it is a known one.
    pub fn from_path(path: &Path) -> Option<Self> {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => Some(Self::Json),
            Some(ext) if ext.eq_ignore_ascii_case("yaml") || ext.eq_ignore_ascii_case("yml") => {
                Some(Self::Yaml)
            }
            _ => None,
        }
    }

    /// Guesses the format from content: a leading `{` means JSON.
    pub fn sniff(text: &str) -> Self {
        if text.trim_start().starts_with('{') {
            Self::Json
        } else {
            Self::Yaml
        }
    }
}

/// Reads and parses an OpenAPI document from disk.
///
/// The format comes from the file extension, falling back to
/// [`DocumentFormat::sniff`].
///
/// # Errors
///
/// Returns [`ExtractError::IoError`] if the file cannot be read, a parse
/// error if the content is not valid JSON/YAML, or
/// [`ExtractError::InvalidDocument`] if the root is not a mapping.
pub fn load_document(path: impl AsRef<Path>) -> Result<Value> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path)?;
    let format = DocumentFormat::from_path(path).unwrap_or_else(|| DocumentFormat::sniff(&text));
    debug!(path = %path.display(), ?format, "Loading OpenAPI document");
    parse_document(&text, format)
}

/// Parses an OpenAPI document from text.
///
/// # Examples
///
/// ```
/// use specql_extract::{DocumentFormat, parse_document};
///
/// let doc = parse_document("openapi: 3.0.0\ncomponents: {}\n", DocumentFormat::Yaml).unwrap();
/// assert_eq!(doc["openapi"], "3.0.0");
///
/// assert!(parse_document("[1, 2]", DocumentFormat::Json).is_err());
/// ```
pub fn parse_document(text: &str, format: DocumentFormat) -> Result<Value> {
    let value: Value = match format {
        DocumentFormat::Json => serde_json::from_str(text)?,
        DocumentFormat::Yaml => serde_yaml::from_str(text)?,
    };
    if !value.is_object() {
        return Err(ExtractError::InvalidDocument(value_kind(&value)));
    }
    Ok(value)
}

pub(crate) fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_from_extension() {
        assert_eq!(
            DocumentFormat::from_path(Path::new("api.JSON")),
            Some(DocumentFormat::Json)
        );
        assert_eq!(
            DocumentFormat::from_path(Path::new("api.yml")),
            Some(DocumentFormat::Yaml)
        );
        assert_eq!(DocumentFormat::from_path(Path::new("api.txt")), None);
    }

    #[test]
    fn test_sniff() {
        assert_eq!(DocumentFormat::sniff("  {\"openapi\": 1}"), DocumentFormat::Json);
        assert_eq!(DocumentFormat::sniff("openapi: 3.1.0"), DocumentFormat::Yaml);
    }

    #[test]
    fn test_yaml_preserves_key_order() {
        let yaml = "components:\n  schemas:\n    Zebra: {type: object}\n    Apple: {type: object}\n";
        let doc = parse_document(yaml, DocumentFormat::Yaml).unwrap();
        let keys: Vec<&String> = doc["components"]["schemas"]
            .as_object()
            .unwrap()
            .keys()
            .collect();
        assert_eq!(keys, ["Zebra", "Apple"]);
    }

    #[test]
    fn test_scalar_root_is_rejected() {
        let err = parse_document("42", DocumentFormat::Json).unwrap_err();
        assert!(matches!(err, ExtractError::InvalidDocument("a number")));
    }

    #[test]
    fn test_load_document_sniffs_unknown_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("spec.txt");
        std::fs::write(&path, r#"{"openapi": "3.0.0"}"#).unwrap();

        let doc = load_document(&path).unwrap();
        assert_eq!(doc["openapi"], "3.0.0");
    }
}
