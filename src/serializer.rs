//! Reading and writing persisted JSON documents.
//!
//! Documents are written pretty-printed. Before writing, every backslash is removed
//! from string values and object keys so that namespace separators never end up in
//! the output; this is done on the value tree, so JSON escapes stay intact.

use crate::error::{Error, Result};
use log::debug;
use serde_json::{Map, Value};
use std::fs;
use std::path::Path;

/// State of a document on disk.
#[derive(Debug, Clone, PartialEq)]
pub enum StoredDocument {
    /// No file at the path
    Absent,
    /// A JSON object
    Parsed(Map<String, Value>),
    /// The file exists but could not be read or is not a JSON object
    Unreadable(String),
}

/// Serializes a document to pretty-printed JSON.
pub fn serialize_json(doc: &Value) -> Result<String> {
    debug!("Serializing document to JSON");
    Ok(serde_json::to_string_pretty(doc)?)
}

/// Removes every backslash from string values and keys, recursively.
pub fn strip_backslashes(value: Value) -> Value {
    match value {
        Value::String(s) => Value::String(s.replace('\\', "")),
        Value::Array(items) => Value::Array(items.into_iter().map(strip_backslashes).collect()),
        Value::Object(map) => Value::Object(
            map.into_iter()
                .map(|(key, child)| (key.replace('\\', ""), strip_backslashes(child)))
                .collect(),
        ),
        other => other,
    }
}

/// Writes string content to a file, creating parent directories as needed.
pub fn write_to_file(content: &str, path: &Path) -> Result<()> {
    debug!("Writing content to file: {}", path.display());

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| Error::io(parent, e))?;
    }

    fs::write(path, content).map_err(|e| Error::io(path, e))?;

    debug!("Successfully wrote {} bytes to {}", content.len(), path.display());
    Ok(())
}

/// Strips backslashes from `doc`, serializes it and writes it to `path`.
///
/// # Arguments
///
/// * `doc` - Document to persist
/// * `path` - Destination file; missing parent directories are created
///
/// # Errors
///
/// Returns an error if serialization fails or the file cannot be written.
///
/// # Example
///
/// ```no_run
/// use openapi_from_invocation::serializer::write_document;
/// use serde_json::json;
/// use std::path::Path;
///
/// write_document(json!({"openapi": "3.0.0"}), Path::new("swagger/root.json")).unwrap();
/// ```
pub fn write_document(doc: Value, path: &Path) -> Result<()> {
    let content = serialize_json(&strip_backslashes(doc))?;
    write_to_file(&content, path)
}

/// Reads the document at `path`.
///
/// # Arguments
///
/// * `path` - Group or action document
///
/// # Returns
///
/// * [`StoredDocument::Absent`] when no file exists
/// * [`StoredDocument::Parsed`] when the file holds a JSON object
/// * [`StoredDocument::Unreadable`] with the reason otherwise; callers decide whether
///   that is fatal
pub fn read_document(path: &Path) -> StoredDocument {
    if !path.exists() {
        debug!("No document at {}", path.display());
        return StoredDocument::Absent;
    }

    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) => return StoredDocument::Unreadable(e.to_string()),
    };

    match serde_json::from_str::<Value>(&content) {
        Ok(Value::Object(map)) => StoredDocument::Parsed(map),
        Ok(_) => StoredDocument::Unreadable("expected a JSON object".to_string()),
        Err(e) => StoredDocument::Unreadable(e.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use tempfile::TempDir;

    #[test]
    fn test_serialize_json_pretty_format() {
        let json = serialize_json(&json!({"openapi": "3.0.0", "paths": {}})).unwrap();

        assert!(json.contains('\n'));
        assert!(json.contains("  \"openapi\": \"3.0.0\""));
    }

    #[test]
    fn test_strip_backslashes_in_keys_and_values() {
        let stripped = strip_backslashes(json!({
            "App\\Http\\Widget": ["App\\Models\\Widget", 1, null],
            "nested": {"quote": "say \"hi\""}
        }));

        assert_eq!(
            stripped,
            json!({
                "AppHttpWidget": ["AppModelsWidget", 1, null],
                "nested": {"quote": "say \"hi\""}
            })
        );
    }

    #[test]
    fn test_write_document_keeps_escapes_valid() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("doc.json");

        write_document(json!({"message": "a \"quoted\" App\\Widget"}), &path).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        let parsed: Value = serde_json::from_str(&content).unwrap();
        assert_eq!(parsed["message"], json!("a \"quoted\" AppWidget"));
    }

    #[test]
    fn test_write_to_file_creates_directories() {
        let temp_dir = TempDir::new().unwrap();
        let file_path = temp_dir.path().join("swagger").join("widget").join("index.json");

        write_to_file("{}", &file_path).unwrap();

        assert_eq!(fs::read_to_string(&file_path).unwrap(), "{}");
    }

    #[test]
    fn test_write_to_file_overwrites_existing() {
        let temp_dir = TempDir::new().unwrap();
        let file_path = temp_dir.path().join("doc.json");

        write_to_file("initial content", &file_path).unwrap();
        write_to_file("new content", &file_path).unwrap();

        assert_eq!(fs::read_to_string(&file_path).unwrap(), "new content");
    }

    #[test]
    fn test_read_document_states() {
        let temp_dir = TempDir::new().unwrap();
        let missing = temp_dir.path().join("missing.json");
        let parsed = temp_dir.path().join("parsed.json");
        let corrupt = temp_dir.path().join("corrupt.json");
        let scalar = temp_dir.path().join("scalar.json");
        fs::write(&parsed, "{\"get\": {}}").unwrap();
        fs::write(&corrupt, "{\"get\": ").unwrap();
        fs::write(&scalar, "42").unwrap();

        assert_eq!(read_document(&missing), StoredDocument::Absent);
        assert_eq!(
            read_document(&parsed),
            StoredDocument::Parsed(json!({"get": {}}).as_object().cloned().unwrap())
        );
        assert!(matches!(read_document(&corrupt), StoredDocument::Unreadable(_)));
        assert!(matches!(read_document(&scalar), StoredDocument::Unreadable(_)));
    }
}
