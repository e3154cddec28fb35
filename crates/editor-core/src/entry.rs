//! Config entries held in a collection

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One document plus its bookkeeping metadata
///
/// Serialized with the field names the config store uses (`configData`,
/// `isNew`, `savedInBackend`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigEntry {
    pub name: String,

    /// Starts at 0 for entries that were never stored
    #[serde(default)]
    pub version: u64,

    #[serde(default)]
    pub author: String,

    /// Mirrored from the document's description field on every flush
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// `None` when the document is absent or cleaned away entirely
    #[serde(rename = "configData", default, skip_serializing_if = "Option::is_none")]
    pub document: Option<Value>,

    #[serde(default)]
    pub is_new: bool,

    /// Cleared whenever a flush changes the stored document
    #[serde(default)]
    pub saved_in_backend: bool,
}

impl ConfigEntry {
    /// An entry loaded from the backend
    pub fn stored(name: impl Into<String>, version: u64, author: impl Into<String>, document: Value) -> Self {
        Self {
            name: name.into(),
            version,
            author: author.into(),
            description: None,
            document: Some(document),
            is_new: false,
            saved_in_backend: true,
        }
    }

    /// A blank entry that has never been submitted
    pub fn draft(author: impl Into<String>) -> Self {
        Self {
            name: String::new(),
            version: 0,
            author: author.into(),
            description: None,
            document: None,
            is_new: true,
            saved_in_backend: false,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Whether the entry carries a document with any content
    pub fn has_document(&self) -> bool {
        match &self.document {
            None | Some(Value::Null) => false,
            Some(Value::Object(map)) => !map.is_empty(),
            Some(Value::Array(items)) => !items.is_empty(),
            Some(_) => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_store_field_names() {
        let entry = ConfigEntry::stored("alpha", 3, "ana", json!({"a": 1}));
        let value = serde_json::to_value(&entry).unwrap();
        assert_eq!(
            value,
            json!({
                "name": "alpha",
                "version": 3,
                "author": "ana",
                "configData": {"a": 1},
                "isNew": false,
                "savedInBackend": true
            })
        );
    }

    #[test]
    fn test_deserialize_defaults() {
        let entry: ConfigEntry = serde_json::from_value(json!({"name": "beta"})).unwrap();
        assert_eq!(entry.version, 0);
        assert!(entry.document.is_none());
        assert!(!entry.is_new);
        assert!(!entry.saved_in_backend);
    }

    #[test]
    fn test_has_document() {
        assert!(!ConfigEntry::draft("u").has_document());
        assert!(!ConfigEntry::stored("a", 0, "u", json!({})).has_document());
        assert!(ConfigEntry::stored("a", 0, "u", json!({"k": 1})).has_document());
    }
}
