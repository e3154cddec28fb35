//! Where entry metadata lives inside a document
//!
//! Each editor type mirrors the entry's name, version, author and
//! description into fields of the document itself. The [`MetadataMap`]
//! names those fields by pointer.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use editor_content::pointer::{get_at_pointer, parse_pointer, set_at_pointer};

use crate::Result;
use crate::entry::ConfigEntry;
use crate::error::Error;

fn default_name() -> String {
    "/name".to_string()
}

fn default_version() -> String {
    "/version".to_string()
}

fn default_author() -> String {
    "/author".to_string()
}

fn default_description() -> String {
    "/description".to_string()
}

/// A logical metadata field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MetadataField {
    Name,
    Version,
    Author,
    Description,
}

impl MetadataField {
    pub const ALL: [MetadataField; 4] = [Self::Name, Self::Version, Self::Author, Self::Description];
}

impl fmt::Display for MetadataField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Name => write!(f, "name"),
            Self::Version => write!(f, "version"),
            Self::Author => write!(f, "author"),
            Self::Description => write!(f, "description"),
        }
    }
}

/// Pointers to the metadata fields of a document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetadataMap {
    #[serde(default = "default_name")]
    pub name: String,
    #[serde(default = "default_version")]
    pub version: String,
    #[serde(default = "default_author")]
    pub author: String,
    #[serde(default = "default_description")]
    pub description: String,
}

impl Default for MetadataMap {
    fn default() -> Self {
        Self {
            name: default_name(),
            version: default_version(),
            author: default_author(),
            description: default_description(),
        }
    }
}

impl MetadataMap {
    /// Pointer for a field
    pub fn pointer(&self, field: MetadataField) -> &str {
        match field {
            MetadataField::Name => &self.name,
            MetadataField::Version => &self.version,
            MetadataField::Author => &self.author,
            MetadataField::Description => &self.description,
        }
    }

    /// Reject pointers that address the document root or contain wildcards
    pub fn validate(&self) -> Result<()> {
        for field in MetadataField::ALL {
            let segments = parse_pointer(self.pointer(field));
            if segments.is_empty() {
                return Err(Error::invalid_config(format!(
                    "metadata field '{}' cannot point at the document root",
                    field
                )));
            }
            if segments.iter().any(|s| s.is_wildcard()) {
                return Err(Error::invalid_config(format!(
                    "metadata field '{}' cannot contain a wildcard",
                    field
                )));
            }
        }
        Ok(())
    }

    pub fn get<'a>(&self, document: &'a Value, field: MetadataField) -> Option<&'a Value> {
        get_at_pointer(document, &parse_pointer(self.pointer(field)))
    }

    pub fn set(&self, document: &mut Value, field: MetadataField, value: Value) -> Result<()> {
        set_at_pointer(document, &parse_pointer(self.pointer(field)), value)?;
        Ok(())
    }

    /// Write the entry's name, version and author into the document
    pub fn mirror(&self, document: &mut Value, entry: &ConfigEntry) -> Result<()> {
        self.set(document, MetadataField::Name, json!(entry.name))?;
        self.set(document, MetadataField::Version, json!(entry.version))?;
        self.set(document, MetadataField::Author, json!(entry.author))?;
        Ok(())
    }

    /// Read the description field; non-string values are rendered as JSON
    pub fn description_of(&self, document: &Value) -> Option<String> {
        match self.get(document, MetadataField::Description)? {
            Value::String(s) => Some(s.clone()),
            Value::Null => None,
            other => Some(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_when_partially_configured() {
        let map: MetadataMap = toml::from_str(r#"name = "/rule_name""#).unwrap();
        assert_eq!(map.name, "/rule_name");
        assert_eq!(map.version, "/version");
        assert_eq!(map.description, "/description");
    }

    #[test]
    fn test_mirror_writes_nested_paths() {
        let map = MetadataMap {
            name: "/meta/name".to_string(),
            ..MetadataMap::default()
        };
        let entry = ConfigEntry::stored("alpha", 2, "ana", json!({}));
        let mut doc = json!({"body": true});

        map.mirror(&mut doc, &entry).unwrap();

        assert_eq!(
            doc,
            json!({"body": true, "meta": {"name": "alpha"}, "version": 2, "author": "ana"})
        );
    }

    #[test]
    fn test_mirror_fails_through_scalar() {
        let map = MetadataMap {
            name: "/meta/name".to_string(),
            ..MetadataMap::default()
        };
        let entry = ConfigEntry::stored("alpha", 2, "ana", json!({}));
        let mut doc = json!({"meta": 5});
        assert!(map.mirror(&mut doc, &entry).is_err());
    }

    #[test]
    fn test_description_of() {
        let map = MetadataMap::default();
        assert_eq!(map.description_of(&json!({"description": "hi"})), Some("hi".to_string()));
        assert_eq!(map.description_of(&json!({"description": 4})), Some("4".to_string()));
        assert_eq!(map.description_of(&json!({})), None);
    }

    #[test]
    fn test_validate_rejects_root_and_wildcard() {
        let root = MetadataMap {
            author: "/".to_string(),
            ..MetadataMap::default()
        };
        assert!(matches!(root.validate(), Err(Error::InvalidConfig { .. })));

        let wildcard = MetadataMap {
            name: "/names/-".to_string(),
            ..MetadataMap::default()
        };
        assert!(wildcard.validate().is_err());
        assert!(MetadataMap::default().validate().is_ok());
    }
}
