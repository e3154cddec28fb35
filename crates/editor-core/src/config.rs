//! Editor configuration parsed from TOML
//!
//! ```toml
//! [editor]
//! type = "alert"
//! ordering = "schema"
//! schema = "schema.json"
//!
//! [metadata]
//! name = "/rule_name"
//!
//! [rules]
//! "/matchers/-/pattern" = "model.matchers[index].type == 'is_in_set'"
//! ```
//!
//! A relative `schema` path is resolved against the directory of the
//! config file when the config is loaded with [`EditorConfig::load`].

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::Value;

use editor_content::{KeyOrdering, PreserveOrder, SchemaOrder, SortedKeys};
use editor_rules::RuleSet;

use crate::Result;
use crate::error::Error;
use crate::metadata::MetadataMap;
use crate::session::EditorSession;

/// Which key ordering cleaned documents get
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderingKind {
    #[default]
    Preserve,
    Sorted,
    Schema,
}

/// The `[editor]` table
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EditorSection {
    /// Editor type; teardown flushes only when it matches the active type
    #[serde(rename = "type", default)]
    pub editor_type: String,

    #[serde(default)]
    pub ordering: OrderingKind,

    /// JSON schema used by `ordering = "schema"`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<PathBuf>,
}

/// Configuration for one editor type
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EditorConfig {
    #[serde(default)]
    pub editor: EditorSection,

    #[serde(default)]
    pub metadata: MetadataMap,

    /// Visibility rules: pointer -> predicate
    #[serde(default)]
    pub rules: RuleSet,

    /// Directory relative schema paths are resolved against
    #[serde(skip)]
    base_dir: Option<PathBuf>,
}

impl EditorConfig {
    /// Parse a configuration from TOML content
    ///
    /// # Example
    ///
    /// ```
    /// use editor_core::config::{EditorConfig, OrderingKind};
    ///
    /// let config = EditorConfig::parse(r#"
    /// [editor]
    /// type = "alert"
    /// ordering = "sorted"
    ///
    /// [rules]
    /// "/debug" = "!model.verbose"
    /// "#).unwrap();
    ///
    /// assert_eq!(config.editor.editor_type, "alert");
    /// assert_eq!(config.editor.ordering, OrderingKind::Sorted);
    /// assert_eq!(config.metadata.name, "/name");
    /// assert_eq!(config.rules.len(), 1);
    /// ```
    pub fn parse(content: &str) -> Result<Self> {
        let config: EditorConfig = toml::from_str(content)?;
        config.metadata.validate()?;
        Ok(config)
    }

    /// Load a configuration file
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(Error::ConfigNotFound {
                path: path.to_path_buf(),
            });
        }
        let content = fs::read_to_string(path)?;
        let mut config = Self::parse(&content)?;
        config.base_dir = path.parent().map(Path::to_path_buf);
        Ok(config)
    }

    /// Path of the schema file, resolved against the config's directory
    pub fn schema_path(&self) -> Option<PathBuf> {
        let schema = self.editor.schema.as_ref()?;
        match &self.base_dir {
            Some(base) if schema.is_relative() => Some(base.join(schema)),
            _ => Some(schema.clone()),
        }
    }

    /// Build the ordering strategy, reading the schema if needed
    pub fn ordering(&self) -> Result<Box<dyn KeyOrdering>> {
        Ok(match self.editor.ordering {
            OrderingKind::Preserve => Box::new(PreserveOrder),
            OrderingKind::Sorted => Box::new(SortedKeys),
            OrderingKind::Schema => {
                let path = self.schema_path().ok_or_else(|| {
                    Error::invalid_config("ordering = \"schema\" requires editor.schema")
                })?;
                let content = fs::read_to_string(&path)?;
                let schema: Value = serde_json::from_str(&content)?;
                tracing::debug!("Loaded ordering schema from {}", path.display());
                Box::new(SchemaOrder::new(schema))
            }
        })
    }

    /// Assemble a session for `user`
    pub fn into_session(self, user: impl Into<String>) -> Result<EditorSession> {
        let ordering = self.ordering()?;
        Ok(EditorSession::new(self.editor.editor_type, user)
            .with_rules(self.rules)
            .with_metadata(self.metadata)
            .with_ordering(ordering))
    }
}
