//! Error types for editor-core

use std::path::PathBuf;

/// Result type for editor-core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in editor-core operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// An operation needed a selected entry but nothing is selected
    #[error("No config entry is selected")]
    NoActiveEntry,

    /// Selection index outside the collection
    #[error("Index {index} is out of range for a collection of {len} entries")]
    IndexOutOfRange { index: usize, len: usize },

    /// Editor configuration is structurally invalid
    #[error("Invalid editor configuration: {message}")]
    InvalidConfig { message: String },

    /// Configuration file not found at expected path
    #[error("Configuration not found at {path}")]
    ConfigNotFound { path: PathBuf },

    // Transparent wrappers for underlying crate errors
    /// Pointer or document error from editor-content
    #[error(transparent)]
    Content(#[from] editor_content::Error),

    /// Rule error from editor-rules
    #[error(transparent)]
    Rules(#[from] editor_rules::Error),

    /// Standard I/O error
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error
    #[error(transparent)]
    Json(#[from] serde_json::Error),

    /// TOML deserialization error
    #[error(transparent)]
    TomlDe(#[from] toml::de::Error),
}

impl Error {
    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig {
            message: message.into(),
        }
    }
}
