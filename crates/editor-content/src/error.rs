//! Error types for editor-content

/// Result type for editor-content operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in editor-content operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Cannot set {path}: {reason}")]
    PathSetFailed { path: String, reason: String },

    #[error("Pointer {path} contains an unresolved wildcard")]
    UnresolvedWildcard { path: String },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    pub fn set_failed(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::PathSetFailed {
            path: path.into(),
            reason: reason.into(),
        }
    }
}
