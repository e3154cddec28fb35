//! Error types for editor-rules

/// Result type for editor-rules operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in editor-rules operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Unexpected character at byte {position} in predicate")]
    Lex { position: usize },

    #[error("Predicate parse error at byte {position}: {message}")]
    Parse { position: usize, message: String },

    #[error("Predicate evaluation error: {message}")]
    Eval { message: String },

    #[error("Rule {path} has {count} wildcards; only one is supported")]
    NestedWildcard { path: String, count: usize },

    #[error("Invalid rule set: {message}")]
    InvalidRuleSet { message: String },
}

impl Error {
    pub fn parse(position: usize, message: impl Into<String>) -> Self {
        Self::Parse {
            position,
            message: message.into(),
        }
    }

    pub fn eval(message: impl Into<String>) -> Self {
        Self::Eval {
            message: message.into(),
        }
    }
}
