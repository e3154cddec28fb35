//! Command implementations for editor-cli

pub mod check;
pub mod clean;
pub mod diff;

pub use check::{CheckArgs, run_check};
pub use clean::run_clean;
pub use diff::run_diff;

use std::fs;
use std::path::Path;

use serde::de::DeserializeOwned;

use crate::error::{CliError, Result};

/// Read and parse a JSON file
pub(crate) fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let content = fs::read_to_string(path)
        .map_err(|e| CliError::user(format!("Cannot read {}: {}", path.display(), e)))?;
    serde_json::from_str(&content)
        .map_err(|e| CliError::user(format!("Invalid JSON in {}: {}", path.display(), e)))
}
