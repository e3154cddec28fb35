//! Clean command implementation
//!
//! Runs a document through the visibility rules and the normalizer of an
//! editor configuration.

use std::fs;
use std::path::Path;

use colored::Colorize;
use serde_json::{Map, Value};

use editor_core::EditorConfig;

use super::read_json;
use crate::error::Result;

/// Run the clean command
pub fn run_clean(config: &Path, document: &Path, output: Option<&Path>) -> Result<()> {
    let session = EditorConfig::load(config)?.into_session("cfged")?;
    let document: Value = read_json(document)?;

    let (cleaned, report) = session.clean_with_report(&document);
    for skipped in &report.skipped {
        tracing::warn!("Rule {} was not applied", skipped.path);
    }
    tracing::info!("Removed {} hidden fields", report.removed.len());

    let cleaned = cleaned.unwrap_or_else(|| {
        tracing::info!("Nothing left of the document after cleaning");
        Value::Object(Map::new())
    });
    let rendered = serde_json::to_string_pretty(&cleaned)?;

    match output {
        Some(path) => {
            fs::write(path, format!("{}\n", rendered))?;
            eprintln!("{} Wrote {}", "OK".green().bold(), path.display());
        }
        None => println!("{}", rendered),
    }

    Ok(())
}
