//! Diff command implementation

use std::path::Path;

use colored::Colorize;
use serde_json::Value;

use editor_content::{SemanticChange, SemanticDiff};

use super::read_json;
use crate::error::Result;

/// Run the diff command
pub fn run_diff(old: &Path, new: &Path, json: bool, text: bool) -> Result<()> {
    let old_doc: Value = read_json(old)?;
    let new_doc: Value = read_json(new)?;

    if text {
        print!("{}", SemanticDiff::unified_text(&old_doc, &new_doc));
        return Ok(());
    }

    let diff = SemanticDiff::compute(&old_doc, &new_doc);
    if json {
        println!("{}", serde_json::to_string_pretty(&diff)?);
    } else {
        print_diff_output(&diff);
    }

    Ok(())
}

/// Print human-readable diff-style output
fn print_diff_output(diff: &SemanticDiff) {
    if diff.is_equivalent {
        println!("{} Documents are equivalent.", "OK".green().bold());
        return;
    }

    println!(
        "{} {} changes (similarity {:.2})",
        "Diff".blue().bold(),
        diff.changes.len(),
        diff.similarity
    );
    println!();

    for change in &diff.changes {
        match change {
            SemanticChange::Added { path, value } => {
                println!("  {} {} {}", "+".green(), path.green(), value)
            }
            SemanticChange::Removed { path, value } => {
                println!("  {} {} {}", "-".red(), path.red(), value)
            }
            SemanticChange::Modified { path, old, new } => {
                println!("  {} {} {} -> {}", "~".yellow(), path.yellow(), old, new)
            }
            SemanticChange::LineAdded { content } => print!("  {} {}", "+".green(), content),
            SemanticChange::LineRemoved { content } => print!("  {} {}", "-".red(), content),
        }
    }
}
