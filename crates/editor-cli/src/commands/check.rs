//! Check command implementation
//!
//! Loads a collection, flushes one entry the way the editor does before a
//! submission and runs the submission checks. Nothing is submitted: the
//! confirmation step always declines.

use std::path::PathBuf;

use colored::Colorize;
use serde_json::{Value, json};

use editor_core::{
    Collection, ConfigEntry, ConfigStore, ConfigSyncController, EditorConfig, InMemoryStore,
    Severity, SubmitOutcome, ValidationReport,
};

use super::read_json;
use crate::error::{CliError, Result};

/// Arguments of the check command
#[derive(Debug, Clone)]
pub struct CheckArgs {
    pub config: PathBuf,
    pub collection: PathBuf,
    pub index: usize,
    pub user: String,
    pub name: Option<String>,
    pub document: Option<PathBuf>,
    pub json: bool,
}

/// Run the check command
pub fn run_check(args: &CheckArgs) -> Result<()> {
    let session = EditorConfig::load(&args.config)?.into_session(args.user.clone())?;
    let entries: Vec<ConfigEntry> = read_json(&args.collection)?;
    let collection = Collection::with_active(entries, args.index)?;
    let mut controller = ConfigSyncController::new(session, InMemoryStore::new(collection));

    if let Some(path) = &args.document {
        *controller.working_document_mut() = read_json::<Value>(path)?;
    }
    if let Some(name) = &args.name {
        controller.set_pending_name(name.clone());
    }

    let outcome = controller.on_submit(&mut |_: &ConfigEntry| false)?;
    let entry = match &outcome {
        SubmitOutcome::Cancelled { entry, .. } | SubmitOutcome::Submitted { entry, .. } => entry.clone(),
        SubmitOutcome::Blocked { .. } => controller
            .store()
            .collection()
            .active_entry()
            .cloned()
            .ok_or_else(|| CliError::user("Entry disappeared during flush"))?,
    };
    let report = outcome.report();

    if args.json {
        let output = json!({
            "blocked": report.is_blocked(),
            "entry": entry,
            "issues": report.issues,
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        print_check_output(&entry, report)?;
    }

    if report.is_blocked() {
        let reasons: Vec<&str> = report.blocking().map(|issue| issue.message()).collect();
        return Err(CliError::Blocked {
            reasons: reasons.join("; "),
        });
    }

    Ok(())
}

fn print_check_output(entry: &ConfigEntry, report: &ValidationReport) -> Result<()> {
    let state = if entry.saved_in_backend {
        "saved".green()
    } else {
        "modified".yellow()
    };
    println!(
        "{} {} v{} by {} ({})",
        "Entry".blue().bold(),
        entry.name.cyan(),
        entry.version,
        entry.author,
        state
    );

    match &entry.document {
        Some(document) => println!("{}", serde_json::to_string_pretty(document)?),
        None => println!("{}", "(empty document)".dimmed()),
    }
    println!();

    if report.is_ok() {
        println!("{} Ready to submit.", "OK".green().bold());
        return Ok(());
    }
    for issue in &report.issues {
        let label = match issue.severity() {
            Severity::Error => "error".red().bold(),
            Severity::Warning => "warning".yellow().bold(),
        };
        println!("  {} {}", label, issue);
    }

    Ok(())
}
