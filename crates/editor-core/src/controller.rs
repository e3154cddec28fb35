//! The flush controller
//!
//! Edits accumulate in a working document. At a flush point (selection
//! change, teardown of the active editor, submit, test run) the controller
//! cleans the working document, merges the entry metadata into it,
//! compares it with the stored document and writes the resulting entry
//! back into the collection through the store.
//!
//! Every fallible step of a flush runs before the store sees a command, so
//! a failed flush leaves the collection as it was.

use serde::Serialize;
use serde_json::{Map, Value, json};

use editor_content::SemanticDiff;

use crate::Result;
use crate::collection::{ConfigStore, StoreCommand};
use crate::entry::ConfigEntry;
use crate::error::Error;
use crate::metadata::MetadataField;
use crate::session::EditorSession;
use crate::validate::{ValidationReport, validate_submission};

/// Whether a flush is running
///
/// A flush runs to completion inside one `&mut self` call, so from outside
/// the controller the state always reads `Idle`. `Flushing` marks the span
/// of the merge and guards against reentry.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FlushState {
    #[default]
    Idle,
    Flushing,
}

/// Asks the user to confirm a submission
pub trait Confirmation {
    fn confirm(&mut self, entry: &ConfigEntry) -> bool;
}

impl<F> Confirmation for F
where
    F: FnMut(&ConfigEntry) -> bool,
{
    fn confirm(&mut self, entry: &ConfigEntry) -> bool {
        self(entry)
    }
}

/// Result of [`ConfigSyncController::on_submit`]
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "lowercase")]
pub enum SubmitOutcome {
    /// Validation refused the submission; nothing was dispatched
    Blocked { report: ValidationReport },
    /// The user declined; nothing was dispatched
    Cancelled { entry: ConfigEntry, report: ValidationReport },
    /// The entry was handed to the store
    Submitted { entry: ConfigEntry, report: ValidationReport },
}

impl SubmitOutcome {
    pub fn report(&self) -> &ValidationReport {
        match self {
            Self::Blocked { report } | Self::Cancelled { report, .. } | Self::Submitted { report, .. } => report,
        }
    }

    pub fn is_submitted(&self) -> bool {
        matches!(self, Self::Submitted { .. })
    }
}

/// Keeps a working document in sync with the shared collection
pub struct ConfigSyncController<S: ConfigStore> {
    session: EditorSession,
    store: S,
    working: Value,
    pending_name: String,
    state: FlushState,
}

impl<S: ConfigStore> ConfigSyncController<S> {
    /// Create a controller; the store's current selection is loaded
    pub fn new(session: EditorSession, store: S) -> Self {
        let mut controller = Self {
            session,
            store,
            working: Value::Object(Map::new()),
            pending_name: String::new(),
            state: FlushState::Idle,
        };
        controller.load_active();
        controller
    }

    pub fn session(&self) -> &EditorSession {
        &self.session
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }

    pub fn state(&self) -> FlushState {
        self.state
    }

    pub fn working_document(&self) -> &Value {
        &self.working
    }

    /// The document the form layer edits between flushes
    pub fn working_document_mut(&mut self) -> &mut Value {
        &mut self.working
    }

    pub fn pending_name(&self) -> &str {
        &self.pending_name
    }

    /// Name given to a new entry at the next flush
    pub fn set_pending_name(&mut self, name: impl Into<String>) {
        self.pending_name = name.into();
    }

    /// Change the selection
    ///
    /// The current selection is flushed before the new one is loaded.
    pub fn select(&mut self, index: Option<usize>) -> Result<()> {
        if let Some(index) = index {
            self.store.collection().check_index(index)?;
        }

        self.on_selection_will_change()?;
        self.store.dispatch(StoreCommand::SelectActive(index));
        self.load_active();
        tracing::debug!("Selected entry {:?}", index);
        Ok(())
    }

    /// Flush if something is selected
    pub fn on_selection_will_change(&mut self) -> Result<Option<ConfigEntry>> {
        if self.store.collection().active_entry().is_none() {
            return Ok(None);
        }
        self.flush().map(Some)
    }

    /// Flush when the editor goes away while its type is the active one
    pub fn on_teardown(&mut self, active_editor_type: &str) -> Result<Option<ConfigEntry>> {
        if active_editor_type != self.session.editor_type() {
            tracing::debug!(
                "Skipping teardown flush: active editor is {}, not {}",
                active_editor_type,
                self.session.editor_type()
            );
            return Ok(None);
        }
        self.on_selection_will_change()
    }

    /// Flush and return the entry as it now sits in the collection
    pub fn get_cleaned_active_entry(&mut self) -> Result<ConfigEntry> {
        self.flush()
    }

    /// Flush, validate, confirm, and hand the entry to the store
    pub fn on_submit(&mut self, confirmation: &mut impl Confirmation) -> Result<SubmitOutcome> {
        let entry = self.flush()?;
        let collection = self.store.collection();
        let report = validate_submission(&entry, collection, collection.active_index());

        if report.is_blocked() {
            for issue in report.blocking() {
                tracing::info!("Submission of '{}' blocked: {}", entry.name, issue);
            }
            return Ok(SubmitOutcome::Blocked { report });
        }
        for issue in report.warnings() {
            tracing::warn!("Submission of '{}': {}", entry.name, issue);
        }

        if !confirmation.confirm(&entry) {
            tracing::debug!("Submission of '{}' cancelled", entry.name);
            return Ok(SubmitOutcome::Cancelled { entry, report });
        }

        let command = if entry.is_new {
            StoreCommand::SubmitNew(entry.clone())
        } else {
            StoreCommand::SubmitEdit(entry.clone())
        };
        tracing::info!("Submitting '{}' ({})", entry.name, command.name());
        self.store.dispatch(command);

        Ok(SubmitOutcome::Submitted { entry, report })
    }

    /// Flush and return the cleaned document for a test run
    pub fn on_test(&mut self) -> Result<Option<Value>> {
        Ok(self.flush()?.document)
    }

    /// Add a copy of the stored active entry as a new entry
    pub fn on_clone(&mut self) -> Result<ConfigEntry> {
        let source = self
            .store
            .collection()
            .active_entry()
            .ok_or(Error::NoActiveEntry)?;

        let name = format!("{}_clone", source.name);
        let metadata = self.session.metadata();
        let original = source
            .document
            .clone()
            .unwrap_or_else(|| Value::Object(Map::new()));
        let mut document = original.clone();
        let overridden = metadata
            .set(&mut document, MetadataField::Name, json!(name))
            .and_then(|()| metadata.set(&mut document, MetadataField::Version, json!(0)));
        if let Err(e) = overridden {
            tracing::warn!("Metadata not written into clone '{}': {}", name, e);
            document = original;
        }

        let clone = ConfigEntry {
            name,
            version: 0,
            author: self.session.user().to_string(),
            description: source.description.clone(),
            document: Some(document),
            is_new: true,
            saved_in_backend: false,
        };

        tracing::debug!("Cloned '{}' as '{}'", source.name, clone.name);
        self.store.dispatch(StoreCommand::AddEntry(clone.clone()));
        Ok(clone)
    }

    fn flush(&mut self) -> Result<ConfigEntry> {
        let collection = self.store.collection();
        let index = collection.active_index().ok_or(Error::NoActiveEntry)?;
        let stored = collection.active_entry().ok_or(Error::NoActiveEntry)?.clone();

        self.state = FlushState::Flushing;
        let entry = self.merge(&stored);
        self.state = FlushState::Idle;

        let entries = self.store.collection().replacing(index, entry.clone());
        self.store.dispatch(StoreCommand::ReplaceAll(entries));
        Ok(entry)
    }

    /// Build the flushed version of `stored` from the working document
    fn merge(&self, stored: &ConfigEntry) -> ConfigEntry {
        let (cleaned, report) = self.session.clean_with_report(&self.working);
        if !report.failed.is_empty() || !report.skipped.is_empty() {
            tracing::debug!(
                "Cleaning '{}': {} predicate failures, {} skipped rules",
                stored.name,
                report.failed.len(),
                report.skipped.len()
            );
        }

        let mut entry = stored.clone();
        if stored.is_new {
            entry.name = self.pending_name.clone();
            entry.version = 0;
            entry.author = self.session.user().to_string();
        }
        entry.document = cleaned.map(|document| self.mirrored(document, &entry));

        let metadata = self.session.metadata();
        entry.description = entry
            .document
            .as_ref()
            .and_then(|document| metadata.description_of(document));

        let diff = SemanticDiff::compute_optional(stored.document.as_ref(), entry.document.as_ref());
        if !diff.is_equivalent {
            tracing::debug!("Entry '{}' changed in {} places", entry.name, diff.changes.len());
            entry.saved_in_backend = false;
        }

        entry
    }

    /// Write the entry's metadata into `document`
    ///
    /// A document the metadata pointers cannot address (an array root, a
    /// scalar in the way) is kept as cleaned.
    fn mirrored(&self, document: Value, entry: &ConfigEntry) -> Value {
        let mut mirrored = document.clone();
        match self.session.metadata().mirror(&mut mirrored, entry) {
            Ok(()) => mirrored,
            Err(e) => {
                tracing::warn!("Metadata not mirrored into '{}': {}", entry.name, e);
                document
            }
        }
    }

    fn load_active(&mut self) {
        match self.store.collection().active_entry() {
            Some(entry) => {
                self.working = entry
                    .document
                    .clone()
                    .unwrap_or_else(|| Value::Object(Map::new()));
                self.pending_name = entry.name.clone();
            }
            None => {
                self.working = Value::Object(Map::new());
                self.pending_name.clear();
            }
        }
    }
}
