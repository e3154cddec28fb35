//! Config entry synchronization for the config editor
//!
//! Ties the document pipeline together. A [`ConfigSyncController`] owns the
//! working copy of the selected entry and, at every flush point, runs the
//! visibility rules and the normalizer over it, mirrors the entry metadata
//! into the cleaned document, computes the dirty flag and writes the entry
//! back through a [`ConfigStore`].
//!
//! ```
//! use editor_core::{Collection, ConfigEntry, ConfigSyncController, EditorSession, InMemoryStore};
//! use serde_json::json;
//!
//! let entries = vec![ConfigEntry::stored("alpha", 1, "ana", json!({"threshold": 3}))];
//! let store = InMemoryStore::new(Collection::with_active(entries, 0).unwrap());
//! let mut controller = ConfigSyncController::new(EditorSession::new("alert", "ana"), store);
//!
//! controller.working_document_mut()["threshold"] = json!(5);
//! let entry = controller.get_cleaned_active_entry().unwrap();
//!
//! assert!(!entry.saved_in_backend);
//! assert_eq!(entry.document.unwrap()["name"], json!("alpha"));
//! ```

pub mod collection;
pub mod config;
pub mod controller;
pub mod entry;
pub mod error;
pub mod metadata;
pub mod session;
pub mod validate;

pub use collection::{Collection, ConfigStore, InMemoryStore, StoreCommand};
pub use config::{EditorConfig, OrderingKind};
pub use controller::{Confirmation, ConfigSyncController, FlushState, SubmitOutcome};
pub use entry::ConfigEntry;
pub use error::{Error, Result};
pub use metadata::{MetadataField, MetadataMap};
pub use session::EditorSession;
pub use validate::{Severity, ValidationIssue, ValidationReport, validate_submission};
