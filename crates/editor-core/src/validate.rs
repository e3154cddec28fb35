//! Submission checks
//!
//! Checks run in a fixed order and stop at the first blocking issue:
//! an empty document blocks before any name check runs. Name checks apply
//! only to entries that were never stored. A space in the name is reported
//! but does not block the submission.

use std::fmt;

use serde::Serialize;

use crate::collection::Collection;
use crate::entry::ConfigEntry;

/// Severity of a validation issue
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Reported, submission proceeds
    Warning,
    /// Submission is refused
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Warning => write!(f, "warning"),
            Self::Error => write!(f, "error"),
        }
    }
}

/// A problem found while validating a submission
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ValidationIssue {
    EmptyDocument,
    MissingName,
    DuplicateName { name: String },
    NameHasSpaces { name: String },
}

impl ValidationIssue {
    pub fn severity(&self) -> Severity {
        match self {
            Self::NameHasSpaces { .. } => Severity::Warning,
            _ => Severity::Error,
        }
    }

    pub fn is_blocking(&self) -> bool {
        self.severity() == Severity::Error
    }

    /// Message shown to the user
    pub fn message(&self) -> &'static str {
        match self {
            Self::EmptyDocument => "No data inputted to form",
            Self::MissingName => "A name must be provided",
            Self::DuplicateName { .. } => "Config name must be unique",
            Self::NameHasSpaces { .. } => "Config names cannot contain spaces",
        }
    }
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

/// Outcome of validating a submission
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ValidationReport {
    pub issues: Vec<ValidationIssue>,
}

impl ValidationReport {
    /// True when no issue at all was found
    pub fn is_ok(&self) -> bool {
        self.issues.is_empty()
    }

    pub fn is_blocked(&self) -> bool {
        self.issues.iter().any(ValidationIssue::is_blocking)
    }

    pub fn blocking(&self) -> impl Iterator<Item = &ValidationIssue> {
        self.issues.iter().filter(|i| i.is_blocking())
    }

    pub fn warnings(&self) -> impl Iterator<Item = &ValidationIssue> {
        self.issues.iter().filter(|i| !i.is_blocking())
    }
}

/// Validate `entry`, the flushed version of the entry at `index`
///
/// The entry at `index` itself is not considered a duplicate.
///
/// # Examples
///
/// ```
/// use editor_core::{Collection, ConfigEntry, ValidationIssue, validate_submission};
/// use serde_json::json;
///
/// let collection = Collection::new(vec![ConfigEntry::stored("alpha", 1, "ana", json!({"a": 1}))]);
/// let mut entry = ConfigEntry::draft("bo");
/// entry.name = "alpha".to_string();
/// entry.document = Some(json!({"b": 2}));
///
/// let report = validate_submission(&entry, &collection, None);
/// assert!(report.is_blocked());
/// assert!(matches!(report.issues[0], ValidationIssue::DuplicateName { .. }));
/// ```
pub fn validate_submission(
    entry: &ConfigEntry,
    collection: &Collection,
    index: Option<usize>,
) -> ValidationReport {
    let mut report = ValidationReport::default();

    if !entry.has_document() {
        report.issues.push(ValidationIssue::EmptyDocument);
        return report;
    }

    if !entry.is_new {
        return report;
    }

    if entry.name.is_empty() {
        report.issues.push(ValidationIssue::MissingName);
        return report;
    }

    let duplicate = collection
        .entries()
        .iter()
        .enumerate()
        .any(|(i, other)| Some(i) != index && other.has_document() && other.name == entry.name);
    if duplicate {
        report.issues.push(ValidationIssue::DuplicateName {
            name: entry.name.clone(),
        });
        return report;
    }

    if entry.name.contains(' ') {
        report.issues.push(ValidationIssue::NameHasSpaces {
            name: entry.name.clone(),
        });
    }

    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn draft(name: &str) -> ConfigEntry {
        let mut entry = ConfigEntry::draft("ana");
        entry.name = name.to_string();
        entry.document = Some(json!({"k": 1}));
        entry
    }

    #[test]
    fn test_stored_entry_skips_name_checks() {
        let mut entry = ConfigEntry::stored("has space", 1, "ana", json!({"k": 1}));
        entry.name = String::new();
        let report = validate_submission(&entry, &Collection::default(), None);
        assert!(report.is_ok());
    }

    #[test]
    fn test_duplicate_ignores_entries_without_document() {
        let mut hollow = ConfigEntry::stored("alpha", 1, "ana", json!({}));
        hollow.document = None;
        let collection = Collection::new(vec![hollow]);
        assert!(validate_submission(&draft("alpha"), &collection, None).is_ok());
    }

    #[test]
    fn test_duplicate_ignores_self() {
        let collection = Collection::new(vec![draft("alpha")]);
        assert!(validate_submission(&draft("alpha"), &collection, Some(0)).is_ok());
    }

    #[test]
    fn test_space_warning_does_not_block() {
        let report = validate_submission(&draft("a b"), &Collection::default(), None);
        assert!(!report.is_blocked());
        assert_eq!(report.warnings().count(), 1);
        assert_eq!(report.issues[0].message(), "Config names cannot contain spaces");
    }

    #[test]
    fn test_issue_serializes_kind() {
        let value = serde_json::to_value(ValidationIssue::DuplicateName {
            name: "x".to_string(),
        })
        .unwrap();
        assert_eq!(value, json!({"kind": "duplicate_name", "name": "x"}));
    }
}
