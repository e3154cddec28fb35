//! Semantic diff types and computation
//!
//! The sync controller uses [`SemanticDiff::compute`] to decide whether a
//! flushed document differs from the stored one; the CLI renders the
//! change list for humans.

use serde::Serialize;
use serde_json::Value;
use similar::TextDiff;

use crate::pointer::{Segment, format_pointer};

/// Maximum recursion depth for diff operations
const MAX_DIFF_DEPTH: usize = 128;

/// Result of comparing two documents semantically
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SemanticDiff {
    /// Are the documents semantically equivalent?
    pub is_equivalent: bool,
    /// List of semantic changes
    pub changes: Vec<SemanticChange>,
    /// Similarity ratio (0.0 to 1.0)
    pub similarity: f64,
}

impl SemanticDiff {
    /// Create a diff indicating documents are equivalent
    pub fn equivalent() -> Self {
        Self {
            is_equivalent: true,
            changes: Vec::new(),
            similarity: 1.0,
        }
    }

    /// Compute a semantic diff between two JSON values
    ///
    /// Object key order is not significant. Changes are keyed by pointer
    /// (e.g., `/config/host`, `/items/2`).
    pub fn compute(old: &Value, new: &Value) -> Self {
        let mut changes = Vec::new();
        let mut path = Vec::new();
        diff_values(old, new, &mut path, &mut changes, 0);

        let similarity = compute_similarity(old, new);

        Self {
            is_equivalent: changes.is_empty(),
            changes,
            similarity,
        }
    }

    /// Compute a diff between two optional documents
    ///
    /// An absent document behaves like `null`.
    pub fn compute_optional(old: Option<&Value>, new: Option<&Value>) -> Self {
        if old.is_none() && new.is_none() {
            return Self::equivalent();
        }
        let null = Value::Null;
        Self::compute(old.unwrap_or(&null), new.unwrap_or(&null))
    }

    /// Compute a line diff between two text renderings
    ///
    /// Uses the `similar` crate's TextDiff for line-by-line comparison.
    pub fn compute_text(old: &str, new: &str) -> Self {
        if old == new {
            return Self::equivalent();
        }

        let text_diff = TextDiff::from_lines(old, new);
        let similarity = text_diff.ratio() as f64;

        let changes: Vec<SemanticChange> = text_diff
            .iter_all_changes()
            .filter_map(|change| match change.tag() {
                similar::ChangeTag::Delete => Some(SemanticChange::LineRemoved {
                    content: change.value().to_string(),
                }),
                similar::ChangeTag::Insert => Some(SemanticChange::LineAdded {
                    content: change.value().to_string(),
                }),
                similar::ChangeTag::Equal => None,
            })
            .collect();

        Self {
            is_equivalent: changes.is_empty(),
            changes,
            similarity,
        }
    }

    /// Render a unified diff of the pretty-printed documents
    pub fn unified_text(old: &Value, new: &Value) -> String {
        let old_text = serde_json::to_string_pretty(old).unwrap_or_default();
        let new_text = serde_json::to_string_pretty(new).unwrap_or_default();
        TextDiff::from_lines(&old_text, &new_text)
            .unified_diff()
            .header("stored", "cleaned")
            .to_string()
    }
}

impl Default for SemanticDiff {
    fn default() -> Self {
        Self::equivalent()
    }
}

/// A semantic change between documents
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SemanticChange {
    /// Key/path added
    Added { path: String, value: Value },
    /// Key/path removed
    Removed { path: String, value: Value },
    /// Value changed at path
    Modified { path: String, old: Value, new: Value },
    /// Line added (text diffs)
    LineAdded { content: String },
    /// Line removed (text diffs)
    LineRemoved { content: String },
}

impl SemanticChange {
    /// Pointer of the change, if it is a structural one
    pub fn path(&self) -> Option<&str> {
        match self {
            Self::Added { path, .. } | Self::Removed { path, .. } | Self::Modified { path, .. } => {
                Some(path)
            }
            Self::LineAdded { .. } | Self::LineRemoved { .. } => None,
        }
    }
}

/// Recursive diff with depth tracking
fn diff_values(
    old: &Value,
    new: &Value,
    path: &mut Vec<Segment>,
    changes: &mut Vec<SemanticChange>,
    depth: usize,
) {
    // Depth limit: treat deeply nested differences as a single modification
    if depth > MAX_DIFF_DEPTH {
        if old != new {
            changes.push(SemanticChange::Modified {
                path: format_pointer(path),
                old: old.clone(),
                new: new.clone(),
            });
        }
        return;
    }

    match (old, new) {
        (Value::Object(old_obj), Value::Object(new_obj)) => {
            for (key, old_value) in old_obj {
                path.push(Segment::Key(key.clone()));
                match new_obj.get(key) {
                    Some(new_value) => diff_values(old_value, new_value, path, changes, depth + 1),
                    None => changes.push(SemanticChange::Removed {
                        path: format_pointer(path),
                        value: old_value.clone(),
                    }),
                }
                path.pop();
            }

            for (key, new_value) in new_obj {
                if !old_obj.contains_key(key) {
                    path.push(Segment::Key(key.clone()));
                    changes.push(SemanticChange::Added {
                        path: format_pointer(path),
                        value: new_value.clone(),
                    });
                    path.pop();
                }
            }
        }

        (Value::Array(old_arr), Value::Array(new_arr)) => {
            let max_len = old_arr.len().max(new_arr.len());
            for i in 0..max_len {
                path.push(Segment::Index(i));
                match (old_arr.get(i), new_arr.get(i)) {
                    (Some(old_val), Some(new_val)) => {
                        diff_values(old_val, new_val, path, changes, depth + 1)
                    }
                    (Some(old_val), None) => changes.push(SemanticChange::Removed {
                        path: format_pointer(path),
                        value: old_val.clone(),
                    }),
                    (None, Some(new_val)) => changes.push(SemanticChange::Added {
                        path: format_pointer(path),
                        value: new_val.clone(),
                    }),
                    (None, None) => {}
                }
                path.pop();
            }
        }

        _ => {
            if old != new {
                changes.push(SemanticChange::Modified {
                    path: format_pointer(path),
                    old: old.clone(),
                    new: new.clone(),
                });
            }
        }
    }
}

/// Compute similarity ratio between two JSON values
///
/// Serializes both values and uses similar::TextDiff::ratio() for a quick
/// estimate.
fn compute_similarity(old: &Value, new: &Value) -> f64 {
    if old == new {
        return 1.0;
    }

    let old_str = serde_json::to_string(old).unwrap_or_default();
    let new_str = serde_json::to_string(new).unwrap_or_default();

    let diff = TextDiff::from_chars(&old_str, &new_str);
    diff.ratio() as f64
}
