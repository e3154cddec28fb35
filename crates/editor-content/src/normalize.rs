//! Empty-value pruning and canonical form
//!
//! A stored document never carries `null` values, empty strings, empty
//! objects, or empty arrays. Pruning runs bottom-up, so a container whose
//! children all prune away disappears in the same pass.

use serde_json::{Map, Value};

use crate::ordering::KeyOrdering;

/// Root pointer handed to the ordering strategy
pub const ROOT_PATH: &str = "/";

/// Whether a scalar counts as empty
fn is_empty_leaf(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.is_empty(),
        _ => false,
    }
}

/// Recursively drop empty values.
///
/// Returns `None` when the value itself prunes away.
///
/// # Examples
///
/// ```
/// use editor_content::prune_empty;
/// use serde_json::json;
///
/// let doc = json!({"a": {"b": null, "c": [1, 2]}, "d": []});
/// assert_eq!(prune_empty(&doc), Some(json!({"a": {"c": [1, 2]}})));
/// assert_eq!(prune_empty(&json!({"x": {"y": {}}})), None);
/// ```
pub fn prune_empty(value: &Value) -> Option<Value> {
    match value {
        Value::Object(map) => {
            let pruned: Map<String, Value> = map
                .iter()
                .filter_map(|(key, child)| prune_empty(child).map(|v| (key.clone(), v)))
                .collect();
            (!pruned.is_empty()).then_some(Value::Object(pruned))
        }
        Value::Array(items) => {
            let pruned: Vec<Value> = items.iter().filter_map(prune_empty).collect();
            (!pruned.is_empty()).then_some(Value::Array(pruned))
        }
        leaf if is_empty_leaf(leaf) => None,
        leaf => Some(leaf.clone()),
    }
}

/// Produce the canonical form of a document.
///
/// Prunes empty values, then applies the ordering strategy at the root.
/// `None` means nothing is left of the document. The result is stable
/// under repeated application.
pub fn normalize(document: &Value, ordering: &dyn KeyOrdering) -> Option<Value> {
    let pruned = prune_empty(document)?;
    Some(ordering.order_keys(&pruned, ROOT_PATH))
}
