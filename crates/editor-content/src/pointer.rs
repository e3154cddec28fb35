//! Pointer parsing and traversal utilities
//!
//! Documents are addressed with slash-delimited pointers in the style of
//! RFC 6901. Rule pointers may additionally contain the wildcard token `-`,
//! which stands for "an element of the array at this position" and must be
//! resolved to a concrete index before the pointer is used against a
//! document.
//!
//! # Pointer Syntax
//!
//! - Root: `""` or `"/"`
//! - Object keys: `/config/database/host`
//! - Array indexing: `/items/0/name`
//! - Wildcards (rules only): `/items/-/name`
//! - Escapes: `~1` decodes to `/`, `~0` decodes to `~`
//!
//! # Examples
//!
//! ```
//! use editor_content::pointer::{parse_pointer, get_at_pointer, Segment};
//! use serde_json::json;
//!
//! let pointer = parse_pointer("/config/servers/0/host");
//! assert_eq!(pointer, vec![
//!     Segment::Key("config".to_string()),
//!     Segment::Key("servers".to_string()),
//!     Segment::Index(0),
//!     Segment::Key("host".to_string()),
//! ]);
//!
//! let value = json!({"config": {"servers": [{"host": "localhost"}]}});
//! assert_eq!(get_at_pointer(&value, &pointer), Some(&json!("localhost")));
//! ```

use std::fmt;

use serde_json::{Map, Value};

use crate::error::{Error, Result};

/// Token marking an array wildcard in a rule pointer
pub const WILDCARD: &str = "-";

/// A segment of a pointer
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Segment {
    /// An object key (e.g., "database" in `/config/database`)
    Key(String),
    /// A numeric token; an array position, or an object key on objects
    Index(usize),
    /// The `-` token of a rule pointer
    Wildcard,
}

impl Segment {
    fn from_token(token: &str) -> Self {
        if token == WILDCARD {
            return Segment::Wildcard;
        }
        if is_array_index(token)
            && let Ok(index) = token.parse::<usize>()
        {
            return Segment::Index(index);
        }
        Segment::Key(unescape(token))
    }

    /// Whether this is the wildcard segment
    pub fn is_wildcard(&self) -> bool {
        matches!(self, Segment::Wildcard)
    }
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Segment::Key(key) => write!(f, "{}", escape(key)),
            Segment::Index(index) => write!(f, "{}", index),
            Segment::Wildcard => write!(f, "{}", WILDCARD),
        }
    }
}

/// Digits only, and no leading zero unless the token is exactly `0`
fn is_array_index(token: &str) -> bool {
    !token.is_empty()
        && token.bytes().all(|b| b.is_ascii_digit())
        && (token == "0" || !token.starts_with('0'))
}

fn unescape(token: &str) -> String {
    token.replace("~1", "/").replace("~0", "~")
}

fn escape(key: &str) -> String {
    key.replace('~', "~0").replace('/', "~1")
}

/// Parse a pointer string into segments.
///
/// Both `""` and `"/"` address the document root. A missing leading slash
/// is tolerated.
///
/// # Examples
///
/// ```
/// use editor_content::pointer::{parse_pointer, Segment};
///
/// assert!(parse_pointer("/").is_empty());
///
/// let pointer = parse_pointer("/matchers/-/pattern");
/// assert_eq!(pointer, vec![
///     Segment::Key("matchers".to_string()),
///     Segment::Wildcard,
///     Segment::Key("pattern".to_string()),
/// ]);
///
/// let pointer = parse_pointer("/a~1b/c~0d");
/// assert_eq!(pointer, vec![
///     Segment::Key("a/b".to_string()),
///     Segment::Key("c~d".to_string()),
/// ]);
/// ```
pub fn parse_pointer(path: &str) -> Vec<Segment> {
    if path.is_empty() || path == "/" {
        return Vec::new();
    }

    let body = path.strip_prefix('/').unwrap_or(path);
    body.split('/').map(Segment::from_token).collect()
}

/// Render segments back into a pointer string.
///
/// The root renders as `"/"`.
pub fn format_pointer(segments: &[Segment]) -> String {
    if segments.is_empty() {
        return "/".to_string();
    }

    let mut out = String::new();
    for segment in segments {
        out.push('/');
        out.push_str(&segment.to_string());
    }
    out
}

/// Positions of the wildcard segments, left to right
pub fn wildcard_positions(segments: &[Segment]) -> Vec<usize> {
    segments
        .iter()
        .enumerate()
        .filter(|(_, s)| s.is_wildcard())
        .map(|(i, _)| i)
        .collect()
}

/// Substitute wildcards, left to right, with the given indices.
///
/// Wildcards beyond the supplied indices are left in place; surplus indices
/// are ignored.
pub fn resolve_wildcards(segments: &[Segment], indices: &[usize]) -> Vec<Segment> {
    let mut indices = indices.iter();
    segments
        .iter()
        .map(|segment| match segment {
            Segment::Wildcard => indices
                .next()
                .map_or(Segment::Wildcard, |index| Segment::Index(*index)),
            other => other.clone(),
        })
        .collect()
}

/// Turn a rule pointer into a concrete pointer.
///
/// # Examples
///
/// ```
/// use editor_content::pointer::to_indexed_pointer;
///
/// assert_eq!(to_indexed_pointer("/items/-/name", &[3]), "/items/3/name");
/// assert_eq!(to_indexed_pointer("/name", &[3]), "/name");
/// ```
pub fn to_indexed_pointer(path: &str, indices: &[usize]) -> String {
    format_pointer(&resolve_wildcards(&parse_pointer(path), indices))
}

fn child<'a>(value: &'a Value, segment: &Segment) -> Option<&'a Value> {
    match (segment, value) {
        (Segment::Key(key), Value::Object(map)) => map.get(key),
        (Segment::Index(index), Value::Array(arr)) => arr.get(*index),
        (Segment::Index(index), Value::Object(map)) => map.get(&index.to_string()),
        _ => None,
    }
}

fn child_mut<'a>(value: &'a mut Value, segment: &Segment) -> Option<&'a mut Value> {
    match (segment, value) {
        (Segment::Key(key), Value::Object(map)) => map.get_mut(key),
        (Segment::Index(index), Value::Array(arr)) => arr.get_mut(*index),
        (Segment::Index(index), Value::Object(map)) => map.get_mut(&index.to_string()),
        _ => None,
    }
}

/// Get a value at the given pointer.
///
/// Returns `None` if the pointer doesn't resolve. Wildcard segments never
/// resolve.
///
/// # Examples
///
/// ```
/// use editor_content::pointer::{parse_pointer, get_at_pointer};
/// use serde_json::json;
///
/// let value = json!({"config": {"host": "localhost"}});
/// assert_eq!(get_at_pointer(&value, &parse_pointer("/config/host")), Some(&json!("localhost")));
/// assert_eq!(get_at_pointer(&value, &parse_pointer("/config/missing")), None);
/// ```
pub fn get_at_pointer<'a>(value: &'a Value, segments: &[Segment]) -> Option<&'a Value> {
    segments
        .iter()
        .try_fold(value, |current, segment| child(current, segment))
}

/// Mutable variant of [`get_at_pointer`]
pub fn get_at_pointer_mut<'a>(value: &'a mut Value, segments: &[Segment]) -> Option<&'a mut Value> {
    segments
        .iter()
        .try_fold(value, |current, segment| child_mut(current, segment))
}

fn descend_or_create<'a>(current: &'a mut Value, segment: &Segment) -> Option<&'a mut Value> {
    if current.is_null() && matches!(segment, Segment::Key(_)) {
        *current = Value::Object(Map::new());
    }

    match (segment, current) {
        (Segment::Key(key), Value::Object(map)) => Some(
            map.entry(key.clone())
                .or_insert_with(|| Value::Object(Map::new())),
        ),
        (Segment::Index(index), Value::Array(arr)) => arr.get_mut(*index),
        (Segment::Index(index), Value::Object(map)) => Some(
            map.entry(index.to_string())
                .or_insert_with(|| Value::Object(Map::new())),
        ),
        _ => None,
    }
}

fn assign(target: &mut Value, segment: &Segment, new_value: Value) -> std::result::Result<(), String> {
    if target.is_null() && matches!(segment, Segment::Key(_)) {
        *target = Value::Object(Map::new());
    }

    match (segment, target) {
        (Segment::Key(key), Value::Object(map)) => {
            map.insert(key.clone(), new_value);
            Ok(())
        }
        (Segment::Index(index), Value::Object(map)) => {
            map.insert(index.to_string(), new_value);
            Ok(())
        }
        (Segment::Index(index), Value::Array(arr)) => {
            if *index < arr.len() {
                arr[*index] = new_value;
                Ok(())
            } else if *index == arr.len() {
                arr.push(new_value);
                Ok(())
            } else {
                Err(format!("index {} out of bounds (len {})", index, arr.len()))
            }
        }
        (_, other) => Err(format!("parent is {}", kind_of(other))),
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Set a value at the given pointer.
///
/// Missing intermediate object keys are created. Traversing through a
/// scalar, indexing past the end of an array, or addressing a wildcard
/// fails without modifying the document.
///
/// # Examples
///
/// ```
/// use editor_content::pointer::{parse_pointer, set_at_pointer, get_at_pointer};
/// use serde_json::json;
///
/// let mut value = json!({"config": {"host": "old"}});
/// let pointer = parse_pointer("/config/host");
/// set_at_pointer(&mut value, &pointer, json!("new")).unwrap();
/// assert_eq!(get_at_pointer(&value, &pointer), Some(&json!("new")));
///
/// set_at_pointer(&mut value, &parse_pointer("/meta/author"), json!("alice")).unwrap();
/// assert_eq!(value["meta"]["author"], json!("alice"));
/// ```
pub fn set_at_pointer(value: &mut Value, segments: &[Segment], new_value: Value) -> Result<()> {
    if segments.iter().any(Segment::is_wildcard) {
        return Err(Error::UnresolvedWildcard {
            path: format_pointer(segments),
        });
    }

    let Some((last, parents)) = segments.split_last() else {
        *value = new_value;
        return Ok(());
    };

    // Check the whole route before touching the document
    let mut cursor = &*value;
    for (depth, segment) in parents.iter().enumerate() {
        match child(cursor, segment) {
            Some(next) => cursor = next,
            None => {
                let creatable = matches!(segment, Segment::Key(_))
                    && matches!(cursor, Value::Object(_) | Value::Null)
                    || matches!((segment, cursor), (Segment::Index(_), Value::Object(_)));
                if !creatable {
                    return Err(Error::set_failed(
                        format_pointer(segments),
                        format!(
                            "cannot traverse {} ({})",
                            format_pointer(&segments[..=depth]),
                            kind_of(cursor)
                        ),
                    ));
                }
                break;
            }
        }
    }

    let mut current = value;
    for segment in parents {
        current = descend_or_create(current, segment).ok_or_else(|| {
            Error::set_failed(format_pointer(segments), "intermediate node is not a container")
        })?;
    }

    assign(current, last, new_value).map_err(|reason| Error::set_failed(format_pointer(segments), reason))
}

/// Remove a value at the given pointer.
///
/// Returns the removed value if the pointer resolved, `None` otherwise.
/// Removing an absent path leaves the document untouched, so the call is
/// idempotent.
///
/// # Examples
///
/// ```
/// use editor_content::pointer::{parse_pointer, remove_at_pointer};
/// use serde_json::json;
///
/// let mut value = json!({"name": "test", "version": "1.0"});
/// let pointer = parse_pointer("/version");
/// assert_eq!(remove_at_pointer(&mut value, &pointer), Some(json!("1.0")));
/// assert_eq!(remove_at_pointer(&mut value, &pointer), None);
/// assert_eq!(value, json!({"name": "test"}));
/// ```
pub fn remove_at_pointer(value: &mut Value, segments: &[Segment]) -> Option<Value> {
    let (last, parents) = segments.split_last()?;
    let parent = get_at_pointer_mut(value, parents)?;

    match (last, parent) {
        (Segment::Key(key), Value::Object(map)) => map.shift_remove(key),
        (Segment::Index(index), Value::Object(map)) => map.shift_remove(&index.to_string()),
        (Segment::Index(index), Value::Array(arr)) if *index < arr.len() => Some(arr.remove(*index)),
        _ => None,
    }
}
