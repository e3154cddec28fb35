//! Key ordering strategies
//!
//! Stored documents are compared and rendered with a canonical key order.
//! The order is supplied per service: some services keep the order the
//! editor produced, some sort keys, and schema-driven services follow the
//! declaration order of the schema's `properties`.

use serde_json::{Map, Value};

use crate::pointer::{Segment, parse_pointer};

/// Reorders the keys of a document
pub trait KeyOrdering: Send + Sync {
    /// Return `value`, which sits at `root_path` in its document, with keys reordered
    fn order_keys(&self, value: &Value, root_path: &str) -> Value;
}

/// Keeps keys in insertion order
#[derive(Debug, Default, Clone, Copy)]
pub struct PreserveOrder;

impl KeyOrdering for PreserveOrder {
    fn order_keys(&self, value: &Value, _root_path: &str) -> Value {
        value.clone()
    }
}

/// Sorts keys lexicographically at every level
#[derive(Debug, Default, Clone, Copy)]
pub struct SortedKeys;

impl SortedKeys {
    fn sort_value(value: &Value) -> Value {
        match value {
            Value::Object(map) => {
                let mut keys: Vec<_> = map.keys().collect();
                keys.sort();
                let mut sorted = Map::new();
                for key in keys {
                    if let Some(v) = map.get(key) {
                        sorted.insert(key.clone(), Self::sort_value(v));
                    }
                }
                Value::Object(sorted)
            }
            Value::Array(arr) => Value::Array(arr.iter().map(Self::sort_value).collect()),
            other => other.clone(),
        }
    }
}

impl KeyOrdering for SortedKeys {
    fn order_keys(&self, value: &Value, _root_path: &str) -> Value {
        Self::sort_value(value)
    }
}

/// Orders keys by the `properties` declaration order of a JSON schema
///
/// Keys the schema does not declare follow the declared ones, in their
/// existing order. Arrays are descended through `items`; undeclared keys
/// use `additionalProperties` when it is a schema object.
#[derive(Debug, Clone)]
pub struct SchemaOrder {
    schema: Value,
}

impl SchemaOrder {
    pub fn new(schema: Value) -> Self {
        Self { schema }
    }

    pub fn schema(&self) -> &Value {
        &self.schema
    }

    /// Locate the sub-schema describing the value at `root_path`
    fn schema_at(&self, root_path: &str) -> Option<&Value> {
        parse_pointer(root_path)
            .iter()
            .try_fold(&self.schema, |schema, segment| match segment {
                Segment::Key(key) => property_schema(schema, key),
                Segment::Index(index) => item_schema(schema, *index),
                Segment::Wildcard => item_schema(schema, 0),
            })
    }

    fn order_with(value: &Value, schema: Option<&Value>) -> Value {
        match value {
            Value::Object(map) => {
                let declared = schema
                    .and_then(|s| s.get("properties"))
                    .and_then(Value::as_object);

                let mut ordered = Map::new();
                if let Some(declared) = declared {
                    for (key, child_schema) in declared {
                        if let Some(child) = map.get(key) {
                            ordered.insert(key.clone(), Self::order_with(child, Some(child_schema)));
                        }
                    }
                }
                for (key, child) in map {
                    if !ordered.contains_key(key) {
                        let child_schema = schema.and_then(|s| property_schema(s, key));
                        ordered.insert(key.clone(), Self::order_with(child, child_schema));
                    }
                }
                Value::Object(ordered)
            }
            Value::Array(items) => Value::Array(
                items
                    .iter()
                    .enumerate()
                    .map(|(i, item)| Self::order_with(item, schema.and_then(|s| item_schema(s, i))))
                    .collect(),
            ),
            other => other.clone(),
        }
    }
}

fn property_schema<'a>(schema: &'a Value, key: &str) -> Option<&'a Value> {
    schema
        .get("properties")
        .and_then(|p| p.get(key))
        .or_else(|| schema.get("additionalProperties").filter(|s| s.is_object()))
}

fn item_schema(schema: &Value, index: usize) -> Option<&Value> {
    match schema.get("items")? {
        Value::Array(tuple) => tuple.get(index),
        items => Some(items),
    }
}

impl KeyOrdering for SchemaOrder {
    fn order_keys(&self, value: &Value, root_path: &str) -> Value {
        Self::order_with(value, self.schema_at(root_path))
    }
}
