//! Rule sets: pointer -> predicate source
//!
//! Rules are supplied per document type. Paths are unique keys and the
//! engine walks them in path order, so evaluation is deterministic no
//! matter how the rules were declared.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use editor_content::pointer::{parse_pointer, wildcard_positions};

use crate::error::{Error, Result};

/// A collection of visibility rules keyed by pointer
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RuleSet {
    rules: BTreeMap<String, String>,
}

impl RuleSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a rule set from a JSON object of `pointer: predicate` pairs
    ///
    /// # Examples
    ///
    /// ```
    /// use editor_rules::RuleSet;
    /// use serde_json::json;
    ///
    /// let rules = RuleSet::from_json(&json!({"/debug": "!model.verbose"})).unwrap();
    /// assert_eq!(rules.get("/debug"), Some("!model.verbose"));
    /// ```
    pub fn from_json(value: &Value) -> Result<Self> {
        let map = value.as_object().ok_or_else(|| Error::InvalidRuleSet {
            message: "rules must be a JSON object".to_string(),
        })?;

        let mut rules = Self::new();
        for (path, predicate) in map {
            let predicate = predicate.as_str().ok_or_else(|| Error::InvalidRuleSet {
                message: format!("predicate for {} must be a string", path),
            })?;
            rules.insert(path.clone(), predicate);
        }
        Ok(rules)
    }

    /// Add or replace the rule for a pointer
    pub fn insert(&mut self, path: impl Into<String>, predicate: impl Into<String>) {
        self.rules.insert(path.into(), predicate.into());
    }

    /// Get the predicate for a pointer
    pub fn get(&self, path: &str) -> Option<&str> {
        self.rules.get(path).map(String::as_str)
    }

    /// Remove the rule for a pointer
    pub fn remove(&mut self, path: &str) -> Option<String> {
        self.rules.remove(path)
    }

    /// Iterate `(pointer, predicate)` pairs in pointer order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.rules.iter().map(|(p, f)| (p.as_str(), f.as_str()))
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Rules the engine cannot handle: more than one wildcard
    pub fn unsupported(&self) -> Vec<Error> {
        self.rules
            .keys()
            .filter_map(|path| {
                let count = wildcard_positions(&parse_pointer(path)).len();
                (count > 1).then(|| Error::NestedWildcard {
                    path: path.clone(),
                    count,
                })
            })
            .collect()
    }
}

impl<P: Into<String>, F: Into<String>> FromIterator<(P, F)> for RuleSet {
    fn from_iter<I: IntoIterator<Item = (P, F)>>(iter: I) -> Self {
        let mut rules = Self::new();
        for (path, predicate) in iter {
            rules.insert(path, predicate);
        }
        rules
    }
}
