//! Visibility rules for configuration documents
//!
//! A rule pairs a pointer with a predicate. When the predicate holds, the
//! field at the pointer is hidden and gets removed from the document before
//! it is stored. Rule pointers may contain one `-` wildcard, in which case
//! the predicate is evaluated once per element of the array it stands for.
//!
//! Predicates are written in a small expression language (see
//! [`predicate`]) instead of executable code:
//!
//! ```
//! use editor_rules::{ExpressionEvaluator, RuleSet, VisibilityEngine};
//! use serde_json::json;
//!
//! let mut rules = RuleSet::new();
//! rules.insert("/matchers/-/pattern", "model.matchers[index].type == 'is_in_set'");
//!
//! let doc = json!({"matchers": [
//!     {"type": "regex_match", "pattern": ".*"},
//!     {"type": "is_in_set", "pattern": "stale"}
//! ]});
//!
//! let evaluator = ExpressionEvaluator::new();
//! let cleaned = VisibilityEngine::new(&evaluator).compute_hidden_fields(&doc, &rules);
//! assert_eq!(cleaned, json!({"matchers": [
//!     {"type": "regex_match", "pattern": ".*"},
//!     {"type": "is_in_set"}
//! ]}));
//! ```

pub mod engine;
pub mod error;
pub mod evaluator;
pub mod lexer;
pub mod predicate;
pub mod rule_set;

pub use engine::{FailedPredicate, SkipReason, SkippedRule, VisibilityEngine, VisibilityReport};
pub use error::{Error, Result};
pub use evaluator::{ExpressionEvaluator, PredicateEvaluator};
pub use predicate::Predicate;
pub use rule_set::RuleSet;
