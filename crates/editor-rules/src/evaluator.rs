//! Predicate evaluation capability
//!
//! The visibility engine never interprets predicate sources itself; it asks
//! a [`PredicateEvaluator`]. [`ExpressionEvaluator`] is the default,
//! backed by the [`Predicate`] language.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use serde_json::Value;

use crate::error::Result;
use crate::predicate::Predicate;

/// Evaluates a predicate source against a document
pub trait PredicateEvaluator {
    /// Decide whether the predicate holds.
    ///
    /// `index` is the element index for rules with an array wildcard.
    fn evaluate(&self, predicate: &str, document: &Value, index: Option<usize>) -> Result<bool>;
}

/// Evaluator for the built-in expression language
///
/// Compiled predicates are cached per source string. Sources that fail to
/// compile are not cached and fail again on every call.
#[derive(Debug, Default)]
pub struct ExpressionEvaluator {
    cache: RefCell<HashMap<String, Rc<Predicate>>>,
}

impl ExpressionEvaluator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Compile (or fetch) the predicate for a source string
    pub fn compile(&self, source: &str) -> Result<Rc<Predicate>> {
        if let Some(predicate) = self.cache.borrow().get(source) {
            return Ok(Rc::clone(predicate));
        }

        let predicate = Rc::new(Predicate::parse(source)?);
        self.cache
            .borrow_mut()
            .insert(source.to_string(), Rc::clone(&predicate));
        Ok(predicate)
    }

    /// Number of compiled predicates held in the cache
    pub fn cached(&self) -> usize {
        self.cache.borrow().len()
    }
}

impl PredicateEvaluator for ExpressionEvaluator {
    fn evaluate(&self, predicate: &str, document: &Value, index: Option<usize>) -> Result<bool> {
        self.compile(predicate)?.evaluate(document, index)
    }
}

impl<F> PredicateEvaluator for F
where
    F: Fn(&str, &Value, Option<usize>) -> Result<bool>,
{
    fn evaluate(&self, predicate: &str, document: &Value, index: Option<usize>) -> Result<bool> {
        self(predicate, document, index)
    }
}
