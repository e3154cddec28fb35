//! Visibility rule engine
//!
//! Removes the fields whose visibility predicate holds. Rules are applied
//! one after another against the evolving document. A wildcard rule is
//! expanded over the array length recorded when that rule starts, and each
//! index is evaluated against the document as earlier indices left it.
//!
//! Predicate failures fail open: the field stays and processing continues
//! with the next evaluation.

use serde::Serialize;
use serde_json::Value;

use editor_content::pointer::{
    Segment, format_pointer, get_at_pointer, parse_pointer, remove_at_pointer,
    resolve_wildcards, wildcard_positions,
};

use crate::evaluator::PredicateEvaluator;
use crate::rule_set::RuleSet;

/// Why a rule was not applied
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum SkipReason {
    /// More than one wildcard in the pointer
    NestedWildcard { count: usize },
    /// The wildcard's container is absent or not an array
    MissingArray { container: String },
}

/// A rule that was not applied
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedRule {
    pub path: String,
    #[serde(flatten)]
    pub reason: SkipReason,
}

/// A predicate that could not be evaluated
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FailedPredicate {
    pub path: String,
    pub index: Option<usize>,
    pub message: String,
}

/// What a run of the engine did
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct VisibilityReport {
    /// Concrete pointers that were removed
    pub removed: Vec<String>,
    pub skipped: Vec<SkippedRule>,
    pub failed: Vec<FailedPredicate>,
}

/// Applies a [`RuleSet`] to documents
pub struct VisibilityEngine<'e> {
    evaluator: &'e dyn PredicateEvaluator,
}

impl<'e> VisibilityEngine<'e> {
    pub fn new(evaluator: &'e dyn PredicateEvaluator) -> Self {
        Self { evaluator }
    }

    /// Return a copy of `document` with every hidden field removed
    pub fn compute_hidden_fields(&self, document: &Value, rules: &RuleSet) -> Value {
        self.compute_hidden_fields_with_report(document, rules).0
    }

    /// Like [`compute_hidden_fields`](Self::compute_hidden_fields), also reporting what happened
    pub fn compute_hidden_fields_with_report(
        &self,
        document: &Value,
        rules: &RuleSet,
    ) -> (Value, VisibilityReport) {
        let mut data = document.clone();
        let mut report = VisibilityReport::default();

        for (path, predicate) in rules.iter() {
            let segments = parse_pointer(path);
            match wildcard_positions(&segments).as_slice() {
                [] => self.apply_plain(&mut data, path, &segments, predicate, &mut report),
                [position] => {
                    self.apply_wildcard(&mut data, path, &segments, *position, predicate, &mut report)
                }
                many => {
                    tracing::warn!(
                        "Skipping rule {}: {} wildcards, only one is supported",
                        path,
                        many.len()
                    );
                    report.skipped.push(SkippedRule {
                        path: path.to_string(),
                        reason: SkipReason::NestedWildcard { count: many.len() },
                    });
                }
            }
        }

        (data, report)
    }

    fn apply_plain(
        &self,
        data: &mut Value,
        path: &str,
        segments: &[Segment],
        predicate: &str,
        report: &mut VisibilityReport,
    ) {
        if self.holds(data, path, predicate, None, report)
            && remove_at_pointer(data, segments).is_some()
        {
            tracing::debug!("Removed hidden field {}", path);
            report.removed.push(format_pointer(segments));
        }
    }

    fn apply_wildcard(
        &self,
        data: &mut Value,
        path: &str,
        segments: &[Segment],
        position: usize,
        predicate: &str,
        report: &mut VisibilityReport,
    ) {
        let container = &segments[..position];
        let len = match get_at_pointer(data, container) {
            Some(Value::Array(items)) => items.len(),
            _ => {
                report.skipped.push(SkippedRule {
                    path: path.to_string(),
                    reason: SkipReason::MissingArray {
                        container: format_pointer(container),
                    },
                });
                return;
            }
        };

        if position + 1 == segments.len() {
            self.remove_elements(data, path, segments, len, predicate, report);
            return;
        }

        for j in 0..len {
            if !self.holds(data, path, predicate, Some(j), report) {
                continue;
            }
            let concrete = resolve_wildcards(segments, &[j]);
            if remove_at_pointer(data, &concrete).is_some() {
                let concrete = format_pointer(&concrete);
                tracing::debug!("Removed hidden field {}", concrete);
                report.removed.push(concrete);
            }
        }
    }

    /// Rules ending in the wildcard hide whole elements. Every index is
    /// evaluated first and elements are removed from the highest index down,
    /// so each index still names the element it was evaluated for.
    fn remove_elements(
        &self,
        data: &mut Value,
        path: &str,
        segments: &[Segment],
        len: usize,
        predicate: &str,
        report: &mut VisibilityReport,
    ) {
        let matched: Vec<usize> = (0..len)
            .filter(|&j| self.holds(data, path, predicate, Some(j), report))
            .collect();

        for j in matched.into_iter().rev() {
            let concrete = resolve_wildcards(segments, &[j]);
            if remove_at_pointer(data, &concrete).is_some() {
                let concrete = format_pointer(&concrete);
                tracing::debug!("Removed hidden element {}", concrete);
                report.removed.push(concrete);
            }
        }
    }

    fn holds(
        &self,
        data: &Value,
        path: &str,
        predicate: &str,
        index: Option<usize>,
        report: &mut VisibilityReport,
    ) -> bool {
        match self.evaluator.evaluate(predicate, data, index) {
            Ok(result) => result,
            Err(e) => {
                tracing::warn!(
                    "Condition evaluation failed while cleaning {} (index {:?}): {}",
                    path,
                    index,
                    e
                );
                report.failed.push(FailedPredicate {
                    path: path.to_string(),
                    index,
                    message: e.to_string(),
                });
                false
            }
        }
    }
}
