//! Per-editor-type session state
//!
//! Everything a controller needs to clean documents of one editor type:
//! the rules, the metadata map, the key ordering and the predicate
//! evaluator. Sessions are built from an [`EditorConfig`](crate::EditorConfig)
//! or assembled directly.

use serde_json::Value;

use editor_content::{KeyOrdering, PreserveOrder, normalize};
use editor_rules::{
    ExpressionEvaluator, PredicateEvaluator, RuleSet, VisibilityEngine, VisibilityReport,
};

use crate::metadata::MetadataMap;

/// Configuration and collaborators for one editor type
pub struct EditorSession {
    editor_type: String,
    user: String,
    rules: RuleSet,
    metadata: MetadataMap,
    ordering: Box<dyn KeyOrdering>,
    evaluator: Box<dyn PredicateEvaluator>,
}

impl EditorSession {
    /// A session with no rules, default metadata pointers, insertion
    /// order, and the expression evaluator
    pub fn new(editor_type: impl Into<String>, user: impl Into<String>) -> Self {
        Self {
            editor_type: editor_type.into(),
            user: user.into(),
            rules: RuleSet::new(),
            metadata: MetadataMap::default(),
            ordering: Box::new(PreserveOrder),
            evaluator: Box::new(ExpressionEvaluator::new()),
        }
    }

    pub fn with_rules(mut self, rules: RuleSet) -> Self {
        for issue in rules.unsupported() {
            tracing::warn!("{}", issue);
        }
        self.rules = rules;
        self
    }

    pub fn with_metadata(mut self, metadata: MetadataMap) -> Self {
        self.metadata = metadata;
        self
    }

    pub fn with_ordering(mut self, ordering: Box<dyn KeyOrdering>) -> Self {
        self.ordering = ordering;
        self
    }

    pub fn with_evaluator(mut self, evaluator: Box<dyn PredicateEvaluator>) -> Self {
        self.evaluator = evaluator;
        self
    }

    pub fn editor_type(&self) -> &str {
        &self.editor_type
    }

    /// Identity written as author of new entries
    pub fn user(&self) -> &str {
        &self.user
    }

    pub fn rules(&self) -> &RuleSet {
        &self.rules
    }

    pub fn metadata(&self) -> &MetadataMap {
        &self.metadata
    }

    /// Remove hidden fields, then normalize
    ///
    /// Returns `None` when nothing is left of the document.
    pub fn clean(&self, document: &Value) -> Option<Value> {
        self.clean_with_report(document).0
    }

    /// Like [`clean`](Self::clean), also returning the rule engine's report
    pub fn clean_with_report(&self, document: &Value) -> (Option<Value>, VisibilityReport) {
        let engine = VisibilityEngine::new(self.evaluator.as_ref());
        let (visible, report) = engine.compute_hidden_fields_with_report(document, &self.rules);
        (normalize(&visible, self.ordering.as_ref()), report)
    }
}

impl std::fmt::Debug for EditorSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EditorSession")
            .field("editor_type", &self.editor_type)
            .field("user", &self.user)
            .field("rules", &self.rules)
            .field("metadata", &self.metadata)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use editor_content::SortedKeys;
    use serde_json::json;

    #[test]
    fn test_clean_runs_rules_then_normalizes() {
        let rules: RuleSet = [("/extra/note", "model.mode == 'simple'")].into_iter().collect();
        let session = EditorSession::new("alert", "ana").with_rules(rules);

        let doc = json!({"mode": "simple", "extra": {"note": "x"}, "empty": []});
        assert_eq!(session.clean(&doc), Some(json!({"mode": "simple"})));
    }

    #[test]
    fn test_clean_applies_ordering() {
        let session = EditorSession::new("alert", "ana").with_ordering(Box::new(SortedKeys));
        let cleaned = session.clean(&json!({"b": 1, "a": 2})).unwrap();
        let keys: Vec<_> = cleaned.as_object().unwrap().keys().cloned().collect();
        assert_eq!(keys, vec!["a", "b"]);
    }

    #[test]
    fn test_clean_reports_nothing_left() {
        let rules: RuleSet = [("/only", "true")].into_iter().collect();
        let session = EditorSession::new("alert", "ana").with_rules(rules);
        let (cleaned, report) = session.clean_with_report(&json!({"only": 1}));
        assert_eq!(cleaned, None);
        assert_eq!(report.removed, vec!["/only"]);
    }

    #[test]
    fn test_custom_evaluator() {
        let hide_all = |_: &str, _: &Value, _: Option<usize>| -> editor_rules::Result<bool> { Ok(true) };
        let rules: RuleSet = [("/a", "ignored")].into_iter().collect();
        let session = EditorSession::new("alert", "ana")
            .with_rules(rules)
            .with_evaluator(Box::new(hide_all));
        assert_eq!(session.clean(&json!({"a": 1, "b": 2})), Some(json!({"b": 2})));
    }
}
