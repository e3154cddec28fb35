//! Document pipeline tests across editor-content and editor-rules
//!
//! Rules first, then pruning and ordering, as a flush runs them.

use editor_content::{KeyOrdering, PreserveOrder, SchemaOrder, SemanticDiff, SortedKeys, normalize};
use editor_rules::{ExpressionEvaluator, RuleSet, VisibilityEngine};
use pretty_assertions::assert_eq;
use rstest::rstest;
use serde_json::{Value, json};

fn clean(document: &Value, rules: &RuleSet, ordering: &dyn KeyOrdering) -> Option<Value> {
    let evaluator = ExpressionEvaluator::new();
    let visible = VisibilityEngine::new(&evaluator).compute_hidden_fields(document, rules);
    normalize(&visible, ordering)
}

fn alert_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "rule_name": {"type": "string"},
            "source_type": {"type": "string"},
            "matchers": {
                "type": "array",
                "items": {
                    "type": "object",
                    "properties": {
                        "type": {"type": "string"},
                        "field": {"type": "string"},
                        "pattern": {"type": "string"},
                        "data": {"type": "string"}
                    }
                }
            },
            "thresholding": {
                "type": "object",
                "properties": {
                    "enabled": {"type": "boolean"},
                    "max_count": {"type": "integer"}
                }
            }
        }
    })
}

fn alert_rules() -> RuleSet {
    [
        ("/matchers/-/pattern", "model.matchers[index].type != 'REGEX_MATCH'"),
        ("/matchers/-/data", "model.matchers[index].type != 'IS_IN_SET'"),
        ("/thresholding/max_count", "!model.thresholding.enabled"),
    ]
    .into_iter()
    .collect()
}

#[test]
fn test_end_to_end_normalization_example() {
    let doc = json!({"a": {"b": null, "c": [1, 2]}, "d": []});
    assert_eq!(
        clean(&doc, &RuleSet::new(), &PreserveOrder),
        Some(json!({"a": {"c": [1, 2]}}))
    );
}

#[test]
fn test_alert_document_cleaned_in_schema_order() {
    let doc = json!({
        "thresholding": {"max_count": 5, "enabled": false},
        "matchers": [
            {"data": "ignored", "pattern": "adm.*", "field": "user", "type": "REGEX_MATCH"},
            {"pattern": "ignored", "data": "a\nb", "field": "host", "type": "IS_IN_SET"}
        ],
        "source_type": "windows",
        "rule_name": "suspicious_login"
    });

    let cleaned = clean(&doc, &alert_rules(), &SchemaOrder::new(alert_schema())).unwrap();

    let expected = json!({
        "rule_name": "suspicious_login",
        "source_type": "windows",
        "matchers": [
            {"type": "REGEX_MATCH", "field": "user", "pattern": "adm.*"},
            {"type": "IS_IN_SET", "field": "host", "data": "a\nb"}
        ],
        "thresholding": {"enabled": false}
    });
    assert_eq!(cleaned, expected);
    // Key order is part of the canonical form
    assert_eq!(
        serde_json::to_string(&cleaned).unwrap(),
        serde_json::to_string(&expected).unwrap()
    );
}

#[test]
fn test_hidden_fields_that_leave_empty_parents_are_pruned() {
    let rules: RuleSet = [("/advanced/level", "true")].into_iter().collect();
    let doc = json!({"basic": 1, "advanced": {"level": 3}});
    assert_eq!(clean(&doc, &rules, &SortedKeys), Some(json!({"basic": 1})));
}

#[test]
fn test_broken_predicate_keeps_field_and_later_rules_run() {
    let rules: RuleSet = [
        ("/a", "model.a >"),
        ("/b", "model.missing.deeper < 'x'"),
        ("/c", "true"),
    ]
    .into_iter()
    .collect();
    let doc = json!({"a": 1, "b": 2, "c": 3});

    assert_eq!(clean(&doc, &rules, &PreserveOrder), Some(json!({"a": 1, "b": 2})));
}

#[rstest]
#[case::preserve(Box::new(PreserveOrder))]
#[case::sorted(Box::new(SortedKeys))]
#[case::schema(Box::new(SchemaOrder::new(alert_schema())))]
fn test_clean_is_idempotent(#[case] ordering: Box<dyn KeyOrdering>) {
    let doc = json!({
        "thresholding": {"enabled": true, "max_count": 2},
        "matchers": [{"type": "IS_IN_SET", "data": "x", "pattern": ""}, {}],
        "rule_name": "r",
        "extra": {"z": [null], "y": 1}
    });

    let once = clean(&doc, &alert_rules(), ordering.as_ref()).unwrap();
    let twice = clean(&once, &alert_rules(), ordering.as_ref()).unwrap();

    assert_eq!(
        serde_json::to_string(&once).unwrap(),
        serde_json::to_string(&twice).unwrap()
    );
}

#[test]
fn test_diff_of_cleaned_document_lists_removed_fields() {
    let doc = json!({"thresholding": {"enabled": false, "max_count": 5}});
    let cleaned = clean(&doc, &alert_rules(), &PreserveOrder).unwrap();

    let diff = SemanticDiff::compute(&doc, &cleaned);

    assert!(!diff.is_equivalent);
    let paths: Vec<_> = diff.changes.iter().filter_map(|c| c.path()).collect();
    assert_eq!(paths, vec!["/thresholding/max_count"]);
}
