//! Tests for the visibility engine with injected evaluators

use std::cell::{Cell, RefCell};

use editor_rules::{Error, ExpressionEvaluator, Result, RuleSet, VisibilityEngine};
use pretty_assertions::assert_eq;
use proptest::prelude::*;
use rstest::rstest;
use serde_json::{Value, json};

fn always(result: bool) -> impl Fn(&str, &Value, Option<usize>) -> Result<bool> {
    move |_, _, _| Ok(result)
}

fn rules(pairs: &[(&str, &str)]) -> RuleSet {
    pairs.iter().copied().collect()
}

#[test]
fn test_always_true_removes_field() {
    let evaluator = always(true);
    let doc = json!({"keep": 1, "drop": {"nested": true}});
    let out = VisibilityEngine::new(&evaluator).compute_hidden_fields(&doc, &rules(&[("/drop", "x")]));
    assert_eq!(out, json!({"keep": 1}));
}

#[test]
fn test_always_false_keeps_document() {
    let evaluator = always(false);
    let doc = json!({"keep": 1, "drop": {"nested": true}});
    let out = VisibilityEngine::new(&evaluator).compute_hidden_fields(&doc, &rules(&[("/drop", "x")]));
    assert_eq!(out, doc);
}

#[test]
fn test_wildcard_evaluates_each_index_in_order() {
    let seen = RefCell::new(Vec::new());
    let evaluator = |_: &str, _: &Value, index: Option<usize>| -> Result<bool> {
        seen.borrow_mut().push(index);
        Ok(index == Some(1))
    };
    let doc = json!({"matchers": [{"p": "a"}, {"p": "b"}, {"p": "c"}]});

    let out = VisibilityEngine::new(&evaluator)
        .compute_hidden_fields(&doc, &rules(&[("/matchers/-/p", "x")]));

    assert_eq!(*seen.borrow(), vec![Some(0), Some(1), Some(2)]);
    assert_eq!(out, json!({"matchers": [{"p": "a"}, {}, {"p": "c"}]}));
}

#[test]
fn test_wildcard_index_is_evaluated_after_earlier_removals() {
    let seen = RefCell::new(Vec::new());
    let evaluator = |_: &str, doc: &Value, _: Option<usize>| -> Result<bool> {
        seen.borrow_mut().push(doc["items"].clone());
        Ok(true)
    };
    let doc = json!({"items": [{"p": 1}, {"p": 2}]});

    let out = VisibilityEngine::new(&evaluator)
        .compute_hidden_fields(&doc, &rules(&[("/items/-/p", "x")]));

    assert_eq!(
        *seen.borrow(),
        vec![json!([{"p": 1}, {"p": 2}]), json!([{}, {"p": 2}])]
    );
    assert_eq!(out, json!({"items": [{}, {}]}));
}

#[test]
fn test_trailing_wildcard_evaluates_before_removing_elements() {
    let seen = RefCell::new(Vec::new());
    let evaluator = |_: &str, doc: &Value, index: Option<usize>| -> Result<bool> {
        seen.borrow_mut().push(doc["items"].clone());
        Ok(index != Some(1))
    };
    let doc = json!({"items": ["a", "b", "c"]});

    let out = VisibilityEngine::new(&evaluator).compute_hidden_fields(&doc, &rules(&[("/items/-", "x")]));

    assert!(seen.borrow().iter().all(|items| *items == json!(["a", "b", "c"])));
    assert_eq!(out, json!({"items": ["b"]}));
}

#[test]
fn test_empty_array_is_never_evaluated() {
    let calls = Cell::new(0);
    let evaluator = |_: &str, _: &Value, _: Option<usize>| -> Result<bool> {
        calls.set(calls.get() + 1);
        Ok(true)
    };
    let doc = json!({"matchers": []});

    let out = VisibilityEngine::new(&evaluator)
        .compute_hidden_fields(&doc, &rules(&[("/matchers/-/p", "x")]));

    assert_eq!(calls.get(), 0);
    assert_eq!(out, doc);
}

#[test]
fn test_plain_rule_evaluates_without_index() {
    let seen = RefCell::new(Vec::new());
    let evaluator = |_: &str, _: &Value, index: Option<usize>| -> Result<bool> {
        seen.borrow_mut().push(index);
        Ok(false)
    };

    VisibilityEngine::new(&evaluator).compute_hidden_fields(&json!({"a": 1}), &rules(&[("/a", "x")]));
    assert_eq!(*seen.borrow(), vec![None]);
}

#[test]
fn test_throwing_predicate_fails_open() {
    let evaluator = |predicate: &str, _: &Value, _: Option<usize>| -> Result<bool> {
        if predicate == "boom" {
            Err(Error::eval("boom"))
        } else {
            Ok(true)
        }
    };
    let doc = json!({"a": 1, "b": 2});

    let (out, report) = VisibilityEngine::new(&evaluator)
        .compute_hidden_fields_with_report(&doc, &rules(&[("/a", "boom"), ("/b", "fine")]));

    assert_eq!(out, json!({"a": 1}));
    assert_eq!(report.failed.len(), 1);
    assert_eq!(report.failed[0].path, "/a");
}

#[test]
fn test_input_document_is_not_mutated() {
    let evaluator = always(true);
    let doc = json!({"a": 1});
    let _ = VisibilityEngine::new(&evaluator).compute_hidden_fields(&doc, &rules(&[("/a", "x")]));
    assert_eq!(doc, json!({"a": 1}));
}

#[test]
fn test_expression_rules_on_alert_document() {
    let evaluator = ExpressionEvaluator::new();
    let doc = json!({
        "rule_name": "suspicious_login",
        "source_type": "windows",
        "matchers": [
            {"type": "REGEX_MATCH", "field": "user", "pattern": "adm.*", "data": "ignored"},
            {"type": "IS_IN_SET", "field": "host", "data": "a\nb", "pattern": "ignored"}
        ],
        "thresholding": {"max_count": 3}
    });
    let rules = rules(&[
        ("/matchers/-/pattern", "model.matchers[index].type !== 'REGEX_MATCH'"),
        ("/matchers/-/data", "model.matchers[index].type !== 'IS_IN_SET'"),
        ("/thresholding", "model.source_type == 'windows'"),
    ]);

    let out = VisibilityEngine::new(&evaluator).compute_hidden_fields(&doc, &rules);

    assert_eq!(
        out,
        json!({
            "rule_name": "suspicious_login",
            "source_type": "windows",
            "matchers": [
                {"type": "REGEX_MATCH", "field": "user", "pattern": "adm.*"},
                {"type": "IS_IN_SET", "field": "host", "data": "a\nb"}
            ]
        })
    );
}

proptest! {
    #[test]
    fn test_wildcard_fan_out_removes_all(n in 0usize..24) {
        let evaluator = always(true);
        let items: Vec<Value> = (0..n).map(|i| json!({"hidden": i, "shown": i})).collect();
        let doc = json!({"items": items});

        let (out, report) = VisibilityEngine::new(&evaluator)
            .compute_hidden_fields_with_report(&doc, &rules(&[("/items/-/hidden", "x")]));

        prop_assert_eq!(report.removed.len(), n);
        let expected: Vec<Value> = (0..n).map(|i| json!({"shown": i})).collect();
        prop_assert_eq!(out, json!({"items": expected}));
    }
}

#[rstest]
#[case::enabled_keeps_threshold(json!({"enabled": true, "max": 3}), json!({"enabled": true, "max": 3}))]
#[case::disabled_hides_threshold(json!({"enabled": false, "max": 3}), json!({"enabled": false}))]
#[case::missing_flag_hides_threshold(json!({"max": 3}), json!({}))]
#[case::absent_field_is_noop(json!({"enabled": false}), json!({"enabled": false}))]
fn test_expression_rule_table(#[case] doc: Value, #[case] expected: Value) {
    let evaluator = ExpressionEvaluator::new();
    let rules = rules(&[("/max", "return !model.enabled;")]);
    assert_eq!(
        VisibilityEngine::new(&evaluator).compute_hidden_fields(&doc, &rules),
        expected
    );
}
