//! Editing session flows: config file -> session -> controller -> store

use std::fs;
use std::path::Path;

use editor_core::{
    Collection, ConfigEntry, ConfigStore, ConfigSyncController, EditorConfig, InMemoryStore,
    MetadataField, StoreCommand, SubmitOutcome, ValidationIssue,
};
use pretty_assertions::assert_eq;
use serde_json::{Value, json};
use tempfile::TempDir;

const CONFIG: &str = r#"
[editor]
type = "alert"
ordering = "schema"
schema = "alert.schema.json"

[metadata]
name = "/rule_name"
version = "/rule_version"
author = "/rule_author"
description = "/rule_description"

[rules]
"/matchers/-/pattern" = "return model.matchers[index].type != 'REGEX_MATCH';"
"/thresholding/max_count" = "!model.thresholding.enabled"
"#;

fn write_config(dir: &Path) -> std::path::PathBuf {
    fs::write(
        dir.join("alert.schema.json"),
        json!({
            "properties": {
                "rule_name": {},
                "rule_version": {},
                "rule_author": {},
                "rule_description": {},
                "matchers": {"items": {"properties": {"type": {}, "pattern": {}}}},
                "thresholding": {"properties": {"enabled": {}, "max_count": {}}}
            }
        })
        .to_string(),
    )
    .unwrap();
    let path = dir.join("alert.toml");
    fs::write(&path, CONFIG).unwrap();
    path
}

fn entries() -> Vec<ConfigEntry> {
    vec![
        ConfigEntry::stored(
            "login_watch",
            7,
            "bo",
            json!({
                "rule_name": "login_watch",
                "rule_version": 7,
                "rule_author": "bo",
                "rule_description": "Watch logins",
                "matchers": [{"type": "REGEX_MATCH", "pattern": "adm.*"}]
            }),
        )
        .with_description("Watch logins"),
        ConfigEntry::stored("disk_full", 2, "cy", json!({"rule_name": "disk_full", "rule_version": 2, "rule_author": "cy"})),
    ]
}

fn controller(dir: &Path, user: &str) -> ConfigSyncController<InMemoryStore> {
    let session = EditorConfig::load(&write_config(dir))
        .unwrap()
        .into_session(user)
        .unwrap();
    let store = InMemoryStore::new(Collection::with_active(entries(), 0).unwrap());
    ConfigSyncController::new(session, store)
}

fn assert_mirrored(controller: &ConfigSyncController<InMemoryStore>, entry: &ConfigEntry) {
    let metadata = controller.session().metadata();
    let document = entry.document.as_ref().expect("document present");
    assert_eq!(metadata.get(document, MetadataField::Name), Some(&json!(entry.name)));
    assert_eq!(metadata.get(document, MetadataField::Version), Some(&json!(entry.version)));
    assert_eq!(metadata.get(document, MetadataField::Author), Some(&json!(entry.author)));
}

#[test]
fn test_untouched_entry_stays_saved_across_selection() {
    let dir = TempDir::new().unwrap();
    let mut c = controller(dir.path(), "ana");

    c.select(Some(1)).unwrap();

    let first = c.store().collection().get(0).unwrap();
    assert!(first.saved_in_backend);
    assert_mirrored(&c, first);
    assert_eq!(c.working_document()["rule_name"], json!("disk_full"));
}

#[test]
fn test_edit_then_switch_marks_dirty_and_keeps_edit() {
    let dir = TempDir::new().unwrap();
    let mut c = controller(dir.path(), "ana");

    c.working_document_mut()["matchers"]
        .as_array_mut()
        .unwrap()
        .push(json!({"type": "IS_IN_SET", "pattern": "hidden"}));
    c.working_document_mut()["rule_name"] = json!("renamed_in_form");
    c.select(Some(1)).unwrap();
    c.select(Some(0)).unwrap();

    let entry = c.store().collection().get(0).unwrap().clone();
    assert!(!entry.saved_in_backend);
    assert_eq!(entry.name, "login_watch");
    assert_mirrored(&c, &entry);
    assert_eq!(
        c.working_document()["matchers"],
        json!([{"type": "REGEX_MATCH", "pattern": "adm.*"}, {"type": "IS_IN_SET"}])
    );
}

#[test]
fn test_flushed_document_follows_schema_order() {
    let dir = TempDir::new().unwrap();
    let mut c = controller(dir.path(), "ana");
    *c.working_document_mut() = json!({
        "thresholding": {"max_count": 3, "enabled": true},
        "matchers": [{"pattern": "x", "type": "REGEX_MATCH"}],
        "rule_description": "Watch logins"
    });

    let entry = c.get_cleaned_active_entry().unwrap();
    let keys: Vec<_> = entry
        .document
        .as_ref()
        .and_then(Value::as_object)
        .unwrap()
        .keys()
        .cloned()
        .collect();

    // Metadata is mirrored after ordering, so it trails the declared fields
    assert_eq!(
        keys,
        vec!["rule_description", "matchers", "thresholding", "rule_name", "rule_version", "rule_author"]
    );
    assert_eq!(entry.description.as_deref(), Some("Watch logins"));
}

#[test]
fn test_clone_then_submit_as_new_entry() {
    let dir = TempDir::new().unwrap();
    let mut c = controller(dir.path(), "ana");

    let clone = c.on_clone().unwrap();
    assert_eq!(clone.name, "login_watch_clone");
    assert_eq!(clone.description.as_deref(), Some("Watch logins"));

    c.select(Some(2)).unwrap();
    assert_eq!(c.pending_name(), "login_watch_clone");

    let outcome = c.on_submit(&mut |_: &ConfigEntry| true).unwrap();
    let SubmitOutcome::Submitted { entry, report } = outcome else {
        panic!("clone should submit");
    };
    assert!(report.is_ok());
    assert_eq!((entry.version, entry.author.as_str()), (0, "ana"));
    assert_mirrored(&c, &entry);

    let commands: Vec<_> = c.store().log().iter().map(StoreCommand::name).collect();
    assert_eq!(
        commands,
        vec!["AddEntry", "ReplaceAll", "SelectActive", "ReplaceAll", "SubmitNew"]
    );
}

#[test]
fn test_clone_submitted_under_original_name_is_blocked() {
    let dir = TempDir::new().unwrap();
    let mut c = controller(dir.path(), "ana");
    c.on_clone().unwrap();
    c.select(Some(2)).unwrap();
    c.set_pending_name("login_watch");

    let outcome = c.on_submit(&mut |_: &ConfigEntry| true).unwrap();

    assert_eq!(
        outcome.report().issues,
        vec![ValidationIssue::DuplicateName {
            name: "login_watch".to_string()
        }]
    );
    assert_eq!(c.store().collection().len(), 3);
    assert!(c.store().collection().get(2).unwrap().is_new);
}

#[test]
fn test_teardown_of_other_editor_type_keeps_store_untouched() {
    let dir = TempDir::new().unwrap();
    let mut c = controller(dir.path(), "ana");
    c.working_document_mut()["rule_description"] = json!("changed");

    assert_eq!(c.on_teardown("parser").unwrap(), None);
    assert!(c.store().log().is_empty());

    let flushed = c.on_teardown("alert").unwrap().unwrap();
    assert_eq!(flushed.description.as_deref(), Some("changed"));
    assert_eq!(c.into_store().into_collection().get(0), Some(&flushed));
}
