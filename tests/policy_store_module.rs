use serde_json::{json, Value};
use slimbrave::policy::{PolicyDocument, PolicyStore};
use slimbrave::shared::errors::ErrorKind;
use std::fs;
use tempfile::tempdir;

#[test]
fn policy_store_module_save_replaces_previous_contents() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("slimbrave.json");
    fs::write(&path, r#"{"ManualKey": 7, "TorDisabled": true}"#).expect("seed");
    let store = PolicyStore::new(&path);

    store
        .save(&PolicyDocument::from_entries([("QuicAllowed", json!(false))]))
        .expect("save");

    let written: Value =
        serde_json::from_str(&fs::read_to_string(&path).expect("read")).expect("json");
    assert_eq!(written, json!({"QuicAllowed": false}));
}

#[test]
fn policy_store_module_writes_four_space_indented_json() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("slimbrave.json");
    let store = PolicyStore::new(&path);

    store
        .save(&PolicyDocument::from_entries([
            ("DnsMode", json!("automatic")),
            ("BraveRewardsDisabled", json!(true)),
        ]))
        .expect("save");

    assert_eq!(
        fs::read_to_string(&path).expect("read"),
        "{\n    \"BraveRewardsDisabled\": true,\n    \"DnsMode\": \"automatic\"\n}\n"
    );
}

#[test]
fn policy_store_module_creates_missing_directory_only_when_allowed() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("policies/managed/slimbrave.json");
    let document = PolicyDocument::from_entries([("TorDisabled", json!(true))]);

    let err = PolicyStore::new(&path)
        .save(&document)
        .expect_err("parent missing");
    assert_eq!(err.kind(), ErrorKind::PermissionDenied);

    PolicyStore::new(&path)
        .with_create_parent(true)
        .save(&document)
        .expect("save with parent creation");
    assert!(path.is_file());
}

#[test]
fn policy_store_module_load_distinguishes_missing_and_corrupt() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("slimbrave.json");
    let store = PolicyStore::new(&path);

    let missing = store.load();
    assert!(!missing.found);
    assert!(missing.diagnostic.is_none());
    assert!(missing.document.is_empty());

    fs::write(&path, "[1, 2]").expect("seed array");
    let corrupt = store.load();
    assert!(corrupt.found);
    assert_eq!(
        corrupt.diagnostic.map(|err| err.kind()),
        Some(ErrorKind::CorruptPolicy)
    );
    assert!(corrupt.document.is_empty());
}

#[test]
fn policy_store_module_remove_reports_absence() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("slimbrave.json");
    let store = PolicyStore::new(&path);

    assert!(!store.remove().expect("remove missing"));
    fs::write(&path, "{}").expect("seed");
    assert!(store.remove().expect("remove existing"));
    assert!(!path.exists());
}
