//! Read-modify-write cycles against the JSON file store

use std::fs;

use serde_json::{Value, json};

use mandala_store::{DocumentStore, JsonFileStore, StoreError, load_or_default, update};
use mandala_types::{Document, Revision};

use crate::common::user;

#[test]
fn first_load_is_the_placeholder_document() {
    let dir = tempfile::tempdir().unwrap();
    let store = JsonFileStore::new(dir.path());

    let document = load_or_default(&store, &user()).unwrap();

    assert_eq!(document, Document::new_default());
    assert!(!store.path_for(&user()).exists());
}

#[test]
fn partial_document_from_another_writer_hydrates_and_survives_save() {
    let dir = tempfile::tempdir().unwrap();
    let store = JsonFileStore::new(dir.path());
    fs::write(
        store.path_for(&user()),
        json!({
            "progression": { "xp": 120, "level": 2 },
            "slackUserId": "U123",
            "revision": 3
        })
        .to_string(),
    )
    .unwrap();

    let (document, ()) = update(&store, &user(), |document| {
        document.goal_tree.center_section.center_cell.title = "Be kind".into();
    })
    .unwrap();

    assert_eq!(document.revision, Revision::new(4));
    assert_eq!(document.progression.xp, 120);
    assert_eq!(document.progression.streak_days, 0);

    let raw: Value =
        serde_json::from_str(&fs::read_to_string(store.path_for(&user())).unwrap()).unwrap();
    assert_eq!(raw["slackUserId"], "U123");
    assert_eq!(raw["goalTree"]["centerSection"]["centerCell"]["title"], "Be kind");
    assert_eq!(raw["revision"], 4);
}

#[test]
fn concurrent_writers_do_not_silently_overwrite() {
    let dir = tempfile::tempdir().unwrap();
    let store = JsonFileStore::new(dir.path());
    store.save(&user(), &Document::new_default()).unwrap();

    let mut phone = store.load(&user()).unwrap().unwrap();
    let mut laptop = phone.clone();
    phone.progression.xp = 10;
    laptop.goal_tree.center_section.center_cell.title = "Laptop vision".into();

    store.save(&user(), &phone).unwrap();
    let err = store.save(&user(), &laptop).unwrap_err();
    assert!(matches!(err, StoreError::Conflict { .. }));

    let (merged, ()) = update(&store, &user(), |document| {
        document.goal_tree.center_section.center_cell.title = "Laptop vision".into();
    })
    .unwrap();
    assert_eq!(merged.progression.xp, 10);
    assert_eq!(merged.goal_tree.vision(), "Laptop vision");
    assert_eq!(merged.revision, Revision::new(3));
}
