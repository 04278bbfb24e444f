use realdoc_core::db::migrations::latest_version;
use realdoc_core::db::{open_db, open_db_in_memory};
use realdoc_core::{AttrValue, Document, DocumentStore, SqliteDocumentStore, StoreError};
use rusqlite::Connection;

fn doc(pairs: &[(&str, AttrValue)]) -> Document {
    pairs
        .iter()
        .map(|(name, value)| ((*name).to_string(), value.clone()))
        .collect()
}

#[test]
fn open_db_applies_migrations() {
    let conn = open_db_in_memory().unwrap();
    let version: u32 = conn
        .query_row("PRAGMA user_version;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(version, latest_version());
}

#[test]
fn open_db_on_file_is_reopenable() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("realdoc.sqlite");

    {
        let conn = open_db(&path).unwrap();
        let store = SqliteDocumentStore::new(&conn);
        store
            .insert(&doc(&[
                ("_id", AttrValue::from("listing-1")),
                ("title", AttrValue::from("House")),
            ]))
            .unwrap();
    }

    let conn = open_db(&path).unwrap();
    let store = SqliteDocumentStore::new(&conn);
    let loaded = store.get("listing-1").unwrap().unwrap();
    assert_eq!(loaded.get("title"), Some(&AttrValue::from("House")));
}

#[test]
fn newer_schema_versions_are_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("future.sqlite");
    let seed = Connection::open(&path).unwrap();
    seed.execute_batch("PRAGMA user_version = 9999;").unwrap();
    drop(seed);

    let err = open_db(&path).unwrap_err();
    assert!(err.to_string().contains("newer than supported"));
}

#[test]
fn get_returns_none_for_missing_documents() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteDocumentStore::new(&conn);
    assert!(store.get("listing-404").unwrap().is_none());
}

#[test]
fn insert_requires_a_text_id_field() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteDocumentStore::new(&conn);

    let err = store
        .insert(&doc(&[("title", AttrValue::from("House"))]))
        .unwrap_err();
    assert!(matches!(err, StoreError::MissingId));

    let err = store
        .insert(&doc(&[("_id", AttrValue::Int(7))]))
        .unwrap_err();
    assert!(matches!(err, StoreError::MissingId));
}

#[test]
fn insert_then_get_round_trips_value_shapes() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteDocumentStore::new(&conn);

    let document = doc(&[
        ("_id", AttrValue::from("listing-7")),
        ("title", AttrValue::from("House")),
        ("price", AttrValue::Int(12500)),
        ("rating", AttrValue::Float(4.5)),
        ("active", AttrValue::Bool(true)),
        ("notes", AttrValue::Null),
    ]);
    let receipt = store.insert(&document).unwrap();
    assert_eq!(receipt.id, "listing-7");
    assert_eq!(receipt.revision, 1);

    let loaded = store.get("listing-7").unwrap().unwrap();
    assert_eq!(loaded, document);
}

#[test]
fn reinserting_an_identity_bumps_the_revision() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteDocumentStore::new(&conn);

    let first = doc(&[
        ("_id", AttrValue::from("listing-7")),
        ("title", AttrValue::from("House")),
    ]);
    assert_eq!(store.insert(&first).unwrap().revision, 1);

    let second = doc(&[
        ("_id", AttrValue::from("listing-7")),
        ("title", AttrValue::from("House, renovated")),
    ]);
    assert_eq!(store.insert(&second).unwrap().revision, 2);

    let loaded = store.get("listing-7").unwrap().unwrap();
    assert_eq!(
        loaded.get("title"),
        Some(&AttrValue::from("House, renovated"))
    );
}

#[test]
fn corrupted_bodies_are_surfaced_not_masked() {
    let conn = open_db_in_memory().unwrap();
    conn.execute(
        "INSERT INTO documents (id, revision, body) VALUES ('listing-9', 1, 'not json');",
        [],
    )
    .unwrap();

    let store = SqliteDocumentStore::new(&conn);
    let err = store.get("listing-9").unwrap_err();
    assert!(matches!(err, StoreError::InvalidData { .. }));
    assert!(err.to_string().contains("listing-9"));
}
