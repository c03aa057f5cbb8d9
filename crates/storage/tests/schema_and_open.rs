use concord_storage::{IndexStore, StoreError};
use rusqlite::Connection;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

fn temp_storage_dir(label: &str) -> PathBuf {
    let mut path = std::env::temp_dir();
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("clock should be monotonic enough for tests")
        .as_nanos();
    path.push(format!(
        "concord-storage-{label}-{}-{nanos}",
        std::process::id()
    ));
    std::fs::create_dir_all(&path).expect("temp storage dir must be creatable");
    path
}

fn seed_translation_db(dir: &Path, file_name: &str) -> PathBuf {
    let db_path = dir.join(file_name);
    let conn = Connection::open(&db_path).expect("fixture db must open");
    conn.execute_batch(
        "CREATE TABLE ASV_books (
           id INTEGER PRIMARY KEY AUTOINCREMENT,
           name TEXT
         );
         CREATE TABLE ASV_verses (
           id INTEGER PRIMARY KEY AUTOINCREMENT,
           book_id INTEGER,
           chapter INTEGER,
           verse INTEGER,
           text TEXT,
           FOREIGN KEY(book_id) REFERENCES ASV_books(id)
         );
         INSERT INTO ASV_books (id, name) VALUES (1, 'Psalms');
         INSERT INTO ASV_verses (id, book_id, chapter, verse, text)
           VALUES (1, 1, 23, 1, 'The LORD is my shepherd.');
         INSERT INTO ASV_verses (id, book_id, chapter, verse, text)
           VALUES (2, 1, 23, 2, 'He restoreth my soul.');",
    )
    .expect("fixture schema must install");
    db_path
}

#[test]
fn open_rejects_missing_database_before_any_write() {
    let dir = temp_storage_dir("missing-db");
    let db_path = dir.join("ASV.db");

    let err = IndexStore::open(&db_path).expect_err("missing file must be rejected");
    match err {
        StoreError::MissingDatabase(path) => assert_eq!(path, db_path),
        other => panic!("expected MissingDatabase, got {other:?}"),
    }
    assert!(!db_path.exists(), "open must not create the store");
}

#[test]
fn open_derives_translation_code_from_file_name() {
    let dir = temp_storage_dir("code-derivation");
    let db_path = seed_translation_db(&dir, "ASV.db");

    let store = IndexStore::open(&db_path).expect("seeded store must open");
    assert_eq!(store.translation().as_str(), "ASV");
}

#[test]
fn open_rejects_unsafe_file_names() {
    let dir = temp_storage_dir("bad-name");
    let db_path = dir.join("bad name.db");
    let conn = Connection::open(&db_path).expect("fixture db must open");
    drop(conn);

    let err = IndexStore::open(&db_path).expect_err("space in the code must be rejected");
    assert!(matches!(err, StoreError::InvalidInput(_)));
}

#[test]
fn translation_title_is_optional_flavor() {
    let dir = temp_storage_dir("title");
    let db_path = seed_translation_db(&dir, "ASV.db");

    let store = IndexStore::open(&db_path).expect("seeded store must open");
    assert_eq!(store.translation_title().expect("no table is not an error"), None);
    drop(store);

    let conn = Connection::open(&db_path).expect("fixture db must reopen");
    conn.execute_batch(
        "CREATE TABLE translations (translation TEXT PRIMARY KEY, title TEXT, license TEXT);
         INSERT INTO translations VALUES ('ASV', 'American Standard Version', 'public domain');",
    )
    .expect("translations table must install");
    drop(conn);

    let store = IndexStore::open(&db_path).expect("store must reopen");
    assert_eq!(
        store.translation_title().expect("title lookup must succeed"),
        Some("American Standard Version".to_string())
    );
}

#[test]
fn schema_rebuild_is_destructive_and_idempotent() {
    let dir = temp_storage_dir("rebuild");
    let db_path = seed_translation_db(&dir, "ASV.db");

    let mut store = IndexStore::open(&db_path).expect("seeded store must open");
    let dropped = store
        .create_index_schema()
        .expect("fresh schema must install");
    assert!(!dropped, "first run must not report a prior index");

    let batch = store.batch().expect("batch must open");
    let word_id = batch
        .insert_word("shepherd", false)
        .expect("word insert must succeed");
    batch
        .insert_occurrence(word_id, 1, 4)
        .expect("occurrence insert must succeed");
    batch.commit().expect("batch must commit");

    let dropped = store
        .create_index_schema()
        .expect("rebuild must succeed with populated tables");
    assert!(dropped, "second run must report the prior index");

    let conn = Connection::open(&db_path).expect("fixture db must reopen");
    let words: i64 = conn
        .query_row("SELECT COUNT(*) FROM ASV_words", [], |row| row.get(0))
        .expect("words table must exist");
    let occurrences: i64 = conn
        .query_row("SELECT COUNT(*) FROM ASV_word_occurrences", [], |row| {
            row.get(0)
        })
        .expect("occurrences table must exist");
    assert_eq!(words, 0, "rebuild must start from a clean slate");
    assert_eq!(occurrences, 0, "rebuild must start from a clean slate");
}

#[test]
fn read_verses_is_ordered_and_joined() {
    let dir = temp_storage_dir("verses");
    let db_path = seed_translation_db(&dir, "ASV.db");

    let store = IndexStore::open(&db_path).expect("seeded store must open");
    let verses = store.read_verses().expect("verses must read");
    assert_eq!(verses.len(), 2);
    assert_eq!(verses[0].id, 1);
    assert_eq!(verses[0].book, "Psalms");
    assert_eq!(verses[0].chapter, 23);
    assert_eq!(verses[0].verse, 1);
    assert_eq!(verses[0].text, "The LORD is my shepherd.");
    assert_eq!(verses[1].id, 2);
}

#[test]
fn read_verses_without_source_tables_is_fatal() {
    let dir = temp_storage_dir("no-source");
    let db_path = dir.join("ASV.db");
    let conn = Connection::open(&db_path).expect("empty db must open");
    drop(conn);

    let store = IndexStore::open(&db_path).expect("empty store must open");
    let err = store
        .read_verses()
        .expect_err("missing source tables must surface");
    assert!(matches!(err, StoreError::Sql(_)));
}
