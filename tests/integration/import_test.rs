// End-to-end import into a library: copy, merge, persist

use aam::core::importer::import_batch;
use aam::core::{DependencyPolicy, ManifestStore};
use std::fs;
use tempfile::TempDir;

use super::common::{empty_library, source_folder, PLAIN_FILES, TWO_DIFFICULTIES};

#[test]
fn test_import_into_empty_library() {
    let temp = TempDir::new().unwrap();
    let library = empty_library(temp.path());
    let src = source_folder(temp.path(), "ether-src", TWO_DIFFICULTIES, PLAIN_FILES);

    let outcome = import_batch(&[src], &library, &DependencyPolicy::default(), false);
    assert!(outcome.failed.is_empty());

    let mut store = ManifestStore::open(&library).unwrap();
    store.upsert(outcome.imported).unwrap();

    let reopened = ManifestStore::open(&library).unwrap();
    assert_eq!(reopened.songs().len(), 1);
    assert_eq!(reopened.songs()[0].id, "ether");
    assert!(reopened.songs()[0].external.is_none());

    for file in PLAIN_FILES {
        let copied = library.join("songs/ether").join(file);
        assert!(copied.is_file(), "{} missing", file);
        assert_eq!(
            fs::read_to_string(copied).unwrap(),
            format!("ether-src:{}", file)
        );
    }
}

#[test]
fn test_batch_keeps_going_after_failure() {
    let temp = TempDir::new().unwrap();
    let library = empty_library(temp.path());
    let broken = source_folder(temp.path(), "broken", TWO_DIFFICULTIES, &["base.ogg"]);
    let good = source_folder(temp.path(), "good", TWO_DIFFICULTIES, PLAIN_FILES);
    let not_a_song = temp.path().join("empty-folder");
    fs::create_dir_all(&not_a_song).unwrap();

    let outcome = import_batch(
        &[broken.clone(), not_a_song.clone(), good],
        &library,
        &DependencyPolicy::default(),
        false,
    );

    assert_eq!(outcome.imported.len(), 1);
    let failed: Vec<_> = outcome.failed.iter().map(|(p, _)| p.clone()).collect();
    assert_eq!(failed, vec![broken, not_a_song]);
}

#[test]
fn test_reimport_updates_in_place() {
    let temp = TempDir::new().unwrap();
    let library = empty_library(temp.path());
    let other = source_folder(
        temp.path(),
        "other",
        r#"{ "songs": [ { "id": "first", "side": 0, "difficulties": [] } ] }"#,
        &["base.ogg", "base.jpg", "base_256.jpg"],
    );
    let src = source_folder(temp.path(), "ether-src", TWO_DIFFICULTIES, PLAIN_FILES);

    let mut store = ManifestStore::open(&library).unwrap();
    let policy = DependencyPolicy::default();
    store
        .upsert(import_batch(&[other.clone(), src.clone()], &library, &policy, false).imported)
        .unwrap();

    let updated = TWO_DIFFICULTIES.replace("\"1.5\"", "\"2.0\"");
    fs::write(src.join("songlist"), updated).unwrap();
    store
        .upsert(import_batch(&[src], &library, &policy, false).imported)
        .unwrap();

    let ids: Vec<&str> = store.songs().iter().map(|s| s.id.as_str()).collect();
    assert_eq!(ids, vec!["first", "ether"]);
    assert_eq!(store.songs()[1].version, "2.0");
}
