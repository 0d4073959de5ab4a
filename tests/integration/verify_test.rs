// Verification of an installed library

use aam::core::config::Settings;
use aam::core::verifier::{verify_library, Severity};
use aam::core::{DependencyPolicy, ManifestStore, Song};
use std::collections::HashSet;
use tempfile::TempDir;

use super::common::{empty_library, touch};

fn song(json: &str) -> Song {
    serde_json::from_str(json).unwrap()
}

#[test]
fn test_future_missing_is_error_beyond_missing_is_warning() {
    let temp = TempDir::new().unwrap();
    let library = empty_library(temp.path());
    let mut store = ManifestStore::open(&library).unwrap();
    store
        .upsert(vec![song(
            r#"{ "id": "x", "side": 0, "difficulties": [
                { "ratingClass": 2, "rating": 9 },
                { "ratingClass": 3, "rating": 10 }
            ] }"#,
        )])
        .unwrap();
    for rel in [
        "img/bg/base_light.jpg",
        "songs/x/base.ogg",
        "songs/x/base.jpg",
        "songs/x/base_256.jpg",
    ] {
        touch(&library, rel);
    }

    let report = verify_library(&library, &DependencyPolicy::new(0, HashSet::new())).unwrap();

    assert_eq!(report.severity(), Severity::Error);
    assert_eq!(report.error_count(), 1);
    assert_eq!(report.warning_count(), 1);
    let errors: Vec<_> = report
        .findings
        .iter()
        .filter(|f| f.severity == Severity::Error)
        .map(|f| f.dependence.dep.as_str())
        .collect();
    assert_eq!(errors, vec!["songs/x/2.aff"]);
}

#[test]
fn test_remote_song_needs_previews_only() {
    let temp = TempDir::new().unwrap();
    let library = empty_library(temp.path());
    let mut store = ManifestStore::open(&library).unwrap();
    store
        .upsert(vec![song(
            r#"{ "id": "r", "side": 2, "remote_dl": true, "difficulties": [
                { "ratingClass": 2, "rating": 9, "audioOverride": true }
            ] }"#,
        )])
        .unwrap();
    for rel in [
        "songs/dl_r/preview.ogg",
        "songs/dl_r/base.jpg",
        "songs/dl_r/base_256.jpg",
        "songs/dl_r/2_preview.ogg",
    ] {
        touch(&library, rel);
    }

    let report = verify_library(&library, &DependencyPolicy::default()).unwrap();
    assert_eq!(report.severity(), Severity::Ok, "{:?}", report.lines());
}

#[test]
fn test_ignored_song_contributes_nothing() {
    let temp = TempDir::new().unwrap();
    let library = empty_library(temp.path());
    let mut store = ManifestStore::open(&library).unwrap();
    store
        .upsert(vec![song(
            r#"{ "id": "tempestissimo", "side": 1, "difficulties": [
                { "ratingClass": 3, "rating": 11 }
            ] }"#,
        )])
        .unwrap();

    let policy = DependencyPolicy::from_settings(&Settings::default());
    let report = verify_library(&library, &policy).unwrap();
    assert!(report.findings.is_empty());
    assert_eq!(report.songs_checked, 1);
}

#[test]
fn test_report_lines_put_latest_error_first() {
    let temp = TempDir::new().unwrap();
    let library = empty_library(temp.path());
    let mut store = ManifestStore::open(&library).unwrap();
    store
        .upsert(vec![
            song(
                r#"{ "id": "first", "side": 2, "difficulties": [
                    { "ratingClass": 3, "rating": 10 }
                ] }"#,
            ),
            song(r#"{ "id": "second", "side": 2, "difficulties": [] }"#),
        ])
        .unwrap();
    for rel in [
        "songs/first/base.jpg",
        "songs/first/base_256.jpg",
        "songs/second/base_256.jpg",
        "songs/second/base.ogg",
    ] {
        touch(&library, rel);
    }

    let report = verify_library(&library, &DependencyPolicy::default()).unwrap();
    assert_eq!(
        report.lines(),
        vec![
            "[E] second requires songs/second/base.jpg, but it does not exist.",
            "[E] first requires songs/first/base.ogg, but it does not exist.",
            "[W] first defines a Beyond difficulty but its chart is missing; it may be loaded online.",
        ]
    );
}
