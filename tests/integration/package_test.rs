// End-to-end packaging: external re-import, archive contents, cleanup

use aam::core::importer::import_batch;
use aam::core::packager::{package_root_for, PackageEvent, Packager};
use aam::core::{DependencyPolicy, ManifestStore};
use aam::AamError;
use std::collections::BTreeMap;
use std::fs;
use std::io::Read;
use std::path::Path;
use tempfile::TempDir;
use tokio::sync::mpsc;

use super::common::{empty_library, source_folder, touch, PLAIN_FILES, TWO_DIFFICULTIES};

/// Relative path -> bytes for every file below `root`; directories map to `None`
fn tree(root: &Path) -> BTreeMap<String, Option<Vec<u8>>> {
    fn walk(dir: &Path, prefix: &str, out: &mut BTreeMap<String, Option<Vec<u8>>>) {
        for entry in fs::read_dir(dir).unwrap() {
            let entry = entry.unwrap();
            let name = format!("{}{}", prefix, entry.file_name().to_string_lossy());
            if entry.file_type().unwrap().is_dir() {
                out.insert(format!("{}/", name), None);
                walk(&entry.path(), &format!("{}/", name), out);
            } else {
                out.insert(name, Some(fs::read(entry.path()).unwrap()));
            }
        }
    }
    let mut out = BTreeMap::new();
    walk(root, "", &mut out);
    out
}

fn archive_tree(archive: &Path) -> BTreeMap<String, Option<Vec<u8>>> {
    let mut zip = zip::ZipArchive::new(fs::File::open(archive).unwrap()).unwrap();
    let mut out = BTreeMap::new();
    for i in 0..zip.len() {
        let mut entry = zip.by_index(i).unwrap();
        let name = entry.name().to_string();
        if entry.is_dir() {
            out.insert(name, None);
        } else {
            let mut data = Vec::new();
            entry.read_to_end(&mut data).unwrap();
            out.insert(name, Some(data));
        }
    }
    out
}

fn drain(mut rx: mpsc::UnboundedReceiver<PackageEvent>) -> Vec<PackageEvent> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}

#[tokio::test]
async fn test_archive_matches_source_tree() {
    let temp = TempDir::new().unwrap();
    let library = empty_library(temp.path());
    let root = library.parent().unwrap().to_path_buf();
    touch(&root, "AndroidManifest.xml");
    touch(&root, "classes.dex");
    touch(&library, "songs/ether/base.ogg");
    touch(&library, "songs/ether/0.aff");
    touch(&library, "img/bg/base_light.jpg");
    fs::create_dir_all(library.join("empty")).unwrap();

    let scratch = temp.path().join("scratch");
    fs::create_dir_all(&scratch).unwrap();
    let dest = temp.path().join("game.apk");
    assert_eq!(package_root_for(&library, &dest).unwrap(), root.canonicalize().unwrap());

    let (tx, rx) = mpsc::unbounded_channel();
    let packager =
        Packager::new(&library, &root, DependencyPolicy::default()).with_temp_root(&scratch);
    let written = packager.run(&dest, tx).await.unwrap();

    assert_eq!(written, dest);
    assert_eq!(archive_tree(&dest), tree(&root));
    assert_eq!(fs::read_dir(&scratch).unwrap().count(), 0);

    let events = drain(rx);
    assert!(matches!(events.first(), Some(PackageEvent::Started { .. })));
    assert!(events
        .iter()
        .any(|e| matches!(e, PackageEvent::Progress { .. })));
    assert!(matches!(events.last(), Some(PackageEvent::Finished { .. })));
}

#[tokio::test]
async fn test_external_song_is_reimported_before_archiving() {
    let temp = TempDir::new().unwrap();
    let library = empty_library(temp.path());
    let root = library.parent().unwrap().to_path_buf();
    let src = source_folder(temp.path(), "linked", TWO_DIFFICULTIES, PLAIN_FILES);

    let policy = DependencyPolicy::default();
    let outcome = import_batch(&[src.clone()], &library, &policy, true);
    ManifestStore::open(&library)
        .unwrap()
        .upsert(outcome.imported)
        .unwrap();

    // the source changes after linking; packaging must pick the change up
    fs::write(src.join("2.aff"), b"edited chart").unwrap();

    let dest = temp.path().join("game.apk");
    let (tx, _rx) = mpsc::unbounded_channel();
    Packager::new(&library, &root, policy)
        .run(&dest, tx)
        .await
        .unwrap();

    let archived = archive_tree(&dest);
    assert_eq!(
        archived.get("assets/songs/ether/2.aff"),
        Some(&Some(b"edited chart".to_vec()))
    );
}

#[tokio::test]
async fn test_missing_external_source_aborts_without_output() {
    let temp = TempDir::new().unwrap();
    let library = empty_library(temp.path());
    let root = library.parent().unwrap().to_path_buf();
    let src = source_folder(temp.path(), "linked", TWO_DIFFICULTIES, PLAIN_FILES);

    let policy = DependencyPolicy::default();
    let outcome = import_batch(&[src.clone()], &library, &policy, true);
    ManifestStore::open(&library)
        .unwrap()
        .upsert(outcome.imported)
        .unwrap();
    fs::remove_dir_all(&src).unwrap();

    let scratch = temp.path().join("scratch");
    fs::create_dir_all(&scratch).unwrap();
    let dest = temp.path().join("game.apk");

    let (tx, rx) = mpsc::unbounded_channel();
    let err = Packager::new(&library, &root, policy)
        .with_temp_root(&scratch)
        .run(&dest, tx)
        .await
        .unwrap_err();

    assert!(matches!(err, AamError::ExternalReimport(ref failed) if failed.len() == 1));
    assert!(!dest.exists());
    assert_eq!(fs::read_dir(&scratch).unwrap().count(), 0);

    let events = drain(rx);
    assert_eq!(events.len(), 1);
    assert!(matches!(events[0], PackageEvent::Failed { .. }));
}

#[tokio::test]
async fn test_unwritable_destination_reports_failure() {
    let temp = TempDir::new().unwrap();
    let library = empty_library(temp.path());
    let root = library.parent().unwrap().to_path_buf();
    let scratch = temp.path().join("scratch");
    fs::create_dir_all(&scratch).unwrap();
    let dest = temp.path().join("missing-dir").join("game.apk");

    let (tx, rx) = mpsc::unbounded_channel();
    let result = Packager::new(&library, &root, DependencyPolicy::default())
        .with_temp_root(&scratch)
        .run(&dest, tx)
        .await;

    assert!(matches!(result, Err(AamError::Package(_))));
    assert!(!dest.exists());
    assert_eq!(fs::read_dir(&scratch).unwrap().count(), 0);
    assert!(matches!(
        drain(rx).last(),
        Some(PackageEvent::Failed { .. })
    ));
}
