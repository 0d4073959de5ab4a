// Shared fixtures for library tests

use std::fs;
use std::path::{Path, PathBuf};

pub const TWO_DIFFICULTIES: &str = r#"{
  "songs": [
    {
      "idx": 1,
      "id": "ether",
      "title_localized": { "en": "Ether Strike" },
      "artist": "akatsuki",
      "bpm": "170",
      "bpm_base": 170,
      "set": "base",
      "side": 1,
      "date": 1500000000,
      "version": "1.5",
      "difficulties": [
        { "ratingClass": 0, "chartDesigner": "a", "jacketDesigner": "", "rating": 4 },
        { "ratingClass": 2, "chartDesigner": "a", "jacketDesigner": "", "rating": 9 }
      ]
    }
  ]
}"#;

pub const PLAIN_FILES: &[&str] = &["base.ogg", "base.jpg", "base_256.jpg", "0.aff", "2.aff"];

/// A song folder as shipped by its author
pub fn source_folder(root: &Path, name: &str, songlist: &str, files: &[&str]) -> PathBuf {
    let dir = root.join(name);
    fs::create_dir_all(&dir).unwrap();
    fs::write(dir.join("songlist"), songlist).unwrap();
    for file in files {
        fs::write(dir.join(file), format!("{}:{}", name, file)).unwrap();
    }
    dir
}

/// An `assets` folder with an empty songlist, nested like an unpacked app
pub fn empty_library(root: &Path) -> PathBuf {
    let library = root.join("app").join("assets");
    fs::create_dir_all(library.join("songs")).unwrap();
    fs::write(library.join("songs").join("songlist"), r#"{ "songs": [] }"#).unwrap();
    library
}

pub fn touch(root: &Path, rel: &str) {
    let path = root.join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, rel.as_bytes()).unwrap();
}
