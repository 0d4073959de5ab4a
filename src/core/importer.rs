// Song folder importer

use std::fs;
use std::path::{Path, PathBuf};

use crate::core::deps::DependencyPolicy;
use crate::core::manifest::read_songlist;
use crate::core::song::Song;
use crate::error::{AamError, Result};

/// Name of the manifest file in source folders and in `songs/`
pub const SONGLIST_FILE: &str = "songlist";

/// Outcome of a multi-folder import
#[derive(Debug, Default)]
pub struct ImportOutcome {
    pub imported: Vec<Song>,
    pub failed: Vec<(PathBuf, String)>,
}

/// Song ids become folder names, so they must be a single plain component
pub fn validate_song_id(id: &str) -> Result<()> {
    if id.trim().is_empty() {
        return Err(AamError::import("song id is empty"));
    }
    if id == "." || id == ".." || id.contains(&['/', '\\', '\0'][..]) {
        return Err(AamError::import(format!(
            "song id \"{}\" is not a valid folder name",
            id
        )));
    }
    Ok(())
}

/// Copy one song folder into `<library>/songs/<id>` and return its record
///
/// Only the first entry of the source `songlist` is honored. Existing files
/// at the destination are overwritten so a re-import updates the song.
pub fn import_song(src: &Path, library: &Path, policy: &DependencyPolicy) -> Result<Song> {
    log::info!("Importing song from {:?} into {:?}", src, library);

    let songlist = read_songlist(&src.join(SONGLIST_FILE))?;
    let song = songlist
        .songs
        .into_iter()
        .next()
        .ok_or_else(|| AamError::import(format!("{:?} has an empty songlist", src)))?;
    validate_song_id(&song.id)?;

    let mut files = policy.source_deps(&song);
    files.push(SONGLIST_FILE.to_string());

    let missing: Vec<&str> = files
        .iter()
        .filter(|file| !src.join(file.as_str()).is_file())
        .map(String::as_str)
        .collect();
    if !missing.is_empty() {
        return Err(AamError::import(format!(
            "{} is missing required file(s): {}",
            song.id,
            missing.join(", ")
        )));
    }

    let dest_dir = library.join("songs").join(&song.id);
    fs::create_dir_all(&dest_dir)?;

    for file in &files {
        let from = src.join(file);
        let to = dest_dir.join(file);
        log::debug!("{:?} -> {:?}", from, to);
        fs::copy(&from, &to).map_err(|e| {
            AamError::import(format!("failed to copy {:?} to {:?}: {}", from, to, e))
        })?;
    }

    Ok(song)
}

/// Import several folders one after another
///
/// A failing folder is recorded and the batch continues. With `link`, each
/// imported record remembers its source folder as `_external`.
pub fn import_batch(
    paths: &[PathBuf],
    library: &Path,
    policy: &DependencyPolicy,
    link: bool,
) -> ImportOutcome {
    let mut outcome = ImportOutcome::default();

    for src in paths {
        match import_song(src, library, policy) {
            Ok(mut song) => {
                if link {
                    let canonical = src.canonicalize().unwrap_or_else(|_| src.clone());
                    song.external = Some(canonical.to_string_lossy().to_string());
                }
                outcome.imported.push(song);
            }
            Err(e) => {
                log::error!("Import of {:?} failed: {}", src, e);
                outcome.failed.push((src.clone(), e.to_string()));
            }
        }
    }

    outcome
}

/// Outcome of a background image import
#[derive(Debug, Default)]
pub struct BackgroundOutcome {
    pub imported: Vec<PathBuf>,
    pub failed: Vec<(PathBuf, String)>,
}

/// Copy background images into `<library>/img/bg`
pub fn import_backgrounds(files: &[PathBuf], library: &Path) -> BackgroundOutcome {
    let mut outcome = BackgroundOutcome::default();
    let bg_dir = library.join("img").join("bg");

    for src in files {
        let result = check_background(src).and_then(|name| {
            fs::create_dir_all(&bg_dir)?;
            let dest = bg_dir.join(name);
            log::debug!("{:?} -> {:?}", src, dest);
            fs::copy(src, &dest)?;
            Ok(())
        });

        match result {
            Ok(()) => outcome.imported.push(src.clone()),
            Err(e) => {
                log::error!("Background import of {:?} failed: {}", src, e);
                outcome.failed.push((src.clone(), e.to_string()));
            }
        }
    }

    outcome
}

fn check_background(src: &Path) -> Result<&std::ffi::OsStr> {
    let is_jpg = src
        .extension()
        .map(|ext| ext.eq_ignore_ascii_case("jpg"))
        .unwrap_or(false);
    if !is_jpg {
        return Err(AamError::invalid_path(format!(
            "{:?} is not a .jpg image",
            src
        )));
    }
    src.file_name()
        .ok_or_else(|| AamError::invalid_path(format!("{:?} has no file name", src)))
}
