//! Manifest store for `<library>/songs/songlist`
//!
//! The manifest is the source of truth for a library. Every mutation is
//! written to disk first and only then applied to the in-memory copy, so the
//! two never diverge when a write fails.

use std::collections::{HashMap, HashSet};
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use serde_json::Value;
use tempfile::NamedTempFile;
use thiserror::Error;

use crate::core::song::{Song, Songlist};

/// Typed manifest failure; `code()` is never zero
#[derive(Error, Debug)]
pub enum ManifestError {
    #[error("Invalid assets folder: songlist not found at {0:?}")]
    Missing(PathBuf),

    #[error("songlist is not valid JSON: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("songlist format error: {0}")]
    InvalidShape(String),

    #[error("Failed to read songlist: {0}")]
    Io(#[source] io::Error),

    #[error("Failed to write songlist: {0}")]
    Write(#[source] io::Error),
}

impl ManifestError {
    pub fn code(&self) -> i32 {
        match self {
            ManifestError::Missing(_) => 1,
            ManifestError::Malformed(_) => 2,
            ManifestError::InvalidShape(_) => 3,
            ManifestError::Io(_) => 4,
            ManifestError::Write(_) => 5,
        }
    }
}

/// Location of the manifest inside a library root
pub fn songlist_path(library: &Path) -> PathBuf {
    library.join("songs").join("songlist")
}

/// Parse any `{ "songs": [...] }` document, source folders included
pub fn parse_songlist(data: &[u8]) -> Result<Songlist, ManifestError> {
    let value: Value = serde_json::from_slice(data)?;
    match value.get("songs") {
        Some(Value::Array(_)) => Ok(serde_json::from_value(value)?),
        Some(_) => Err(ManifestError::InvalidShape(
            "\"songs\" is not an array".to_string(),
        )),
        None => Err(ManifestError::InvalidShape(
            "missing \"songs\" key".to_string(),
        )),
    }
}

pub fn read_songlist(path: &Path) -> Result<Songlist, ManifestError> {
    let data = fs::read(path).map_err(|e| match e.kind() {
        io::ErrorKind::NotFound => ManifestError::Missing(path.to_path_buf()),
        _ => ManifestError::Io(e),
    })?;
    parse_songlist(&data)
}

/// Write pretty JSON (2-space indent) through a temp file and rename
///
/// An existing manifest keeps its permissions.
pub fn write_songlist(path: &Path, songs: &[Song]) -> Result<(), ManifestError> {
    #[derive(serde::Serialize)]
    struct SonglistRef<'a> {
        songs: &'a [Song],
    }

    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let data = serde_json::to_vec_pretty(&SonglistRef { songs })?;

    let mut tmp = NamedTempFile::new_in(dir).map_err(ManifestError::Write)?;
    // The replacement keeps the mode of the file it replaces
    if let Ok(existing) = fs::metadata(path) {
        tmp.as_file()
            .set_permissions(existing.permissions())
            .map_err(ManifestError::Write)?;
    }
    tmp.write_all(&data).map_err(ManifestError::Write)?;
    tmp.as_file().sync_all().map_err(ManifestError::Write)?;
    tmp.persist(path).map_err(|e| ManifestError::Write(e.error))?;
    Ok(())
}

/// Upsert `incoming` into `existing` keyed by `id`
///
/// Replaced entries keep their original position; new ids are appended in
/// incoming order.
pub fn merge_songlist(incoming: Vec<Song>, existing: Vec<Song>) -> Vec<Song> {
    log::info!("Merging {} song(s) into manifest", incoming.len());
    let mut merged = existing;
    let mut index: HashMap<String, usize> = merged
        .iter()
        .enumerate()
        .map(|(i, song)| (song.id.clone(), i))
        .collect();

    for song in incoming {
        match index.get(&song.id) {
            Some(&i) => merged[i] = song,
            None => {
                index.insert(song.id.clone(), merged.len());
                merged.push(song);
            }
        }
    }

    merged
}

/// Result of a batch delete
#[derive(Debug, Default)]
pub struct RemoveOutcome {
    pub removed: Vec<String>,
    /// `(id, reason)` for ids that were unknown or whose files stayed behind
    pub failed: Vec<(String, String)>,
}

/// An opened library manifest
#[derive(Debug)]
pub struct ManifestStore {
    library: PathBuf,
    songs: Vec<Song>,
}

impl ManifestStore {
    pub fn open(library: &Path) -> Result<Self, ManifestError> {
        log::info!("Loading songlist from {:?}", library);
        let songlist = read_songlist(&songlist_path(library))?;
        Ok(Self {
            library: library.to_path_buf(),
            songs: songlist.songs,
        })
    }

    /// Open the manifest, creating an empty one when the library has none
    pub fn create(library: &Path) -> Result<Self, ManifestError> {
        let path = songlist_path(library);
        if !path.exists() {
            log::info!("Creating empty songlist at {:?}", path);
            if let Some(dir) = path.parent() {
                fs::create_dir_all(dir).map_err(ManifestError::Write)?;
            }
            write_songlist(&path, &[])?;
        }
        Self::open(library)
    }

    pub fn library(&self) -> &Path {
        &self.library
    }

    pub fn path(&self) -> PathBuf {
        songlist_path(&self.library)
    }

    pub fn songs(&self) -> &[Song] {
        &self.songs
    }

    pub fn get(&self, id: &str) -> Option<&Song> {
        self.songs.iter().find(|song| song.id == id)
    }

    pub fn upsert(&mut self, incoming: Vec<Song>) -> Result<(), ManifestError> {
        let merged = merge_songlist(incoming, self.songs.clone());
        self.commit(merged)
    }

    /// Persist an edited list wholesale
    pub fn replace(&mut self, songs: Vec<Song>) -> Result<(), ManifestError> {
        let mut seen = HashSet::new();
        if let Some(dup) = songs.iter().find(|song| !seen.insert(song.id.as_str())) {
            return Err(ManifestError::InvalidShape(format!(
                "duplicate song id \"{}\"",
                dup.id
            )));
        }
        self.commit(songs)
    }

    /// Remove songs by id; with `purge`, delete their library folders too
    ///
    /// Externally linked songs never have their folders purged since the
    /// library does not own their canonical files.
    pub fn remove(&mut self, ids: &[String], purge: bool) -> Result<RemoveOutcome, ManifestError> {
        let mut outcome = RemoveOutcome::default();
        let wanted: HashSet<&str> = ids.iter().map(String::as_str).collect();

        for id in ids {
            if self.get(id).is_none() {
                outcome.failed.push((id.clone(), "not in songlist".to_string()));
            }
        }

        let (dropped, kept): (Vec<Song>, Vec<Song>) = self
            .songs
            .iter()
            .cloned()
            .partition(|song| wanted.contains(song.id.as_str()));

        self.commit(kept)?;

        for song in dropped {
            if purge && song.external.is_none() {
                let dir = self.library.join("songs").join(song.asset_dir_name());
                match fs::remove_dir_all(&dir) {
                    Ok(()) => log::info!("Removed {:?}", dir),
                    Err(e) if e.kind() == io::ErrorKind::NotFound => {}
                    Err(e) => {
                        log::error!("Failed to remove {:?}: {}", dir, e);
                        outcome.failed.push((song.id.clone(), e.to_string()));
                        continue;
                    }
                }
            }
            outcome.removed.push(song.id);
        }

        Ok(outcome)
    }

    fn commit(&mut self, songs: Vec<Song>) -> Result<(), ManifestError> {
        write_songlist(&self.path(), &songs)?;
        self.songs = songs;
        Ok(())
    }
}
