//! Library packaging
//!
//! Packaging runs in three stages:
//!
//! 1. every externally linked song is re-imported into the library; if any
//!    of them fails the run stops before an archive is started
//! 2. the package root is zipped into a file inside a private temp dir,
//!    reporting the processed size at most once per second
//! 3. the finished archive is copied next to the destination and renamed
//!    into place
//!
//! The temp dir is a [`tempfile::TempDir`] owned by one run, so it is
//! removed on every exit path.
//!
//! # Examples
//!
//! ```no_run
//! use aam::core::deps::DependencyPolicy;
//! use aam::core::packager::Packager;
//! use std::path::Path;
//!
//! # async fn run() -> aam::Result<()> {
//! let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
//! let packager = Packager::new("/games/app/assets", "/games/app", DependencyPolicy::default());
//! packager.run(Path::new("/tmp/app.apk"), tx).await?;
//! while let Some(event) = rx.recv().await {
//!     println!("{:?}", event);
//! }
//! # Ok(())
//! # }
//! ```

use std::fs::{self, File};
use std::io::{self, BufWriter, Read, Seek, Write};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use futures_util::future::join_all;
use tokio::sync::mpsc::UnboundedSender;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::core::deps::DependencyPolicy;
use crate::core::importer::import_song;
use crate::core::manifest::ManifestStore;
use crate::core::song::Song;
use crate::error::{AamError, Result};
use crate::ui::formatters::format_size;

const TEMP_PREFIX: &str = "aam-assets-";
const PROGRESS_INTERVAL: Duration = Duration::from_secs(1);
const COPY_BUFFER: usize = 64 * 1024;

/// Notifications emitted while packaging
#[derive(Debug, Clone, PartialEq)]
pub enum PackageEvent {
    Started { source_root: PathBuf, dest: PathBuf },
    Progress { bytes: u64, human: String },
    Finished { dest: PathBuf, bytes: u64 },
    Failed { message: String },
}

/// Root folder that goes into the package for a given destination
///
/// `.ipa` bundles keep assets two levels deep (`Payload/App.app/assets`);
/// every other format keeps them one level deep.
pub fn package_root_for(library: &Path, dest: &Path) -> Result<PathBuf> {
    let levels = match dest.extension().and_then(|ext| ext.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("ipa") => 2,
        _ => 1,
    };
    let library = library
        .canonicalize()
        .unwrap_or_else(|_| library.to_path_buf());
    library
        .ancestors()
        .nth(levels)
        .filter(|root| !root.as_os_str().is_empty())
        .map(Path::to_path_buf)
        .ok_or_else(|| {
            AamError::invalid_path(format!(
                "{:?} has no ancestor {} level(s) up",
                library, levels
            ))
        })
}

/// Re-import every linked song so its files are present in the library
///
/// All imports are started; the result is an error if any of them failed.
pub async fn reimport_external(
    library: &Path,
    songs: &[Song],
    policy: &DependencyPolicy,
) -> Result<usize> {
    let tasks = songs
        .iter()
        .filter_map(|song| {
            song.external
                .as_ref()
                .map(|ext| (song.id.clone(), PathBuf::from(ext)))
        })
        .map(|(id, external)| {
            let library = library.to_path_buf();
            let policy = policy.clone();
            async move {
                log::info!("Re-importing external song {} from {:?}", id, external);
                let joined = tokio::task::spawn_blocking(move || {
                    import_song(&external, &library, &policy)
                })
                .await;
                (id, joined)
            }
        });

    let results = join_all(tasks).await;
    let total = results.len();
    let mut failed = Vec::new();

    for (id, joined) in results {
        match joined {
            Ok(Ok(_)) => {}
            Ok(Err(e)) => {
                log::error!("External song {} failed to re-import: {}", id, e);
                failed.push(format!("{}: {}", id, e));
            }
            Err(e) => {
                log::error!("External song {} import task aborted: {}", id, e);
                failed.push(format!("{}: {}", id, e));
            }
        }
    }

    if failed.is_empty() {
        Ok(total)
    } else {
        Err(AamError::ExternalReimport(failed))
    }
}

/// Packages one library into one archive
#[derive(Debug, Clone)]
pub struct Packager {
    library: PathBuf,
    source_root: PathBuf,
    policy: DependencyPolicy,
    temp_root: Option<PathBuf>,
}

impl Packager {
    pub fn new<L: Into<PathBuf>, S: Into<PathBuf>>(
        library: L,
        source_root: S,
        policy: DependencyPolicy,
    ) -> Self {
        Self {
            library: library.into(),
            source_root: source_root.into(),
            policy,
            temp_root: None,
        }
    }

    /// Create the private temp dir under `root` instead of the system temp dir
    pub fn with_temp_root<P: Into<PathBuf>>(mut self, root: P) -> Self {
        self.temp_root = Some(root.into());
        self
    }

    pub fn source_root(&self) -> &Path {
        &self.source_root
    }

    /// Build the archive at `dest`; the last event sent is `Finished` or `Failed`
    pub async fn run(&self, dest: &Path, events: UnboundedSender<PackageEvent>) -> Result<PathBuf> {
        log::info!("Packaging {:?} -> {:?}", self.source_root, dest);
        let result = self.run_inner(dest, &events).await;

        let _ = match &result {
            Ok(bytes) => {
                log::info!("Package written to {:?} ({})", dest, format_size(*bytes));
                events.send(PackageEvent::Finished {
                    dest: dest.to_path_buf(),
                    bytes: *bytes,
                })
            }
            Err(e) => {
                log::error!("Packaging failed: {}", e);
                events.send(PackageEvent::Failed {
                    message: e.to_string(),
                })
            }
        };

        result.map(|_| dest.to_path_buf())
    }

    async fn run_inner(&self, dest: &Path, events: &UnboundedSender<PackageEvent>) -> Result<u64> {
        let store = ManifestStore::open(&self.library)?;
        reimport_external(&self.library, store.songs(), &self.policy).await?;

        let _ = events.send(PackageEvent::Started {
            source_root: self.source_root.clone(),
            dest: dest.to_path_buf(),
        });

        let source_root = self.source_root.clone();
        let dest = dest.to_path_buf();
        let temp_root = self.temp_root.clone();
        let events = events.clone();

        tokio::task::spawn_blocking(move || {
            build_package(&source_root, &dest, temp_root.as_deref(), |bytes| {
                let _ = events.send(PackageEvent::Progress {
                    bytes,
                    human: format_size(bytes),
                });
            })
        })
        .await
        .map_err(|e| AamError::package(format!("archive task aborted: {}", e)))?
    }
}

/// Zip `source_root` into a temp file, then install it at `dest`
///
/// Returns the number of source bytes archived.
pub fn build_package<F>(
    source_root: &Path,
    dest: &Path,
    temp_root: Option<&Path>,
    on_progress: F,
) -> Result<u64>
where
    F: FnMut(u64),
{
    let file_name = dest
        .file_name()
        .ok_or_else(|| AamError::invalid_path(format!("{:?} has no file name", dest)))?;

    let mut builder = tempfile::Builder::new();
    builder.prefix(TEMP_PREFIX);
    let temp_dir = match temp_root {
        Some(root) => builder.tempdir_in(root)?,
        None => builder.tempdir()?,
    };
    log::debug!("Using temp dir {:?}", temp_dir.path());

    let temp_archive = temp_dir.path().join(file_name);
    let mut progress = ProgressTracker::new(PROGRESS_INTERVAL, on_progress);
    write_archive(source_root, &temp_archive, &mut progress)?;
    install_archive(&temp_archive, dest)?;

    if let Err(e) = temp_dir.close() {
        log::warn!("Failed to remove temp dir: {}", e);
    }
    Ok(progress.processed)
}

/// Throttles size notifications to one per interval
struct ProgressTracker<F: FnMut(u64)> {
    processed: u64,
    interval: Duration,
    last_emit: Option<Instant>,
    on_progress: F,
}

impl<F: FnMut(u64)> ProgressTracker<F> {
    fn new(interval: Duration, on_progress: F) -> Self {
        Self {
            processed: 0,
            interval,
            last_emit: None,
            on_progress,
        }
    }

    fn advance(&mut self, bytes: u64) {
        self.processed += bytes;
        let due = self
            .last_emit
            .map_or(true, |last| last.elapsed() >= self.interval);
        if due {
            self.last_emit = Some(Instant::now());
            (self.on_progress)(self.processed);
        }
    }
}

fn write_archive<F: FnMut(u64)>(
    source_root: &Path,
    archive_path: &Path,
    progress: &mut ProgressTracker<F>,
) -> Result<()> {
    let file = File::create(archive_path)?;
    let mut zip = ZipWriter::new(BufWriter::new(file));
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    for entry in sorted_entries(source_root)? {
        let name = entry.file_name().to_string_lossy().to_string();
        let path = entry.path();
        if fs::metadata(&path)?.is_dir() {
            add_directory(&mut zip, &path, &name, &options, progress)?;
        } else {
            add_file(&mut zip, &path, &name, &options, progress)?;
        }
    }

    let writer = zip.finish()?;
    let file = writer.into_inner().map_err(|e| e.into_error())?;
    file.sync_all()?;
    Ok(())
}

fn sorted_entries(dir: &Path) -> Result<Vec<fs::DirEntry>> {
    let mut entries = fs::read_dir(dir)?.collect::<io::Result<Vec<_>>>()?;
    entries.sort_by_key(|entry| entry.file_name());
    Ok(entries)
}

fn add_directory<W: Write + Seek, F: FnMut(u64)>(
    zip: &mut ZipWriter<W>,
    dir: &Path,
    name: &str,
    options: &SimpleFileOptions,
    progress: &mut ProgressTracker<F>,
) -> Result<()> {
    zip.add_directory(format!("{}/", name), options.clone())?;

    for entry in sorted_entries(dir)? {
        let child = format!("{}/{}", name, entry.file_name().to_string_lossy());
        let path = entry.path();
        if fs::metadata(&path)?.is_dir() {
            add_directory(zip, &path, &child, options, progress)?;
        } else {
            add_file(zip, &path, &child, options, progress)?;
        }
    }
    Ok(())
}

fn add_file<W: Write + Seek, F: FnMut(u64)>(
    zip: &mut ZipWriter<W>,
    path: &Path,
    name: &str,
    options: &SimpleFileOptions,
    progress: &mut ProgressTracker<F>,
) -> Result<()> {
    zip.start_file(name, options.clone())?;
    let mut file = File::open(path)?;
    let mut buffer = vec![0u8; COPY_BUFFER];

    loop {
        let read = file.read(&mut buffer)?;
        if read == 0 {
            break;
        }
        zip.write_all(&buffer[..read])?;
        progress.advance(read as u64);
    }
    Ok(())
}

/// Copy next to `dest` under a hidden name, then rename over `dest`
fn install_archive(archive: &Path, dest: &Path) -> Result<()> {
    let dir = dest
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let file_name = dest
        .file_name()
        .ok_or_else(|| AamError::invalid_path(format!("{:?} has no file name", dest)))?;
    let staging = dir.join(format!(".{}.partial", file_name.to_string_lossy()));

    let installed = fs::copy(archive, &staging).and_then(|_| fs::rename(&staging, dest));
    if let Err(e) = installed {
        let _ = fs::remove_file(&staging);
        return Err(AamError::package(format!(
            "failed to copy package to {:?}: {}",
            dest, e
        )));
    }
    Ok(())
}
