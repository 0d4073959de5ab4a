use anyhow::{anyhow, Context, Result};
use colored::Colorize;
use std::path::{Path, PathBuf};

use crate::core::config::{Namespace, Store};
use crate::core::{Config, DependencyPolicy, ManifestStore, RatingClass, Song};
use crate::ui::{dimmed, fit_width, format_date, success, warn};

/// Path of the open library, or a hint on how to open one
pub fn require_library(config: &Config) -> Result<PathBuf> {
    config
        .library_path()
        .ok_or_else(|| anyhow!("No assets folder is open. Run 'aam open <path>' first."))
}

pub fn policy(config: &Config) -> DependencyPolicy {
    DependencyPolicy::from_settings(&config.settings)
}

/// Open the library manifest, surfacing its error code
pub fn open_store(library: &Path) -> Result<ManifestStore> {
    ManifestStore::open(library)
        .map_err(|e| anyhow!("[{}] {}", e.code(), e))
        .with_context(|| format!("Failed to load songlist of {:?}", library))
}

/// Mirror the manifest into `assets.songs` and persist the config
pub fn sync_cache(config: &mut Config, store: &ManifestStore) -> Result<()> {
    config.assets.songs = store.songs().to_vec();
    config.save()
}

pub fn open(config: &mut Config, matches: &clap::ArgMatches) -> Result<()> {
    let path = matches
        .get_one::<String>("path")
        .context("Path argument is required")?;
    let create = matches.get_flag("create");

    let path_buf = Path::new(path);
    if !path_buf.is_dir() {
        println!("{}", format!("'{}' is not a directory", path).red());
        return Ok(());
    }
    let library = path_buf
        .canonicalize()
        .map_err(|e| anyhow!("Failed to resolve path: {}", e))?;

    let store = if create {
        ManifestStore::create(&library).map_err(|e| anyhow!("[{}] {}", e.code(), e))?
    } else {
        open_store(&library)?
    };

    config.assets.path = library.to_string_lossy().to_string();
    sync_cache(config, &store)?;

    println!(
        "{} {}",
        "✓ Opened assets folder:".green(),
        library.display()
    );
    println!(
        "{} {}",
        "Songs:".white().bold(),
        store.songs().len().to_string().yellow().bold()
    );
    Ok(())
}

pub fn close(config: &mut Config) -> Result<()> {
    if config.library_path().is_none() {
        warn("No assets folder is open.");
        return Ok(());
    }
    config.reset(Namespace::Assets);
    config.save()?;
    success("✓ Assets folder closed");
    Ok(())
}

pub fn list(config: &Config) -> Result<()> {
    let library = require_library(config)?;
    let store = open_store(&library)?;
    let songs = store.songs();

    if songs.is_empty() {
        println!("{}", "The songlist is empty. Use 'aam import <folder>' to add songs.".yellow());
        return Ok(());
    }

    println!(
        "{} {}",
        "Songs:".white().bold(),
        format!("({} total)", songs.len()).dimmed()
    );
    println!();
    println!(
        "{} {} {} {} {}",
        fit_width("id", 24).dimmed(),
        fit_width("title", 32).dimmed(),
        fit_width("artist", 20).dimmed(),
        fit_width("date", 10).dimmed(),
        "ratings".dimmed()
    );

    for song in songs {
        let mut id = fit_width(&song.id, 24).cyan().bold();
        if song.external.is_some() {
            id = fit_width(&format!("{}*", song.id), 24).magenta().bold();
        }
        println!(
            "{} {} {} {} {}",
            id,
            fit_width(song.display_title(), 32),
            fit_width(&song.artist, 20),
            fit_width(&format_date(song.date), 10).dimmed(),
            ratings(song)
        );
    }

    if songs.iter().any(|s| s.external.is_some()) {
        println!();
        dimmed("* linked to an external folder");
    }
    Ok(())
}

fn ratings(song: &Song) -> String {
    song.difficulties
        .iter()
        .map(|d| {
            let tier = match d.rating_class {
                RatingClass::Past => "PST",
                RatingClass::Present => "PRS",
                RatingClass::Future => "FTR",
                RatingClass::Beyond => "BYD",
            };
            let plus = if d.rating_plus { "+" } else { "" };
            if d.rating < 0 {
                format!("{}:-", tier)
            } else {
                format!("{}:{}{}", tier, d.rating, plus)
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
