use anyhow::{Context, Result};
use colored::Colorize;
use std::path::PathBuf;

use super::library::{open_store, policy, require_library, sync_cache};
use crate::core::importer::{import_backgrounds, import_batch};
use crate::core::Config;
use crate::ui::error;

pub fn execute(config: &mut Config, matches: &clap::ArgMatches) -> Result<()> {
    let library = require_library(config)?;
    let link = matches.get_flag("link");
    let paths: Vec<PathBuf> = matches
        .get_many::<String>("paths")
        .context("At least one song folder is required")?
        .map(PathBuf::from)
        .collect();

    println!("{}", "Importing songs...".cyan());
    let outcome = import_batch(&paths, &library, &policy(config), link);

    let mut store = open_store(&library)?;
    let imported = outcome.imported.len();
    store
        .upsert(outcome.imported)
        .map_err(|e| anyhow::anyhow!("[{}] {}", e.code(), e))?;
    sync_cache(config, &store)?;

    println!();
    println!(
        "{} {}",
        "Imported".green().bold(),
        format!("{} song(s)", imported).yellow().bold()
    );
    report_failures("The following songs failed to import:", &outcome.failed);
    Ok(())
}

pub fn execute_backgrounds(config: &Config, matches: &clap::ArgMatches) -> Result<()> {
    let library = require_library(config)?;
    let files: Vec<PathBuf> = matches
        .get_many::<String>("files")
        .context("At least one image is required")?
        .map(PathBuf::from)
        .collect();

    let outcome = import_backgrounds(&files, &library);

    println!(
        "{} {}",
        "Imported".green().bold(),
        format!("{} background(s)", outcome.imported.len()).yellow().bold()
    );
    report_failures("The following backgrounds failed to import:", &outcome.failed);
    Ok(())
}

fn report_failures(title: &str, failed: &[(PathBuf, String)]) {
    if failed.is_empty() {
        return;
    }
    println!();
    error(title);
    for (path, reason) in failed {
        println!("  {} {}", path.display().to_string().red(), reason.dimmed());
    }
}
