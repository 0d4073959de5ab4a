use anyhow::{Context, Result};
use colored::Colorize;

use super::library::{open_store, require_library, sync_cache};
use crate::core::Config;
use crate::ui::error;

pub fn execute(config: &mut Config, matches: &clap::ArgMatches) -> Result<()> {
    let library = require_library(config)?;
    let purge = matches.get_flag("purge");
    let ids: Vec<String> = matches
        .get_many::<String>("ids")
        .context("At least one song id is required")?
        .cloned()
        .collect();

    let mut store = open_store(&library)?;
    let outcome = store
        .remove(&ids, purge)
        .map_err(|e| anyhow::anyhow!("[{}] {}", e.code(), e))?;
    sync_cache(config, &store)?;

    println!(
        "{} {}",
        "Deleted".green().bold(),
        format!("{} song(s)", outcome.removed.len()).yellow().bold()
    );
    if !outcome.failed.is_empty() {
        println!();
        error("The following songs could not be deleted:");
        for (id, reason) in &outcome.failed {
            println!("  {} {}", id.red(), reason.dimmed());
        }
    }
    Ok(())
}
