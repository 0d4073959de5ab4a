use anyhow::Result;
use colored::Colorize;

use super::library::{open_store, policy, require_library};
use crate::core::verifier::{verify_songs, Severity};
use crate::core::Config;

pub fn execute(config: &Config) -> Result<()> {
    let library = require_library(config)?;
    let store = open_store(&library)?;

    println!("{}", "Verifying dependencies...".dimmed());
    let report = verify_songs(&store, &policy(config));

    let summary = report.summary();
    match report.severity() {
        Severity::Ok => println!("{}", summary.green().bold()),
        Severity::Warning => println!("{}", summary.yellow().bold()),
        Severity::Error => println!("{}", summary.red().bold()),
    }

    for line in report.lines() {
        if line.starts_with("[E]") {
            println!("  {}", line.red());
        } else {
            println!("  {}", line.yellow());
        }
    }
    Ok(())
}
