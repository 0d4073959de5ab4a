use anyhow::{anyhow, Context, Result};
use colored::Colorize;
use std::path::PathBuf;
use tokio::sync::mpsc;

use super::library::{policy, require_library};
use crate::core::packager::{package_root_for, PackageEvent, Packager};
use crate::core::Config;
use crate::ui::{clear_line, confirm, dimmed, error, format_size, info, show_size_progress};

pub fn execute(config: &Config, matches: &clap::ArgMatches) -> Result<()> {
    let library = require_library(config)?;
    let dest = matches
        .get_one::<String>("dest")
        .map(PathBuf::from)
        .context("Destination path is required")?;
    let assume_yes = matches.get_flag("yes");

    let source_root = package_root_for(&library, &dest)?;

    if !assume_yes {
        println!(
            "{} {}",
            "Package root:".white().bold(),
            source_root.display().to_string().cyan()
        );
        dimmed("This folder should contain every file that goes into the package.");
        dimmed("Running 'aam verify' before packaging is strongly recommended.");
        println!();
        if !confirm("Use this package root? (y/n):")? {
            println!();
            info("Operation cancelled by user.");
            return Ok(());
        }
        println!();
    }

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    let packager = Packager::new(library, source_root, policy(config));

    let result = runtime.block_on(async {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let printer = tokio::spawn(async move {
            while let Some(event) = rx.recv().await {
                render(event);
            }
        });
        let result = packager.run(&dest, tx).await;
        let _ = printer.await;
        result
    });

    result
        .map(|_| ())
        .map_err(|e| anyhow!("Packaging did not complete: {}", e))
}

fn render(event: PackageEvent) {
    match event {
        PackageEvent::Started { source_root, dest } => {
            println!(
                "{} {} {} {}",
                "Packaging".cyan().bold(),
                source_root.display(),
                "->".dimmed(),
                dest.display()
            );
        }
        PackageEvent::Progress { human, .. } => show_size_progress("Archived:", &human),
        PackageEvent::Finished { dest, bytes } => {
            clear_line();
            println!(
                "{} {} {}",
                "✓ Exported:".green().bold(),
                dest.display(),
                format!("({})", format_size(bytes)).dimmed()
            );
        }
        PackageEvent::Failed { message } => {
            clear_line();
            error(&format!("Packaging error: {}", message));
        }
    }
}
