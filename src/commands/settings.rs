use anyhow::{Context, Result};
use colored::Colorize;
use serde_json::Value;

use crate::core::config::{Namespace, Store, StoreKey};
use crate::core::Config;

pub fn execute(config: &mut Config, matches: &clap::ArgMatches) -> Result<()> {
    match matches.subcommand() {
        Some(("get", sub_matches)) => get(config, sub_matches),
        Some(("set", sub_matches)) => set(config, sub_matches),
        Some(("reset", sub_matches)) => reset(config, sub_matches),
        _ => list(config),
    }
}

fn key_arg(matches: &clap::ArgMatches) -> Result<StoreKey> {
    matches
        .get_one::<String>("key")
        .context("Key argument is required")?
        .parse()
}

/// Values are read as JSON when possible and as plain strings otherwise
fn parse_value(raw: &str) -> Value {
    serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()))
}

fn render(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => serde_json::to_string_pretty(other).unwrap_or_default(),
    }
}

fn get(config: &Config, matches: &clap::ArgMatches) -> Result<()> {
    let key = key_arg(matches)?;
    println!("{}", format!("{}:", key).white());
    println!("{}", render(&config.get(key)).cyan().bold());
    Ok(())
}

fn set(config: &mut Config, matches: &clap::ArgMatches) -> Result<()> {
    let key = key_arg(matches)?;
    let raw = matches
        .get_one::<String>("value")
        .context("Value argument is required")?;

    config.set(key, parse_value(raw))?;
    config.save()?;

    println!("{} {}", format!("✓ {} set to:", key).green(), render(&config.get(key)));
    Ok(())
}

fn reset(config: &mut Config, matches: &clap::ArgMatches) -> Result<()> {
    let namespace: Namespace = matches
        .get_one::<String>("namespace")
        .context("Namespace argument is required")?
        .parse()?;

    config.reset(namespace);
    config.save()?;

    println!("{}", "✓ Restored defaults".green());
    Ok(())
}

fn list(config: &Config) -> Result<()> {
    for key in StoreKey::ALL {
        if key == StoreKey::AssetsSongs {
            println!(
                "{} {}",
                format!("{}:", key).white(),
                format!("{} song(s)", config.assets.songs.len()).dimmed()
            );
            continue;
        }
        println!("{} {}", format!("{}:", key).white(), render(&config.get(key)).cyan());
    }
    Ok(())
}
