// AAM Library - Public API

// Re-export error types
pub mod error;
pub use error::{AamError, Result};

// Module declarations
pub mod commands;
pub mod core;
pub mod ui;

// Re-export commonly used types
pub use core::config::Config;

/// Map a stored `settings.logLevel` name to a filter
pub fn parse_log_level(level: &str) -> log::LevelFilter {
    match level.trim().to_ascii_lowercase().as_str() {
        "off" => log::LevelFilter::Off,
        "error" => log::LevelFilter::Error,
        "warn" | "warning" => log::LevelFilter::Warn,
        "info" => log::LevelFilter::Info,
        "verbose" => log::LevelFilter::Debug,
        "debug" | "silly" | "trace" => log::LevelFilter::Trace,
        _ => log::LevelFilter::Info,
    }
}

// Initialize logging; RUST_LOG wins over the stored level
pub fn init_logging(level: &str) {
    env_logger::Builder::new()
        .filter_level(parse_log_level(level))
        .parse_default_env()
        .init();
}
