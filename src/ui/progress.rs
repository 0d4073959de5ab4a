// Progress line for long-running operations

use colored::Colorize;
use std::io::{self, Write};

/// Redraw a single status line with the archived size so far
pub fn show_size_progress(prefix: &str, human_size: &str) {
    print!("\r{} {} ", prefix.white(), human_size.green().bold());
    io::stdout().flush().ok();
}

/// Clear the current line (useful for progress lines)
pub fn clear_line() {
    print!("\r{}\r", " ".repeat(80));
    io::stdout().flush().ok();
}
