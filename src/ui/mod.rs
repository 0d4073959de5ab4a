// UI and formatting module

pub mod formatters;
pub mod progress;
pub mod prompts;

// Re-export commonly used items for cleaner imports
pub use formatters::{fit_width, format_date, format_size};
pub use progress::{clear_line, show_size_progress};
pub use prompts::{confirm, dimmed, error, info, success, warn};
