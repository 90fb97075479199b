//! Shared helpers for table cells and log snippets.

mod format;
mod string;

pub use format::{format_balance, format_clock, format_since};
pub use string::{truncate_chars, truncate_str};
