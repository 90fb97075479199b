//! Formatting for status table cells.

use chrono::{DateTime, Local, Utc};

pub fn format_balance(balance: f64) -> String {
    format!("{:.2}", balance)
}

/// Local wall-clock time, or "never".
pub fn format_clock(at: Option<DateTime<Utc>>) -> String {
    match at {
        Some(at) => at.with_timezone(&Local).format("%H:%M:%S").to_string(),
        None => "never".to_string(),
    }
}

/// Coarse age of `at` relative to `now`: "12s", "4m", "3h".
pub fn format_since(at: Option<DateTime<Utc>>, now: DateTime<Utc>) -> String {
    let Some(at) = at else {
        return "-".to_string();
    };
    let secs = (now - at).num_seconds().max(0);
    match secs {
        0..=59 => format!("{}s", secs),
        60..=3599 => format!("{}m", secs / 60),
        _ => format!("{}h", secs / 3600),
    }
}
