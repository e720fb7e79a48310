//! Human-readable time and duration labels for dividers and replay frames.

use std::fmt::Write;

use chrono::format::{Item, StrftimeItems};
use chrono::{DateTime, Duration, FixedOffset};
use tracing::warn;

/// Shown in place of a time that couldn't be parsed.
pub const PLACEHOLDER_TIME: &str = "--:--";

/// Compact session length: `<1m`, `5m`, `2h`, `1h 30m`.
pub fn duration_label(duration: Duration) -> String {
    let secs = duration.num_seconds().max(0);
    if secs < 60 {
        return "<1m".to_string();
    }
    let minutes = secs / 60;
    if minutes < 60 {
        return format!("{minutes}m");
    }
    let (hours, minutes) = (minutes / 60, minutes % 60);
    if minutes == 0 {
        format!("{hours}h")
    } else {
        format!("{hours}h {minutes}m")
    }
}

/// Format a session timestamp, or [`PLACEHOLDER_TIME`] when it is missing.
///
/// The time is rendered in the offset it was recorded with.
pub fn time_label(ts: Option<DateTime<FixedOffset>>, format: &str) -> String {
    let Some(ts) = ts else {
        return PLACEHOLDER_TIME.to_string();
    };
    let mut out = String::new();
    if write!(out, "{}", ts.format(format)).is_err() {
        warn!(format, "unusable time format, using placeholder");
        return PLACEHOLDER_TIME.to_string();
    }
    out
}

/// Whether `format` is a strftime pattern chrono can render.
pub fn is_valid_time_format(format: &str) -> bool {
    StrftimeItems::new(format).all(|item| !matches!(item, Item::Error))
}

// ============================================================================
// Tests
// ============================================================================
