//! Wall-clock timestamp rendering.
//!
//! Downstream consumers parse timestamps in a fixed numeric form:
//! fourteen digits (`YYYYMMDDHHMMSS`) for run-level events, twenty digits
//! (`YYYYMMDDHHMMSSffffff`) for STF build times.

use chrono::{DateTime, Local};

const COMPACT: &str = "%Y%m%d%H%M%S";
const COMPACT_MICROS: &str = "%Y%m%d%H%M%S%6f";

/// Render a timestamp as fourteen digits, second precision.
pub fn format_compact(t: DateTime<Local>) -> String {
    t.format(COMPACT).to_string()
}

/// Render a timestamp as twenty digits, microsecond precision.
pub fn format_compact_micros(t: DateTime<Local>) -> String {
    t.format(COMPACT_MICROS).to_string()
}

/// Current wall-clock time, second precision.
pub fn now_compact() -> String {
    format_compact(Local::now())
}

/// Current wall-clock time, microsecond precision.
pub fn now_compact_micros() -> String {
    format_compact_micros(Local::now())
}
