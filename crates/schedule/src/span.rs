//! Span parsing.
//!
//! A span is written as five comma-separated non-negative integers:
//! `weeks,days,hours,minutes,seconds`. Example: `0,0,0,1,30` is 90 seconds.

use crate::ScheduleError;

const SECONDS_PER_WEEK: u64 = 7 * 24 * 3600;
const SECONDS_PER_DAY: u64 = 24 * 3600;

/// Parse a span string into a duration in seconds.
pub fn parse_span(raw: &str) -> Result<f64, ScheduleError> {
    let fields: Vec<&str> = raw.split(',').collect();
    if fields.len() != 5 {
        return Err(ScheduleError::Span {
            raw: raw.to_string(),
            reason: format!("expected 5 comma-separated integers, got {}", fields.len()),
        });
    }

    let mut parts = [0u64; 5];
    for (slot, field) in parts.iter_mut().zip(&fields) {
        *slot = field
            .trim()
            .parse::<u64>()
            .map_err(|_| ScheduleError::Span {
                raw: raw.to_string(),
                reason: format!("{:?} is not a non-negative integer", field),
            })?;
    }

    let [weeks, days, hours, minutes, seconds] = parts;
    let total =
        weeks * SECONDS_PER_WEEK + days * SECONDS_PER_DAY + hours * 3600 + minutes * 60 + seconds;
    Ok(total as f64)
}
