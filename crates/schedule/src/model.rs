//! The schedule model: segments, breakpoints, and time lookup.

use crate::{parse_span, ScheduleError};
use serde::Deserialize;
use std::path::Path;

/// One record of the schedule source, before span parsing.
#[derive(Debug, Clone, Deserialize)]
pub struct ScheduleEntry {
    /// Operational state name, e.g. `RUN`.
    pub state: String,
    /// Substate name, e.g. `PHYSICS`.
    pub substate: String,
    /// Interval length as `weeks,days,hours,minutes,seconds`.
    pub span: String,
}

/// One parsed segment of the schedule.
#[derive(Debug, Clone, PartialEq)]
pub struct ScheduleSegment {
    /// Operational state name.
    pub state: String,
    /// Substate name.
    pub substate: String,
    /// Segment length in seconds.
    pub duration_secs: f64,
}

/// An immutable schedule: parsed segments plus cumulative breakpoints.
///
/// For N segments there are N+1 breakpoints; `points[0]` is 0 and
/// `points[i]` is the cumulative duration of segments `[0..i)`. The last
/// breakpoint is the natural simulation horizon.
#[derive(Debug, Clone)]
pub struct Schedule {
    segments: Vec<ScheduleSegment>,
    points: Vec<f64>,
}

impl Schedule {
    /// Build a schedule from ordered entries, parsing each span.
    ///
    /// Fails on an empty list or on any malformed span.
    pub fn from_entries(entries: Vec<ScheduleEntry>) -> Result<Self, ScheduleError> {
        if entries.is_empty() {
            return Err(ScheduleError::Empty);
        }

        let mut segments = Vec::with_capacity(entries.len());
        let mut points = Vec::with_capacity(entries.len() + 1);
        let mut current = 0.0;
        points.push(current);

        for entry in entries {
            let duration_secs = parse_span(&entry.span)?;
            current += duration_secs;
            points.push(current);
            segments.push(ScheduleSegment {
                state: entry.state,
                substate: entry.substate,
                duration_secs,
            });
        }

        Ok(Self { segments, points })
    }

    /// Load a schedule from a YAML file: a list of `{state, substate, span}`.
    pub fn from_yaml_file(path: &Path) -> Result<Self, ScheduleError> {
        let text = std::fs::read_to_string(path).map_err(|source| ScheduleError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_yaml_str(&text)
    }

    /// Parse a schedule from YAML text.
    pub fn from_yaml_str(text: &str) -> Result<Self, ScheduleError> {
        let entries: Vec<ScheduleEntry> = serde_yaml::from_str(text)?;
        Self::from_entries(entries)
    }

    /// Cumulative breakpoints, length `len() + 1`.
    pub fn points(&self) -> &[f64] {
        &self.points
    }

    /// Number of segments.
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    /// Whether the schedule has no segments (never true after load).
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// The segment at the given index.
    pub fn segment(&self, index: usize) -> &ScheduleSegment {
        &self.segments[index]
    }

    /// End of the schedule: the last breakpoint.
    pub fn horizon(&self) -> f64 {
        *self.points.last().unwrap_or(&0.0)
    }

    /// Index of the segment active at logical time `t`.
    ///
    /// Returns the greatest `i` with `points[i] <= t` (rightmost insertion
    /// point minus one), so a time exactly on a breakpoint belongs to the
    /// segment starting there. A result of `len()` or more means `t` is at
    /// or past the horizon; callers keep the last segment active in that
    /// case.
    pub fn segment_index_at(&self, t: f64) -> usize {
        self.points.partition_point(|p| *p <= t).saturating_sub(1)
    }
}
