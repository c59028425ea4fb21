// libs/scheduling-cell/src/interval.rs
use chrono::{NaiveTime, Timelike};

/// Half-open occupied minute range `[start, end)` within one clinic day.
///
/// Every occupancy decision in this cell (availability, conflicts, calendar
/// layout) goes through this one type so that multi-slot appointments block
/// every grid slot they cover, never just the one they start on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MinuteInterval {
    pub start: i64,
    pub end: i64,
}

impl MinuteInterval {
    pub fn new(start: i64, end: i64) -> Self {
        Self { start, end }
    }

    pub fn starting_at(time: NaiveTime, duration_minutes: i64) -> Self {
        let start = minutes_since_midnight(time);
        Self {
            start,
            end: start + duration_minutes.max(0),
        }
    }

    /// Strict half-open overlap: back-to-back intervals (one ending exactly
    /// when the other begins) do not overlap.
    pub fn overlaps(&self, other: &MinuteInterval) -> bool {
        self.start < other.end && other.start < self.end
    }

    pub fn contains_minute(&self, minute: i64) -> bool {
        minute >= self.start && minute < self.end
    }
}

pub fn minutes_since_midnight(time: NaiveTime) -> i64 {
    i64::from(time.hour()) * 60 + i64::from(time.minute())
}
