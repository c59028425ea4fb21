// libs/scheduling-cell/src/grid.rs
use chrono::NaiveTime;
use serde::{Deserialize, Serialize};

/// Fixed universe of bookable slot start times: 08:00 through 18:00 in
/// 30-minute steps. Immutable configuration, not a runtime entity.
pub struct TimeGrid;

const OPENING_MINUTE: i64 = 8 * 60;
const CLOSING_MINUTE: i64 = 18 * 60;
const STEP_MINUTES: i64 = 30;

/// Slots strictly before this hour are in-chair sessions; the rest are
/// offered as remote consultations.
const REMOTE_CUTOFF_MINUTE: i64 = 13 * 60;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum SessionKind {
    FaceToFace,
    Remote,
}

/// Length of one grid slot in minutes.
pub fn slot_length_minutes() -> i64 {
    STEP_MINUTES
}

impl TimeGrid {
    /// Ordered slot starts, restartable, fixed cardinality.
    pub fn all_slots() -> impl Iterator<Item = NaiveTime> {
        (OPENING_MINUTE..=CLOSING_MINUTE)
            .step_by(STEP_MINUTES as usize)
            .filter_map(|m| NaiveTime::from_hms_opt((m / 60) as u32, (m % 60) as u32, 0))
    }

    pub fn slot_count() -> usize {
        ((CLOSING_MINUTE - OPENING_MINUTE) / STEP_MINUTES) as usize + 1
    }

    pub fn contains(time: NaiveTime) -> bool {
        Self::all_slots().any(|slot| slot == time)
    }

    /// 12-hour display form of an `HH:MM` slot string. Malformed or empty
    /// input yields an empty string rather than an error.
    pub fn display(slot: &str) -> String {
        match NaiveTime::parse_from_str(slot, "%H:%M") {
            Ok(time) => time.format("%-I:%M %p").to_string(),
            Err(_) => String::new(),
        }
    }

    pub fn session_kind(slot: NaiveTime) -> SessionKind {
        if crate::interval::minutes_since_midnight(slot) < REMOTE_CUTOFF_MINUTE {
            SessionKind::FaceToFace
        } else {
            SessionKind::Remote
        }
    }
}
