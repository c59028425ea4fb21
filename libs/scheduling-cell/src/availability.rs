// libs/scheduling-cell/src/availability.rs
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::Serialize;
use tracing::debug;

use crate::grid::TimeGrid;
use crate::interval::MinuteInterval;
use crate::models::Appointment;

/// Which definition of "occupied" a caller wants.
///
/// A doctor's private calendar must show every live booking, including unpaid
/// pending requests assigned to them. The public booking surface must not let
/// an abandoned unpaid request block the slot for other patients.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OccupancyView {
    DoctorCalendar,
    PublicBooking,
}

impl OccupancyView {
    fn occupies(&self, appointment: &Appointment) -> bool {
        if appointment.is_cancelled() {
            return false;
        }
        match self {
            OccupancyView::DoctorCalendar => true,
            OccupancyView::PublicBooking => !appointment.is_unpaid_placeholder(),
        }
    }
}

/// Classification of one grid slot for one doctor on one date.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct SlotAvailability {
    #[serde(with = "crate::models::time_hm")]
    pub slot: NaiveTime,
    pub is_past: bool,
    pub is_booked: bool,
}

impl SlotAvailability {
    pub fn is_available(&self) -> bool {
        !self.is_past && !self.is_booked
    }
}

/// One grid slot in the "any doctor" public view, with the doctors who still
/// have it open.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct OpenSlot {
    #[serde(with = "crate::models::time_hm")]
    pub slot: NaiveTime,
    pub is_past: bool,
    pub open_doctors: Vec<String>,
}

impl OpenSlot {
    pub fn is_available(&self) -> bool {
        !self.is_past && !self.open_doctors.is_empty()
    }
}

/// Classify every grid slot for `doctor` on `date`. Returns exactly one entry
/// per grid slot, in grid order. Pure: identical inputs give identical output.
///
/// An unknown doctor name simply matches no appointments, so every non-past
/// slot comes back open; callers validate the doctor exists before trusting
/// that.
pub fn day_schedule(
    date: NaiveDate,
    doctor: &str,
    appointments: &[Appointment],
    now: NaiveDateTime,
    view: OccupancyView,
) -> Vec<SlotAvailability> {
    let occupied: Vec<MinuteInterval> = appointments
        .iter()
        .filter(|a| a.date == date && a.doctor == doctor && view.occupies(a))
        .map(|a| a.interval())
        .collect();

    debug!(
        "Classifying {} grid slots for {} on {} ({} occupied intervals)",
        TimeGrid::slot_count(),
        doctor,
        date,
        occupied.len()
    );

    TimeGrid::all_slots()
        .map(|slot| SlotAvailability {
            slot,
            is_past: slot_is_past(date, slot, now),
            is_booked: slot_is_booked(slot, &occupied),
        })
        .collect()
}

/// Public "any doctor" availability: a slot is open when at least one doctor
/// on the roster has it free under the public-booking occupancy rules. The
/// qualifying doctors are listed so the booking UI can offer a choice.
pub fn open_doctor_slots(
    date: NaiveDate,
    roster: &[String],
    appointments: &[Appointment],
    now: NaiveDateTime,
) -> Vec<OpenSlot> {
    let per_doctor: Vec<(&String, Vec<MinuteInterval>)> = roster
        .iter()
        .map(|doctor| {
            let occupied = appointments
                .iter()
                .filter(|a| {
                    a.date == date
                        && &a.doctor == doctor
                        && OccupancyView::PublicBooking.occupies(a)
                })
                .map(|a| a.interval())
                .collect();
            (doctor, occupied)
        })
        .collect();

    TimeGrid::all_slots()
        .map(|slot| {
            let is_past = slot_is_past(date, slot, now);
            let open_doctors = per_doctor
                .iter()
                .filter(|(_, occupied)| !slot_is_booked(slot, occupied))
                .map(|(doctor, _)| (*doctor).clone())
                .collect();
            OpenSlot {
                slot,
                is_past,
                open_doctors,
            }
        })
        .collect()
}

/// A slot is past when its date+time is at or before now. Every slot of a
/// date strictly in the past is past; slots on future dates never are.
fn slot_is_past(date: NaiveDate, slot: NaiveTime, now: NaiveDateTime) -> bool {
    date.and_time(slot) <= now
}

/// Interval overlap, not exact-start matching: a 60-minute appointment blocks
/// both grid slots it covers.
fn slot_is_booked(slot: NaiveTime, occupied: &[MinuteInterval]) -> bool {
    let slot_interval = MinuteInterval::starting_at(slot, crate::grid::slot_length_minutes());
    occupied.iter().any(|o| o.overlaps(&slot_interval))
}
