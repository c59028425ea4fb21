// libs/scheduling-cell/src/conflict.rs
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use thiserror::Error;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::interval::MinuteInterval;
use crate::models::Appointment;

/// Why a proposed booking was rejected. Each variant carries the exact
/// wording surfaced to the user, distinguishing "you are busy" from "the
/// provider is busy".
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConflictError {
    #[error("Appointments cannot be booked for a past date or time")]
    PastDateTime,

    #[error("You already have an appointment at this time")]
    PatientBusy,

    #[error("This time slot is already booked for the selected provider")]
    DoctorBusy,
}

/// A booking or edit awaiting the accept/reject decision. `exclude_id` is set
/// when editing so the appointment never conflicts with itself.
#[derive(Debug, Clone)]
pub struct BookingProposal {
    pub patient_id: Uuid,
    pub doctor: String,
    pub date: NaiveDate,
    pub time: NaiveTime,
    pub duration_minutes: i64,
    pub exclude_id: Option<Uuid>,
}

impl BookingProposal {
    fn interval(&self) -> MinuteInterval {
        MinuteInterval::starting_at(self.time, self.duration_minutes)
    }
}

/// Authoritative client-side accept/reject decision for a proposed booking.
///
/// Checks, in order: past date/time, patient exclusivity, doctor exclusivity.
/// The two exclusivity checks are independent; order only determines which
/// reason surfaces first. Pure predicate over the supplied snapshot; the
/// persistence service re-verifies at write time because two clients can both
/// pass this check for the same slot.
pub fn check_booking(
    proposal: &BookingProposal,
    appointments: &[Appointment],
    now: NaiveDateTime,
) -> Result<(), ConflictError> {
    if proposal.date.and_time(proposal.time) <= now {
        debug!(
            "Rejecting past-dated booking for {} at {} {}",
            proposal.patient_id, proposal.date, proposal.time
        );
        return Err(ConflictError::PastDateTime);
    }

    let proposed = proposal.interval();

    let relevant = |a: &&Appointment| {
        a.date == proposal.date && !a.is_cancelled() && Some(a.id) != proposal.exclude_id
    };

    let patient_clash = appointments
        .iter()
        .filter(relevant)
        .filter(|a| a.patient_id == proposal.patient_id)
        .any(|a| a.interval().overlaps(&proposed));

    if patient_clash {
        warn!(
            "Patient {} already booked on {} overlapping {}",
            proposal.patient_id, proposal.date, proposal.time
        );
        return Err(ConflictError::PatientBusy);
    }

    let doctor_clash = appointments
        .iter()
        .filter(relevant)
        .filter(|a| a.doctor == proposal.doctor)
        .any(|a| a.interval().overlaps(&proposed));

    if doctor_clash {
        warn!(
            "Doctor {} already booked on {} overlapping {}",
            proposal.doctor, proposal.date, proposal.time
        );
        return Err(ConflictError::DoctorBusy);
    }

    Ok(())
}
