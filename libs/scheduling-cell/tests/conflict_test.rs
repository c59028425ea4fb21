// libs/scheduling-cell/tests/conflict_test.rs
use assert_matches::assert_matches;
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use uuid::Uuid;

use scheduling_cell::conflict::{check_booking, BookingProposal, ConflictError};
use scheduling_cell::models::{Appointment, AppointmentStatus, PaymentStatus, VisitReason};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn at(h: u32, min: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(h, min, 0).unwrap()
}

fn early(day: NaiveDate) -> NaiveDateTime {
    day.and_time(at(6, 0))
}

fn appointment(
    patient_id: Uuid,
    doctor: &str,
    day: NaiveDate,
    time: NaiveTime,
    duration: i64,
) -> Appointment {
    Appointment {
        id: Uuid::new_v4(),
        patient_id,
        patient_name: "Jose Ramos".to_string(),
        doctor: doctor.to_string(),
        date: day,
        time,
        duration_minutes: duration,
        reason: VisitReason::Filling,
        custom_reason: None,
        status: AppointmentStatus::Confirmed,
        payment_status: PaymentStatus::Paid,
        cancellation_requested: false,
        notes: None,
    }
}

fn proposal(
    patient_id: Uuid,
    doctor: &str,
    day: NaiveDate,
    time: NaiveTime,
    duration: i64,
) -> BookingProposal {
    BookingProposal {
        patient_id,
        doctor: doctor.to_string(),
        date: day,
        time,
        duration_minutes: duration,
        exclude_id: None,
    }
}

#[test]
fn doctor_double_booking_is_rejected_and_adjacent_slot_accepted() {
    // Scenario 1: Smith has 10:00-10:30; 10:00 rejected, 10:30 accepted.
    let day = date(2026, 9, 14);
    let existing = vec![appointment(Uuid::new_v4(), "Dr. Smith", day, at(10, 0), 30)];

    let clash = proposal(Uuid::new_v4(), "Dr. Smith", day, at(10, 0), 30);
    assert_matches!(
        check_booking(&clash, &existing, early(day)),
        Err(ConflictError::DoctorBusy)
    );

    let adjacent = proposal(Uuid::new_v4(), "Dr. Smith", day, at(10, 30), 30);
    assert_matches!(check_booking(&adjacent, &existing, early(day)), Ok(()));
}

#[test]
fn patient_conflict_spans_doctors() {
    // Scenario 2: P1 is with Smith 09:00-09:30; P1 with Jones at 09:15 rejected.
    let day = date(2026, 9, 14);
    let patient = Uuid::new_v4();
    let existing = vec![appointment(patient, "Dr. Smith", day, at(9, 0), 30)];

    let overlapping = proposal(patient, "Dr. Jones", day, at(9, 15), 30);
    assert_matches!(
        check_booking(&overlapping, &existing, early(day)),
        Err(ConflictError::PatientBusy)
    );
}

#[test]
fn patient_conflict_reported_before_doctor_conflict() {
    let day = date(2026, 9, 14);
    let patient = Uuid::new_v4();
    let existing = vec![appointment(patient, "Dr. Smith", day, at(9, 0), 30)];

    // Same patient, same doctor, same slot: both rules fail, patient reason wins.
    let both = proposal(patient, "Dr. Smith", day, at(9, 0), 30);
    assert_matches!(
        check_booking(&both, &existing, early(day)),
        Err(ConflictError::PatientBusy)
    );
}

#[test]
fn edit_never_conflicts_with_itself() {
    let day = date(2026, 9, 14);
    let patient = Uuid::new_v4();
    let existing = vec![appointment(patient, "Dr. Smith", day, at(9, 0), 30)];

    // Notes-only edit: same patient, doctor, date, time, duration.
    let unchanged = BookingProposal {
        patient_id: patient,
        doctor: "Dr. Smith".to_string(),
        date: day,
        time: at(9, 0),
        duration_minutes: 30,
        exclude_id: Some(existing[0].id),
    };
    assert_matches!(check_booking(&unchanged, &existing, early(day)), Ok(()));
}

#[test]
fn cancelled_appointments_do_not_conflict() {
    let day = date(2026, 9, 14);
    let patient = Uuid::new_v4();
    let mut existing = appointment(patient, "Dr. Smith", day, at(9, 0), 30);
    existing.status = AppointmentStatus::Cancelled;

    let same_slot = proposal(patient, "Dr. Smith", day, at(9, 0), 30);
    assert_matches!(check_booking(&same_slot, &[existing], early(day)), Ok(()));
}

#[test]
fn same_slot_different_day_does_not_conflict() {
    let monday = date(2026, 9, 14);
    let tuesday = date(2026, 9, 15);
    let patient = Uuid::new_v4();
    let existing = vec![appointment(patient, "Dr. Smith", monday, at(9, 0), 30)];

    let next_day = proposal(patient, "Dr. Smith", tuesday, at(9, 0), 30);
    assert_matches!(check_booking(&next_day, &existing, early(monday)), Ok(()));
}

#[test]
fn long_appointment_blocks_interior_slots() {
    let day = date(2026, 9, 14);
    let existing = vec![appointment(Uuid::new_v4(), "Dr. Smith", day, at(10, 0), 90)];

    // 10:30 and 11:00 both fall inside 10:00-11:30.
    for slot in [at(10, 30), at(11, 0)] {
        let inside = proposal(Uuid::new_v4(), "Dr. Smith", day, slot, 30);
        assert_matches!(
            check_booking(&inside, &existing, early(day)),
            Err(ConflictError::DoctorBusy)
        );
    }

    let after = proposal(Uuid::new_v4(), "Dr. Smith", day, at(11, 30), 30);
    assert_matches!(check_booking(&after, &existing, early(day)), Ok(()));
}

#[test]
fn past_datetime_rejected_even_when_slot_is_free() {
    // Scenario 5: one minute in the past, otherwise free.
    let day = date(2026, 9, 14);
    let now = day.and_time(at(10, 1));

    let late = proposal(Uuid::new_v4(), "Dr. Smith", day, at(10, 0), 30);
    assert_matches!(
        check_booking(&late, &[], now),
        Err(ConflictError::PastDateTime)
    );
}

#[test]
fn booking_exactly_at_now_is_rejected() {
    let day = date(2026, 9, 14);
    let now = day.and_time(at(10, 0));

    let at_now = proposal(Uuid::new_v4(), "Dr. Smith", day, at(10, 0), 30);
    assert_matches!(
        check_booking(&at_now, &[], now),
        Err(ConflictError::PastDateTime)
    );
}

#[test]
fn past_date_takes_precedence_over_conflicts() {
    let day = date(2026, 9, 14);
    let patient = Uuid::new_v4();
    let existing = vec![appointment(patient, "Dr. Smith", day, at(9, 0), 30)];
    let now = day.and_time(at(12, 0));

    let stale = proposal(patient, "Dr. Smith", day, at(9, 0), 30);
    assert_matches!(
        check_booking(&stale, &existing, now),
        Err(ConflictError::PastDateTime)
    );
}
