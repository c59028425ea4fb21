// libs/scheduling-cell/tests/layout_test.rs
use chrono::{NaiveDate, NaiveTime};
use uuid::Uuid;

use scheduling_cell::interval::MinuteInterval;
use scheduling_cell::layout::{layout_day, Placement};
use scheduling_cell::models::{Appointment, AppointmentStatus, PaymentStatus, VisitReason};

fn at(h: u32, min: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(h, min, 0).unwrap()
}

fn appointment(doctor: &str, time: NaiveTime, duration: i64) -> Appointment {
    Appointment {
        id: Uuid::new_v4(),
        patient_id: Uuid::new_v4(),
        patient_name: "Lena Ong".to_string(),
        doctor: doctor.to_string(),
        date: NaiveDate::from_ymd_opt(2026, 9, 14).unwrap(),
        time,
        duration_minutes: duration,
        reason: VisitReason::Braces,
        custom_reason: None,
        status: AppointmentStatus::Confirmed,
        payment_status: PaymentStatus::Paid,
        cancellation_requested: false,
        notes: None,
    }
}

fn placement_for<'a>(placements: &'a [Placement], id: Uuid) -> &'a Placement {
    placements.iter().find(|p| p.id == id).unwrap()
}

#[test]
fn overlapping_pair_and_detached_single() {
    // Scenario 3: A 09:00-10:00, B 09:30-10:00, C 10:00-10:30.
    let a = appointment("Dr. Reyes", at(9, 0), 60);
    let b = appointment("Dr. Cruz", at(9, 30), 30);
    let c = appointment("Dr. Reyes", at(10, 0), 30);
    let placements = layout_day(&[a.clone(), b.clone(), c.clone()]);

    let pa = placement_for(&placements, a.id);
    let pb = placement_for(&placements, b.id);
    let pc = placement_for(&placements, c.id);

    assert_ne!(pa.column, pb.column);
    assert_eq!(pa.sibling_count, 2);
    assert_eq!(pb.sibling_count, 2);
    assert_eq!(pc.sibling_count, 1);
}

#[test]
fn every_appointment_gets_exactly_one_placement() {
    let appointments: Vec<Appointment> = (0..6)
        .map(|i| appointment("Dr. Reyes", at(9 + i / 2, (i % 2) * 30), 30))
        .collect();
    let placements = layout_day(&appointments);

    assert_eq!(placements.len(), appointments.len());
    for appt in &appointments {
        assert_eq!(placements.iter().filter(|p| p.id == appt.id).count(), 1);
    }
}

#[test]
fn same_column_never_overlaps() {
    let appointments = vec![
        appointment("Dr. Reyes", at(9, 0), 120),
        appointment("Dr. Cruz", at(9, 0), 30),
        appointment("Dr. Ong", at(9, 30), 60),
        appointment("Dr. Cruz", at(10, 0), 60),
        appointment("Dr. Tan", at(10, 30), 30),
        appointment("Dr. Reyes", at(11, 0), 30),
    ];
    let placements = layout_day(&appointments);

    for (i, p) in placements.iter().enumerate() {
        for q in placements.iter().skip(i + 1) {
            if p.column == q.column {
                let a = MinuteInterval::new(p.start_minute, p.end_minute);
                let b = MinuteInterval::new(q.start_minute, q.end_minute);
                assert!(!a.overlaps(&b), "{:?} overlaps {:?} in one column", p, q);
            }
        }
    }
}

#[test]
fn cluster_members_share_sibling_count() {
    // Chain: A 09:00-10:00 overlaps B 09:30-10:30 overlaps C 10:00-11:00.
    // A and C do not touch but are one component through B.
    let a = appointment("Dr. Reyes", at(9, 0), 60);
    let b = appointment("Dr. Cruz", at(9, 30), 60);
    let c = appointment("Dr. Ong", at(10, 0), 60);
    let placements = layout_day(&[a.clone(), b.clone(), c.clone()]);

    let counts: Vec<usize> = [a.id, b.id, c.id]
        .iter()
        .map(|id| placement_for(&placements, *id).sibling_count)
        .collect();
    assert_eq!(counts, vec![2, 2, 2]);
}

#[test]
fn back_to_back_appointments_stack_in_one_column() {
    let first = appointment("Dr. Reyes", at(9, 0), 30);
    let second = appointment("Dr. Reyes", at(9, 30), 30);
    let placements = layout_day(&[first.clone(), second.clone()]);

    assert_eq!(placement_for(&placements, first.id).column, 0);
    assert_eq!(placement_for(&placements, second.id).column, 0);
    assert!(placements.iter().all(|p| p.sibling_count == 1));
}

#[test]
fn three_way_overlap_uses_three_columns() {
    let appointments = vec![
        appointment("Dr. Reyes", at(9, 0), 60),
        appointment("Dr. Cruz", at(9, 0), 60),
        appointment("Dr. Ong", at(9, 0), 60),
    ];
    let placements = layout_day(&appointments);

    let mut columns: Vec<usize> = placements.iter().map(|p| p.column).collect();
    columns.sort_unstable();
    assert_eq!(columns, vec![0, 1, 2]);
    assert!(placements.iter().all(|p| p.sibling_count == 3));
}

#[test]
fn longer_block_placed_first_on_start_tie() {
    let long = appointment("Dr. Reyes", at(9, 0), 90);
    let short = appointment("Dr. Cruz", at(9, 0), 30);
    let placements = layout_day(&[short.clone(), long.clone()]);

    assert_eq!(placement_for(&placements, long.id).column, 0);
    assert_eq!(placement_for(&placements, short.id).column, 1);
}

#[test]
fn layout_is_deterministic() {
    let appointments = vec![
        appointment("Dr. Reyes", at(9, 0), 60),
        appointment("Dr. Cruz", at(9, 30), 60),
        appointment("Dr. Ong", at(11, 0), 30),
    ];
    assert_eq!(layout_day(&appointments), layout_day(&appointments));
}

#[test]
fn empty_day_yields_empty_layout() {
    assert!(layout_day(&[]).is_empty());
}
