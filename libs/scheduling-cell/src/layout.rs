// libs/scheduling-cell/src/layout.rs
use serde::Serialize;
use uuid::Uuid;

use crate::interval::MinuteInterval;
use crate::models::Appointment;

/// Rendering assignment for one appointment block: `column` within its
/// overlap cluster and the cluster-wide `sibling_count` that fixes the
/// fractional width (`100% / sibling_count`) and left offset
/// (`column / sibling_count * 100%`).
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct Placement {
    pub id: Uuid,
    pub column: usize,
    pub sibling_count: usize,
    pub start_minute: i64,
    pub end_minute: i64,
}

/// Greedy interval-graph coloring over one day's appointments.
///
/// Appointments are placed in start order (ties broken by longer duration
/// first, which stabilizes the layout); each goes into the leftmost column
/// whose occupants it does not overlap. Overlap clusters (connected
/// components of the overlap relation) share a single sibling count so the
/// calendar renders a tidy uniform grid per cluster.
///
/// O(n * columns); a clinic day holds tens of appointments, not thousands.
pub fn layout_day(appointments: &[Appointment]) -> Vec<Placement> {
    let mut items: Vec<(Uuid, MinuteInterval)> = appointments
        .iter()
        .map(|a| (a.id, a.interval()))
        .collect();
    items.sort_by(|(_, a), (_, b)| a.start.cmp(&b.start).then(b.end.cmp(&a.end)));

    // First-fit column per item, scanning existing columns left to right.
    let mut columns: Vec<Vec<MinuteInterval>> = Vec::new();
    let mut assigned: Vec<usize> = Vec::with_capacity(items.len());

    for (_, interval) in &items {
        let slot = columns
            .iter()
            .position(|occupants| occupants.iter().all(|o| !o.overlaps(interval)));
        match slot {
            Some(col) => {
                columns[col].push(*interval);
                assigned.push(col);
            }
            None => {
                columns.push(vec![*interval]);
                assigned.push(columns.len() - 1);
            }
        }
    }

    // In start order, a cluster ends exactly when the next start reaches the
    // running maximum end, so connected components are contiguous runs.
    let mut placements = Vec::with_capacity(items.len());
    let mut cluster_start = 0;
    while cluster_start < items.len() {
        let mut cluster_end = cluster_start + 1;
        let mut max_end = items[cluster_start].1.end;
        while cluster_end < items.len() && items[cluster_end].1.start < max_end {
            max_end = max_end.max(items[cluster_end].1.end);
            cluster_end += 1;
        }

        let sibling_count = assigned[cluster_start..cluster_end]
            .iter()
            .max()
            .map(|max_col| max_col + 1)
            .unwrap_or(1);

        for index in cluster_start..cluster_end {
            let (id, interval) = items[index];
            placements.push(Placement {
                id,
                column: assigned[index],
                sibling_count,
                start_minute: interval.start,
                end_minute: interval.end,
            });
        }

        cluster_start = cluster_end;
    }

    placements
}
