//! Appointment scheduling and availability engine for the dental portal.
//!
//! Everything in this cell is synchronous and pure: it operates on
//! appointment snapshots the caller has already fetched. The persistence
//! service remains the authority for the exclusivity invariants at write
//! time; this cell gives the fast client-facing answer.

pub mod availability;
pub mod conflict;
pub mod grid;
pub mod interval;
pub mod layout;
pub mod lifecycle;
pub mod models;

pub use availability::{day_schedule, open_doctor_slots, OccupancyView, OpenSlot, SlotAvailability};
pub use conflict::{check_booking, BookingProposal, ConflictError};
pub use grid::{SessionKind, TimeGrid};
pub use interval::MinuteInterval;
pub use layout::{layout_day, Placement};
pub use lifecycle::{AppointmentLifecycle, LifecycleError};
pub use models::{Appointment, AppointmentStatus, PaymentStatus, VisitReason};
