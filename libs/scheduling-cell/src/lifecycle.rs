// libs/scheduling-cell/src/lifecycle.rs
use chrono::NaiveDate;
use thiserror::Error;
use tracing::{debug, warn};

use crate::models::{Appointment, AppointmentStatus, PaymentStatus};

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum LifecycleError {
    #[error("Appointment status cannot change from {from} to {to}")]
    InvalidTransition {
        from: AppointmentStatus,
        to: AppointmentStatus,
    },

    #[error("Only pending appointments can be deleted")]
    NotDeletable,
}

/// Legal status transitions and their coupling to payment state.
///
/// The external store does not enforce any of this; the core is the contract.
pub struct AppointmentLifecycle;

impl AppointmentLifecycle {
    pub fn new() -> Self {
        Self
    }

    /// Valid next statuses for a given current status. Terminal states return
    /// an empty list.
    pub fn valid_transitions(&self, current: AppointmentStatus) -> Vec<AppointmentStatus> {
        use AppointmentStatus::*;
        match current {
            Pending => vec![Confirmed, Scheduled, ToPay, Cancelled],
            Tentative => vec![Confirmed, Cancelled],
            ToPay => vec![Confirmed, Scheduled, Cancelled],
            // Tentative here is the patient-initiated cancellation request on
            // a live booking, recorded alongside `cancellation_requested`.
            Scheduled => vec![Confirmed, Completed, Cancelled, Tentative],
            Confirmed => vec![Completed, Cancelled, Tentative],
            Completed | Cancelled => vec![],
        }
    }

    /// A self-transition on a non-terminal state is a no-op, not an error.
    pub fn validate_transition(
        &self,
        current: AppointmentStatus,
        next: AppointmentStatus,
    ) -> Result<(), LifecycleError> {
        debug!("Validating status transition {} -> {}", current, next);

        if current == next && !Self::is_terminal(current) {
            return Ok(());
        }

        if !self.valid_transitions(current).contains(&next) {
            warn!("Invalid status transition attempted: {} -> {}", current, next);
            return Err(LifecycleError::InvalidTransition {
                from: current,
                to: next,
            });
        }

        Ok(())
    }

    pub fn is_terminal(status: AppointmentStatus) -> bool {
        matches!(
            status,
            AppointmentStatus::Completed | AppointmentStatus::Cancelled
        )
    }

    /// Initial status of a fresh booking: patient-originated requests await
    /// staff approval, staff-created bookings are pre-approved.
    pub fn initial_status(staff_created: bool) -> AppointmentStatus {
        if staff_created {
            AppointmentStatus::Scheduled
        } else {
            AppointmentStatus::Pending
        }
    }

    /// Hard deletion is only legal while the request is still pending.
    pub fn validate_delete(&self, status: AppointmentStatus) -> Result<(), LifecycleError> {
        if status == AppointmentStatus::Pending {
            Ok(())
        } else {
            Err(LifecycleError::NotDeletable)
        }
    }

    /// Computed display status: past scheduled/confirmed appointments read as
    /// completed without the transition ever being persisted.
    pub fn effective_status(appointment: &Appointment, today: NaiveDate) -> AppointmentStatus {
        match appointment.status {
            AppointmentStatus::Scheduled | AppointmentStatus::Confirmed
                if appointment.date < today =>
            {
                AppointmentStatus::Completed
            }
            status => status,
        }
    }

    /// Whether the appointment belongs in the staff "Requests" inbox.
    pub fn needs_staff_attention(status: AppointmentStatus) -> bool {
        matches!(
            status,
            AppointmentStatus::Pending | AppointmentStatus::Tentative | AppointmentStatus::ToPay
        )
    }

    /// Payment-affordance label shown next to an inbox item.
    pub fn attention_label(
        status: AppointmentStatus,
        payment: PaymentStatus,
    ) -> Option<&'static str> {
        match (status, payment) {
            (AppointmentStatus::ToPay, _) => Some("Awaiting payment"),
            (AppointmentStatus::Tentative, PaymentStatus::HalfPaid) => {
                Some("Partially paid - needs approval")
            }
            (AppointmentStatus::Tentative, _) => Some("Needs review"),
            (AppointmentStatus::Pending, PaymentStatus::Unpaid) => Some("New request - unpaid"),
            (AppointmentStatus::Pending, _) => Some("New request"),
            _ => None,
        }
    }

    /// Patient asks to cancel a live booking: the request is flagged
    /// explicitly and the status parks on tentative for staff review.
    pub fn request_cancellation(
        &self,
        appointment: &mut Appointment,
    ) -> Result<(), LifecycleError> {
        self.validate_transition(appointment.status, AppointmentStatus::Tentative)?;
        appointment.status = AppointmentStatus::Tentative;
        appointment.cancellation_requested = true;

        let marker = "[cancellation requested by patient]";
        appointment.notes = Some(match appointment.notes.take() {
            Some(existing) if !existing.is_empty() => format!("{existing}\n{marker}"),
            _ => marker.to_string(),
        });

        Ok(())
    }
}

impl Default for AppointmentLifecycle {
    fn default() -> Self {
        Self::new()
    }
}
