// libs/appointment-cell/src/services/schedule.rs
use chrono::{Local, NaiveDate};
use reqwest::Method;
use serde_json::Value;
use std::sync::Arc;
use tracing::debug;

use doctor_cell::services::directory::DoctorDirectoryService;
use scheduling_cell::availability::{
    day_schedule, open_doctor_slots, OccupancyView, OpenSlot, SlotAvailability,
};
use scheduling_cell::layout::{layout_day, Placement};
use scheduling_cell::lifecycle::AppointmentLifecycle;
use scheduling_cell::models::Appointment;
use shared_config::AppConfig;
use shared_database::portal::PortalClient;

use crate::models::{AnonymizedAppointment, AppointmentError, RequestItem};

/// Read-side scheduling surface: slot availability, calendar layout, the
/// anonymized occupancy feed, and the staff requests inbox. All computation
/// happens in the scheduling cell; this service only fetches snapshots and
/// shapes responses.
pub struct ScheduleService {
    portal: Arc<PortalClient>,
    directory: DoctorDirectoryService,
}

impl ScheduleService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            portal: Arc::new(PortalClient::new(config)),
            directory: DoctorDirectoryService::new(config),
        }
    }

    /// Per-slot classification of one doctor's day.
    pub async fn doctor_day(
        &self,
        date: NaiveDate,
        doctor: &str,
        view: OccupancyView,
        auth_token: &str,
    ) -> Result<Vec<SlotAvailability>, AppointmentError> {
        let snapshot = self.appointments_for_date(date, auth_token).await?;
        Ok(day_schedule(
            date,
            doctor,
            &snapshot,
            Local::now().naive_local(),
            view,
        ))
    }

    /// Public "any doctor" availability across the active roster.
    pub async fn public_day(
        &self,
        date: NaiveDate,
        auth_token: &str,
    ) -> Result<Vec<OpenSlot>, AppointmentError> {
        let roster = self
            .directory
            .roster_names(auth_token)
            .await
            .map_err(|e| AppointmentError::DatabaseError(e.to_string()))?;
        let snapshot = self.appointments_for_date(date, auth_token).await?;

        debug!(
            "Computing public availability on {} across {} doctors",
            date,
            roster.len()
        );
        Ok(open_doctor_slots(
            date,
            &roster,
            &snapshot,
            Local::now().naive_local(),
        ))
    }

    /// Column layout for the calendar view of one day. Cancelled appointments
    /// never render.
    pub async fn calendar_layout(
        &self,
        date: NaiveDate,
        doctor: Option<&str>,
        auth_token: &str,
    ) -> Result<Vec<Placement>, AppointmentError> {
        let mut snapshot = self.appointments_for_date(date, auth_token).await?;
        snapshot.retain(|a| !a.is_cancelled());
        if let Some(doctor) = doctor {
            snapshot.retain(|a| a.doctor == doctor);
        }
        Ok(layout_day(&snapshot))
    }

    /// Occupancy for a date with patient identity stripped, consumed by
    /// patients checking slots they do not own.
    pub async fn anonymized_day(
        &self,
        date: NaiveDate,
        auth_token: &str,
    ) -> Result<Vec<AnonymizedAppointment>, AppointmentError> {
        let snapshot = self.appointments_for_date(date, auth_token).await?;
        Ok(snapshot
            .iter()
            .filter(|a| !a.is_cancelled())
            .map(AnonymizedAppointment::from)
            .collect())
    }

    /// Staff requests inbox: everything awaiting attention, labelled by its
    /// payment affordance.
    pub async fn requests_inbox(
        &self,
        auth_token: &str,
    ) -> Result<Vec<RequestItem>, AppointmentError> {
        let path = "/rest/v1/appointments?order=date.asc,time.asc";
        let result: Vec<Value> = self
            .portal
            .request(Method::GET, path, Some(auth_token), None)
            .await
            .map_err(|e| AppointmentError::DatabaseError(e.to_string()))?;

        let appointments = result
            .into_iter()
            .map(serde_json::from_value)
            .collect::<std::result::Result<Vec<Appointment>, _>>()
            .map_err(|e| {
                AppointmentError::DatabaseError(format!("Failed to parse appointments: {}", e))
            })?;

        Ok(appointments
            .into_iter()
            .filter(|a| AppointmentLifecycle::needs_staff_attention(a.status))
            .filter_map(|a| {
                AppointmentLifecycle::attention_label(a.status, a.payment_status).map(|label| {
                    RequestItem {
                        payment_status: a.payment_status,
                        label,
                        appointment: a,
                    }
                })
            })
            .collect())
    }

    async fn appointments_for_date(
        &self,
        date: NaiveDate,
        auth_token: &str,
    ) -> Result<Vec<Appointment>, AppointmentError> {
        let path = format!("/rest/v1/appointments?date=eq.{}&order=time.asc", date);
        let result: Vec<Value> = self
            .portal
            .request(Method::GET, &path, Some(auth_token), None)
            .await
            .map_err(|e| AppointmentError::DatabaseError(e.to_string()))?;

        result
            .into_iter()
            .map(serde_json::from_value)
            .collect::<std::result::Result<Vec<Appointment>, _>>()
            .map_err(|e| {
                AppointmentError::DatabaseError(format!("Failed to parse appointments: {}", e))
            })
    }
}
