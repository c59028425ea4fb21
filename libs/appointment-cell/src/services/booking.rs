// libs/appointment-cell/src/services/booking.rs
use chrono::{Local, NaiveDate, NaiveDateTime};
use reqwest::Method;
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{debug, info, warn};
use uuid::Uuid;

use doctor_cell::services::directory::DoctorDirectoryService;
use scheduling_cell::conflict::{check_booking, BookingProposal};
use scheduling_cell::grid::TimeGrid;
use scheduling_cell::lifecycle::AppointmentLifecycle;
use scheduling_cell::models::{Appointment, PaymentStatus, VisitReason};
use shared_config::AppConfig;
use shared_database::portal::PortalClient;

use crate::models::{
    AppointmentError, BookAppointmentRequest, BookingRules, StatusUpdateRequest,
    UpdateAppointmentRequest,
};

/// Books, edits, and retires appointments. The snapshot-validate-write cycle
/// is optimistic: the persistence service re-checks exclusivity at the write
/// boundary and its conflict response maps onto the same user-facing reasons
/// the local detector produces.
pub struct AppointmentBookingService {
    portal: Arc<PortalClient>,
    directory: DoctorDirectoryService,
    lifecycle: AppointmentLifecycle,
    rules: BookingRules,
}

impl AppointmentBookingService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            portal: Arc::new(PortalClient::new(config)),
            directory: DoctorDirectoryService::new(config),
            lifecycle: AppointmentLifecycle::new(),
            rules: BookingRules::default(),
        }
    }

    /// Book a new appointment. `staff_created` picks the initial status:
    /// staff bookings are pre-approved, patient requests await review.
    pub async fn book(
        &self,
        request: BookAppointmentRequest,
        staff_created: bool,
        auth_token: &str,
    ) -> Result<Appointment, AppointmentError> {
        info!(
            "Booking appointment for patient {} with {} on {} {}",
            request.patient_id, request.doctor, request.date, request.time
        );

        let now = clinic_now();
        let duration = self.validate_booking_request(&request, now.date())?;

        if !self
            .directory
            .exists(&request.doctor, auth_token)
            .await
            .map_err(|e| AppointmentError::DatabaseError(e.to_string()))?
        {
            return Err(AppointmentError::DoctorNotFound);
        }

        let snapshot = self.appointments_for_date(request.date, auth_token).await?;

        let proposal = BookingProposal {
            patient_id: request.patient_id,
            doctor: request.doctor.clone(),
            date: request.date,
            time: request.time,
            duration_minutes: duration,
            exclude_id: None,
        };
        check_booking(&proposal, &snapshot, now)?;

        let record = json!({
            "patient_id": request.patient_id,
            "patient_name": request.patient_name,
            "doctor": request.doctor,
            "date": request.date,
            "time": request.time.format("%H:%M").to_string(),
            "duration_minutes": duration,
            "reason": request.reason,
            "custom_reason": request.custom_reason,
            "status": AppointmentLifecycle::initial_status(staff_created),
            "payment_status": PaymentStatus::Unpaid,
            "cancellation_requested": false,
            "notes": request.notes,
        });

        let created = self.insert_appointment(record, auth_token).await?;
        info!("Appointment {} created as {}", created.id, created.status);
        Ok(created)
    }

    /// Edit mutable fields. Timing changes are re-validated against both
    /// exclusivity invariants, excluding the appointment itself.
    pub async fn update(
        &self,
        appointment_id: Uuid,
        request: UpdateAppointmentRequest,
        auth_token: &str,
    ) -> Result<Appointment, AppointmentError> {
        debug!("Updating appointment {}", appointment_id);

        let current = self.get_appointment(appointment_id, auth_token).await?;

        let date = request.date.unwrap_or(current.date);
        let time = request.time.unwrap_or(current.time);
        let duration = request.duration_minutes.unwrap_or(current.duration_minutes);
        let doctor = request.doctor.clone().unwrap_or_else(|| current.doctor.clone());
        let reason = request.reason.unwrap_or(current.reason);
        let custom_reason = request
            .custom_reason
            .clone()
            .or_else(|| current.custom_reason.clone());

        self.validate_reason(reason, custom_reason.as_deref())?;
        self.validate_duration(duration)?;

        if request.touches_timing() {
            if !TimeGrid::contains(time) {
                return Err(AppointmentError::ValidationError(
                    "Appointment time must be on the clinic's slot grid".to_string(),
                ));
            }

            if !self
                .directory
                .exists(&doctor, auth_token)
                .await
                .map_err(|e| AppointmentError::DatabaseError(e.to_string()))?
            {
                return Err(AppointmentError::DoctorNotFound);
            }

            let snapshot = self.appointments_for_date(date, auth_token).await?;
            let proposal = BookingProposal {
                patient_id: current.patient_id,
                doctor: doctor.clone(),
                date,
                time,
                duration_minutes: duration,
                exclude_id: Some(appointment_id),
            };
            check_booking(&proposal, &snapshot, clinic_now())?;
        }

        let mut patch = serde_json::Map::new();
        patch.insert("date".to_string(), json!(date));
        patch.insert("time".to_string(), json!(time.format("%H:%M").to_string()));
        patch.insert("duration_minutes".to_string(), json!(duration));
        patch.insert("doctor".to_string(), json!(doctor));
        patch.insert("reason".to_string(), json!(reason));
        patch.insert("custom_reason".to_string(), json!(custom_reason));
        if let Some(notes) = request.notes {
            patch.insert("notes".to_string(), json!(notes));
        }

        self.patch_appointment(appointment_id, Value::Object(patch), auth_token)
            .await
    }

    /// Move an appointment through the lifecycle machine.
    pub async fn transition_status(
        &self,
        appointment_id: Uuid,
        request: StatusUpdateRequest,
        auth_token: &str,
    ) -> Result<Appointment, AppointmentError> {
        let current = self.get_appointment(appointment_id, auth_token).await?;

        self.lifecycle
            .validate_transition(current.status, request.status)?;

        if current.status == request.status {
            debug!(
                "Status no-op for appointment {} ({})",
                appointment_id, current.status
            );
            return Ok(current);
        }

        info!(
            "Appointment {} status {} -> {}",
            appointment_id, current.status, request.status
        );

        self.patch_appointment(
            appointment_id,
            json!({ "status": request.status }),
            auth_token,
        )
        .await
    }

    /// Patient-initiated cancellation of a live booking: flags the record and
    /// parks it on tentative for staff review.
    pub async fn request_cancellation(
        &self,
        appointment_id: Uuid,
        auth_token: &str,
    ) -> Result<Appointment, AppointmentError> {
        let mut current = self.get_appointment(appointment_id, auth_token).await?;
        let previous = current.status;

        self.lifecycle.request_cancellation(&mut current)?;

        info!(
            "Cancellation requested for appointment {} (was {})",
            appointment_id, previous
        );

        self.patch_appointment(
            appointment_id,
            json!({
                "status": current.status,
                "cancellation_requested": true,
                "notes": current.notes,
            }),
            auth_token,
        )
        .await
    }

    /// Hard delete, legal only while the request is still pending.
    pub async fn delete(
        &self,
        appointment_id: Uuid,
        auth_token: &str,
    ) -> Result<(), AppointmentError> {
        let current = self.get_appointment(appointment_id, auth_token).await?;

        self.lifecycle.validate_delete(current.status)?;

        let path = format!("/rest/v1/appointments?id=eq.{}", appointment_id);
        let _: Vec<Value> = self
            .portal
            .request(Method::DELETE, &path, Some(auth_token), None)
            .await
            .map_err(|e| AppointmentError::DatabaseError(e.to_string()))?;

        info!("Deleted pending appointment {}", appointment_id);
        Ok(())
    }

    // ==========================================================================
    // READS
    // ==========================================================================

    pub async fn get_appointment(
        &self,
        appointment_id: Uuid,
        auth_token: &str,
    ) -> Result<Appointment, AppointmentError> {
        let path = format!("/rest/v1/appointments?id=eq.{}", appointment_id);
        let result: Vec<Value> = self
            .portal
            .request(Method::GET, &path, Some(auth_token), None)
            .await
            .map_err(|e| AppointmentError::DatabaseError(e.to_string()))?;

        let value = result.into_iter().next().ok_or(AppointmentError::NotFound)?;
        serde_json::from_value(value)
            .map_err(|e| AppointmentError::DatabaseError(format!("Failed to parse appointment: {}", e)))
    }

    pub async fn patient_appointments(
        &self,
        patient_id: Uuid,
        auth_token: &str,
    ) -> Result<Vec<Appointment>, AppointmentError> {
        let path = format!(
            "/rest/v1/appointments?patient_id=eq.{}&order=date.asc,time.asc",
            patient_id
        );
        self.fetch_appointments(&path, auth_token).await
    }

    pub async fn doctor_appointments(
        &self,
        doctor: &str,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
        auth_token: &str,
    ) -> Result<Vec<Appointment>, AppointmentError> {
        let mut path = format!(
            "/rest/v1/appointments?doctor=eq.{}",
            doctor.replace(' ', "%20")
        );
        if let Some(from) = from {
            path.push_str(&format!("&date=gte.{}", from));
        }
        if let Some(to) = to {
            path.push_str(&format!("&date=lte.{}", to));
        }
        path.push_str("&order=date.asc,time.asc");
        self.fetch_appointments(&path, auth_token).await
    }

    pub async fn appointments_for_date(
        &self,
        date: NaiveDate,
        auth_token: &str,
    ) -> Result<Vec<Appointment>, AppointmentError> {
        let path = format!("/rest/v1/appointments?date=eq.{}&order=time.asc", date);
        self.fetch_appointments(&path, auth_token).await
    }

    // ==========================================================================
    // PRIVATE HELPERS
    // ==========================================================================

    async fn fetch_appointments(
        &self,
        path: &str,
        auth_token: &str,
    ) -> Result<Vec<Appointment>, AppointmentError> {
        let result: Vec<Value> = self
            .portal
            .request(Method::GET, path, Some(auth_token), None)
            .await
            .map_err(|e| AppointmentError::DatabaseError(e.to_string()))?;

        result
            .into_iter()
            .map(serde_json::from_value)
            .collect::<std::result::Result<Vec<Appointment>, _>>()
            .map_err(|e| AppointmentError::DatabaseError(format!("Failed to parse appointments: {}", e)))
    }

    async fn insert_appointment(
        &self,
        record: Value,
        auth_token: &str,
    ) -> Result<Appointment, AppointmentError> {
        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert(
            "Prefer",
            reqwest::header::HeaderValue::from_static("return=representation"),
        );

        let result: Vec<Value> = self
            .portal
            .request_with_headers(
                Method::POST,
                "/rest/v1/appointments",
                Some(auth_token),
                Some(record),
                Some(headers),
            )
            .await
            .map_err(map_write_error)?;

        let value = result
            .into_iter()
            .next()
            .ok_or_else(|| AppointmentError::DatabaseError("Create returned no record".to_string()))?;
        serde_json::from_value(value)
            .map_err(|e| AppointmentError::DatabaseError(format!("Failed to parse appointment: {}", e)))
    }

    async fn patch_appointment(
        &self,
        appointment_id: Uuid,
        patch: Value,
        auth_token: &str,
    ) -> Result<Appointment, AppointmentError> {
        let path = format!("/rest/v1/appointments?id=eq.{}", appointment_id);
        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert(
            "Prefer",
            reqwest::header::HeaderValue::from_static("return=representation"),
        );

        let result: Vec<Value> = self
            .portal
            .request_with_headers(Method::PATCH, &path, Some(auth_token), Some(patch), Some(headers))
            .await
            .map_err(map_write_error)?;

        let value = result.into_iter().next().ok_or(AppointmentError::NotFound)?;
        serde_json::from_value(value)
            .map_err(|e| AppointmentError::DatabaseError(format!("Failed to parse appointment: {}", e)))
    }

    fn validate_booking_request(
        &self,
        request: &BookAppointmentRequest,
        today: NaiveDate,
    ) -> Result<i64, AppointmentError> {
        if request.patient_name.trim().is_empty() {
            return Err(AppointmentError::ValidationError(
                "Patient name is required".to_string(),
            ));
        }
        if request.doctor.trim().is_empty() {
            return Err(AppointmentError::ValidationError(
                "Doctor is required".to_string(),
            ));
        }
        if request.date < today {
            return Err(AppointmentError::ValidationError(
                "Appointment date cannot be in the past".to_string(),
            ));
        }
        if !TimeGrid::contains(request.time) {
            return Err(AppointmentError::ValidationError(
                "Appointment time must be on the clinic's slot grid".to_string(),
            ));
        }

        self.validate_reason(request.reason, request.custom_reason.as_deref())?;

        let duration = request
            .duration_minutes
            .unwrap_or(self.rules.default_duration_minutes);
        self.validate_duration(duration)?;

        Ok(duration)
    }

    fn validate_reason(
        &self,
        reason: VisitReason,
        custom_reason: Option<&str>,
    ) -> Result<(), AppointmentError> {
        if reason == VisitReason::Other
            && custom_reason.map(str::trim).unwrap_or_default().is_empty()
        {
            return Err(AppointmentError::ValidationError(
                "Please describe the reason for your visit".to_string(),
            ));
        }
        Ok(())
    }

    fn validate_duration(&self, duration: i64) -> Result<(), AppointmentError> {
        if duration < self.rules.min_duration_minutes || duration > self.rules.max_duration_minutes
        {
            return Err(AppointmentError::ValidationError(format!(
                "Duration must be between {} and {} minutes",
                self.rules.min_duration_minutes, self.rules.max_duration_minutes
            )));
        }
        Ok(())
    }
}

/// The write boundary is the authority: a conflict response from the store
/// surfaces with the provider-busy wording so both rejection paths read the
/// same to the user.
fn map_write_error(e: anyhow::Error) -> AppointmentError {
    let text = e.to_string();
    if text.starts_with("Conflict") {
        warn!("Persistence rejected write as conflicting: {}", text);
        AppointmentError::Conflict(scheduling_cell::conflict::ConflictError::DoctorBusy)
    } else {
        AppointmentError::DatabaseError(text)
    }
}

/// Clinic-local wall clock; all dates and times in the portal are local.
fn clinic_now() -> NaiveDateTime {
    Local::now().naive_local()
}
