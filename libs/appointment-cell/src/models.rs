// libs/appointment-cell/src/models.rs
use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use scheduling_cell::conflict::ConflictError;
use scheduling_cell::lifecycle::LifecycleError;
use scheduling_cell::models::{time_hm, Appointment, AppointmentStatus, PaymentStatus, VisitReason};
use shared_models::error::AppError;

// ==============================================================================
// REQUEST/RESPONSE MODELS
// ==============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookAppointmentRequest {
    pub patient_id: Uuid,
    pub patient_name: String,
    pub doctor: String,
    pub date: NaiveDate,
    #[serde(with = "time_hm")]
    pub time: NaiveTime,
    pub duration_minutes: Option<i64>,
    pub reason: VisitReason,
    pub custom_reason: Option<String>,
    pub notes: Option<String>,
}

/// Mutable fields of an existing appointment. Any change to
/// date/time/doctor/duration re-runs the conflict check against the rest of
/// the day, excluding the appointment itself.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateAppointmentRequest {
    pub date: Option<NaiveDate>,
    #[serde(default, with = "time_hm_opt")]
    pub time: Option<NaiveTime>,
    pub duration_minutes: Option<i64>,
    pub doctor: Option<String>,
    pub reason: Option<VisitReason>,
    pub custom_reason: Option<String>,
    pub notes: Option<String>,
}

impl UpdateAppointmentRequest {
    pub fn touches_timing(&self) -> bool {
        self.date.is_some()
            || self.time.is_some()
            || self.duration_minutes.is_some()
            || self.doctor.is_some()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusUpdateRequest {
    pub status: AppointmentStatus,
}

/// Occupancy read with patient identity stripped, served to patients checking
/// availability against slots they do not own.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnonymizedAppointment {
    pub doctor: String,
    pub date: NaiveDate,
    #[serde(with = "time_hm")]
    pub time: NaiveTime,
    pub duration_minutes: i64,
    pub status: AppointmentStatus,
}

impl From<&Appointment> for AnonymizedAppointment {
    fn from(appointment: &Appointment) -> Self {
        Self {
            doctor: appointment.doctor.clone(),
            date: appointment.date,
            time: appointment.time,
            duration_minutes: appointment.duration_minutes,
            status: appointment.status,
        }
    }
}

/// One staff "Requests" inbox entry: the appointment plus its
/// payment-affordance label.
#[derive(Debug, Clone, Serialize)]
pub struct RequestItem {
    pub appointment: Appointment,
    pub label: &'static str,
    pub payment_status: PaymentStatus,
}

// ==============================================================================
// VALIDATION RULES
// ==============================================================================

#[derive(Debug, Clone)]
pub struct BookingRules {
    pub default_duration_minutes: i64,
    pub min_duration_minutes: i64,
    pub max_duration_minutes: i64,
}

impl Default for BookingRules {
    fn default() -> Self {
        Self {
            default_duration_minutes: 30,
            min_duration_minutes: 15,
            max_duration_minutes: 120,
        }
    }
}

// ==============================================================================
// ERROR TYPES
// ==============================================================================

#[derive(Debug, Clone, thiserror::Error)]
pub enum AppointmentError {
    #[error("Appointment not found")]
    NotFound,

    #[error("Doctor not found")]
    DoctorNotFound,

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error(transparent)]
    Conflict(#[from] ConflictError),

    #[error(transparent)]
    Lifecycle(#[from] LifecycleError),

    #[error("Database error: {0}")]
    DatabaseError(String),
}

impl From<AppointmentError> for AppError {
    fn from(e: AppointmentError) -> Self {
        match e {
            AppointmentError::NotFound => AppError::NotFound("Appointment not found".to_string()),
            AppointmentError::DoctorNotFound => AppError::NotFound("Doctor not found".to_string()),
            AppointmentError::ValidationError(msg) => AppError::ValidationError(msg),
            AppointmentError::Conflict(reason) => AppError::Conflict(reason.to_string()),
            AppointmentError::Lifecycle(reason) => AppError::BadRequest(reason.to_string()),
            AppointmentError::DatabaseError(msg) => AppError::ExternalService(msg),
        }
    }
}

/// `Option<NaiveTime>` wire format `HH:MM`, tolerant of a seconds suffix.
pub mod time_hm_opt {
    use chrono::NaiveTime;
    use serde::{self, Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(time: &Option<NaiveTime>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match time {
            Some(t) => serializer.serialize_str(&t.format("%H:%M").to_string()),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<NaiveTime>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw: Option<String> = Option::deserialize(deserializer)?;
        match raw {
            None => Ok(None),
            Some(s) => NaiveTime::parse_from_str(&s, "%H:%M")
                .or_else(|_| NaiveTime::parse_from_str(&s, "%H:%M:%S"))
                .map(Some)
                .map_err(serde::de::Error::custom),
        }
    }
}
