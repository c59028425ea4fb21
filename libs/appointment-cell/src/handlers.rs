// libs/appointment-cell/src/handlers.rs
use std::sync::Arc;

use axum::{
    extract::{Extension, Path, Query, State},
    Json,
};
use axum_extra::TypedHeader;
use chrono::NaiveDate;
use headers::{authorization::Bearer, Authorization};
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

use scheduling_cell::availability::OccupancyView;
use shared_config::AppConfig;
use shared_models::auth::User;
use shared_models::error::AppError;

use crate::models::{BookAppointmentRequest, StatusUpdateRequest, UpdateAppointmentRequest};
use crate::services::booking::AppointmentBookingService;
use crate::services::schedule::ScheduleService;

// ==============================================================================
// QUERY PARAMETER STRUCTS
// ==============================================================================

#[derive(Debug, Deserialize)]
pub struct DayQuery {
    pub date: NaiveDate,
}

#[derive(Debug, Deserialize)]
pub struct DoctorDayQuery {
    pub date: NaiveDate,
    pub doctor: String,
}

#[derive(Debug, Deserialize)]
pub struct LayoutQuery {
    pub date: NaiveDate,
    pub doctor: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct DoctorRangeQuery {
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

// ==============================================================================
// BOOKING HANDLERS
// ==============================================================================

#[axum::debug_handler]
pub async fn book_appointment(
    State(state): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
    Json(request): Json<BookAppointmentRequest>,
) -> Result<Json<Value>, AppError> {
    let is_own_booking = request.patient_id.to_string() == user.id;
    if !is_own_booking && !user.is_staff() {
        return Err(AppError::Auth(
            "Not authorized to book appointment for this patient".to_string(),
        ));
    }

    let booking_service = AppointmentBookingService::new(&state);
    let appointment = booking_service
        .book(request, user.is_staff(), auth.token())
        .await
        .map_err(AppError::from)?;

    Ok(Json(json!({
        "success": true,
        "appointment": appointment,
    })))
}

#[axum::debug_handler]
pub async fn update_appointment(
    State(state): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
    Path(appointment_id): Path<Uuid>,
    Json(request): Json<UpdateAppointmentRequest>,
) -> Result<Json<Value>, AppError> {
    let booking_service = AppointmentBookingService::new(&state);

    let current = booking_service
        .get_appointment(appointment_id, auth.token())
        .await
        .map_err(AppError::from)?;
    if current.patient_id.to_string() != user.id && !user.is_staff() {
        return Err(AppError::Auth("Not authorized for this appointment".to_string()));
    }

    let appointment = booking_service
        .update(appointment_id, request, auth.token())
        .await
        .map_err(AppError::from)?;

    Ok(Json(json!({ "success": true, "appointment": appointment })))
}

#[axum::debug_handler]
pub async fn transition_status(
    State(state): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
    Path(appointment_id): Path<Uuid>,
    Json(request): Json<StatusUpdateRequest>,
) -> Result<Json<Value>, AppError> {
    if !user.is_staff() {
        return Err(AppError::Auth(
            "Only staff can change appointment status".to_string(),
        ));
    }

    let booking_service = AppointmentBookingService::new(&state);
    let appointment = booking_service
        .transition_status(appointment_id, request, auth.token())
        .await
        .map_err(AppError::from)?;

    Ok(Json(json!({ "success": true, "appointment": appointment })))
}

#[axum::debug_handler]
pub async fn request_cancellation(
    State(state): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
    Path(appointment_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let booking_service = AppointmentBookingService::new(&state);

    let current = booking_service
        .get_appointment(appointment_id, auth.token())
        .await
        .map_err(AppError::from)?;
    if current.patient_id.to_string() != user.id && !user.is_staff() {
        return Err(AppError::Auth("Not authorized for this appointment".to_string()));
    }

    let appointment = booking_service
        .request_cancellation(appointment_id, auth.token())
        .await
        .map_err(AppError::from)?;

    Ok(Json(json!({ "success": true, "appointment": appointment })))
}

#[axum::debug_handler]
pub async fn delete_appointment(
    State(state): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
    Path(appointment_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let booking_service = AppointmentBookingService::new(&state);

    let current = booking_service
        .get_appointment(appointment_id, auth.token())
        .await
        .map_err(AppError::from)?;
    if current.patient_id.to_string() != user.id && !user.is_staff() {
        return Err(AppError::Auth("Not authorized for this appointment".to_string()));
    }

    booking_service
        .delete(appointment_id, auth.token())
        .await
        .map_err(AppError::from)?;

    Ok(Json(json!({ "success": true })))
}

// ==============================================================================
// READ HANDLERS
// ==============================================================================

#[axum::debug_handler]
pub async fn get_appointment(
    State(state): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
    Path(appointment_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let booking_service = AppointmentBookingService::new(&state);
    let appointment = booking_service
        .get_appointment(appointment_id, auth.token())
        .await
        .map_err(AppError::from)?;

    if appointment.patient_id.to_string() != user.id && !user.is_staff() {
        return Err(AppError::Auth("Not authorized for this appointment".to_string()));
    }

    Ok(Json(json!({ "appointment": appointment })))
}

#[axum::debug_handler]
pub async fn get_patient_appointments(
    State(state): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
    Path(patient_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    if patient_id.to_string() != user.id && !user.is_staff() {
        return Err(AppError::Auth(
            "Not authorized to view this patient's appointments".to_string(),
        ));
    }

    let booking_service = AppointmentBookingService::new(&state);
    let appointments = booking_service
        .patient_appointments(patient_id, auth.token())
        .await
        .map_err(AppError::from)?;

    Ok(Json(json!({ "appointments": appointments })))
}

#[axum::debug_handler]
pub async fn get_doctor_appointments(
    State(state): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
    Path(doctor): Path<String>,
    Query(range): Query<DoctorRangeQuery>,
) -> Result<Json<Value>, AppError> {
    if !user.is_staff() {
        return Err(AppError::Auth(
            "Only staff can view a doctor's full schedule".to_string(),
        ));
    }

    let booking_service = AppointmentBookingService::new(&state);
    let appointments = booking_service
        .doctor_appointments(&doctor, range.from, range.to, auth.token())
        .await
        .map_err(AppError::from)?;

    Ok(Json(json!({ "appointments": appointments })))
}

// ==============================================================================
// SCHEDULE HANDLERS
// ==============================================================================

/// Private calendar classification for one doctor: unpaid pending requests
/// count as occupied here.
#[axum::debug_handler]
pub async fn get_doctor_day(
    State(state): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
    Query(query): Query<DoctorDayQuery>,
) -> Result<Json<Value>, AppError> {
    if !user.is_staff() {
        return Err(AppError::Auth("Only staff can view doctor calendars".to_string()));
    }

    let schedule_service = ScheduleService::new(&state);
    let slots = schedule_service
        .doctor_day(
            query.date,
            &query.doctor,
            OccupancyView::DoctorCalendar,
            auth.token(),
        )
        .await
        .map_err(AppError::from)?;

    Ok(Json(json!({ "date": query.date, "doctor": query.doctor, "slots": slots })))
}

/// Public "any doctor" availability used by booking surfaces. Abandoned
/// unpaid requests do not close slots here.
#[axum::debug_handler]
pub async fn get_public_availability(
    State(state): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Query(query): Query<DayQuery>,
) -> Result<Json<Value>, AppError> {
    let schedule_service = ScheduleService::new(&state);
    let slots = schedule_service
        .public_day(query.date, auth.token())
        .await
        .map_err(AppError::from)?;

    Ok(Json(json!({ "date": query.date, "slots": slots })))
}

#[axum::debug_handler]
pub async fn get_calendar_layout(
    State(state): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
    Query(query): Query<LayoutQuery>,
) -> Result<Json<Value>, AppError> {
    if !user.is_staff() {
        return Err(AppError::Auth("Only staff can view the clinic calendar".to_string()));
    }

    let schedule_service = ScheduleService::new(&state);
    let placements = schedule_service
        .calendar_layout(query.date, query.doctor.as_deref(), auth.token())
        .await
        .map_err(AppError::from)?;

    Ok(Json(json!({ "date": query.date, "placements": placements })))
}

#[axum::debug_handler]
pub async fn get_anonymized_day(
    State(state): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Query(query): Query<DayQuery>,
) -> Result<Json<Value>, AppError> {
    let schedule_service = ScheduleService::new(&state);
    let occupancy = schedule_service
        .anonymized_day(query.date, auth.token())
        .await
        .map_err(AppError::from)?;

    Ok(Json(json!({ "date": query.date, "occupancy": occupancy })))
}

#[axum::debug_handler]
pub async fn get_requests_inbox(
    State(state): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
) -> Result<Json<Value>, AppError> {
    if !user.is_staff() {
        return Err(AppError::Auth("Only staff can view the requests inbox".to_string()));
    }

    let schedule_service = ScheduleService::new(&state);
    let requests = schedule_service
        .requests_inbox(auth.token())
        .await
        .map_err(AppError::from)?;

    Ok(Json(json!({ "requests": requests })))
}
