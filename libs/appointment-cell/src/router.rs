// libs/appointment-cell/src/router.rs
use std::sync::Arc;

use axum::{
    middleware,
    routing::{delete, get, patch, post, put},
    Router,
};

use shared_config::AppConfig;
use shared_utils::extractor::auth_middleware;

use crate::handlers;

pub fn appointment_routes(state: Arc<AppConfig>) -> Router {
    // All appointment operations require authentication
    let protected_routes = Router::new()
        // Booking and lifecycle
        .route("/", post(handlers::book_appointment))
        .route("/{appointment_id}", get(handlers::get_appointment))
        .route("/{appointment_id}", put(handlers::update_appointment))
        .route("/{appointment_id}", delete(handlers::delete_appointment))
        .route("/{appointment_id}/status", patch(handlers::transition_status))
        .route(
            "/{appointment_id}/request-cancellation",
            post(handlers::request_cancellation),
        )
        // Listings
        .route("/patients/{patient_id}", get(handlers::get_patient_appointments))
        .route("/doctors/{doctor}", get(handlers::get_doctor_appointments))
        .route("/requests", get(handlers::get_requests_inbox))
        // Schedule surfaces
        .route("/schedule/doctor-day", get(handlers::get_doctor_day))
        .route("/schedule/availability", get(handlers::get_public_availability))
        .route("/schedule/layout", get(handlers::get_calendar_layout))
        .route("/schedule/occupancy", get(handlers::get_anonymized_day))
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware));

    Router::new().merge(protected_routes).with_state(state)
}
