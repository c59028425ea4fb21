// libs/doctor-cell/src/handlers.rs
use std::sync::Arc;

use axum::{
    extract::{Path, State},
    Json,
};
use axum_extra::TypedHeader;
use headers::{authorization::Bearer, Authorization};
use serde_json::{json, Value};

use shared_config::AppConfig;
use shared_models::error::AppError;

use crate::services::directory::DoctorDirectoryService;

#[axum::debug_handler]
pub async fn list_doctors(
    State(state): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
) -> Result<Json<Value>, AppError> {
    let directory = DoctorDirectoryService::new(&state);

    let doctors = directory
        .list_doctors(auth.token())
        .await
        .map_err(|e| AppError::ExternalService(e.to_string()))?;

    Ok(Json(json!({ "doctors": doctors })))
}

#[axum::debug_handler]
pub async fn get_doctor(
    State(state): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Path(name): Path<String>,
) -> Result<Json<Value>, AppError> {
    let directory = DoctorDirectoryService::new(&state);

    let doctor = directory
        .get_by_name(&name, auth.token())
        .await
        .map_err(|e| AppError::ExternalService(e.to_string()))?
        .ok_or_else(|| AppError::NotFound(format!("Doctor {} not found", name)))?;

    Ok(Json(json!({ "doctor": doctor })))
}
