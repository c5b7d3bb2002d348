//! Endpoint handlers.

use crate::error::{ApiError, ApiResult};
use crate::AppState;
use api_shared::wire;
use api_shared::HealthService;
use axum::extract::{Path, State};
use axum::Json;
use echo_core::{Examination, MedicalRecordNumber, Patient};

#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Health check response", body = wire::HealthRes)
    )
)]
/// Health check endpoint used by monitoring.
#[axum::debug_handler]
pub async fn health(State(_state): State<AppState>) -> Json<wire::HealthRes> {
    Json(HealthService::check_health())
}

#[utoipa::path(
    get,
    path = "/api/patients/{rm}",
    params(
        ("rm" = String, Path, description = "Medical record number")
    ),
    responses(
        (status = 200, description = "Registered patient", body = wire::PatientBody),
        (status = 404, description = "Patient not found", body = wire::ErrorRes),
        (status = 500, description = "Internal server error", body = wire::ErrorRes)
    )
)]
/// Look up a patient by medical record number.
#[axum::debug_handler]
pub async fn get_patient(
    State(state): State<AppState>,
    Path(rm): Path<String>,
) -> ApiResult<Json<wire::PatientBody>> {
    // An RM that cannot exist is simply not registered.
    let rm = MedicalRecordNumber::parse(&rm).map_err(|_| ApiError::PatientNotFound)?;
    let patient = state.service.find_patient(&rm)?;
    Ok(Json(patient.into()))
}

#[utoipa::path(
    post,
    path = "/api/patients",
    request_body = wire::PatientBody,
    responses(
        (status = 200, description = "Patient saved", body = wire::MessageRes),
        (status = 400, description = "Invalid patient data", body = wire::ErrorRes),
        (status = 500, description = "Internal server error", body = wire::ErrorRes)
    )
)]
/// Register a patient or replace the record with the same RM.
#[axum::debug_handler]
pub async fn save_patient(
    State(state): State<AppState>,
    Json(body): Json<wire::PatientBody>,
) -> ApiResult<Json<wire::MessageRes>> {
    let patient = Patient::try_from(body)?;
    state.service.save_patient(patient)?;
    Ok(Json(wire::MessageRes {
        message: "Patient data saved".into(),
    }))
}

#[utoipa::path(
    get,
    path = "/api/examinations",
    responses(
        (status = 200, description = "All examinations, newest first", body = [wire::ExaminationBody]),
        (status = 500, description = "Internal server error", body = wire::ErrorRes)
    )
)]
/// List the examination history, newest first.
#[axum::debug_handler]
pub async fn list_examinations(
    State(state): State<AppState>,
) -> ApiResult<Json<Vec<wire::ExaminationBody>>> {
    let history = state.service.history()?;
    Ok(Json(history.into_iter().map(Into::into).collect()))
}

#[utoipa::path(
    post,
    path = "/api/examinations",
    request_body = wire::ExaminationBody,
    responses(
        (status = 200, description = "Examination saved", body = wire::MessageRes),
        (status = 500, description = "Internal server error", body = wire::ErrorRes)
    )
)]
/// Store an examination report produced by the client.
#[axum::debug_handler]
pub async fn save_examination(
    State(state): State<AppState>,
    Json(body): Json<wire::ExaminationBody>,
) -> ApiResult<Json<wire::MessageRes>> {
    state.service.record_examination(Examination::from(body))?;
    Ok(Json(wire::MessageRes {
        message: "Examination data saved".into(),
    }))
}

#[utoipa::path(
    post,
    path = "/api/examinations/calculate",
    request_body = wire::CalculateReq,
    responses(
        (status = 200, description = "Examination recorded", body = wire::CalculateRes),
        (status = 400, description = "Invalid measurements", body = wire::ErrorRes),
        (status = 404, description = "Patient not found", body = wire::ErrorRes),
        (status = 500, description = "Internal server error", body = wire::ErrorRes)
    )
)]
/// Calculate, format and record an examination for a registered patient.
#[axum::debug_handler]
pub async fn calculate_examination(
    State(state): State<AppState>,
    Json(req): Json<wire::CalculateReq>,
) -> ApiResult<Json<wire::CalculateRes>> {
    let rm = MedicalRecordNumber::parse(&req.rm).map_err(|_| ApiError::PatientNotFound)?;
    let outcome = state.service.examine(&rm, &req.measurements)?;

    Ok(Json(wire::CalculateRes {
        metrics: wire::MetricsRes::from(&outcome.metrics),
        examination: outcome.examination.into(),
    }))
}
