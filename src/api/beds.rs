//! Bed management endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;
use utoipa::ToSchema;
use validator::Validate;

use crate::{
    error::{AppError, AppResult},
    models::{
        bed::{AllocateBed, Bed, BedMaintenance, CreateBeds, DischargePatient},
        bed_history::BedHistory,
    },
    services::stats::BedStats,
    AppState,
};

use super::{AppJson, AuthenticatedUser};

/// Beds with dashboard statistics
#[derive(Serialize, ToSchema)]
pub struct BedsResponse {
    pub beds: Vec<Bed>,
    pub stats: BedStats,
}

/// Result of a bed creation batch
#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateBedsResponse {
    pub message: String,
    /// First bed number of the batch
    pub start_number: i32,
    /// Last bed number of the batch
    pub end_number: i32,
    pub beds: Vec<Bed>,
}

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RemoveBedResponse {
    pub message: String,
    pub removed_bed: Bed,
}

/// Recent allocation episodes, newest first
#[derive(Serialize, ToSchema)]
pub struct BedHistoryResponse {
    pub history: Vec<BedHistory>,
}

/// Outcome of a single bed transition
#[derive(Serialize, ToSchema)]
pub struct BedActionResponse {
    pub message: String,
    pub bed: Bed,
}

/// List beds
#[utoipa::path(
    get,
    path = "/beds",
    tag = "beds",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "All beds with statistics", body = BedsResponse),
        (status = 401, description = "Not authenticated", body = crate::error::ErrorResponse)
    )
)]
pub async fn list_beds(
    State(state): State<AppState>,
    AuthenticatedUser(_identity): AuthenticatedUser,
) -> AppResult<Json<BedsResponse>> {
    let (beds, stats) = state.services.beds.overview().await?;
    Ok(Json(BedsResponse { beds, stats }))
}

/// Add beds
#[utoipa::path(
    post,
    path = "/beds",
    tag = "beds",
    security(("bearer_auth" = [])),
    request_body = CreateBeds,
    responses(
        (status = 201, description = "Beds created", body = CreateBedsResponse),
        (status = 400, description = "Invalid count", body = crate::error::ErrorResponse),
        (status = 403, description = "Bed manager role required", body = crate::error::ErrorResponse)
    )
)]
pub async fn create_beds(
    State(state): State<AppState>,
    AuthenticatedUser(identity): AuthenticatedUser,
    AppJson(data): AppJson<CreateBeds>,
) -> AppResult<(StatusCode, Json<CreateBedsResponse>)> {
    identity.require_bed_manager()?;
    data.validate()?;

    let beds = state
        .services
        .beds
        .create_beds(data.count, data.ward_type.unwrap_or_default())
        .await?;

    let start_number = beds.first().map(|b| b.bed_number).unwrap_or_default();
    let end_number = beds.last().map(|b| b.bed_number).unwrap_or_default();

    Ok((
        StatusCode::CREATED,
        Json(CreateBedsResponse {
            message: format!(
                "{} new beds added (numbers {} to {})",
                beds.len(),
                start_number,
                end_number
            ),
            start_number,
            end_number,
            beds,
        }),
    ))
}

/// Remove a bed
#[utoipa::path(
    delete,
    path = "/beds/{bed_number}",
    tag = "beds",
    security(("bearer_auth" = [])),
    params(("bed_number" = i32, Path, description = "Bed number")),
    responses(
        (status = 200, description = "Bed removed", body = RemoveBedResponse),
        (status = 400, description = "Bed occupied or under maintenance", body = crate::error::ErrorResponse),
        (status = 404, description = "Bed not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn remove_bed(
    State(state): State<AppState>,
    AuthenticatedUser(identity): AuthenticatedUser,
    Path(bed_number): Path<String>,
) -> AppResult<Json<RemoveBedResponse>> {
    identity.require_bed_manager()?;

    let bed_number: i32 = bed_number
        .trim()
        .parse()
        .map_err(|_| AppError::Validation("Bed number must be a valid number".to_string()))?;

    let removed_bed = state.services.beds.remove_bed(bed_number).await?;

    Ok(Json(RemoveBedResponse {
        message: format!("Bed {} has been removed from the system", bed_number),
        removed_bed,
    }))
}

/// Recent allocation history
#[utoipa::path(
    get,
    path = "/beds/history",
    tag = "beds",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Most recent 100 episodes, newest first", body = BedHistoryResponse)
    )
)]
pub async fn bed_history(
    State(state): State<AppState>,
    AuthenticatedUser(_identity): AuthenticatedUser,
) -> AppResult<Json<BedHistoryResponse>> {
    let history = state.services.beds.history().await?;
    Ok(Json(BedHistoryResponse { history }))
}

/// Allocate a bed to a patient
#[utoipa::path(
    post,
    path = "/beds/allocate",
    tag = "beds",
    security(("bearer_auth" = [])),
    request_body = AllocateBed,
    responses(
        (status = 200, description = "Bed allocated", body = BedActionResponse),
        (status = 400, description = "No beds available", body = crate::error::ErrorResponse)
    )
)]
pub async fn allocate_bed(
    State(state): State<AppState>,
    AuthenticatedUser(identity): AuthenticatedUser,
    AppJson(data): AppJson<AllocateBed>,
) -> AppResult<Json<BedActionResponse>> {
    identity.require_bed_manager()?;
    data.validate()?;

    let bed = state
        .services
        .beds
        .allocate(&data.patient_name, data.ward_type)
        .await?;

    Ok(Json(BedActionResponse {
        message: format!(
            "Bed {} allocated to {}",
            bed.bed_number,
            bed.patient_name.as_deref().unwrap_or_default()
        ),
        bed,
    }))
}

/// Discharge a patient
#[utoipa::path(
    post,
    path = "/beds/discharge",
    tag = "beds",
    security(("bearer_auth" = [])),
    request_body = DischargePatient,
    responses(
        (status = 200, description = "Patient discharged", body = BedActionResponse),
        (status = 404, description = "Patient is not in any bed", body = crate::error::ErrorResponse)
    )
)]
pub async fn discharge_patient(
    State(state): State<AppState>,
    AuthenticatedUser(identity): AuthenticatedUser,
    AppJson(data): AppJson<DischargePatient>,
) -> AppResult<Json<BedActionResponse>> {
    identity.require_bed_manager()?;
    data.validate()?;

    let bed = state.services.beds.discharge(&data.patient_name).await?;

    Ok(Json(BedActionResponse {
        message: format!(
            "Patient {} discharged from bed {}",
            data.patient_name.trim(),
            bed.bed_number
        ),
        bed,
    }))
}

/// Put a bed under maintenance
#[utoipa::path(
    post,
    path = "/beds/maintenance",
    tag = "beds",
    security(("bearer_auth" = [])),
    request_body = BedMaintenance,
    responses(
        (status = 200, description = "Bed under maintenance", body = BedActionResponse),
        (status = 400, description = "Bed occupied or already under maintenance", body = crate::error::ErrorResponse),
        (status = 404, description = "Bed not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn start_maintenance(
    State(state): State<AppState>,
    AuthenticatedUser(identity): AuthenticatedUser,
    AppJson(data): AppJson<BedMaintenance>,
) -> AppResult<Json<BedActionResponse>> {
    identity.require_bed_manager()?;
    let bed_number = data.bed_number.positive("Bed number")?;

    let bed = state.services.beds.start_maintenance(bed_number).await?;

    Ok(Json(BedActionResponse {
        message: format!("Bed {} is now under maintenance", bed_number),
        bed,
    }))
}

/// Return a bed from maintenance
#[utoipa::path(
    post,
    path = "/beds/return-from-maintenance",
    tag = "beds",
    security(("bearer_auth" = [])),
    request_body = BedMaintenance,
    responses(
        (status = 200, description = "Bed available again", body = BedActionResponse),
        (status = 400, description = "Bed is not under maintenance", body = crate::error::ErrorResponse),
        (status = 404, description = "Bed not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn end_maintenance(
    State(state): State<AppState>,
    AuthenticatedUser(identity): AuthenticatedUser,
    AppJson(data): AppJson<BedMaintenance>,
) -> AppResult<Json<BedActionResponse>> {
    identity.require_bed_manager()?;
    let bed_number = data.bed_number.positive("Bed number")?;

    let bed = state.services.beds.end_maintenance(bed_number).await?;

    Ok(Json(BedActionResponse {
        message: format!("Bed {} has been returned from maintenance", bed_number),
        bed,
    }))
}
