//! Equipment API endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;
use utoipa::ToSchema;
use validator::Validate;

use crate::{
    error::AppResult,
    models::equipment::{AssignEquipment, CreateEquipment, Equipment, ReturnEquipment},
    services::stats::EquipmentStats,
    AppState,
};

use super::{AppJson, AuthenticatedUser};

#[derive(Serialize, ToSchema)]
pub struct EquipmentListResponse {
    pub equipment: Vec<Equipment>,
    pub stats: EquipmentStats,
}

/// Outcome of an equipment operation
#[derive(Serialize, ToSchema)]
pub struct EquipmentActionResponse {
    pub message: String,
    pub equipment: Equipment,
}

#[derive(Serialize, ToSchema)]
pub struct PatientEquipmentResponse {
    pub count: usize,
    pub equipment: Vec<Equipment>,
}

/// List all equipment
#[utoipa::path(
    get,
    path = "/equipment",
    tag = "equipment",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Equipment list with usage statistics", body = EquipmentListResponse)
    )
)]
pub async fn list_equipment(
    State(state): State<AppState>,
    AuthenticatedUser(_identity): AuthenticatedUser,
) -> AppResult<Json<EquipmentListResponse>> {
    let (equipment, stats) = state.services.equipment.overview().await?;
    Ok(Json(EquipmentListResponse { equipment, stats }))
}

/// Register equipment
#[utoipa::path(
    post,
    path = "/equipment",
    tag = "equipment",
    security(("bearer_auth" = [])),
    request_body = CreateEquipment,
    responses(
        (status = 201, description = "Equipment created", body = EquipmentActionResponse),
        (status = 400, description = "Missing fields or duplicate serial number", body = crate::error::ErrorResponse)
    )
)]
pub async fn create_equipment(
    State(state): State<AppState>,
    AuthenticatedUser(identity): AuthenticatedUser,
    AppJson(data): AppJson<CreateEquipment>,
) -> AppResult<(StatusCode, Json<EquipmentActionResponse>)> {
    identity.require_equipment_access()?;
    data.validate()?;

    let equipment = state.services.equipment.create(&data).await?;
    Ok((
        StatusCode::CREATED,
        Json(EquipmentActionResponse {
            message: "New equipment added successfully".to_string(),
            equipment,
        }),
    ))
}

/// Assign equipment to a patient
#[utoipa::path(
    post,
    path = "/equipment/assign",
    tag = "equipment",
    security(("bearer_auth" = [])),
    request_body = AssignEquipment,
    responses(
        (status = 200, description = "Equipment assigned", body = EquipmentActionResponse),
        (status = 400, description = "Equipment already in use", body = crate::error::ErrorResponse),
        (status = 404, description = "Equipment not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn assign_equipment(
    State(state): State<AppState>,
    AuthenticatedUser(identity): AuthenticatedUser,
    AppJson(data): AppJson<AssignEquipment>,
) -> AppResult<Json<EquipmentActionResponse>> {
    identity.require_equipment_access()?;
    data.validate()?;
    let equipment_id = data.equipment_id.positive("Equipment ID")?;

    let equipment = state
        .services
        .equipment
        .assign(equipment_id, &data.patient_name)
        .await?;

    Ok(Json(EquipmentActionResponse {
        message: format!("{} assigned to {}", equipment.name, data.patient_name.trim()),
        equipment,
    }))
}

/// Return equipment from a patient
#[utoipa::path(
    post,
    path = "/equipment/return",
    tag = "equipment",
    security(("bearer_auth" = [])),
    request_body = ReturnEquipment,
    responses(
        (status = 200, description = "Equipment returned", body = EquipmentActionResponse),
        (status = 400, description = "Equipment is not in use", body = crate::error::ErrorResponse),
        (status = 404, description = "Equipment not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn return_equipment(
    State(state): State<AppState>,
    AuthenticatedUser(identity): AuthenticatedUser,
    AppJson(data): AppJson<ReturnEquipment>,
) -> AppResult<Json<EquipmentActionResponse>> {
    identity.require_equipment_access()?;
    let equipment_id = data.equipment_id.positive("Equipment ID")?;

    let (equipment, patient) = state
        .services
        .equipment
        .return_equipment(equipment_id)
        .await?;

    Ok(Json(EquipmentActionResponse {
        message: format!("{} returned from {}", equipment.name, patient),
        equipment,
    }))
}

/// Equipment currently assigned to a patient
#[utoipa::path(
    get,
    path = "/equipment/by-patient/{patient_name}",
    tag = "equipment",
    security(("bearer_auth" = [])),
    params(("patient_name" = String, Path, description = "Patient name")),
    responses(
        (status = 200, description = "Equipment assigned to the patient", body = PatientEquipmentResponse)
    )
)]
pub async fn equipment_by_patient(
    State(state): State<AppState>,
    AuthenticatedUser(_identity): AuthenticatedUser,
    Path(patient_name): Path<String>,
) -> AppResult<Json<PatientEquipmentResponse>> {
    let equipment = state.services.equipment.by_patient(&patient_name).await?;
    Ok(Json(PatientEquipmentResponse {
        count: equipment.len(),
        equipment,
    }))
}
