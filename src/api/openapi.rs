//! OpenAPI documentation

use axum::Router;
use utoipa::{
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    Modify, OpenApi,
};
use utoipa_swagger_ui::SwaggerUi;

use crate::api::{auth, beds, equipment, health};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Wardwatch API",
        version = "1.0.0",
        description = "Hospital bed and equipment tracking REST API",
        license(name = "AGPL-3.0", url = "https://www.gnu.org/licenses/agpl-3.0.html")
    ),
    servers(
        (url = "/api", description = "API")
    ),
    paths(
        // Health
        health::health_check,
        health::readiness_check,
        // Auth
        auth::register,
        auth::login,
        auth::me,
        // Beds
        beds::list_beds,
        beds::create_beds,
        beds::remove_bed,
        beds::bed_history,
        beds::allocate_bed,
        beds::discharge_patient,
        beds::start_maintenance,
        beds::end_maintenance,
        // Equipment
        equipment::list_equipment,
        equipment::create_equipment,
        equipment::assign_equipment,
        equipment::return_equipment,
        equipment::equipment_by_patient,
    ),
    components(
        schemas(
            // Auth
            auth::LoginRequest,
            auth::LoginResponse,
            auth::RegisterResponse,
            crate::models::user::User,
            crate::models::user::Role,
            crate::models::user::RegisterUser,
            crate::models::user::Identity,
            // Beds
            beds::BedsResponse,
            beds::CreateBedsResponse,
            beds::RemoveBedResponse,
            beds::BedHistoryResponse,
            beds::BedActionResponse,
            crate::models::bed::Bed,
            crate::models::bed::WardType,
            crate::models::bed::CreateBeds,
            crate::models::bed::AllocateBed,
            crate::models::bed::DischargePatient,
            crate::models::bed::BedMaintenance,
            crate::models::bed_history::BedHistory,
            crate::services::stats::BedStats,
            crate::services::stats::WardStats,
            crate::services::stats::WardBreakdown,
            // Equipment
            equipment::EquipmentListResponse,
            equipment::EquipmentActionResponse,
            equipment::PatientEquipmentResponse,
            crate::models::equipment::Equipment,
            crate::models::equipment::CreateEquipment,
            crate::models::equipment::AssignEquipment,
            crate::models::equipment::ReturnEquipment,
            crate::services::stats::EquipmentStats,
            // Health
            health::HealthResponse,
            // Errors
            crate::error::ErrorResponse,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "auth", description = "Registration, login and identity"),
        (name = "beds", description = "Bed inventory, allocation and maintenance"),
        (name = "equipment", description = "Equipment inventory and assignment")
    )
)]
pub struct ApiDoc;

/// Registers the bearer token scheme referenced by protected paths
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

/// Create the OpenAPI documentation router
pub fn create_openapi_router() -> Router {
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
}
