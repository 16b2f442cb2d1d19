//! API handlers for Wardwatch REST endpoints

pub mod auth;
pub mod beds;
pub mod equipment;
pub mod health;
pub mod openapi;

use axum::{
    async_trait,
    extract::{FromRequest, FromRequestParts},
    http::{header::AUTHORIZATION, request::Parts},
    routing::{delete, get, post},
    Router,
};
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::{error::AppError, models::user::Identity, AppState};

/// Header carrying a role override for the current request
pub const ROLE_HEADER: &str = "x-user-role";

/// Extractor resolving the caller through the access gate
pub struct AuthenticatedUser(pub Identity);

#[async_trait]
impl FromRequestParts<AppState> for AuthenticatedUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let token = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "))
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .ok_or_else(|| {
                AppError::Authentication("No authentication token, authorization denied".to_string())
            })?;

        let role_header = parts
            .headers
            .get(ROLE_HEADER)
            .and_then(|value| value.to_str().ok());

        let identity = state.services.auth.resolve(token, role_header).await?;
        Ok(AuthenticatedUser(identity))
    }
}

/// JSON body extractor whose rejections use the API error shape
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct AppJson<T>(pub T);

/// Create the application router with all routes
pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api = Router::new()
        // Health check
        .route("/health", get(health::health_check))
        .route("/ready", get(health::readiness_check))
        // Authentication
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        .route("/auth/me", get(auth::me))
        // Beds
        .route("/beds", get(beds::list_beds).post(beds::create_beds))
        .route("/beds/history", get(beds::bed_history))
        .route("/beds/allocate", post(beds::allocate_bed))
        .route("/beds/discharge", post(beds::discharge_patient))
        .route("/beds/maintenance", post(beds::start_maintenance))
        .route("/beds/return-from-maintenance", post(beds::end_maintenance))
        .route("/beds/:bed_number", delete(beds::remove_bed))
        // Equipment
        .route(
            "/equipment",
            get(equipment::list_equipment).post(equipment::create_equipment),
        )
        .route("/equipment/assign", post(equipment::assign_equipment))
        .route("/equipment/return", post(equipment::return_equipment))
        .route(
            "/equipment/by-patient/:patient_name",
            get(equipment::equipment_by_patient),
        )
        .with_state(state);

    Router::new()
        .nest("/api", api)
        .merge(openapi::create_openapi_router())
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new())
        .layer(cors)
}
