//! Wardwatch hospital resource tracker
//!
//! REST JSON API tracking bed occupancy, bed maintenance and medical
//! equipment assignment for a hospital ward dashboard.

use std::sync::Arc;

pub mod api;
pub mod config;
pub mod error;
pub mod models;
pub mod repository;
pub mod services;

pub use config::AppConfig;
pub use error::{AppError, AppResult};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub services: Arc<services::Services>,
}
