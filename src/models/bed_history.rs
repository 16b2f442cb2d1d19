//! Bed allocation history

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

use super::bed::WardType;

/// One allocation episode of a bed
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BedHistory {
    pub id: i32,
    pub bed_number: i32,
    pub patient_name: String,
    pub allocated_at: DateTime<Utc>,
    /// Null while the episode is open
    pub discharged_at: Option<DateTime<Utc>>,
    pub is_active: bool,
    pub ward_type: WardType,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Data needed to open a new episode
#[derive(Debug, Clone, PartialEq)]
pub struct NewBedHistory {
    pub bed_number: i32,
    pub patient_name: String,
    pub allocated_at: DateTime<Utc>,
    pub ward_type: WardType,
}
