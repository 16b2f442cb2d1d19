//! Equipment model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

use super::input::NumericInput;
use crate::error::{AppError, AppResult};

/// Equipment record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Equipment {
    pub id: i32,
    pub name: String,
    /// Free-text category, e.g. "ventilator"
    #[serde(rename = "type")]
    pub equipment_type: String,
    pub serial_number: Option<String>,
    pub is_in_use: bool,
    pub patient_name: Option<String>,
    pub assigned_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EquipmentState {
    Available,
    InUse,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EquipmentEvent {
    Assign,
    Return,
}

impl Equipment {
    pub fn state(&self) -> EquipmentState {
        if self.is_in_use {
            EquipmentState::InUse
        } else {
            EquipmentState::Available
        }
    }

    pub fn transition(&self, event: EquipmentEvent) -> AppResult<EquipmentState> {
        match (self.state(), event) {
            (EquipmentState::Available, EquipmentEvent::Assign) => Ok(EquipmentState::InUse),
            (EquipmentState::InUse, EquipmentEvent::Return) => Ok(EquipmentState::Available),
            (EquipmentState::InUse, EquipmentEvent::Assign) => {
                Err(AppError::Conflict("Equipment already in use".to_string()))
            }
            (EquipmentState::Available, EquipmentEvent::Return) => {
                Err(AppError::Conflict("Equipment is not currently in use".to_string()))
            }
        }
    }
}

/// Generate a serial number for equipment registered without one
pub fn generate_serial_number() -> String {
    let id = uuid::Uuid::new_v4().simple().to_string().to_uppercase();
    format!("EQ-{}", &id[..12])
}

/// Create equipment request
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateEquipment {
    #[validate(length(min = 1, message = "Please provide equipment name and type"))]
    pub name: String,
    #[serde(rename = "type")]
    #[validate(length(min = 1, message = "Please provide equipment name and type"))]
    pub equipment_type: String,
    /// Generated when omitted or blank
    pub serial_number: Option<String>,
}

/// Validated equipment ready for insertion
#[derive(Debug, Clone, PartialEq)]
pub struct NewEquipment {
    pub name: String,
    pub equipment_type: String,
    pub serial_number: String,
}

/// Assign equipment request
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AssignEquipment {
    #[schema(value_type = String, example = "3")]
    pub equipment_id: NumericInput,
    #[validate(length(min = 1, message = "Please provide equipment ID and patient name"))]
    pub patient_name: String,
}

/// Return equipment request
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReturnEquipment {
    #[schema(value_type = String, example = "3")]
    pub equipment_id: NumericInput,
}

#[cfg(test)]
pub(crate) fn sample_equipment(id: i32) -> Equipment {
    Equipment {
        id,
        name: "Infusion pump".to_string(),
        equipment_type: "pump".to_string(),
        serial_number: Some(format!("SN-{}", id)),
        is_in_use: false,
        patient_name: None,
        assigned_at: None,
        created_at: Utc::now(),
    }
}
