//! Bed model and its occupancy state machine

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{Decode, Encode, FromRow, Postgres};
use utoipa::ToSchema;
use validator::Validate;

use super::input::NumericInput;
use crate::error::{AppError, AppResult};

/// Ward classification, fixed when the bed is created
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum WardType {
    #[default]
    General,
    Icu,
}

impl WardType {
    pub fn as_str(&self) -> &'static str {
        match self {
            WardType::General => "general",
            WardType::Icu => "icu",
        }
    }
}

impl std::fmt::Display for WardType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for WardType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "general" => Ok(WardType::General),
            "icu" => Ok(WardType::Icu),
            _ => Err(format!("Invalid ward type: {}", s)),
        }
    }
}

// Stored as TEXT
impl sqlx::Type<Postgres> for WardType {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <String as sqlx::Type<Postgres>>::type_info()
    }
}

impl<'r> Decode<'r, Postgres> for WardType {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let s: String = Decode::<Postgres>::decode(value)?;
        s.parse().map_err(|e: String| e.into())
    }
}

impl Encode<'_, Postgres> for WardType {
    fn encode_by_ref(&self, buf: &mut sqlx::postgres::PgArgumentBuffer) -> sqlx::encode::IsNull {
        <&str as Encode<Postgres>>::encode(self.as_str(), buf)
    }
}

/// Bed record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Bed {
    pub bed_number: i32,
    pub is_occupied: bool,
    /// Set only while the bed is occupied
    pub patient_name: Option<String>,
    pub allocated_at: Option<DateTime<Utc>>,
    pub is_under_maintenance: bool,
    pub maintenance_start_time: Option<DateTime<Utc>>,
    pub ward_type: WardType,
    pub created_at: DateTime<Utc>,
}

/// Observable state of a bed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BedState {
    Available,
    Occupied,
    Maintenance,
}

/// Requested change to a bed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BedEvent {
    Allocate,
    Discharge,
    StartMaintenance,
    EndMaintenance,
    Remove,
}

impl Bed {
    pub fn state(&self) -> BedState {
        if self.is_occupied {
            BedState::Occupied
        } else if self.is_under_maintenance {
            BedState::Maintenance
        } else {
            BedState::Available
        }
    }

    /// Validate `event` against the current state and return the state the
    /// bed moves to. `Remove` leaves the bed in `Available` until deleted.
    pub fn transition(&self, event: BedEvent) -> AppResult<BedState> {
        let n = self.bed_number;
        match (self.state(), event) {
            (BedState::Available, BedEvent::Allocate) => Ok(BedState::Occupied),
            (BedState::Occupied, BedEvent::Discharge) => Ok(BedState::Available),
            (BedState::Available, BedEvent::StartMaintenance) => Ok(BedState::Maintenance),
            (BedState::Maintenance, BedEvent::EndMaintenance) => Ok(BedState::Available),
            (BedState::Available, BedEvent::Remove) => Ok(BedState::Available),

            (BedState::Occupied, BedEvent::Allocate) => {
                Err(AppError::Conflict(format!("Bed {} is already occupied", n)))
            }
            (BedState::Maintenance, BedEvent::Allocate) => {
                Err(AppError::Conflict(format!("Bed {} is under maintenance", n)))
            }
            (_, BedEvent::Discharge) => {
                Err(AppError::Conflict(format!("Bed {} is not occupied", n)))
            }
            (BedState::Occupied, BedEvent::StartMaintenance) => Err(AppError::Conflict(format!(
                "Bed {} is occupied. Please discharge the patient first.",
                n
            ))),
            (BedState::Maintenance, BedEvent::StartMaintenance) => {
                Err(AppError::Conflict(format!("Bed {} is already under maintenance", n)))
            }
            (_, BedEvent::EndMaintenance) => {
                Err(AppError::Conflict(format!("Bed {} is not under maintenance", n)))
            }
            (BedState::Occupied, BedEvent::Remove) => Err(AppError::Conflict(
                "Cannot remove an occupied bed. Please discharge the patient first.".to_string(),
            )),
            (BedState::Maintenance, BedEvent::Remove) => Err(AppError::Conflict(
                "Cannot remove a bed under maintenance. Please return it from maintenance first."
                    .to_string(),
            )),
        }
    }
}

/// Bed numbers assigned to a batch of `count` new beds when the highest
/// existing number is `current_max`.
pub fn next_bed_numbers(current_max: Option<i32>, count: i32) -> std::ops::RangeInclusive<i32> {
    let start = current_max.unwrap_or(0) + 1;
    start..=start + count - 1
}

/// Create beds request
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateBeds {
    #[validate(range(min = 1, max = 500, message = "Please provide a count between 1 and 500"))]
    pub count: i32,
    pub ward_type: Option<WardType>,
}

/// Allocate bed request
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AllocateBed {
    #[validate(length(min = 1, message = "Please provide a patient name"))]
    pub patient_name: String,
    /// Restrict the search to one ward
    pub ward_type: Option<WardType>,
}

/// Discharge patient request
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DischargePatient {
    #[validate(length(min = 1, message = "Please provide a patient name"))]
    pub patient_name: String,
}

/// Maintenance request, addressed by bed number
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BedMaintenance {
    #[schema(value_type = String, example = "12")]
    pub bed_number: NumericInput,
}

#[cfg(test)]
pub(crate) fn sample_bed(bed_number: i32) -> Bed {
    Bed {
        bed_number,
        is_occupied: false,
        patient_name: None,
        allocated_at: None,
        is_under_maintenance: false,
        maintenance_start_time: None,
        ward_type: WardType::General,
        created_at: Utc::now(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn occupied(n: i32, patient: &str) -> Bed {
        Bed {
            is_occupied: true,
            patient_name: Some(patient.to_string()),
            allocated_at: Some(Utc::now()),
            ..sample_bed(n)
        }
    }

    fn in_maintenance(n: i32) -> Bed {
        Bed {
            is_under_maintenance: true,
            maintenance_start_time: Some(Utc::now()),
            ..sample_bed(n)
        }
    }

    #[test]
    fn state_is_derived_from_flags() {
        assert_eq!(sample_bed(1).state(), BedState::Available);
        assert_eq!(occupied(1, "Alice").state(), BedState::Occupied);
        assert_eq!(in_maintenance(1).state(), BedState::Maintenance);
    }

    #[test]
    fn allowed_transitions() {
        let bed = sample_bed(3);
        assert_eq!(bed.transition(BedEvent::Allocate).unwrap(), BedState::Occupied);
        assert_eq!(bed.transition(BedEvent::StartMaintenance).unwrap(), BedState::Maintenance);
        assert_eq!(bed.transition(BedEvent::Remove).unwrap(), BedState::Available);
        assert_eq!(
            occupied(3, "Alice").transition(BedEvent::Discharge).unwrap(),
            BedState::Available
        );
        assert_eq!(
            in_maintenance(3).transition(BedEvent::EndMaintenance).unwrap(),
            BedState::Available
        );
    }

    #[test]
    fn occupied_and_maintenance_never_overlap() {
        let err = occupied(4, "Bob").transition(BedEvent::StartMaintenance).unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
        let err = in_maintenance(4).transition(BedEvent::Allocate).unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
    }

    #[test]
    fn busy_beds_cannot_be_removed() {
        for bed in [occupied(5, "Carol"), in_maintenance(5)] {
            assert!(matches!(bed.transition(BedEvent::Remove), Err(AppError::Conflict(_))));
        }
    }

    #[test]
    fn maintenance_end_requires_maintenance() {
        let err = sample_bed(6).transition(BedEvent::EndMaintenance).unwrap_err();
        assert_eq!(err.to_string(), "Conflict: Bed 6 is not under maintenance");
    }

    #[test]
    fn numbering_continues_after_highest_bed() {
        assert_eq!(next_bed_numbers(Some(7), 5), 8..=12);
        assert_eq!(next_bed_numbers(None, 3), 1..=3);
    }

    #[test]
    fn ward_type_round_trips_through_strings() {
        assert_eq!("ICU".parse::<WardType>().unwrap(), WardType::Icu);
        assert_eq!(WardType::General.to_string(), "general");
        assert!("maternity".parse::<WardType>().is_err());
    }
}
