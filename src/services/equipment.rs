//! Equipment service

use std::sync::Arc;

use chrono::Utc;

use crate::{
    error::{AppError, AppResult},
    models::equipment::{
        generate_serial_number, CreateEquipment, Equipment, EquipmentEvent, NewEquipment,
    },
    repository::EquipmentStore,
};

use super::stats::{equipment_stats, EquipmentStats};

#[derive(Clone)]
pub struct EquipmentService {
    store: Arc<dyn EquipmentStore>,
}

impl EquipmentService {
    pub fn new(store: Arc<dyn EquipmentStore>) -> Self {
        Self { store }
    }

    pub async fn overview(&self) -> AppResult<(Vec<Equipment>, EquipmentStats)> {
        let equipment = self.store.list().await?;
        let stats = equipment_stats(&equipment);
        Ok((equipment, stats))
    }

    pub async fn create(&self, data: &CreateEquipment) -> AppResult<Equipment> {
        let name = data.name.trim();
        let equipment_type = data.equipment_type.trim();
        if name.is_empty() || equipment_type.is_empty() {
            return Err(AppError::Validation(
                "Please provide equipment name and type".to_string(),
            ));
        }

        let serial_number = match data.serial_number.as_deref().map(str::trim) {
            Some(serial) if !serial.is_empty() => {
                if self.store.serial_exists(serial).await? {
                    return Err(AppError::Conflict(format!(
                        "Equipment with serial number {} already exists",
                        serial
                    )));
                }
                serial.to_string()
            }
            _ => generate_serial_number(),
        };

        let new = NewEquipment {
            name: name.to_string(),
            equipment_type: equipment_type.to_string(),
            serial_number,
        };

        match self.store.insert(&new).await {
            Ok(equipment) => {
                tracing::info!(equipment_id = equipment.id, serial = %new.serial_number, "Equipment added");
                Ok(equipment)
            }
            Err(e) if e.is_unique_violation() => Err(AppError::Conflict(
                "Duplicate equipment serial number. Please use a unique serial number.".to_string(),
            )),
            Err(e) => Err(e),
        }
    }

    pub async fn assign(&self, equipment_id: i32, patient_name: &str) -> AppResult<Equipment> {
        let patient = patient_name.trim();
        if patient.is_empty() {
            return Err(AppError::Validation(
                "Please provide equipment ID and patient name".to_string(),
            ));
        }

        let equipment = self.get(equipment_id).await?;
        equipment.transition(EquipmentEvent::Assign)?;

        let assigned = self
            .store
            .claim(equipment_id, patient, Utc::now())
            .await?
            .ok_or_else(|| AppError::Conflict("Equipment already in use".to_string()))?;

        tracing::info!(equipment_id, patient, "Equipment assigned");
        Ok(assigned)
    }

    /// Release equipment; returns the record and the patient it came from
    pub async fn return_equipment(&self, equipment_id: i32) -> AppResult<(Equipment, String)> {
        let equipment = self.get(equipment_id).await?;
        equipment.transition(EquipmentEvent::Return)?;
        let patient = equipment.patient_name.clone().unwrap_or_default();

        let returned = self
            .store
            .release(equipment_id)
            .await?
            .ok_or_else(|| AppError::Conflict("Equipment is not currently in use".to_string()))?;

        tracing::info!(equipment_id, patient = %patient, "Equipment returned");
        Ok((returned, patient))
    }

    pub async fn by_patient(&self, patient_name: &str) -> AppResult<Vec<Equipment>> {
        let patient = patient_name.trim();
        if patient.is_empty() {
            return Err(AppError::Validation("Please provide a patient name".to_string()));
        }
        self.store.list_by_patient(patient).await
    }

    async fn get(&self, equipment_id: i32) -> AppResult<Equipment> {
        self.store
            .get(equipment_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Equipment not found".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::equipment::sample_equipment;
    use crate::repository::equipment::MockEquipmentStore;
    use tokio_test::{assert_err, assert_ok};

    fn in_use(id: i32, patient: &str) -> Equipment {
        Equipment {
            is_in_use: true,
            patient_name: Some(patient.to_string()),
            assigned_at: Some(Utc::now()),
            ..sample_equipment(id)
        }
    }

    fn request(serial: Option<&str>) -> CreateEquipment {
        CreateEquipment {
            name: "Ventilator".into(),
            equipment_type: "respiratory".into(),
            serial_number: serial.map(String::from),
        }
    }

    #[tokio::test]
    async fn duplicate_serial_conflicts() {
        let mut store = MockEquipmentStore::new();
        store.expect_serial_exists().returning(|_| Ok(true));
        store.expect_insert().never();

        let err = assert_err!(EquipmentService::new(Arc::new(store)).create(&request(Some("V-1"))).await);
        assert_eq!(err.to_string(), "Conflict: Equipment with serial number V-1 already exists");
    }

    #[tokio::test]
    async fn missing_serial_is_generated() {
        let mut store = MockEquipmentStore::new();
        store.expect_serial_exists().never();
        store
            .expect_insert()
            .withf(|new| new.serial_number.starts_with("EQ-") && new.name == "Ventilator")
            .times(1)
            .returning(|new| {
                Ok(Equipment {
                    serial_number: Some(new.serial_number.clone()),
                    ..sample_equipment(1)
                })
            });

        let service = EquipmentService::new(Arc::new(store));
        assert_ok!(service.create(&request(Some("  "))).await);
    }

    #[tokio::test]
    async fn blank_name_is_rejected() {
        let mut store = MockEquipmentStore::new();
        store.expect_insert().never();
        let data = CreateEquipment {
            name: " ".into(),
            ..request(None)
        };

        let err = assert_err!(EquipmentService::new(Arc::new(store)).create(&data).await);
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn assign_unknown_equipment_is_not_found() {
        let mut store = MockEquipmentStore::new();
        store.expect_get().returning(|_| Ok(None));
        store.expect_claim().never();

        let err = assert_err!(EquipmentService::new(Arc::new(store)).assign(42, "Alice").await);
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn second_assign_conflicts() {
        let mut store = MockEquipmentStore::new();
        store.expect_get().returning(|id| Ok(Some(in_use(id, "Alice"))));
        store.expect_claim().never();

        let err = assert_err!(EquipmentService::new(Arc::new(store)).assign(1, "Bob").await);
        assert!(matches!(err, AppError::Conflict(_)));
    }

    #[tokio::test]
    async fn assign_marks_in_use() {
        let mut store = MockEquipmentStore::new();
        store.expect_get().returning(|id| Ok(Some(sample_equipment(id))));
        store.expect_claim().times(1).returning(|id, patient, _| {
            assert_eq!(patient, "Alice");
            Ok(Some(in_use(id, patient)))
        });

        let eq = assert_ok!(EquipmentService::new(Arc::new(store)).assign(1, "Alice").await);
        assert!(eq.is_in_use);
        assert_eq!(eq.patient_name.as_deref(), Some("Alice"));
    }

    #[tokio::test]
    async fn return_reports_previous_patient() {
        let mut store = MockEquipmentStore::new();
        store.expect_get().returning(|id| Ok(Some(in_use(id, "Alice"))));
        store.expect_release().returning(|id| Ok(Some(sample_equipment(id))));

        let (eq, patient) = assert_ok!(EquipmentService::new(Arc::new(store)).return_equipment(3).await);
        assert!(!eq.is_in_use);
        assert_eq!(patient, "Alice");
    }

    #[tokio::test]
    async fn return_of_idle_equipment_conflicts() {
        let mut store = MockEquipmentStore::new();
        store.expect_get().returning(|id| Ok(Some(sample_equipment(id))));
        store.expect_release().never();

        let err = assert_err!(EquipmentService::new(Arc::new(store)).return_equipment(3).await);
        assert!(matches!(err, AppError::Conflict(_)));
    }

    #[tokio::test]
    async fn usage_rate_of_empty_inventory_is_zero() {
        let mut store = MockEquipmentStore::new();
        store.expect_list().returning(|| Ok(Vec::new()));

        let (items, stats) = assert_ok!(EquipmentService::new(Arc::new(store)).overview().await);
        assert!(items.is_empty());
        assert_eq!(stats.usage_rate, 0);
    }
}
