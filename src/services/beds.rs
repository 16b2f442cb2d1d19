//! Bed allocation, discharge and maintenance

use std::sync::Arc;

use chrono::Utc;

use crate::{
    error::{AppError, AppResult},
    models::{
        bed::{next_bed_numbers, Bed, BedEvent, WardType},
        bed_history::{BedHistory, NewBedHistory},
    },
    repository::{BedStore, HistoryLedger},
};

use super::stats::{bed_stats, BedStats};

/// Number of history records returned by [`BedsService::history`]
pub const HISTORY_LIMIT: i64 = 100;

#[derive(Clone)]
pub struct BedsService {
    beds: Arc<dyn BedStore>,
    history: Arc<dyn HistoryLedger>,
}

fn changed_concurrently(bed_number: i32) -> AppError {
    AppError::Conflict(format!(
        "Bed {} was modified by another request, please retry",
        bed_number
    ))
}

fn patient_name(raw: &str) -> AppResult<&str> {
    let name = raw.trim();
    if name.is_empty() {
        return Err(AppError::Validation("Please provide a patient name".to_string()));
    }
    Ok(name)
}

impl BedsService {
    pub fn new(beds: Arc<dyn BedStore>, history: Arc<dyn HistoryLedger>) -> Self {
        Self { beds, history }
    }

    pub async fn health_check(&self) -> AppResult<()> {
        self.beds.health_check().await
    }

    /// All beds with their aggregated statistics
    pub async fn overview(&self) -> AppResult<(Vec<Bed>, BedStats)> {
        let beds = self.beds.list().await?;
        let stats = bed_stats(&beds);
        Ok((beds, stats))
    }

    /// Create `count` beds numbered after the current highest bed
    pub async fn create_beds(&self, count: i32, ward_type: WardType) -> AppResult<Vec<Bed>> {
        if count < 1 {
            return Err(AppError::Validation("Please provide a valid number of beds".to_string()));
        }

        let current_max = self.beds.max_bed_number().await?;
        let numbers: Vec<i32> = next_bed_numbers(current_max, count).collect();

        let mut beds = match self.beds.insert_many(numbers, ward_type).await {
            Ok(beds) => beds,
            Err(e) if e.is_unique_violation() => {
                return Err(AppError::Conflict(
                    "Bed numbers changed while creating beds, please retry".to_string(),
                ))
            }
            Err(e) => return Err(e),
        };
        beds.sort_by_key(|b| b.bed_number);

        tracing::info!(count, ward_type = %ward_type, "Beds created");
        Ok(beds)
    }

    /// Remove an idle bed. History records are kept.
    pub async fn remove_bed(&self, bed_number: i32) -> AppResult<Bed> {
        let bed = self
            .beds
            .get(bed_number)
            .await?
            .ok_or_else(|| AppError::NotFound("Bed not found".to_string()))?;

        bed.transition(BedEvent::Remove)?;

        let removed = self
            .beds
            .delete_idle(bed_number)
            .await?
            .ok_or_else(|| changed_concurrently(bed_number))?;

        tracing::info!(bed_number, "Bed removed");
        Ok(removed)
    }

    pub async fn history(&self) -> AppResult<Vec<BedHistory>> {
        self.history.recent(HISTORY_LIMIT).await
    }

    /// Place a patient in the first available bed and open a history episode
    pub async fn allocate(&self, patient_name_raw: &str, ward_type: Option<WardType>) -> AppResult<Bed> {
        let name = patient_name(patient_name_raw)?;
        let now = Utc::now();

        let bed = self
            .beds
            .claim_available(ward_type, name, now)
            .await?
            .ok_or_else(|| match ward_type {
                Some(ward) => AppError::Conflict(format!("No {} beds available", ward)),
                None => AppError::Conflict("No beds available".to_string()),
            })?;

        let opened = self
            .history
            .open(&NewBedHistory {
                bed_number: bed.bed_number,
                patient_name: name.to_string(),
                allocated_at: bed.allocated_at.unwrap_or(now),
                ward_type: bed.ward_type,
            })
            .await;

        // No episode means no allocation: hand the bed back before failing.
        if let Err(e) = opened {
            if let Err(release_err) = self.beds.release(bed.bed_number, name).await {
                tracing::error!(
                    bed_number = bed.bed_number,
                    patient = name,
                    "Failed to release bed after history error: {}",
                    release_err
                );
            }
            return Err(e);
        }

        tracing::info!(bed_number = bed.bed_number, patient = name, "Bed allocated");
        Ok(bed)
    }

    /// Free the bed held by `patient_name` and close its history episode
    pub async fn discharge(&self, patient_name_raw: &str) -> AppResult<Bed> {
        let name = patient_name(patient_name_raw)?;

        let bed = self
            .beds
            .find_occupied_by_patient(name)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Patient \"{}\" is not in any bed", name)))?;

        bed.transition(BedEvent::Discharge)?;

        let released = self
            .beds
            .release(bed.bed_number, name)
            .await?
            .ok_or_else(|| changed_concurrently(bed.bed_number))?;

        // The bed is already free at this point; ledger problems are not fatal.
        match self.history.close(bed.bed_number, name, Utc::now()).await {
            Ok(Some(_)) => {}
            Ok(None) => tracing::warn!(
                bed_number = bed.bed_number,
                patient = name,
                "No active history record found for discharged patient"
            ),
            Err(e) => tracing::error!(
                bed_number = bed.bed_number,
                patient = name,
                "Failed to close history record: {}",
                e
            ),
        }

        tracing::info!(bed_number = bed.bed_number, patient = name, "Patient discharged");
        Ok(released)
    }

    pub async fn start_maintenance(&self, bed_number: i32) -> AppResult<Bed> {
        let bed = self
            .beds
            .get(bed_number)
            .await?
            .ok_or_else(|| AppError::NotFound("Bed not found".to_string()))?;

        bed.transition(BedEvent::StartMaintenance)?;

        let updated = self
            .beds
            .start_maintenance(bed_number, Utc::now())
            .await?
            .ok_or_else(|| changed_concurrently(bed_number))?;

        tracing::info!(bed_number, "Bed under maintenance");
        Ok(updated)
    }

    pub async fn end_maintenance(&self, bed_number: i32) -> AppResult<Bed> {
        let bed = self
            .beds
            .get(bed_number)
            .await?
            .ok_or_else(|| AppError::NotFound("Bed not found".to_string()))?;

        bed.transition(BedEvent::EndMaintenance)?;

        let updated = self
            .beds
            .end_maintenance(bed_number)
            .await?
            .ok_or_else(|| changed_concurrently(bed_number))?;

        tracing::info!(bed_number, "Bed returned from maintenance");
        Ok(updated)
    }
}
