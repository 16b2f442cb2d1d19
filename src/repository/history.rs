//! Bed history ledger

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{Pool, Postgres};

use crate::{
    error::AppResult,
    models::bed_history::{BedHistory, NewBedHistory},
};

/// Append/close audit trail of bed allocations. Records are never deleted.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait HistoryLedger: Send + Sync {
    async fn open(&self, entry: &NewBedHistory) -> AppResult<BedHistory>;

    /// Close the active episode for this bed and patient, if any
    async fn close(
        &self,
        bed_number: i32,
        patient_name: &str,
        discharged_at: DateTime<Utc>,
    ) -> AppResult<Option<BedHistory>>;

    /// Most recent episodes, newest allocation first
    async fn recent(&self, limit: i64) -> AppResult<Vec<BedHistory>>;
}

#[derive(Clone)]
pub struct HistoryRepository {
    pool: Pool<Postgres>,
}

impl HistoryRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl HistoryLedger for HistoryRepository {
    async fn open(&self, entry: &NewBedHistory) -> AppResult<BedHistory> {
        let row = sqlx::query_as::<_, BedHistory>(
            r#"
            INSERT INTO bed_history (bed_number, patient_name, allocated_at, ward_type)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(entry.bed_number)
        .bind(&entry.patient_name)
        .bind(entry.allocated_at)
        .bind(entry.ward_type)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    async fn close(
        &self,
        bed_number: i32,
        patient_name: &str,
        discharged_at: DateTime<Utc>,
    ) -> AppResult<Option<BedHistory>> {
        let row = sqlx::query_as::<_, BedHistory>(
            r#"
            UPDATE bed_history
            SET is_active = FALSE, discharged_at = $3, updated_at = $3
            WHERE bed_number = $1 AND patient_name = $2 AND is_active
            RETURNING *
            "#,
        )
        .bind(bed_number)
        .bind(patient_name)
        .bind(discharged_at)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    async fn recent(&self, limit: i64) -> AppResult<Vec<BedHistory>> {
        let rows = sqlx::query_as::<_, BedHistory>(
            "SELECT * FROM bed_history ORDER BY allocated_at DESC, id DESC LIMIT $1",
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }
}
