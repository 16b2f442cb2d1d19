//! Beds repository for database operations

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{Pool, Postgres};

use crate::{
    error::AppResult,
    models::bed::{Bed, WardType},
};

/// Persistence of bed records.
///
/// State-changing methods are conditional updates: they return `None` when
/// the bed is missing or no longer satisfies the transition's precondition.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BedStore: Send + Sync {
    /// Cheap round-trip used by the readiness probe
    async fn health_check(&self) -> AppResult<()>;

    async fn list(&self) -> AppResult<Vec<Bed>>;

    async fn get(&self, bed_number: i32) -> AppResult<Option<Bed>>;

    async fn max_bed_number(&self) -> AppResult<Option<i32>>;

    async fn insert_many(&self, bed_numbers: Vec<i32>, ward_type: WardType) -> AppResult<Vec<Bed>>;

    /// Occupy the lowest-numbered available bed, optionally within a ward
    async fn claim_available(
        &self,
        ward_type: Option<WardType>,
        patient_name: &str,
        allocated_at: DateTime<Utc>,
    ) -> AppResult<Option<Bed>>;

    async fn find_occupied_by_patient(&self, patient_name: &str) -> AppResult<Option<Bed>>;

    async fn release(&self, bed_number: i32, patient_name: &str) -> AppResult<Option<Bed>>;

    async fn start_maintenance(&self, bed_number: i32, started_at: DateTime<Utc>) -> AppResult<Option<Bed>>;

    async fn end_maintenance(&self, bed_number: i32) -> AppResult<Option<Bed>>;

    /// Delete the bed if it is neither occupied nor under maintenance
    async fn delete_idle(&self, bed_number: i32) -> AppResult<Option<Bed>>;
}

#[derive(Clone)]
pub struct BedsRepository {
    pool: Pool<Postgres>,
}

impl BedsRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BedStore for BedsRepository {
    async fn health_check(&self) -> AppResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    async fn list(&self) -> AppResult<Vec<Bed>> {
        let beds = sqlx::query_as::<_, Bed>("SELECT * FROM beds ORDER BY bed_number")
            .fetch_all(&self.pool)
            .await?;
        Ok(beds)
    }

    async fn get(&self, bed_number: i32) -> AppResult<Option<Bed>> {
        let bed = sqlx::query_as::<_, Bed>("SELECT * FROM beds WHERE bed_number = $1")
            .bind(bed_number)
            .fetch_optional(&self.pool)
            .await?;
        Ok(bed)
    }

    async fn max_bed_number(&self) -> AppResult<Option<i32>> {
        let max: Option<i32> = sqlx::query_scalar("SELECT MAX(bed_number) FROM beds")
            .fetch_one(&self.pool)
            .await?;
        Ok(max)
    }

    async fn insert_many(&self, bed_numbers: Vec<i32>, ward_type: WardType) -> AppResult<Vec<Bed>> {
        let beds = sqlx::query_as::<_, Bed>(
            r#"
            INSERT INTO beds (bed_number, ward_type)
            SELECT n, $2 FROM UNNEST($1::int4[]) AS n
            RETURNING *
            "#,
        )
        .bind(&bed_numbers)
        .bind(ward_type)
        .fetch_all(&self.pool)
        .await?;
        Ok(beds)
    }

    async fn claim_available(
        &self,
        ward_type: Option<WardType>,
        patient_name: &str,
        allocated_at: DateTime<Utc>,
    ) -> AppResult<Option<Bed>> {
        // SKIP LOCKED lets concurrent allocations pick different beds
        let bed = sqlx::query_as::<_, Bed>(
            r#"
            UPDATE beds
            SET is_occupied = TRUE, patient_name = $2, allocated_at = $3
            WHERE bed_number = (
                SELECT bed_number FROM beds
                WHERE NOT is_occupied
                  AND NOT is_under_maintenance
                  AND ($1::text IS NULL OR ward_type = $1::text)
                ORDER BY bed_number
                LIMIT 1
                FOR UPDATE SKIP LOCKED
            )
              AND NOT is_occupied
              AND NOT is_under_maintenance
            RETURNING *
            "#,
        )
        .bind(ward_type)
        .bind(patient_name)
        .bind(allocated_at)
        .fetch_optional(&self.pool)
        .await?;
        Ok(bed)
    }

    async fn find_occupied_by_patient(&self, patient_name: &str) -> AppResult<Option<Bed>> {
        let bed = sqlx::query_as::<_, Bed>(
            r#"
            SELECT * FROM beds
            WHERE is_occupied AND patient_name = $1
            ORDER BY bed_number
            LIMIT 1
            "#,
        )
        .bind(patient_name)
        .fetch_optional(&self.pool)
        .await?;
        Ok(bed)
    }

    async fn release(&self, bed_number: i32, patient_name: &str) -> AppResult<Option<Bed>> {
        let bed = sqlx::query_as::<_, Bed>(
            r#"
            UPDATE beds
            SET is_occupied = FALSE, patient_name = NULL, allocated_at = NULL
            WHERE bed_number = $1 AND is_occupied AND patient_name = $2
            RETURNING *
            "#,
        )
        .bind(bed_number)
        .bind(patient_name)
        .fetch_optional(&self.pool)
        .await?;
        Ok(bed)
    }

    async fn start_maintenance(&self, bed_number: i32, started_at: DateTime<Utc>) -> AppResult<Option<Bed>> {
        let bed = sqlx::query_as::<_, Bed>(
            r#"
            UPDATE beds
            SET is_under_maintenance = TRUE, maintenance_start_time = $2
            WHERE bed_number = $1 AND NOT is_occupied AND NOT is_under_maintenance
            RETURNING *
            "#,
        )
        .bind(bed_number)
        .bind(started_at)
        .fetch_optional(&self.pool)
        .await?;
        Ok(bed)
    }

    async fn end_maintenance(&self, bed_number: i32) -> AppResult<Option<Bed>> {
        let bed = sqlx::query_as::<_, Bed>(
            r#"
            UPDATE beds
            SET is_under_maintenance = FALSE, maintenance_start_time = NULL
            WHERE bed_number = $1 AND is_under_maintenance
            RETURNING *
            "#,
        )
        .bind(bed_number)
        .fetch_optional(&self.pool)
        .await?;
        Ok(bed)
    }

    async fn delete_idle(&self, bed_number: i32) -> AppResult<Option<Bed>> {
        let bed = sqlx::query_as::<_, Bed>(
            r#"
            DELETE FROM beds
            WHERE bed_number = $1 AND NOT is_occupied AND NOT is_under_maintenance
            RETURNING *
            "#,
        )
        .bind(bed_number)
        .fetch_optional(&self.pool)
        .await?;
        Ok(bed)
    }
}
