//! Equipment repository for database operations

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{Pool, Postgres};

use crate::{
    error::AppResult,
    models::equipment::{Equipment, NewEquipment},
};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait EquipmentStore: Send + Sync {
    async fn list(&self) -> AppResult<Vec<Equipment>>;

    async fn get(&self, id: i32) -> AppResult<Option<Equipment>>;

    async fn serial_exists(&self, serial_number: &str) -> AppResult<bool>;

    async fn insert(&self, data: &NewEquipment) -> AppResult<Equipment>;

    /// Mark as in use if currently available
    async fn claim(&self, id: i32, patient_name: &str, assigned_at: DateTime<Utc>) -> AppResult<Option<Equipment>>;

    /// Mark as available if currently in use
    async fn release(&self, id: i32) -> AppResult<Option<Equipment>>;

    async fn list_by_patient(&self, patient_name: &str) -> AppResult<Vec<Equipment>>;
}

#[derive(Clone)]
pub struct EquipmentRepository {
    pool: Pool<Postgres>,
}

impl EquipmentRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl EquipmentStore for EquipmentRepository {
    async fn list(&self) -> AppResult<Vec<Equipment>> {
        let rows = sqlx::query_as::<_, Equipment>("SELECT * FROM equipment ORDER BY name, id")
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    async fn get(&self, id: i32) -> AppResult<Option<Equipment>> {
        let row = sqlx::query_as::<_, Equipment>("SELECT * FROM equipment WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    async fn serial_exists(&self, serial_number: &str) -> AppResult<bool> {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM equipment WHERE serial_number = $1)",
        )
        .bind(serial_number)
        .fetch_one(&self.pool)
        .await?;
        Ok(exists)
    }

    async fn insert(&self, data: &NewEquipment) -> AppResult<Equipment> {
        let row = sqlx::query_as::<_, Equipment>(
            r#"
            INSERT INTO equipment (name, equipment_type, serial_number)
            VALUES ($1, $2, $3)
            RETURNING *
            "#,
        )
        .bind(&data.name)
        .bind(&data.equipment_type)
        .bind(&data.serial_number)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    async fn claim(&self, id: i32, patient_name: &str, assigned_at: DateTime<Utc>) -> AppResult<Option<Equipment>> {
        let row = sqlx::query_as::<_, Equipment>(
            r#"
            UPDATE equipment
            SET is_in_use = TRUE, patient_name = $2, assigned_at = $3
            WHERE id = $1 AND NOT is_in_use
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(patient_name)
        .bind(assigned_at)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    async fn release(&self, id: i32) -> AppResult<Option<Equipment>> {
        let row = sqlx::query_as::<_, Equipment>(
            r#"
            UPDATE equipment
            SET is_in_use = FALSE, patient_name = NULL, assigned_at = NULL
            WHERE id = $1 AND is_in_use
            RETURNING *
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    async fn list_by_patient(&self, patient_name: &str) -> AppResult<Vec<Equipment>> {
        let rows = sqlx::query_as::<_, Equipment>(
            "SELECT * FROM equipment WHERE patient_name = $1 ORDER BY assigned_at, id",
        )
        .bind(patient_name)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }
}
