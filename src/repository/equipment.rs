//! Equipment repository

use chrono::{DateTime, Utc};
use sqlx::{Pool, Postgres};
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    models::{
        enums::EquipmentType,
        equipment::{CreateEquipment, Equipment, UpdateEquipment},
    },
};

#[derive(Clone)]
pub struct EquipmentRepository {
    pool: Pool<Postgres>,
}

impl EquipmentRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// List an account's equipment
    pub async fn list(&self, account_id: Uuid) -> AppResult<Vec<Equipment>> {
        let rows = sqlx::query_as::<_, Equipment>(
            "SELECT * FROM equipment WHERE account_id = $1 ORDER BY name",
        )
        .bind(account_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// Get equipment by ID
    pub async fn get_by_id(&self, account_id: Uuid, id: Uuid) -> AppResult<Equipment> {
        sqlx::query_as::<_, Equipment>("SELECT * FROM equipment WHERE id = $1 AND account_id = $2")
            .bind(id)
            .bind(account_id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Equipment {} not found", id)))
    }

    /// Create equipment
    pub async fn create(&self, account_id: Uuid, data: &CreateEquipment) -> AppResult<Equipment> {
        let row = sqlx::query_as::<_, Equipment>(
            r#"
            INSERT INTO equipment (
                id, account_id, name, equipment_type, subtype, brand, model,
                last_maintenance, maintenance_interval_days, notes
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(account_id)
        .bind(&data.name)
        .bind(data.equipment_type.unwrap_or(EquipmentType::Other))
        .bind(&data.subtype)
        .bind(&data.brand)
        .bind(&data.model)
        .bind(data.last_maintenance)
        .bind(data.maintenance_interval_days)
        .bind(&data.notes)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    /// Update equipment (only provided fields)
    pub async fn update(&self, account_id: Uuid, id: Uuid, data: &UpdateEquipment) -> AppResult<Equipment> {
        let mut sets: Vec<String> = Vec::new();
        let mut idx = 3;

        macro_rules! add_field {
            ($field:expr, $name:expr) => {
                if $field.is_some() {
                    sets.push(format!("{} = ${}", $name, idx));
                    idx += 1;
                }
            };
        }

        add_field!(data.name, "name");
        add_field!(data.equipment_type, "equipment_type");
        add_field!(data.subtype, "subtype");
        add_field!(data.brand, "brand");
        add_field!(data.model, "model");
        add_field!(data.maintenance_interval_days, "maintenance_interval_days");
        add_field!(data.notes, "notes");

        if sets.is_empty() {
            return self.get_by_id(account_id, id).await;
        }

        let query = format!(
            "UPDATE equipment SET {} WHERE id = $1 AND account_id = $2 RETURNING *",
            sets.join(", ")
        );

        let mut builder = sqlx::query_as::<_, Equipment>(&query).bind(id).bind(account_id);

        macro_rules! bind_field {
            ($field:expr) => {
                if let Some(ref val) = $field {
                    builder = builder.bind(val);
                }
            };
        }

        bind_field!(data.name);
        bind_field!(data.equipment_type);
        bind_field!(data.subtype);
        bind_field!(data.brand);
        bind_field!(data.model);
        bind_field!(data.maintenance_interval_days);
        bind_field!(data.notes);

        builder
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Equipment {} not found", id)))
    }

    /// Delete equipment
    pub async fn delete(&self, account_id: Uuid, id: Uuid) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM equipment WHERE id = $1 AND account_id = $2")
            .bind(id)
            .bind(account_id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Equipment {} not found", id)));
        }
        Ok(())
    }

    /// Get equipment regardless of owner, so callers can tell "missing" from "foreign"
    pub async fn get_by_id_unscoped(&self, id: Uuid) -> AppResult<Equipment> {
        sqlx::query_as::<_, Equipment>("SELECT * FROM equipment WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Equipment {} not found", id)))
    }

    /// Record a completed service: new baseline, notification stamp cleared
    pub async fn resolve_maintenance(
        &self,
        account_id: Uuid,
        id: Uuid,
        at: DateTime<Utc>,
    ) -> AppResult<Equipment> {
        sqlx::query_as::<_, Equipment>(
            r#"
            UPDATE equipment
            SET last_maintenance = $3, maintenance_last_notified = NULL
            WHERE id = $1 AND account_id = $2
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(account_id)
        .bind(at)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Equipment {} not found", id)))
    }

    /// All equipment with a maintenance interval, across every account (scanner only)
    pub async fn list_maintenance_tracked(&self) -> AppResult<Vec<Equipment>> {
        let rows = sqlx::query_as::<_, Equipment>(
            "SELECT * FROM equipment WHERE maintenance_interval_days IS NOT NULL",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// Stamp the scanner's last notification time (scanner only)
    pub async fn mark_maintenance_notified(&self, id: Uuid, at: DateTime<Utc>) -> AppResult<()> {
        sqlx::query("UPDATE equipment SET maintenance_last_notified = $2 WHERE id = $1")
            .bind(id)
            .bind(at)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}
