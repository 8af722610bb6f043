//! Water recipes repository

use sqlx::{Pool, Postgres};
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    models::water_recipe::{CreateWaterRecipe, WaterRecipe},
};

#[derive(Clone)]
pub struct WaterRecipesRepository {
    pool: Pool<Postgres>,
}

impl WaterRecipesRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    pub async fn list(&self, account_id: Uuid) -> AppResult<Vec<WaterRecipe>> {
        let rows = sqlx::query_as::<_, WaterRecipe>(
            "SELECT * FROM water_recipes WHERE account_id = $1 ORDER BY name",
        )
        .bind(account_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    pub async fn get_by_id(&self, account_id: Uuid, id: Uuid) -> AppResult<WaterRecipe> {
        sqlx::query_as::<_, WaterRecipe>("SELECT * FROM water_recipes WHERE id = $1 AND account_id = $2")
            .bind(id)
            .bind(account_id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Water recipe {} not found", id)))
    }

    pub async fn create(&self, account_id: Uuid, data: &CreateWaterRecipe) -> AppResult<WaterRecipe> {
        let row = sqlx::query_as::<_, WaterRecipe>(
            r#"
            INSERT INTO water_recipes (
                id, account_id, name, general_hardness_ppm, alkalinity_ppm,
                magnesium_ppm, calcium_ppm, notes
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(account_id)
        .bind(&data.name)
        .bind(data.general_hardness_ppm)
        .bind(data.alkalinity_ppm)
        .bind(data.magnesium_ppm)
        .bind(data.calcium_ppm)
        .bind(&data.notes)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    pub async fn delete(&self, account_id: Uuid, id: Uuid) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM water_recipes WHERE id = $1 AND account_id = $2")
            .bind(id)
            .bind(account_id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Water recipe {} not found", id)));
        }
        Ok(())
    }
}
