//! Cupping notes repository

use sqlx::{Pool, Postgres};
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    models::cupping::{CreateCuppingNote, CuppingNote},
};

#[derive(Clone)]
pub struct CuppingRepository {
    pool: Pool<Postgres>,
}

impl CuppingRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    pub async fn list_for_brew(&self, account_id: Uuid, brew_id: Uuid) -> AppResult<Vec<CuppingNote>> {
        let rows = sqlx::query_as::<_, CuppingNote>(
            "SELECT * FROM cupping_notes WHERE account_id = $1 AND brew_id = $2 ORDER BY created_at DESC",
        )
        .bind(account_id)
        .bind(brew_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    pub async fn get_by_id(&self, account_id: Uuid, id: Uuid) -> AppResult<CuppingNote> {
        sqlx::query_as::<_, CuppingNote>("SELECT * FROM cupping_notes WHERE id = $1 AND account_id = $2")
            .bind(id)
            .bind(account_id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Cupping note {} not found", id)))
    }

    pub async fn create(
        &self,
        account_id: Uuid,
        brew_id: Uuid,
        data: &CreateCuppingNote,
    ) -> AppResult<CuppingNote> {
        let s = &data.scores;
        let row = sqlx::query_as::<_, CuppingNote>(
            r#"
            INSERT INTO cupping_notes (
                id, account_id, brew_id,
                fragrance_aroma, flavor, aftertaste, acidity, body,
                balance, uniformity, clean_cup, sweetness, overall,
                flavor_descriptors, notes
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(account_id)
        .bind(brew_id)
        .bind(s.fragrance_aroma)
        .bind(s.flavor)
        .bind(s.aftertaste)
        .bind(s.acidity)
        .bind(s.body)
        .bind(s.balance)
        .bind(s.uniformity)
        .bind(s.clean_cup)
        .bind(s.sweetness)
        .bind(s.overall)
        .bind(&data.flavor_descriptors)
        .bind(&data.notes)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    pub async fn delete(&self, account_id: Uuid, id: Uuid) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM cupping_notes WHERE id = $1 AND account_id = $2")
            .bind(id)
            .bind(account_id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Cupping note {} not found", id)));
        }
        Ok(())
    }
}
