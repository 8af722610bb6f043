//! Beans repository

use sqlx::{Pool, Postgres};
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    models::{
        bean::{Bean, BeanQuery, CreateBean, UpdateBean},
        enums::BeanStatus,
    },
};

#[derive(Clone)]
pub struct BeansRepository {
    pool: Pool<Postgres>,
}

impl BeansRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    pub async fn list(&self, account_id: Uuid, query: &BeanQuery) -> AppResult<Vec<Bean>> {
        let rows = match query.status {
            Some(status) => {
                sqlx::query_as::<_, Bean>(
                    "SELECT * FROM beans WHERE account_id = $1 AND status = $2 ORDER BY created_at DESC",
                )
                .bind(account_id)
                .bind(status)
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query_as::<_, Bean>(
                    "SELECT * FROM beans WHERE account_id = $1 ORDER BY created_at DESC",
                )
                .bind(account_id)
                .fetch_all(&self.pool)
                .await?
            }
        };
        Ok(rows)
    }

    pub async fn get_by_id(&self, account_id: Uuid, id: Uuid) -> AppResult<Bean> {
        sqlx::query_as::<_, Bean>("SELECT * FROM beans WHERE id = $1 AND account_id = $2")
            .bind(id)
            .bind(account_id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Bean {} not found", id)))
    }

    pub async fn create(&self, account_id: Uuid, data: &CreateBean) -> AppResult<Bean> {
        let row = sqlx::query_as::<_, Bean>(
            r#"
            INSERT INTO beans (
                id, account_id, name, roaster, origin, roast_level, roast_date,
                weight_grams, price, status, notes
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(account_id)
        .bind(&data.name)
        .bind(&data.roaster)
        .bind(&data.origin)
        .bind(&data.roast_level)
        .bind(data.roast_date)
        .bind(data.weight_grams)
        .bind(data.price)
        .bind(BeanStatus::Active)
        .bind(&data.notes)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    pub async fn update(&self, account_id: Uuid, id: Uuid, data: &UpdateBean) -> AppResult<Bean> {
        let mut sets: Vec<String> = Vec::new();
        let mut idx = 3;

        macro_rules! add_f {
            ($field:expr, $name:expr) => {
                if $field.is_some() { sets.push(format!("{} = ${}", $name, idx)); idx += 1; }
            };
        }

        add_f!(data.name, "name");
        add_f!(data.roaster, "roaster");
        add_f!(data.origin, "origin");
        add_f!(data.roast_level, "roast_level");
        add_f!(data.roast_date, "roast_date");
        add_f!(data.weight_grams, "weight_grams");
        add_f!(data.price, "price");
        add_f!(data.status, "status");
        add_f!(data.notes, "notes");

        if sets.is_empty() {
            return self.get_by_id(account_id, id).await;
        }

        let query = format!(
            "UPDATE beans SET {} WHERE id = $1 AND account_id = $2 RETURNING *",
            sets.join(", ")
        );

        let mut builder = sqlx::query_as::<_, Bean>(&query).bind(id).bind(account_id);

        macro_rules! bind_f {
            ($field:expr) => {
                if let Some(ref val) = $field { builder = builder.bind(val); }
            };
        }

        bind_f!(data.name);
        bind_f!(data.roaster);
        bind_f!(data.origin);
        bind_f!(data.roast_level);
        bind_f!(data.roast_date);
        bind_f!(data.weight_grams);
        bind_f!(data.price);
        bind_f!(data.status);
        bind_f!(data.notes);

        builder
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Bean {} not found", id)))
    }

    pub async fn delete(&self, account_id: Uuid, id: Uuid) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM beans WHERE id = $1 AND account_id = $2")
            .bind(id)
            .bind(account_id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Bean {} not found", id)));
        }
        Ok(())
    }

    /// Recorded dose of every brew of the bean, oldest first
    pub async fn dose_log(&self, account_id: Uuid, bean_id: Uuid) -> AppResult<Vec<Option<f64>>> {
        let doses: Vec<Option<f64>> = sqlx::query_scalar(
            "SELECT dose_grams FROM brews WHERE account_id = $1 AND bean_id = $2 ORDER BY brewed_at",
        )
        .bind(account_id)
        .bind(bean_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(doses)
    }

    /// Finish a bag with its corrected starting weight, in one statement.
    /// The first recorded weight is preserved in `original_weight_grams`.
    pub async fn finish(
        &self,
        account_id: Uuid,
        id: Uuid,
        actual_initial_weight_grams: f64,
    ) -> AppResult<Bean> {
        sqlx::query_as::<_, Bean>(
            r#"
            UPDATE beans
            SET status = $3,
                original_weight_grams = COALESCE(original_weight_grams, weight_grams),
                weight_grams = $4
            WHERE id = $1 AND account_id = $2
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(account_id)
        .bind(BeanStatus::Finished)
        .bind(actual_initial_weight_grams)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Bean {} not found", id)))
    }
}
