//! Brews repository

use chrono::{DateTime, Utc};
use sqlx::{Pool, Postgres};
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    models::brew::{Brew, BrewPoint, BrewQuery, CreateBrew, UpdateBrew},
};

/// Projection shared by the metrics queries
const BREW_POINT_SELECT: &str = r#"
    SELECT b.id, b.brewed_at, b.rating, b.dose_grams, b.water_grams,
           COALESCE(e.subtype, e.equipment_type) AS method,
           bn.name AS bean_name
    FROM brews b
    LEFT JOIN equipment e ON e.id = b.equipment_id
    LEFT JOIN beans bn ON bn.id = b.bean_id
"#;

#[derive(Clone)]
pub struct BrewsRepository {
    pool: Pool<Postgres>,
}

impl BrewsRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// List brews with optional filters and pagination
    pub async fn list(&self, account_id: Uuid, query: &BrewQuery) -> AppResult<(Vec<Brew>, i64)> {
        let page = query.page.unwrap_or(1).max(1);
        let per_page = query.per_page.unwrap_or(50).clamp(1, 200);
        let offset = (page - 1) * per_page;

        let mut conditions = vec!["account_id = $1".to_string()];
        let mut idx = 2;

        if query.bean_id.is_some() {
            conditions.push(format!("bean_id = ${}", idx));
            idx += 1;
        }
        if query.equipment_id.is_some() {
            conditions.push(format!("(equipment_id = ${0} OR grinder_id = ${0})", idx));
        }

        let where_clause = format!("WHERE {}", conditions.join(" AND "));

        let count_q = format!("SELECT COUNT(*) FROM brews {}", where_clause);
        let mut count_builder = sqlx::query_scalar::<_, i64>(&count_q).bind(account_id);
        if let Some(bean_id) = query.bean_id { count_builder = count_builder.bind(bean_id); }
        if let Some(equipment_id) = query.equipment_id { count_builder = count_builder.bind(equipment_id); }
        let total = count_builder.fetch_one(&self.pool).await?;

        let select_q = format!(
            "SELECT * FROM brews {} ORDER BY brewed_at DESC LIMIT {} OFFSET {}",
            where_clause, per_page, offset
        );
        let mut builder = sqlx::query_as::<_, Brew>(&select_q).bind(account_id);
        if let Some(bean_id) = query.bean_id { builder = builder.bind(bean_id); }
        if let Some(equipment_id) = query.equipment_id { builder = builder.bind(equipment_id); }

        let rows = builder.fetch_all(&self.pool).await?;
        Ok((rows, total))
    }

    pub async fn get_by_id(&self, account_id: Uuid, id: Uuid) -> AppResult<Brew> {
        sqlx::query_as::<_, Brew>("SELECT * FROM brews WHERE id = $1 AND account_id = $2")
            .bind(id)
            .bind(account_id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Brew {} not found", id)))
    }

    pub async fn create(&self, account_id: Uuid, data: &CreateBrew) -> AppResult<Brew> {
        let row = sqlx::query_as::<_, Brew>(
            r#"
            INSERT INTO brews (
                id, account_id, bean_id, equipment_id, grinder_id, water_recipe_id,
                dose_grams, water_grams, water_temp_c, grind_setting,
                brew_time_seconds, bloom_time_seconds, rating, notes, brewed_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(account_id)
        .bind(data.bean_id)
        .bind(data.equipment_id)
        .bind(data.grinder_id)
        .bind(data.water_recipe_id)
        .bind(data.dose_grams)
        .bind(data.water_grams)
        .bind(data.water_temp_c)
        .bind(&data.grind_setting)
        .bind(data.brew_time_seconds)
        .bind(data.bloom_time_seconds)
        .bind(data.rating)
        .bind(&data.notes)
        .bind(data.brewed_at.unwrap_or_else(Utc::now))
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    pub async fn update(&self, account_id: Uuid, id: Uuid, data: &UpdateBrew) -> AppResult<Brew> {
        let mut sets: Vec<String> = Vec::new();
        let mut idx = 3;

        macro_rules! add_f {
            ($field:expr, $name:expr) => {
                if $field.is_some() { sets.push(format!("{} = ${}", $name, idx)); idx += 1; }
            };
        }

        add_f!(data.equipment_id, "equipment_id");
        add_f!(data.grinder_id, "grinder_id");
        add_f!(data.water_recipe_id, "water_recipe_id");
        add_f!(data.dose_grams, "dose_grams");
        add_f!(data.water_grams, "water_grams");
        add_f!(data.water_temp_c, "water_temp_c");
        add_f!(data.grind_setting, "grind_setting");
        add_f!(data.brew_time_seconds, "brew_time_seconds");
        add_f!(data.bloom_time_seconds, "bloom_time_seconds");
        add_f!(data.rating, "rating");
        add_f!(data.notes, "notes");
        add_f!(data.brewed_at, "brewed_at");

        if sets.is_empty() {
            return self.get_by_id(account_id, id).await;
        }

        let query = format!(
            "UPDATE brews SET {} WHERE id = $1 AND account_id = $2 RETURNING *",
            sets.join(", ")
        );

        let mut builder = sqlx::query_as::<_, Brew>(&query).bind(id).bind(account_id);

        macro_rules! bind_f {
            ($field:expr) => {
                if let Some(ref val) = $field { builder = builder.bind(val); }
            };
        }

        bind_f!(data.equipment_id);
        bind_f!(data.grinder_id);
        bind_f!(data.water_recipe_id);
        bind_f!(data.dose_grams);
        bind_f!(data.water_grams);
        bind_f!(data.water_temp_c);
        bind_f!(data.grind_setting);
        bind_f!(data.brew_time_seconds);
        bind_f!(data.bloom_time_seconds);
        bind_f!(data.rating);
        bind_f!(data.notes);
        bind_f!(data.brewed_at);

        builder
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Brew {} not found", id)))
    }

    pub async fn delete(&self, account_id: Uuid, id: Uuid) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM brews WHERE id = $1 AND account_id = $2")
            .bind(id)
            .bind(account_id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Brew {} not found", id)));
        }
        Ok(())
    }

    /// Brews made with a piece of equipment (as brewer or grinder), newest first
    pub async fn points_for_equipment(&self, account_id: Uuid, equipment_id: Uuid) -> AppResult<Vec<BrewPoint>> {
        let q = format!(
            "{} WHERE b.account_id = $1 AND (b.equipment_id = $2 OR b.grinder_id = $2) ORDER BY b.brewed_at DESC",
            BREW_POINT_SELECT
        );
        let rows = sqlx::query_as::<_, BrewPoint>(&q)
            .bind(account_id)
            .bind(equipment_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    /// An account's brews since `since`, newest first
    pub async fn points_since(&self, account_id: Uuid, since: DateTime<Utc>) -> AppResult<Vec<BrewPoint>> {
        let q = format!(
            "{} WHERE b.account_id = $1 AND b.brewed_at >= $2 ORDER BY b.brewed_at DESC",
            BREW_POINT_SELECT
        );
        let rows = sqlx::query_as::<_, BrewPoint>(&q)
            .bind(account_id)
            .bind(since)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }
}
