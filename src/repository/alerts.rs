//! Alerts repository

use sqlx::{Pool, Postgres};
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    models::{
        alert::{Alert, AlertAction, AlertQuery, NewAlert},
        enums::{AlertType, EntityType},
    },
};

#[derive(Clone)]
pub struct AlertsRepository {
    pool: Pool<Postgres>,
}

impl AlertsRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// List an account's alerts, newest first
    pub async fn list(&self, account_id: Uuid, query: &AlertQuery) -> AppResult<Vec<Alert>> {
        let mut conditions = vec!["account_id = $1".to_string()];
        if !query.include_dismissed.unwrap_or(false) {
            conditions.push("NOT is_dismissed".to_string());
        }
        if query.unread_only.unwrap_or(false) {
            conditions.push("NOT is_read".to_string());
        }
        let limit = query.limit.unwrap_or(50).clamp(1, 500);

        let q = format!(
            "SELECT * FROM alerts WHERE {} ORDER BY triggered_at DESC LIMIT {}",
            conditions.join(" AND "),
            limit
        );

        let rows = sqlx::query_as::<_, Alert>(&q)
            .bind(account_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    /// Get an alert regardless of owner, so callers can tell "missing" from "foreign"
    pub async fn get_by_id_unscoped(&self, id: Uuid) -> AppResult<Alert> {
        sqlx::query_as::<_, Alert>("SELECT * FROM alerts WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Alert {} not found", id)))
    }

    pub async fn count_unread(&self, account_id: Uuid) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM alerts WHERE account_id = $1 AND NOT is_read AND NOT is_dismissed",
        )
        .bind(account_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(count)
    }

    /// Whether an active alert of this type exists for the entity
    pub async fn has_active(
        &self,
        account_id: Uuid,
        alert_type: AlertType,
        entity_id: Uuid,
    ) -> AppResult<bool> {
        let exists: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS (
                SELECT 1 FROM alerts
                WHERE account_id = $1 AND alert_type = $2 AND entity_id = $3 AND NOT is_dismissed
            )
            "#,
        )
        .bind(account_id)
        .bind(alert_type)
        .bind(entity_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(exists)
    }

    /// Insert unless an active alert already exists for the same
    /// (account, type, entity). Returns `None` when nothing was inserted.
    pub async fn insert_if_absent(&self, alert: &NewAlert) -> AppResult<Option<Alert>> {
        let row = sqlx::query_as::<_, Alert>(
            r#"
            INSERT INTO alerts (
                id, account_id, alert_type, entity_type, entity_id,
                title, message, priority, triggered_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            ON CONFLICT (account_id, alert_type, entity_id)
                WHERE NOT is_dismissed AND entity_id IS NOT NULL
                DO NOTHING
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(alert.account_id)
        .bind(alert.alert_type)
        .bind(alert.entity_type)
        .bind(alert.entity_id)
        .bind(&alert.title)
        .bind(&alert.message)
        .bind(alert.priority)
        .bind(alert.triggered_at)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    /// Apply a lifecycle action. Each action only sets its own flag, so an
    /// action racing with another can never clear what the other set.
    pub async fn apply_action(&self, account_id: Uuid, id: Uuid, action: AlertAction) -> AppResult<Alert> {
        let q = match action {
            AlertAction::Dismiss => {
                "UPDATE alerts SET is_dismissed = TRUE WHERE id = $1 AND account_id = $2 RETURNING *"
            }
            AlertAction::MarkRead => {
                "UPDATE alerts SET is_read = TRUE WHERE id = $1 AND account_id = $2 RETURNING *"
            }
        };

        sqlx::query_as::<_, Alert>(q)
            .bind(id)
            .bind(account_id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Alert {} not found", id)))
    }

    /// Whether any alert of this type, dismissed or not, exists for the entity
    pub async fn exists_for_entity(
        &self,
        account_id: Uuid,
        alert_type: AlertType,
        entity_id: Uuid,
    ) -> AppResult<bool> {
        let exists: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS (
                SELECT 1 FROM alerts
                WHERE account_id = $1 AND alert_type = $2 AND entity_id = $3
            )
            "#,
        )
        .bind(account_id)
        .bind(alert_type)
        .bind(entity_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(exists)
    }

    pub async fn mark_all_read(&self, account_id: Uuid) -> AppResult<u64> {
        let result = sqlx::query(
            "UPDATE alerts SET is_read = TRUE WHERE account_id = $1 AND NOT is_read AND NOT is_dismissed",
        )
        .bind(account_id)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected())
    }

    /// Dismiss every active alert of a type pointing at an entity
    pub async fn dismiss_for_entity(
        &self,
        account_id: Uuid,
        alert_type: AlertType,
        entity_type: EntityType,
        entity_id: Uuid,
    ) -> AppResult<u64> {
        let result = sqlx::query(
            r#"
            UPDATE alerts SET is_dismissed = TRUE
            WHERE account_id = $1 AND alert_type = $2 AND entity_type = $3
              AND entity_id = $4 AND NOT is_dismissed
            "#,
        )
        .bind(account_id)
        .bind(alert_type)
        .bind(entity_type)
        .bind(entity_id)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected())
    }
}
