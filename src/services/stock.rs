//! Bean stock and consumption tracking.
//!
//! Remaining stock is always derived from the brew log, never stored. The
//! "mark as finished" correction is the only write that rewrites a stored
//! weight, and it keeps the original figure alongside.

use chrono::Utc;
use rust_decimal::{prelude::FromPrimitive, Decimal};
use uuid::Uuid;

use crate::{
    config::StockConfig,
    error::{AppError, AppResult},
    models::{
        bean::{Bean, BeanConsumption, BeanQuery, CreateBean, StockStatus, UpdateBean},
        enums::{AlertPriority, AlertType, BeanStatus, EntityType},
        NewAlert,
    },
    repository::Repository,
};

/// `weight - consumed`; unknown when no purchased weight was recorded
pub fn remaining_stock(weight_grams: Option<f64>, consumption: &BeanConsumption) -> Option<f64> {
    weight_grams.map(|weight| weight - consumption.total_dose_grams)
}

/// Price per gram; no data without both figures or with a zero weight
pub fn price_per_gram(price: Option<Decimal>, weight_grams: Option<f64>) -> Option<Decimal> {
    let weight = Decimal::from_f64(weight_grams?)?;
    if weight.is_zero() {
        return None;
    }
    price?.checked_div(weight).map(|p| p.round_dp(4))
}

pub fn stock_status(bean: &Bean, consumption: BeanConsumption) -> StockStatus {
    let remaining = remaining_stock(bean.weight_grams, &consumption);
    StockStatus {
        bean_id: bean.id,
        weight_grams: bean.weight_grams,
        consumption,
        remaining_grams: remaining,
        depleted: remaining.map_or(false, |r| r <= 0.0),
        price_per_gram: price_per_gram(bean.price, bean.weight_grams),
    }
}

#[derive(Clone)]
pub struct StockService {
    repository: Repository,
    config: StockConfig,
}

impl StockService {
    pub fn new(repository: Repository, config: StockConfig) -> Self {
        Self { repository, config }
    }

    pub async fn list(&self, account_id: Uuid, query: &BeanQuery) -> AppResult<Vec<Bean>> {
        self.repository.beans.list(account_id, query).await
    }

    pub async fn get_by_id(&self, account_id: Uuid, id: Uuid) -> AppResult<Bean> {
        self.repository.beans.get_by_id(account_id, id).await
    }

    pub async fn create(&self, account_id: Uuid, data: &CreateBean) -> AppResult<Bean> {
        self.repository.beans.create(account_id, data).await
    }

    pub async fn update(&self, account_id: Uuid, id: Uuid, data: &UpdateBean) -> AppResult<Bean> {
        self.repository.beans.update(account_id, id, data).await
    }

    pub async fn delete(&self, account_id: Uuid, id: Uuid) -> AppResult<()> {
        self.repository.beans.delete(account_id, id).await
    }

    /// Brew count and total dose for a bean
    pub async fn compute_consumption(&self, account_id: Uuid, bean_id: Uuid) -> AppResult<BeanConsumption> {
        let doses = self.repository.beans.dose_log(account_id, bean_id).await?;
        Ok(BeanConsumption::from_doses(doses))
    }

    pub async fn stock(&self, account_id: Uuid, bean_id: Uuid) -> AppResult<StockStatus> {
        let bean = self.repository.beans.get_by_id(account_id, bean_id).await?;
        let consumption = self.compute_consumption(account_id, bean_id).await?;
        Ok(stock_status(&bean, consumption))
    }

    /// Refuse a new brew against a depleted bean unless the user acknowledged it
    pub async fn check_before_brew(&self, account_id: Uuid, bean_id: Uuid, acknowledged: bool) -> AppResult<StockStatus> {
        let status = self.stock(account_id, bean_id).await?;
        if status.depleted && !acknowledged {
            return Err(AppError::BusinessRule(format!(
                "Bean {} has no stock left ({:.0} g remaining); confirm to log the brew anyway",
                bean_id,
                status.remaining_grams.unwrap_or_default()
            )));
        }
        Ok(status)
    }

    /// Correct the starting weight and mark the bag finished
    pub async fn mark_as_finished(
        &self,
        account_id: Uuid,
        bean_id: Uuid,
        actual_initial_weight_grams: f64,
    ) -> AppResult<Bean> {
        if !actual_initial_weight_grams.is_finite() || actual_initial_weight_grams <= 0.0 {
            return Err(AppError::Validation(
                "Actual initial weight must be a positive number of grams".to_string(),
            ));
        }

        let bean = self
            .repository
            .beans
            .finish(account_id, bean_id, actual_initial_weight_grams)
            .await?;
        tracing::info!(
            %bean_id,
            original = ?bean.original_weight_grams,
            corrected = actual_initial_weight_grams,
            "Bean marked as finished"
        );
        Ok(bean)
    }

    /// Raise a low-stock alert once remaining stock reaches the threshold.
    /// One per bean: once the user dismissed it, later brews stay quiet.
    /// Best effort: failures are logged, never returned.
    pub async fn raise_low_stock_alert(&self, account_id: Uuid, bean_id: Uuid) {
        let loaded = async {
            let bean = self.repository.beans.get_by_id(account_id, bean_id).await?;
            let consumption = self.compute_consumption(account_id, bean_id).await?;
            let alerted = self
                .repository
                .alerts
                .exists_for_entity(account_id, AlertType::LowStock, bean_id)
                .await?;
            Ok::<_, AppError>((bean, consumption, alerted))
        };
        let (bean, consumption, alerted) = match loaded.await {
            Ok(loaded) => loaded,
            Err(e) => {
                tracing::warn!(%bean_id, "Low stock check failed: {}", e);
                return;
            }
        };
        let status = stock_status(&bean, consumption);
        let Some((remaining, priority)) =
            low_stock_alert_level(&bean, &status, self.config.low_stock_threshold_grams, alerted)
        else {
            return;
        };

        let alert = NewAlert {
            account_id,
            alert_type: AlertType::LowStock,
            entity_type: Some(EntityType::Bean),
            entity_id: Some(bean_id),
            title: format!("Running low: {}", bean.name),
            message: format!("About {:.0} g left.", remaining.max(0.0)),
            priority,
            triggered_at: Utc::now(),
        };

        match self.repository.alerts.insert_if_absent(&alert).await {
            Ok(Some(created)) => tracing::debug!(%bean_id, alert_id = %created.id, "Low stock alert created"),
            Ok(None) => {}
            Err(e) => tracing::warn!(%bean_id, "Failed to create low stock alert: {}", e),
        }
    }
}

/// Remaining grams and priority of the low-stock alert to raise, if any.
/// Only active beans with a known weight at or under `threshold` qualify,
/// and only when the bean never had a low-stock alert.
pub fn low_stock_alert_level(
    bean: &Bean,
    status: &StockStatus,
    threshold: f64,
    previously_alerted: bool,
) -> Option<(f64, AlertPriority)> {
    if previously_alerted || bean.status != BeanStatus::Active {
        return None;
    }
    let remaining = status.remaining_grams.filter(|r| *r <= threshold)?;
    let priority = if remaining <= 0.0 { AlertPriority::High } else { AlertPriority::Normal };
    Some((remaining, priority))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bean(weight: Option<f64>, price: Option<Decimal>) -> Bean {
        Bean {
            id: Uuid::new_v4(),
            account_id: Uuid::new_v4(),
            name: "Kochere".to_string(),
            roaster: None,
            origin: Some("Ethiopia".to_string()),
            roast_level: None,
            roast_date: None,
            weight_grams: weight,
            original_weight_grams: None,
            price,
            status: BeanStatus::Active,
            notes: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_consumption_sums_doses() {
        let c = BeanConsumption::from_doses([Some(15.0), Some(18.0), Some(20.0)]);
        assert_eq!(c.brew_count, 3);
        assert_eq!(c.total_dose_grams, 53.0);
    }

    #[test]
    fn test_missing_dose_counts_as_a_brew() {
        let c = BeanConsumption::from_doses([Some(15.0), None]);
        assert_eq!(c, BeanConsumption { brew_count: 2, total_dose_grams: 15.0 });
        assert_eq!(BeanConsumption::from_doses(Vec::new()), BeanConsumption::default());
    }

    #[test]
    fn test_low_stock_alert_level() {
        let b = bean(Some(250.0), None);
        let low = stock_status(&b, BeanConsumption { brew_count: 12, total_dose_grams: 225.0 });
        assert_eq!(low_stock_alert_level(&b, &low, 30.0, false), Some((25.0, AlertPriority::Normal)));

        let empty = stock_status(&b, BeanConsumption { brew_count: 14, total_dose_grams: 255.0 });
        assert_eq!(low_stock_alert_level(&b, &empty, 30.0, false), Some((-5.0, AlertPriority::High)));

        let plenty = stock_status(&b, BeanConsumption { brew_count: 2, total_dose_grams: 36.0 });
        assert_eq!(low_stock_alert_level(&b, &plenty, 30.0, false), None);
    }

    #[test]
    fn test_dismissed_low_stock_alert_is_not_raised_again() {
        let b = bean(Some(250.0), None);
        let empty = stock_status(&b, BeanConsumption { brew_count: 14, total_dose_grams: 260.0 });
        assert_eq!(low_stock_alert_level(&b, &empty, 30.0, true), None);

        let finished = Bean { status: BeanStatus::Finished, ..bean(Some(250.0), None) };
        let status = stock_status(&finished, BeanConsumption { brew_count: 14, total_dose_grams: 260.0 });
        assert_eq!(low_stock_alert_level(&finished, &status, 30.0, false), None);
    }

    #[test]
    fn test_overdrawn_bean_is_depleted() {
        let c = BeanConsumption { brew_count: 14, total_dose_grams: 260.0 };
        let status = stock_status(&bean(Some(250.0), None), c);
        assert_eq!(status.remaining_grams, Some(-10.0));
        assert!(status.depleted);
    }

    #[test]
    fn test_exactly_empty_is_depleted() {
        let c = BeanConsumption { brew_count: 10, total_dose_grams: 250.0 };
        assert!(stock_status(&bean(Some(250.0), None), c).depleted);
    }

    #[test]
    fn test_unknown_weight_never_warns() {
        let c = BeanConsumption { brew_count: 100, total_dose_grams: 5000.0 };
        let status = stock_status(&bean(None, None), c);
        assert_eq!(status.remaining_grams, None);
        assert!(!status.depleted);
    }

    #[test]
    fn test_price_per_gram() {
        assert_eq!(
            price_per_gram(Some(Decimal::new(1800, 2)), Some(250.0)),
            Some(Decimal::new(720, 4))
        );
        assert_eq!(price_per_gram(Some(Decimal::new(1800, 2)), Some(0.0)), None);
        assert_eq!(price_per_gram(None, Some(250.0)), None);
        assert_eq!(price_per_gram(Some(Decimal::new(1800, 2)), None), None);
    }
}
