//! Alert lifecycle service

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    models::{
        alert::{Alert, AlertAction, AlertQuery, CreateAlert, NewAlert},
        bean::Bean,
        enums::{AlertPriority, AlertType, EntityType},
        equipment::Equipment,
        AccountClaims,
    },
    repository::Repository,
};

/// Storage operations behind the alert lifecycle
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AlertStore: Send + Sync {
    async fn list_alerts(&self, account_id: Uuid, query: &AlertQuery) -> AppResult<Vec<Alert>>;

    async fn count_unread(&self, account_id: Uuid) -> AppResult<i64>;

    async fn get_bean(&self, account_id: Uuid, bean_id: Uuid) -> AppResult<Bean>;

    async fn insert_alert_if_absent(&self, alert: &NewAlert) -> AppResult<Option<Alert>>;

    /// Any owner's alert
    async fn get_alert(&self, alert_id: Uuid) -> AppResult<Alert>;

    async fn apply_alert_action(&self, account_id: Uuid, alert_id: Uuid, action: AlertAction) -> AppResult<Alert>;

    async fn mark_all_read(&self, account_id: Uuid) -> AppResult<u64>;

    /// Any owner's equipment
    async fn get_equipment(&self, equipment_id: Uuid) -> AppResult<Equipment>;

    async fn resolve_maintenance(&self, account_id: Uuid, equipment_id: Uuid, at: DateTime<Utc>) -> AppResult<Equipment>;

    async fn dismiss_maintenance_alerts(&self, account_id: Uuid, equipment_id: Uuid) -> AppResult<u64>;
}

#[async_trait]
impl AlertStore for Repository {
    async fn list_alerts(&self, account_id: Uuid, query: &AlertQuery) -> AppResult<Vec<Alert>> {
        self.alerts.list(account_id, query).await
    }

    async fn count_unread(&self, account_id: Uuid) -> AppResult<i64> {
        self.alerts.count_unread(account_id).await
    }

    async fn get_bean(&self, account_id: Uuid, bean_id: Uuid) -> AppResult<Bean> {
        self.beans.get_by_id(account_id, bean_id).await
    }

    async fn insert_alert_if_absent(&self, alert: &NewAlert) -> AppResult<Option<Alert>> {
        self.alerts.insert_if_absent(alert).await
    }

    async fn get_alert(&self, alert_id: Uuid) -> AppResult<Alert> {
        self.alerts.get_by_id_unscoped(alert_id).await
    }

    async fn apply_alert_action(&self, account_id: Uuid, alert_id: Uuid, action: AlertAction) -> AppResult<Alert> {
        self.alerts.apply_action(account_id, alert_id, action).await
    }

    async fn mark_all_read(&self, account_id: Uuid) -> AppResult<u64> {
        self.alerts.mark_all_read(account_id).await
    }

    async fn get_equipment(&self, equipment_id: Uuid) -> AppResult<Equipment> {
        self.equipment.get_by_id_unscoped(equipment_id).await
    }

    async fn resolve_maintenance(&self, account_id: Uuid, equipment_id: Uuid, at: DateTime<Utc>) -> AppResult<Equipment> {
        self.equipment.resolve_maintenance(account_id, equipment_id, at).await
    }

    async fn dismiss_maintenance_alerts(&self, account_id: Uuid, equipment_id: Uuid) -> AppResult<u64> {
        self.alerts
            .dismiss_for_entity(account_id, AlertType::Maintenance, EntityType::Equipment, equipment_id)
            .await
    }
}

#[derive(Clone)]
pub struct AlertsService {
    store: Arc<dyn AlertStore>,
}

impl AlertsService {
    pub fn new(store: Arc<dyn AlertStore>) -> Self {
        Self { store }
    }

    pub async fn list(&self, claims: &AccountClaims, query: &AlertQuery) -> AppResult<Vec<Alert>> {
        self.store.list_alerts(claims.account_id(), query).await
    }

    pub async fn unread_count(&self, claims: &AccountClaims) -> AppResult<i64> {
        self.store.count_unread(claims.account_id()).await
    }

    /// User-created alert; a reorder reminder when it points at a bean
    pub async fn create(&self, claims: &AccountClaims, data: &CreateAlert) -> AppResult<Alert> {
        let account_id = claims.account_id();
        let (alert_type, entity_type) = match data.bean_id {
            Some(bean_id) => {
                self.store.get_bean(account_id, bean_id).await?;
                (AlertType::Reorder, Some(EntityType::Bean))
            }
            None => (AlertType::Custom, None),
        };

        let alert = NewAlert {
            account_id,
            alert_type,
            entity_type,
            entity_id: data.bean_id,
            title: data.title.clone(),
            message: data.message.clone().unwrap_or_default(),
            priority: data.priority.unwrap_or(AlertPriority::Normal),
            triggered_at: Utc::now(),
        };

        match self.store.insert_alert_if_absent(&alert).await? {
            Some(created) => Ok(created),
            None => Err(AppError::Conflict(
                "An active reminder already exists for this bean".to_string(),
            )),
        }
    }

    /// Apply a lifecycle action to an alert the caller owns.
    /// Writes nothing when the state would not change.
    async fn transition(&self, claims: &AccountClaims, alert_id: Uuid, action: AlertAction) -> AppResult<Alert> {
        let alert = self.store.get_alert(alert_id).await?;
        claims.require_owner(alert.account_id)?;

        let current = alert.state();
        if action.apply(current) == current {
            return Ok(alert);
        }

        self.store
            .apply_alert_action(claims.account_id(), alert_id, action)
            .await
    }

    /// Dismiss an alert (idempotent)
    pub async fn dismiss(&self, claims: &AccountClaims, alert_id: Uuid) -> AppResult<Alert> {
        let alert = self.transition(claims, alert_id, AlertAction::Dismiss).await?;
        tracing::debug!(alert_id = %alert.id, "Alert dismissed");
        Ok(alert)
    }

    /// Mark an alert read (idempotent)
    pub async fn mark_read(&self, claims: &AccountClaims, alert_id: Uuid) -> AppResult<Alert> {
        self.transition(claims, alert_id, AlertAction::MarkRead).await
    }

    pub async fn mark_all_read(&self, claims: &AccountClaims) -> AppResult<u64> {
        self.store.mark_all_read(claims.account_id()).await
    }

    /// Record that maintenance was done: new baseline, notification stamp
    /// cleared. Open maintenance alerts are then dismissed as a separate
    /// step whose failure does not undo the resolve.
    pub async fn resolve_maintenance(&self, claims: &AccountClaims, equipment_id: Uuid) -> AppResult<Equipment> {
        let owner = self.store.get_equipment(equipment_id).await?.account_id;
        claims.require_owner(owner)?;

        let account_id = claims.account_id();
        let equipment = self
            .store
            .resolve_maintenance(account_id, equipment_id, Utc::now())
            .await?;

        match self.store.dismiss_maintenance_alerts(account_id, equipment_id).await {
            Ok(count) if count > 0 => {
                tracing::debug!(%equipment_id, count, "Dismissed maintenance alerts after resolve");
            }
            Ok(_) => {}
            Err(e) => {
                tracing::warn!(%equipment_id, "Failed to dismiss maintenance alerts: {}", e);
            }
        }

        Ok(equipment)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use chrono::Duration;
    use mockall::predicate::eq;

    use super::*;
    use crate::models::enums::EquipmentType;

    fn claims() -> AccountClaims {
        AccountClaims::new(Uuid::new_v4(), None, Duration::hours(1))
    }

    fn alert(account_id: Uuid, is_read: bool, is_dismissed: bool) -> Alert {
        Alert {
            id: Uuid::new_v4(),
            account_id,
            alert_type: AlertType::Custom,
            entity_type: None,
            entity_id: None,
            title: "Descale the kettle".to_string(),
            message: String::new(),
            priority: AlertPriority::Normal,
            is_read,
            is_dismissed,
            triggered_at: Utc::now(),
        }
    }

    fn equipment(account_id: Uuid) -> Equipment {
        let now = Utc::now();
        Equipment {
            id: Uuid::new_v4(),
            account_id,
            name: "Linea Mini".to_string(),
            equipment_type: EquipmentType::EspressoMachine,
            subtype: None,
            brand: None,
            model: None,
            last_maintenance: Some(now - Duration::days(40)),
            maintenance_interval_days: Some(30),
            maintenance_last_notified: Some(now - Duration::days(2)),
            notes: None,
            created_at: now - Duration::days(400),
        }
    }

    /// In-memory alerts whose actions only ever set flags. Reads yield
    /// before returning so concurrent calls interleave between read and write.
    #[derive(Default)]
    struct FakeStore {
        alerts: Mutex<Vec<Alert>>,
    }

    #[async_trait]
    impl AlertStore for FakeStore {
        async fn list_alerts(&self, account_id: Uuid, _query: &AlertQuery) -> AppResult<Vec<Alert>> {
            Ok(self
                .alerts
                .lock()
                .unwrap()
                .iter()
                .filter(|a| a.account_id == account_id && !a.is_dismissed)
                .cloned()
                .collect())
        }

        async fn count_unread(&self, _account_id: Uuid) -> AppResult<i64> {
            unimplemented!()
        }

        async fn get_bean(&self, _account_id: Uuid, _bean_id: Uuid) -> AppResult<Bean> {
            unimplemented!()
        }

        async fn insert_alert_if_absent(&self, _alert: &NewAlert) -> AppResult<Option<Alert>> {
            unimplemented!()
        }

        async fn get_alert(&self, alert_id: Uuid) -> AppResult<Alert> {
            let found = self.alerts.lock().unwrap().iter().find(|a| a.id == alert_id).cloned();
            tokio::task::yield_now().await;
            found.ok_or_else(|| AppError::NotFound("Alert not found".into()))
        }

        async fn apply_alert_action(&self, account_id: Uuid, alert_id: Uuid, action: AlertAction) -> AppResult<Alert> {
            let mut alerts = self.alerts.lock().unwrap();
            let row = alerts
                .iter_mut()
                .find(|a| a.id == alert_id && a.account_id == account_id)
                .ok_or_else(|| AppError::NotFound("Alert not found".into()))?;
            match action {
                AlertAction::Dismiss => row.is_dismissed = true,
                AlertAction::MarkRead => row.is_read = true,
            }
            Ok(row.clone())
        }

        async fn mark_all_read(&self, _account_id: Uuid) -> AppResult<u64> {
            unimplemented!()
        }

        async fn get_equipment(&self, _equipment_id: Uuid) -> AppResult<Equipment> {
            unimplemented!()
        }

        async fn resolve_maintenance(&self, _account_id: Uuid, _equipment_id: Uuid, _at: DateTime<Utc>) -> AppResult<Equipment> {
            unimplemented!()
        }

        async fn dismiss_maintenance_alerts(&self, _account_id: Uuid, _equipment_id: Uuid) -> AppResult<u64> {
            unimplemented!()
        }
    }

    #[tokio::test]
    async fn test_concurrent_dismiss_and_read_stay_dismissed() {
        let owner = claims();
        let store = Arc::new(FakeStore::default());
        let ids: Vec<Uuid> = (0..20)
            .map(|_| {
                let a = alert(owner.account_id(), false, false);
                let id = a.id;
                store.alerts.lock().unwrap().push(a);
                id
            })
            .collect();
        let service = AlertsService::new(store.clone());

        for id in &ids {
            let (dismissed, read) = tokio::join!(service.dismiss(&owner, *id), service.mark_read(&owner, *id));
            tokio_test::assert_ok!(dismissed);
            tokio_test::assert_ok!(read);
        }

        let alerts = store.alerts.lock().unwrap();
        assert!(alerts.iter().all(|a| a.is_dismissed && a.is_read));
        drop(alerts);
        assert!(service.list(&owner, &AlertQuery::default()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_dismiss_twice_writes_once() {
        let owner = claims();
        let dismissed = alert(owner.account_id(), false, true);
        let id = dismissed.id;

        let mut store = MockAlertStore::new();
        store
            .expect_get_alert()
            .with(eq(id))
            .returning(move |_| Ok(dismissed.clone()));
        store.expect_apply_alert_action().never();

        let service = AlertsService::new(Arc::new(store));
        let result = service.dismiss(&owner, id).await.unwrap();
        assert!(result.is_dismissed);
    }

    #[tokio::test]
    async fn test_mark_read_on_dismissed_alert_only_sets_read() {
        let owner = claims();
        let dismissed = alert(owner.account_id(), false, true);
        let id = dismissed.id;
        let account_id = owner.account_id();

        let mut store = MockAlertStore::new();
        let stored = dismissed.clone();
        store.expect_get_alert().returning(move |_| Ok(stored.clone()));
        store
            .expect_apply_alert_action()
            .with(eq(account_id), eq(id), eq(AlertAction::MarkRead))
            .times(1)
            .returning(move |_, _, _| Ok(Alert { is_read: true, ..dismissed.clone() }));

        let service = AlertsService::new(Arc::new(store));
        let result = service.mark_read(&owner, id).await.unwrap();
        assert!(result.is_read);
        assert!(result.is_dismissed);
    }

    #[tokio::test]
    async fn test_foreign_alert_is_not_authorized() {
        let intruder = claims();
        let foreign = alert(Uuid::new_v4(), false, false);

        let mut store = MockAlertStore::new();
        store.expect_get_alert().returning(move |_| Ok(foreign.clone()));
        store.expect_apply_alert_action().never();

        let service = AlertsService::new(Arc::new(store));
        let err = service.dismiss(&intruder, Uuid::new_v4()).await.unwrap_err();
        assert!(matches!(err, AppError::Authorization(_)));
    }

    #[tokio::test]
    async fn test_foreign_equipment_resolve_is_not_authorized() {
        let intruder = claims();
        let foreign = equipment(Uuid::new_v4());

        let mut store = MockAlertStore::new();
        store.expect_get_equipment().returning(move |_| Ok(foreign.clone()));
        store.expect_resolve_maintenance().never();
        store.expect_dismiss_maintenance_alerts().never();

        let service = AlertsService::new(Arc::new(store));
        let err = service
            .resolve_maintenance(&intruder, Uuid::new_v4())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Authorization(_)));
    }

    #[tokio::test]
    async fn test_resolve_survives_failed_alert_dismissal() {
        let owner = claims();
        let item = equipment(owner.account_id());
        let id = item.id;

        let mut store = MockAlertStore::new();
        let stored = item.clone();
        store.expect_get_equipment().returning(move |_| Ok(stored.clone()));
        store
            .expect_resolve_maintenance()
            .times(1)
            .returning(move |_, _, at| {
                Ok(Equipment {
                    last_maintenance: Some(at),
                    maintenance_last_notified: None,
                    ..item.clone()
                })
            });
        store
            .expect_dismiss_maintenance_alerts()
            .times(1)
            .returning(|_, _| Err(AppError::Internal("connection reset".into())));

        let service = AlertsService::new(Arc::new(store));
        let resolved = service.resolve_maintenance(&owner, id).await.unwrap();
        assert_eq!(resolved.maintenance_last_notified, None);
        assert!(resolved.last_maintenance.is_some());
    }

    #[tokio::test]
    async fn test_duplicate_reorder_reminder_conflicts() {
        let owner = claims();

        let mut store = MockAlertStore::new();
        store.expect_get_bean().returning(|account_id, bean_id| {
            Ok(Bean {
                id: bean_id,
                account_id,
                name: "Kochere".to_string(),
                roaster: None,
                origin: None,
                roast_level: None,
                roast_date: None,
                weight_grams: Some(250.0),
                original_weight_grams: None,
                price: None,
                status: crate::models::enums::BeanStatus::Active,
                notes: None,
                created_at: Utc::now(),
            })
        });
        store
            .expect_insert_alert_if_absent()
            .withf(|a| a.alert_type == AlertType::Reorder && a.entity_type == Some(EntityType::Bean))
            .returning(|_| Ok(None));

        let service = AlertsService::new(Arc::new(store));
        let request = CreateAlert {
            title: "Order more Kochere".to_string(),
            message: None,
            priority: None,
            bean_id: Some(Uuid::new_v4()),
        };
        let err = service.create(&owner, &request).await.unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
    }
}
