//! Maintenance scanner
//!
//! Walks every equipment row with a service interval and raises a
//! `maintenance` alert once the interval has elapsed. Runs from the cron
//! endpoint; each run re-evaluates everything, so a missed or interrupted run
//! is recovered by the next one.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::{
    error::AppResult,
    models::{
        alert::{Alert, NewAlert},
        enums::{AlertPriority, AlertType, EntityType},
        equipment::{Equipment, MaintenanceStatus},
    },
    repository::Repository,
};

/// Storage operations the scanner needs
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MaintenanceStore: Send + Sync {
    async fn list_maintenance_tracked(&self) -> AppResult<Vec<Equipment>>;

    async fn has_active_alert(
        &self,
        account_id: Uuid,
        alert_type: AlertType,
        entity_id: Uuid,
    ) -> AppResult<bool>;

    async fn insert_alert_if_absent(&self, alert: &NewAlert) -> AppResult<Option<Alert>>;

    async fn mark_maintenance_notified(&self, equipment_id: Uuid, at: DateTime<Utc>) -> AppResult<()>;
}

#[async_trait]
impl MaintenanceStore for Repository {
    async fn list_maintenance_tracked(&self) -> AppResult<Vec<Equipment>> {
        self.equipment.list_maintenance_tracked().await
    }

    async fn has_active_alert(
        &self,
        account_id: Uuid,
        alert_type: AlertType,
        entity_id: Uuid,
    ) -> AppResult<bool> {
        self.alerts.has_active(account_id, alert_type, entity_id).await
    }

    async fn insert_alert_if_absent(&self, alert: &NewAlert) -> AppResult<Option<Alert>> {
        self.alerts.insert_if_absent(alert).await
    }

    async fn mark_maintenance_notified(&self, equipment_id: Uuid, at: DateTime<Utc>) -> AppResult<()> {
        self.equipment.mark_maintenance_notified(equipment_id, at).await
    }
}

/// Outcome of evaluating one equipment row against its schedule
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MaintenanceCheck {
    /// No (usable) interval configured
    NotTracked,
    /// Never serviced: no baseline to measure from
    NoBaseline,
    NotDue { days_since: i64 },
    /// A notification was sent less than a day ago
    RecentlyNotified,
    Due { days_since: i64, priority: AlertPriority },
}

/// Whole days elapsed since `since`
pub fn days_between(since: DateTime<Utc>, now: DateTime<Utc>) -> i64 {
    (now - since).num_seconds().div_euclid(86_400)
}

/// Decide what the scanner should do for one equipment row, ignoring
/// existing alerts (checked separately against the store).
pub fn evaluate(equipment: &Equipment, now: DateTime<Utc>) -> MaintenanceCheck {
    let interval = match equipment.maintenance_interval_days {
        Some(days) if days > 0 => i64::from(days),
        _ => return MaintenanceCheck::NotTracked,
    };
    let last = match equipment.last_maintenance {
        Some(last) => last,
        None => return MaintenanceCheck::NoBaseline,
    };

    let days_since = days_between(last, now);
    if days_since < interval {
        return MaintenanceCheck::NotDue { days_since };
    }

    if let Some(notified) = equipment.maintenance_last_notified {
        if now - notified < Duration::days(1) {
            return MaintenanceCheck::RecentlyNotified;
        }
    }

    let priority = if days_since >= 2 * interval {
        AlertPriority::High
    } else {
        AlertPriority::Normal
    };
    MaintenanceCheck::Due { days_since, priority }
}

/// Schedule view shown on the equipment page
pub fn maintenance_status(equipment: &Equipment, now: DateTime<Utc>) -> MaintenanceStatus {
    let days_since = equipment.last_maintenance.map(|last| days_between(last, now));
    let days_until_due = match (days_since, equipment.maintenance_interval_days) {
        (Some(since), Some(interval)) => Some(i64::from(interval) - since),
        _ => None,
    };

    MaintenanceStatus {
        equipment_id: equipment.id,
        last_maintenance: equipment.last_maintenance,
        maintenance_interval_days: equipment.maintenance_interval_days,
        days_since_maintenance: days_since,
        days_until_due,
        overdue: days_until_due.map_or(false, |d| d <= 0),
    }
}

fn maintenance_alert(equipment: &Equipment, days_since: i64, priority: AlertPriority, now: DateTime<Utc>) -> NewAlert {
    let interval = equipment.maintenance_interval_days.unwrap_or_default();
    NewAlert {
        account_id: equipment.account_id,
        alert_type: AlertType::Maintenance,
        entity_type: Some(EntityType::Equipment),
        entity_id: Some(equipment.id),
        title: format!("Maintenance due: {}", equipment.name),
        message: format!(
            "{} was last serviced {} days ago (every {} days).",
            equipment.label(),
            days_since,
            interval
        ),
        priority,
        triggered_at: now,
    }
}

/// Summary of one scanner run
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct ScanReport {
    pub examined: usize,
    pub alerts_created: usize,
    /// Due, but an active alert already exists
    pub already_alerted: usize,
    pub failures: usize,
}

#[derive(Clone)]
pub struct MaintenanceService {
    store: Arc<dyn MaintenanceStore>,
}

impl MaintenanceService {
    pub fn new(store: Arc<dyn MaintenanceStore>) -> Self {
        Self { store }
    }

    /// Run one scan. Only a failed read of the equipment table aborts;
    /// per-row failures are logged and the scan moves on.
    pub async fn run_scan(&self, now: DateTime<Utc>) -> AppResult<ScanReport> {
        let equipment = self.store.list_maintenance_tracked().await?;
        let mut report = ScanReport {
            examined: equipment.len(),
            ..Default::default()
        };

        for item in &equipment {
            let (days_since, priority) = match evaluate(item, now) {
                MaintenanceCheck::Due { days_since, priority } => (days_since, priority),
                _ => continue,
            };

            match self
                .store
                .has_active_alert(item.account_id, AlertType::Maintenance, item.id)
                .await
            {
                Ok(true) => {
                    report.already_alerted += 1;
                    continue;
                }
                Ok(false) => {}
                Err(e) => {
                    tracing::warn!(equipment_id = %item.id, "Maintenance alert lookup failed: {}", e);
                    report.failures += 1;
                    continue;
                }
            }

            let alert = maintenance_alert(item, days_since, priority, now);
            match self.store.insert_alert_if_absent(&alert).await {
                Ok(Some(created)) => {
                    tracing::debug!(equipment_id = %item.id, alert_id = %created.id, "Maintenance alert created");
                }
                Ok(None) => {
                    report.already_alerted += 1;
                    continue;
                }
                Err(e) => {
                    tracing::warn!(equipment_id = %item.id, "Maintenance alert insert failed: {}", e);
                    report.failures += 1;
                    continue;
                }
            }
            report.alerts_created += 1;

            // A failed stamp leaves the alert in place; the next run sees it and skips.
            if let Err(e) = self.store.mark_maintenance_notified(item.id, now).await {
                tracing::warn!(equipment_id = %item.id, "Failed to stamp maintenance notification: {}", e);
                report.failures += 1;
            }
        }

        tracing::info!(
            examined = report.examined,
            created = report.alerts_created,
            already_alerted = report.already_alerted,
            failures = report.failures,
            "Maintenance scan finished"
        );
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;
    use crate::{error::AppError, models::enums::EquipmentType};

    fn equipment(last_days_ago: Option<i64>, interval: Option<i32>, now: DateTime<Utc>) -> Equipment {
        Equipment {
            id: Uuid::new_v4(),
            account_id: Uuid::new_v4(),
            name: "Grinder".to_string(),
            equipment_type: EquipmentType::Grinder,
            subtype: None,
            brand: Some("Comandante".to_string()),
            model: Some("C40".to_string()),
            last_maintenance: last_days_ago.map(|d| now - Duration::days(d)),
            maintenance_interval_days: interval,
            maintenance_last_notified: None,
            notes: None,
            created_at: now - Duration::days(365),
        }
    }

    /// In-memory store behaving like the partial unique index
    #[derive(Default)]
    struct FakeStore {
        equipment: Mutex<Vec<Equipment>>,
        alerts: Mutex<Vec<Alert>>,
    }

    impl FakeStore {
        fn with(equipment: Vec<Equipment>) -> Arc<Self> {
            Arc::new(Self {
                equipment: Mutex::new(equipment),
                alerts: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl MaintenanceStore for FakeStore {
        async fn list_maintenance_tracked(&self) -> AppResult<Vec<Equipment>> {
            Ok(self
                .equipment
                .lock()
                .unwrap()
                .iter()
                .filter(|e| e.maintenance_interval_days.is_some())
                .cloned()
                .collect())
        }

        async fn has_active_alert(&self, account_id: Uuid, alert_type: AlertType, entity_id: Uuid) -> AppResult<bool> {
            Ok(self.alerts.lock().unwrap().iter().any(|a| {
                a.account_id == account_id
                    && a.alert_type == alert_type
                    && a.entity_id == Some(entity_id)
                    && !a.is_dismissed
            }))
        }

        async fn insert_alert_if_absent(&self, alert: &NewAlert) -> AppResult<Option<Alert>> {
            let mut alerts = self.alerts.lock().unwrap();
            let exists = alerts.iter().any(|a| {
                a.account_id == alert.account_id
                    && a.alert_type == alert.alert_type
                    && a.entity_id == alert.entity_id
                    && !a.is_dismissed
            });
            if exists {
                return Ok(None);
            }
            let created = Alert {
                id: Uuid::new_v4(),
                account_id: alert.account_id,
                alert_type: alert.alert_type,
                entity_type: alert.entity_type,
                entity_id: alert.entity_id,
                title: alert.title.clone(),
                message: alert.message.clone(),
                priority: alert.priority,
                is_read: false,
                is_dismissed: false,
                triggered_at: alert.triggered_at,
            };
            alerts.push(created.clone());
            Ok(Some(created))
        }

        async fn mark_maintenance_notified(&self, equipment_id: Uuid, at: DateTime<Utc>) -> AppResult<()> {
            for e in self.equipment.lock().unwrap().iter_mut() {
                if e.id == equipment_id {
                    e.maintenance_last_notified = Some(at);
                }
            }
            Ok(())
        }
    }

    #[test]
    fn test_never_serviced_is_not_evaluated() {
        let now = Utc::now();
        for interval in [1, 7, 90] {
            assert_eq!(
                evaluate(&equipment(None, Some(interval), now), now),
                MaintenanceCheck::NoBaseline
            );
        }
        assert_eq!(evaluate(&equipment(Some(30), None, now), now), MaintenanceCheck::NotTracked);
        assert_eq!(evaluate(&equipment(Some(30), Some(0), now), now), MaintenanceCheck::NotTracked);
    }

    #[test]
    fn test_priority_thresholds() {
        let now = Utc::now();
        assert_eq!(
            evaluate(&equipment(Some(6), Some(7), now), now),
            MaintenanceCheck::NotDue { days_since: 6 }
        );
        assert_eq!(
            evaluate(&equipment(Some(7), Some(7), now), now),
            MaintenanceCheck::Due { days_since: 7, priority: AlertPriority::Normal }
        );
        assert_eq!(
            evaluate(&equipment(Some(10), Some(7), now), now),
            MaintenanceCheck::Due { days_since: 10, priority: AlertPriority::Normal }
        );
        assert_eq!(
            evaluate(&equipment(Some(14), Some(7), now), now),
            MaintenanceCheck::Due { days_since: 14, priority: AlertPriority::High }
        );
    }

    #[test]
    fn test_recent_notification_suppresses() {
        let now = Utc::now();
        let mut e = equipment(Some(10), Some(7), now);
        e.maintenance_last_notified = Some(now - Duration::hours(20));
        assert_eq!(evaluate(&e, now), MaintenanceCheck::RecentlyNotified);

        e.maintenance_last_notified = Some(now - Duration::hours(25));
        assert!(matches!(evaluate(&e, now), MaintenanceCheck::Due { .. }));
    }

    #[test]
    fn test_days_between_floors() {
        let now = Utc::now();
        assert_eq!(days_between(now - Duration::hours(47), now), 1);
        assert_eq!(days_between(now - Duration::days(3), now), 3);
    }

    #[test]
    fn test_maintenance_status() {
        let now = Utc::now();
        let status = maintenance_status(&equipment(Some(10), Some(7), now), now);
        assert_eq!(status.days_since_maintenance, Some(10));
        assert_eq!(status.days_until_due, Some(-3));
        assert!(status.overdue);

        let status = maintenance_status(&equipment(None, Some(7), now), now);
        assert_eq!(status.days_until_due, None);
        assert!(!status.overdue);
    }

    #[tokio::test]
    async fn test_scan_creates_normal_alert_and_stamps() {
        let now = Utc::now();
        let item = equipment(Some(10), Some(7), now);
        let store = FakeStore::with(vec![item.clone()]);
        let service = MaintenanceService::new(store.clone());

        let report = tokio_test::assert_ok!(service.run_scan(now).await);
        assert_eq!(report.alerts_created, 1);

        let alerts = store.alerts.lock().unwrap().clone();
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].priority, AlertPriority::Normal);
        assert_eq!(alerts[0].alert_type, AlertType::Maintenance);
        assert_eq!(alerts[0].entity_id, Some(item.id));
        assert_eq!(alerts[0].account_id, item.account_id);

        let stamped = store.equipment.lock().unwrap()[0].maintenance_last_notified;
        assert_eq!(stamped, Some(now));
    }

    #[tokio::test]
    async fn test_second_scan_same_day_creates_nothing() {
        let now = Utc::now();
        let store = FakeStore::with(vec![equipment(Some(7), Some(7), now)]);
        let service = MaintenanceService::new(store.clone());

        assert_eq!(service.run_scan(now).await.unwrap().alerts_created, 1);
        let later = now + Duration::hours(3);
        assert_eq!(service.run_scan(later).await.unwrap().alerts_created, 0);
        assert_eq!(store.alerts.lock().unwrap().len(), 1);

        // Next day: stamp is stale but the alert is still active
        let next_day = now + Duration::days(1) + Duration::minutes(1);
        let report = service.run_scan(next_day).await.unwrap();
        assert_eq!(report.alerts_created, 0);
        assert_eq!(report.already_alerted, 1);
    }

    #[tokio::test]
    async fn test_dismissed_alert_allows_a_new_one() {
        let now = Utc::now();
        let store = FakeStore::with(vec![equipment(Some(30), Some(7), now)]);
        let service = MaintenanceService::new(store.clone());

        service.run_scan(now).await.unwrap();
        store.alerts.lock().unwrap()[0].is_dismissed = true;

        let report = service.run_scan(now + Duration::days(2)).await.unwrap();
        assert_eq!(report.alerts_created, 1);
        let alerts = store.alerts.lock().unwrap();
        assert_eq!(alerts.len(), 2);
        assert_eq!(alerts[1].priority, AlertPriority::High);
    }

    #[tokio::test]
    async fn test_never_serviced_equipment_never_alerts() {
        let now = Utc::now();
        let store = FakeStore::with(vec![
            equipment(None, Some(1), now),
            equipment(None, Some(30), now),
        ]);
        let service = MaintenanceService::new(store.clone());

        let report = service.run_scan(now).await.unwrap();
        assert_eq!(report.examined, 2);
        assert_eq!(report.alerts_created, 0);
        assert!(store.alerts.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_row_failure_does_not_abort_scan() {
        let now = Utc::now();
        let failing = equipment(Some(10), Some(7), now);
        let healthy = equipment(Some(10), Some(7), now);
        let failing_id = failing.id;
        let healthy_id = healthy.id;
        let rows = vec![failing, healthy];

        let mut store = MockMaintenanceStore::new();
        store
            .expect_list_maintenance_tracked()
            .returning(move || Ok(rows.clone()));
        store.expect_has_active_alert().returning(|_, _, _| Ok(false));
        store
            .expect_insert_alert_if_absent()
            .withf(move |a| a.entity_id == Some(failing_id))
            .returning(|_| Err(AppError::Internal("insert failed".into())));
        store
            .expect_insert_alert_if_absent()
            .withf(move |a| a.entity_id == Some(healthy_id))
            .returning(|a| {
                Ok(Some(Alert {
                    id: Uuid::new_v4(),
                    account_id: a.account_id,
                    alert_type: a.alert_type,
                    entity_type: a.entity_type,
                    entity_id: a.entity_id,
                    title: a.title.clone(),
                    message: a.message.clone(),
                    priority: a.priority,
                    is_read: false,
                    is_dismissed: false,
                    triggered_at: a.triggered_at,
                }))
            });
        store
            .expect_mark_maintenance_notified()
            .withf(move |id, _| *id == healthy_id)
            .times(1)
            .returning(|_, _| Ok(()));

        let service = MaintenanceService::new(Arc::new(store));
        let report = service.run_scan(now).await.unwrap();
        assert_eq!(report.alerts_created, 1);
        assert_eq!(report.failures, 1);
    }

    #[tokio::test]
    async fn test_equipment_read_failure_aborts() {
        let mut store = MockMaintenanceStore::new();
        store
            .expect_list_maintenance_tracked()
            .returning(|| Err(AppError::Internal("connection refused".into())));
        store.expect_insert_alert_if_absent().never();

        let service = MaintenanceService::new(Arc::new(store));
        assert!(service.run_scan(Utc::now()).await.is_err());
    }
}
