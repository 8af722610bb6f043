//! Equipment service

use chrono::Utc;
use uuid::Uuid;

use crate::{
    error::AppResult,
    models::equipment::{CreateEquipment, Equipment, MaintenanceStatus, UpdateEquipment},
    repository::Repository,
    services::maintenance::maintenance_status,
};

#[derive(Clone)]
pub struct EquipmentService {
    repository: Repository,
}

impl EquipmentService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    pub async fn list(&self, account_id: Uuid) -> AppResult<Vec<Equipment>> {
        self.repository.equipment.list(account_id).await
    }

    pub async fn get_by_id(&self, account_id: Uuid, id: Uuid) -> AppResult<Equipment> {
        self.repository.equipment.get_by_id(account_id, id).await
    }

    pub async fn create(&self, account_id: Uuid, data: &CreateEquipment) -> AppResult<Equipment> {
        self.repository.equipment.create(account_id, data).await
    }

    pub async fn update(&self, account_id: Uuid, id: Uuid, data: &UpdateEquipment) -> AppResult<Equipment> {
        self.repository.equipment.update(account_id, id, data).await
    }

    pub async fn delete(&self, account_id: Uuid, id: Uuid) -> AppResult<()> {
        self.repository.equipment.delete(account_id, id).await
    }

    /// Maintenance schedule for one piece of equipment
    pub async fn maintenance(&self, account_id: Uuid, id: Uuid) -> AppResult<MaintenanceStatus> {
        let equipment = self.repository.equipment.get_by_id(account_id, id).await?;
        Ok(maintenance_status(&equipment, Utc::now()))
    }
}
