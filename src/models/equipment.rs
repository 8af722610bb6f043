//! Equipment model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use super::enums::EquipmentType;

/// Brewing equipment owned by an account
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Equipment {
    pub id: Uuid,
    pub account_id: Uuid,
    /// Display name
    pub name: String,
    pub equipment_type: EquipmentType,
    /// Finer classification, e.g. "V60" or "AeroPress"; used as the brew method label
    pub subtype: Option<String>,
    pub brand: Option<String>,
    pub model: Option<String>,
    /// Last time the equipment was serviced
    pub last_maintenance: Option<DateTime<Utc>>,
    /// Service interval; maintenance is not tracked when unset
    pub maintenance_interval_days: Option<i32>,
    /// Last time the scanner raised a maintenance alert
    pub maintenance_last_notified: Option<DateTime<Utc>>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Equipment {
    /// Human readable label ("Brand Model", falling back to the name)
    pub fn label(&self) -> String {
        match (&self.brand, &self.model) {
            (Some(brand), Some(model)) => format!("{} {}", brand, model),
            (Some(brand), None) => brand.clone(),
            (None, Some(model)) => model.clone(),
            (None, None) => self.name.clone(),
        }
    }
}

/// Create equipment request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateEquipment {
    #[validate(length(min = 1, message = "Name is required"))]
    pub name: String,
    pub equipment_type: Option<EquipmentType>,
    pub subtype: Option<String>,
    pub brand: Option<String>,
    pub model: Option<String>,
    pub last_maintenance: Option<DateTime<Utc>>,
    #[validate(range(min = 1, message = "Maintenance interval must be at least one day"))]
    pub maintenance_interval_days: Option<i32>,
    pub notes: Option<String>,
}

/// Update equipment request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateEquipment {
    #[validate(length(min = 1, message = "Name cannot be empty"))]
    pub name: Option<String>,
    pub equipment_type: Option<EquipmentType>,
    pub subtype: Option<String>,
    pub brand: Option<String>,
    pub model: Option<String>,
    #[validate(range(min = 1, message = "Maintenance interval must be at least one day"))]
    pub maintenance_interval_days: Option<i32>,
    pub notes: Option<String>,
}

/// Maintenance schedule view for one piece of equipment
#[derive(Debug, Serialize, ToSchema)]
pub struct MaintenanceStatus {
    pub equipment_id: Uuid,
    pub last_maintenance: Option<DateTime<Utc>>,
    pub maintenance_interval_days: Option<i32>,
    /// Whole days since the last service, when known
    pub days_since_maintenance: Option<i64>,
    /// Days left before service is due (negative when overdue)
    pub days_until_due: Option<i64>,
    pub overdue: bool,
}
