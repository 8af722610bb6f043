//! Brew log model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

/// A single logged coffee preparation
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Brew {
    pub id: Uuid,
    pub account_id: Uuid,
    pub bean_id: Uuid,
    pub equipment_id: Option<Uuid>,
    pub grinder_id: Option<Uuid>,
    pub water_recipe_id: Option<Uuid>,
    pub dose_grams: Option<f64>,
    pub water_grams: Option<f64>,
    pub water_temp_c: Option<f64>,
    pub grind_setting: Option<String>,
    pub brew_time_seconds: Option<i32>,
    pub bloom_time_seconds: Option<i32>,
    /// 1 to 5
    pub rating: Option<i16>,
    pub notes: Option<String>,
    pub brewed_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl Brew {
    /// Water to coffee ratio (e.g. 16.0 for 1:16)
    pub fn ratio(&self) -> Option<f64> {
        brew_ratio(self.dose_grams, self.water_grams)
    }
}

/// Water/dose ratio; no data when the dose is missing or zero
pub fn brew_ratio(dose_grams: Option<f64>, water_grams: Option<f64>) -> Option<f64> {
    match (dose_grams, water_grams) {
        (Some(dose), Some(water)) if dose > 0.0 => Some(water / dose),
        _ => None,
    }
}

/// Brew with its computed ratio, as returned by the API
#[derive(Debug, Serialize, ToSchema)]
pub struct BrewDetails {
    #[serde(flatten)]
    pub brew: Brew,
    pub ratio: Option<f64>,
}

impl From<Brew> for BrewDetails {
    fn from(brew: Brew) -> Self {
        let ratio = brew.ratio();
        Self { brew, ratio }
    }
}

/// Brew parameters shared by create and repeat
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct CreateBrew {
    pub bean_id: Uuid,
    pub equipment_id: Option<Uuid>,
    pub grinder_id: Option<Uuid>,
    pub water_recipe_id: Option<Uuid>,
    #[validate(range(exclusive_min = 0.0, max = 2000.0, message = "Dose must be positive"))]
    pub dose_grams: Option<f64>,
    #[validate(range(exclusive_min = 0.0, max = 10000.0, message = "Water must be positive"))]
    pub water_grams: Option<f64>,
    #[validate(range(min = 0.0, max = 100.0, message = "Temperature must be between 0 and 100"))]
    pub water_temp_c: Option<f64>,
    pub grind_setting: Option<String>,
    #[validate(range(min = 0, message = "Brew time cannot be negative"))]
    pub brew_time_seconds: Option<i32>,
    #[validate(range(min = 0, message = "Bloom time cannot be negative"))]
    pub bloom_time_seconds: Option<i32>,
    #[validate(range(min = 1, max = 5, message = "Rating must be between 1 and 5"))]
    pub rating: Option<i16>,
    pub notes: Option<String>,
    /// Defaults to now
    pub brewed_at: Option<DateTime<Utc>>,
    /// Log the brew even though the bean has no stock left
    #[serde(default)]
    pub acknowledge_low_stock: bool,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateBrew {
    pub equipment_id: Option<Uuid>,
    pub grinder_id: Option<Uuid>,
    pub water_recipe_id: Option<Uuid>,
    #[validate(range(exclusive_min = 0.0, max = 2000.0, message = "Dose must be positive"))]
    pub dose_grams: Option<f64>,
    #[validate(range(exclusive_min = 0.0, max = 10000.0, message = "Water must be positive"))]
    pub water_grams: Option<f64>,
    #[validate(range(min = 0.0, max = 100.0, message = "Temperature must be between 0 and 100"))]
    pub water_temp_c: Option<f64>,
    pub grind_setting: Option<String>,
    #[validate(range(min = 0, message = "Brew time cannot be negative"))]
    pub brew_time_seconds: Option<i32>,
    #[validate(range(min = 0, message = "Bloom time cannot be negative"))]
    pub bloom_time_seconds: Option<i32>,
    #[validate(range(min = 1, max = 5, message = "Rating must be between 1 and 5"))]
    pub rating: Option<i16>,
    pub notes: Option<String>,
    pub brewed_at: Option<DateTime<Utc>>,
}

/// Quick brew: repeat an earlier preparation with a fresh outcome
#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
pub struct RepeatBrew {
    #[validate(range(min = 1, max = 5, message = "Rating must be between 1 and 5"))]
    pub rating: Option<i16>,
    pub notes: Option<String>,
    #[serde(default)]
    pub acknowledge_low_stock: bool,
}

impl RepeatBrew {
    /// Parameters for a new brew copying `template`, brewed now
    pub fn apply(&self, template: &Brew) -> CreateBrew {
        CreateBrew {
            bean_id: template.bean_id,
            equipment_id: template.equipment_id,
            grinder_id: template.grinder_id,
            water_recipe_id: template.water_recipe_id,
            dose_grams: template.dose_grams,
            water_grams: template.water_grams,
            water_temp_c: template.water_temp_c,
            grind_setting: template.grind_setting.clone(),
            brew_time_seconds: template.brew_time_seconds,
            bloom_time_seconds: template.bloom_time_seconds,
            rating: self.rating,
            notes: self.notes.clone(),
            brewed_at: None,
            acknowledge_low_stock: self.acknowledge_low_stock,
        }
    }
}

#[derive(Debug, Default, Deserialize, IntoParams, ToSchema)]
pub struct BrewQuery {
    pub bean_id: Option<Uuid>,
    pub equipment_id: Option<Uuid>,
    pub page: Option<i64>,
    pub per_page: Option<i64>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct BrewList {
    pub brews: Vec<BrewDetails>,
    pub total: i64,
}

/// Minimal brew projection used by the metrics aggregator
#[derive(Debug, Clone, FromRow)]
pub struct BrewPoint {
    pub id: Uuid,
    pub brewed_at: DateTime<Utc>,
    pub rating: Option<i16>,
    pub dose_grams: Option<f64>,
    pub water_grams: Option<f64>,
    /// Equipment subtype, else equipment type
    pub method: Option<String>,
    pub bean_name: Option<String>,
}
