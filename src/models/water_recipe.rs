//! Water recipe model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

/// Brewing water composition
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct WaterRecipe {
    pub id: Uuid,
    pub account_id: Uuid,
    pub name: String,
    /// GH as ppm CaCO3
    pub general_hardness_ppm: Option<f64>,
    /// KH as ppm CaCO3
    pub alkalinity_ppm: Option<f64>,
    pub magnesium_ppm: Option<f64>,
    pub calcium_ppm: Option<f64>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateWaterRecipe {
    #[validate(length(min = 1, message = "Name is required"))]
    pub name: String,
    #[validate(range(min = 0.0, message = "Hardness cannot be negative"))]
    pub general_hardness_ppm: Option<f64>,
    #[validate(range(min = 0.0, message = "Alkalinity cannot be negative"))]
    pub alkalinity_ppm: Option<f64>,
    #[validate(range(min = 0.0, message = "Magnesium cannot be negative"))]
    pub magnesium_ppm: Option<f64>,
    #[validate(range(min = 0.0, message = "Calcium cannot be negative"))]
    pub calcium_ppm: Option<f64>,
    pub notes: Option<String>,
}
