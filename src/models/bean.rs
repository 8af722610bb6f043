//! Coffee bean model and stock figures

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use super::enums::BeanStatus;

/// A bag of coffee beans
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Bean {
    pub id: Uuid,
    pub account_id: Uuid,
    pub name: String,
    pub roaster: Option<String>,
    pub origin: Option<String>,
    pub roast_level: Option<String>,
    pub roast_date: Option<NaiveDate>,
    /// Purchased weight (corrected value once the bag is marked finished)
    pub weight_grams: Option<f64>,
    /// Weight as first recorded, kept when a correction rewrites `weight_grams`
    pub original_weight_grams: Option<f64>,
    pub price: Option<Decimal>,
    pub status: BeanStatus,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateBean {
    #[validate(length(min = 1, message = "Name is required"))]
    pub name: String,
    pub roaster: Option<String>,
    pub origin: Option<String>,
    pub roast_level: Option<String>,
    pub roast_date: Option<NaiveDate>,
    #[validate(range(exclusive_min = 0.0, message = "Weight must be positive"))]
    pub weight_grams: Option<f64>,
    pub price: Option<Decimal>,
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateBean {
    #[validate(length(min = 1, message = "Name cannot be empty"))]
    pub name: Option<String>,
    pub roaster: Option<String>,
    pub origin: Option<String>,
    pub roast_level: Option<String>,
    pub roast_date: Option<NaiveDate>,
    #[validate(range(exclusive_min = 0.0, message = "Weight must be positive"))]
    pub weight_grams: Option<f64>,
    pub price: Option<Decimal>,
    pub status: Option<BeanStatus>,
    pub notes: Option<String>,
}

#[derive(Debug, Default, Deserialize, IntoParams, ToSchema)]
pub struct BeanQuery {
    pub status: Option<BeanStatus>,
}

/// "Mark as finished" correction: the real starting weight of the bag
#[derive(Debug, Deserialize, ToSchema)]
pub struct FinishBean {
    pub actual_initial_weight_grams: f64,
}

/// Cumulative recorded consumption of a bean
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, ToSchema)]
pub struct BeanConsumption {
    pub brew_count: i64,
    pub total_dose_grams: f64,
}

impl BeanConsumption {
    /// Fold a bean's dose log; brews without a recorded dose count as 0 g
    pub fn from_doses<I>(doses: I) -> Self
    where
        I: IntoIterator<Item = Option<f64>>,
    {
        doses.into_iter().fold(Self::default(), |acc, dose| Self {
            brew_count: acc.brew_count + 1,
            total_dose_grams: acc.total_dose_grams + dose.unwrap_or(0.0),
        })
    }
}

/// Derived stock figures for a bean
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct StockStatus {
    pub bean_id: Uuid,
    pub weight_grams: Option<f64>,
    pub consumption: BeanConsumption,
    /// `weight_grams - total_dose_grams`; unknown when no weight was recorded
    pub remaining_grams: Option<f64>,
    /// True when remaining stock is known and at or below zero
    pub depleted: bool,
    pub price_per_gram: Option<Decimal>,
}
