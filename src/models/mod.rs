//! Data models for BrewVault

pub mod account;
pub mod alert;
pub mod bean;
pub mod brew;
pub mod cupping;
pub mod enums;
pub mod equipment;
pub mod water_recipe;

// Re-export commonly used types
pub use account::AccountClaims;
pub use alert::{Alert, AlertAction, AlertState, NewAlert};
pub use bean::{Bean, BeanConsumption, StockStatus};
pub use brew::{Brew, BrewPoint};
pub use cupping::{CuppingNote, ScaScores};
pub use enums::{AlertPriority, AlertType, BeanStatus, EntityType, EquipmentType};
pub use equipment::Equipment;
pub use water_recipe::WaterRecipe;
