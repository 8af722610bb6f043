//! Business logic services

pub mod alerts;
pub mod brews;
pub mod cupping;
pub mod equipment;
pub mod maintenance;
pub mod metrics;
pub mod stock;
pub mod water_recipes;

use std::sync::Arc;

use crate::{config::StockConfig, repository::Repository};

/// Container for all services
#[derive(Clone)]
pub struct Services {
    pub repository: Repository,
    pub equipment: equipment::EquipmentService,
    pub alerts: alerts::AlertsService,
    pub maintenance: maintenance::MaintenanceService,
    pub stock: stock::StockService,
    pub brews: brews::BrewsService,
    pub cupping: cupping::CuppingService,
    pub water_recipes: water_recipes::WaterRecipesService,
    pub metrics: metrics::MetricsService,
}

impl Services {
    /// Create all services with the given repository
    pub fn new(repository: Repository, stock_config: StockConfig) -> Self {
        let stock = stock::StockService::new(repository.clone(), stock_config);
        Self {
            equipment: equipment::EquipmentService::new(repository.clone()),
            alerts: alerts::AlertsService::new(Arc::new(repository.clone())),
            maintenance: maintenance::MaintenanceService::new(Arc::new(repository.clone())),
            brews: brews::BrewsService::new(repository.clone(), stock.clone()),
            stock,
            cupping: cupping::CuppingService::new(repository.clone()),
            water_recipes: water_recipes::WaterRecipesService::new(repository.clone()),
            metrics: metrics::MetricsService::new(repository.clone()),
            repository,
        }
    }
}
