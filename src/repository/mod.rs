//! Repository layer for database operations.
//!
//! Every query that serves a user request filters on the owning account id.

pub mod alerts;
pub mod beans;
pub mod brews;
pub mod cupping;
pub mod equipment;
pub mod water_recipes;

use sqlx::{Pool, Postgres};

/// Main repository struct holding database connection pool
#[derive(Clone)]
pub struct Repository {
    pub pool: Pool<Postgres>,
    pub equipment: equipment::EquipmentRepository,
    pub alerts: alerts::AlertsRepository,
    pub beans: beans::BeansRepository,
    pub brews: brews::BrewsRepository,
    pub cupping: cupping::CuppingRepository,
    pub water_recipes: water_recipes::WaterRecipesRepository,
}

impl Repository {
    /// Create a new repository with the given database pool
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self {
            equipment: equipment::EquipmentRepository::new(pool.clone()),
            alerts: alerts::AlertsRepository::new(pool.clone()),
            beans: beans::BeansRepository::new(pool.clone()),
            brews: brews::BrewsRepository::new(pool.clone()),
            cupping: cupping::CuppingRepository::new(pool.clone()),
            water_recipes: water_recipes::WaterRecipesRepository::new(pool.clone()),
            pool,
        }
    }

    /// Round trip to the database (readiness check)
    pub async fn ping(&self) -> Result<(), sqlx::Error> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
