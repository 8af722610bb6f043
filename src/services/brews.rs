//! Brew logging service

use uuid::Uuid;

use crate::{
    error::AppResult,
    models::brew::{Brew, BrewQuery, CreateBrew, RepeatBrew, UpdateBrew},
    repository::Repository,
    services::stock::StockService,
};

#[derive(Clone)]
pub struct BrewsService {
    repository: Repository,
    stock: StockService,
}

impl BrewsService {
    pub fn new(repository: Repository, stock: StockService) -> Self {
        Self { repository, stock }
    }

    pub async fn list(&self, account_id: Uuid, query: &BrewQuery) -> AppResult<(Vec<Brew>, i64)> {
        self.repository.brews.list(account_id, query).await
    }

    pub async fn get_by_id(&self, account_id: Uuid, id: Uuid) -> AppResult<Brew> {
        self.repository.brews.get_by_id(account_id, id).await
    }

    /// Referenced equipment, grinder and water recipe must belong to the account
    async fn check_references(
        &self,
        account_id: Uuid,
        equipment_id: Option<Uuid>,
        grinder_id: Option<Uuid>,
        water_recipe_id: Option<Uuid>,
    ) -> AppResult<()> {
        for id in [equipment_id, grinder_id].into_iter().flatten() {
            self.repository.equipment.get_by_id(account_id, id).await?;
        }
        if let Some(id) = water_recipe_id {
            self.repository.water_recipes.get_by_id(account_id, id).await?;
        }
        Ok(())
    }

    /// Log a brew. A depleted bean blocks the brew until the user acknowledges it.
    pub async fn create(&self, account_id: Uuid, data: &CreateBrew) -> AppResult<Brew> {
        self.stock
            .check_before_brew(account_id, data.bean_id, data.acknowledge_low_stock)
            .await?;
        self.check_references(account_id, data.equipment_id, data.grinder_id, data.water_recipe_id)
            .await?;

        let brew = self.repository.brews.create(account_id, data).await?;
        tracing::debug!(brew_id = %brew.id, bean_id = %brew.bean_id, "Brew logged");

        self.stock.raise_low_stock_alert(account_id, brew.bean_id).await;
        Ok(brew)
    }

    /// Quick brew: log a new brew with the parameters of an earlier one
    pub async fn repeat(&self, account_id: Uuid, template_id: Uuid, data: &RepeatBrew) -> AppResult<Brew> {
        let template = self.repository.brews.get_by_id(account_id, template_id).await?;
        self.create(account_id, &data.apply(&template)).await
    }

    pub async fn update(&self, account_id: Uuid, id: Uuid, data: &UpdateBrew) -> AppResult<Brew> {
        self.check_references(account_id, data.equipment_id, data.grinder_id, data.water_recipe_id)
            .await?;
        self.repository.brews.update(account_id, id, data).await
    }

    pub async fn delete(&self, account_id: Uuid, id: Uuid) -> AppResult<()> {
        self.repository.brews.delete(account_id, id).await
    }
}
