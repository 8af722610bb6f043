//! Water recipes service

use uuid::Uuid;

use crate::{
    error::AppResult,
    models::water_recipe::{CreateWaterRecipe, WaterRecipe},
    repository::Repository,
};

#[derive(Clone)]
pub struct WaterRecipesService {
    repository: Repository,
}

impl WaterRecipesService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    pub async fn list(&self, account_id: Uuid) -> AppResult<Vec<WaterRecipe>> {
        self.repository.water_recipes.list(account_id).await
    }

    pub async fn create(&self, account_id: Uuid, data: &CreateWaterRecipe) -> AppResult<WaterRecipe> {
        self.repository.water_recipes.create(account_id, data).await
    }

    pub async fn delete(&self, account_id: Uuid, id: Uuid) -> AppResult<()> {
        self.repository.water_recipes.delete(account_id, id).await
    }
}
