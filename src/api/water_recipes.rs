//! Water recipe endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    error::AppResult,
    models::water_recipe::{CreateWaterRecipe, WaterRecipe},
    AppState,
};

use super::AuthenticatedUser;

#[utoipa::path(
    get,
    path = "/water-recipes",
    tag = "water",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Water recipes", body = Vec<WaterRecipe>)
    )
)]
pub async fn list_water_recipes(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
) -> AppResult<Json<Vec<WaterRecipe>>> {
    let recipes = state.services.water_recipes.list(claims.account_id()).await?;
    Ok(Json(recipes))
}

#[utoipa::path(
    post,
    path = "/water-recipes",
    tag = "water",
    security(("bearer_auth" = [])),
    request_body = CreateWaterRecipe,
    responses(
        (status = 201, description = "Water recipe created", body = WaterRecipe)
    )
)]
pub async fn create_water_recipe(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Json(data): Json<CreateWaterRecipe>,
) -> AppResult<(StatusCode, Json<WaterRecipe>)> {
    data.validate()?;
    let recipe = state.services.water_recipes.create(claims.account_id(), &data).await?;
    Ok((StatusCode::CREATED, Json(recipe)))
}

#[utoipa::path(
    delete,
    path = "/water-recipes/{id}",
    tag = "water",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Water recipe ID")),
    responses(
        (status = 204, description = "Water recipe deleted")
    )
)]
pub async fn delete_water_recipe(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> AppResult<StatusCode> {
    state.services.water_recipes.delete(claims.account_id(), id).await?;
    Ok(StatusCode::NO_CONTENT)
}
