//! Brew log endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    error::AppResult,
    models::brew::{BrewDetails, BrewList, BrewQuery, CreateBrew, RepeatBrew, UpdateBrew},
    AppState,
};

use super::AuthenticatedUser;

/// List brews
#[utoipa::path(
    get,
    path = "/brews",
    tag = "brews",
    security(("bearer_auth" = [])),
    params(BrewQuery),
    responses(
        (status = 200, description = "Brews, newest first", body = BrewList)
    )
)]
pub async fn list_brews(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Query(query): Query<BrewQuery>,
) -> AppResult<Json<BrewList>> {
    let (brews, total) = state.services.brews.list(claims.account_id(), &query).await?;
    Ok(Json(BrewList {
        brews: brews.into_iter().map(BrewDetails::from).collect(),
        total,
    }))
}

/// Get a brew
#[utoipa::path(
    get,
    path = "/brews/{id}",
    tag = "brews",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Brew ID")),
    responses(
        (status = 200, description = "Brew details", body = BrewDetails),
        (status = 404, description = "Brew not found")
    )
)]
pub async fn get_brew(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<BrewDetails>> {
    let brew = state.services.brews.get_by_id(claims.account_id(), id).await?;
    Ok(Json(brew.into()))
}

/// Log a brew
#[utoipa::path(
    post,
    path = "/brews",
    tag = "brews",
    security(("bearer_auth" = [])),
    request_body = CreateBrew,
    responses(
        (status = 201, description = "Brew logged", body = BrewDetails),
        (status = 400, description = "Invalid request"),
        (status = 422, description = "Bean has no stock left; resend with acknowledge_low_stock")
    )
)]
pub async fn create_brew(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Json(data): Json<CreateBrew>,
) -> AppResult<(StatusCode, Json<BrewDetails>)> {
    data.validate()?;
    let brew = state.services.brews.create(claims.account_id(), &data).await?;
    Ok((StatusCode::CREATED, Json(brew.into())))
}

/// Quick brew: repeat an earlier brew now
#[utoipa::path(
    post,
    path = "/brews/{id}/repeat",
    tag = "brews",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Brew to repeat")),
    request_body = RepeatBrew,
    responses(
        (status = 201, description = "Brew logged", body = BrewDetails),
        (status = 422, description = "Bean has no stock left; resend with acknowledge_low_stock")
    )
)]
pub async fn repeat_brew(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(data): Json<RepeatBrew>,
) -> AppResult<(StatusCode, Json<BrewDetails>)> {
    data.validate()?;
    let brew = state.services.brews.repeat(claims.account_id(), id, &data).await?;
    Ok((StatusCode::CREATED, Json(brew.into())))
}

/// Edit a brew
#[utoipa::path(
    put,
    path = "/brews/{id}",
    tag = "brews",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Brew ID")),
    request_body = UpdateBrew,
    responses(
        (status = 200, description = "Brew updated", body = BrewDetails)
    )
)]
pub async fn update_brew(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(data): Json<UpdateBrew>,
) -> AppResult<Json<BrewDetails>> {
    data.validate()?;
    let brew = state.services.brews.update(claims.account_id(), id, &data).await?;
    Ok(Json(brew.into()))
}

/// Delete a brew
#[utoipa::path(
    delete,
    path = "/brews/{id}",
    tag = "brews",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Brew ID")),
    responses(
        (status = 204, description = "Brew deleted")
    )
)]
pub async fn delete_brew(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> AppResult<StatusCode> {
    state.services.brews.delete(claims.account_id(), id).await?;
    Ok(StatusCode::NO_CONTENT)
}
