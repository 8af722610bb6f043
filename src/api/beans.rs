//! Bean and stock endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    error::AppResult,
    models::bean::{Bean, BeanQuery, CreateBean, FinishBean, StockStatus, UpdateBean},
    AppState,
};

use super::AuthenticatedUser;

/// List beans
#[utoipa::path(
    get,
    path = "/beans",
    tag = "beans",
    security(("bearer_auth" = [])),
    params(BeanQuery),
    responses(
        (status = 200, description = "Beans, newest first", body = Vec<Bean>)
    )
)]
pub async fn list_beans(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Query(query): Query<BeanQuery>,
) -> AppResult<Json<Vec<Bean>>> {
    let beans = state.services.stock.list(claims.account_id(), &query).await?;
    Ok(Json(beans))
}

/// Get a bean
#[utoipa::path(
    get,
    path = "/beans/{id}",
    tag = "beans",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Bean ID")),
    responses(
        (status = 200, description = "Bean details", body = Bean),
        (status = 404, description = "Bean not found")
    )
)]
pub async fn get_bean(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<Bean>> {
    let bean = state.services.stock.get_by_id(claims.account_id(), id).await?;
    Ok(Json(bean))
}

/// Add a bag of beans
#[utoipa::path(
    post,
    path = "/beans",
    tag = "beans",
    security(("bearer_auth" = [])),
    request_body = CreateBean,
    responses(
        (status = 201, description = "Bean created", body = Bean),
        (status = 400, description = "Invalid request")
    )
)]
pub async fn create_bean(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Json(data): Json<CreateBean>,
) -> AppResult<(StatusCode, Json<Bean>)> {
    data.validate()?;
    let bean = state.services.stock.create(claims.account_id(), &data).await?;
    Ok((StatusCode::CREATED, Json(bean)))
}

/// Update a bean
#[utoipa::path(
    put,
    path = "/beans/{id}",
    tag = "beans",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Bean ID")),
    request_body = UpdateBean,
    responses(
        (status = 200, description = "Bean updated", body = Bean)
    )
)]
pub async fn update_bean(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(data): Json<UpdateBean>,
) -> AppResult<Json<Bean>> {
    data.validate()?;
    let bean = state.services.stock.update(claims.account_id(), id, &data).await?;
    Ok(Json(bean))
}

/// Delete a bean and its brews
#[utoipa::path(
    delete,
    path = "/beans/{id}",
    tag = "beans",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Bean ID")),
    responses(
        (status = 204, description = "Bean deleted")
    )
)]
pub async fn delete_bean(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> AppResult<StatusCode> {
    state.services.stock.delete(claims.account_id(), id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Remaining stock derived from the brew log
#[utoipa::path(
    get,
    path = "/beans/{id}/stock",
    tag = "beans",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Bean ID")),
    responses(
        (status = 200, description = "Stock status", body = StockStatus)
    )
)]
pub async fn get_stock(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<StockStatus>> {
    let stock = state.services.stock.stock(claims.account_id(), id).await?;
    Ok(Json(stock))
}

/// Mark a bag finished, correcting its starting weight
#[utoipa::path(
    post,
    path = "/beans/{id}/finish",
    tag = "beans",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Bean ID")),
    request_body = FinishBean,
    responses(
        (status = 200, description = "Bean finished", body = Bean),
        (status = 400, description = "Weight must be positive")
    )
)]
pub async fn finish_bean(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(data): Json<FinishBean>,
) -> AppResult<Json<Bean>> {
    let bean = state
        .services
        .stock
        .mark_as_finished(claims.account_id(), id, data.actual_initial_weight_grams)
        .await?;
    Ok(Json(bean))
}
