//! Cupping note endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use crate::{
    error::AppResult,
    models::cupping::{CreateCuppingNote, CuppingNoteView},
    AppState,
};

use super::AuthenticatedUser;

/// Cupping notes of a brew
#[utoipa::path(
    get,
    path = "/brews/{id}/cupping",
    tag = "cupping",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Brew ID")),
    responses(
        (status = 200, description = "Cupping notes with total scores", body = Vec<CuppingNoteView>)
    )
)]
pub async fn list_cupping_notes(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(brew_id): Path<Uuid>,
) -> AppResult<Json<Vec<CuppingNoteView>>> {
    let notes = state.services.cupping.list_for_brew(claims.account_id(), brew_id).await?;
    Ok(Json(notes))
}

/// Score a brew
#[utoipa::path(
    post,
    path = "/brews/{id}/cupping",
    tag = "cupping",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Brew ID")),
    request_body = CreateCuppingNote,
    responses(
        (status = 201, description = "Cupping note created", body = CuppingNoteView),
        (status = 400, description = "Scores out of range or not in quarter points")
    )
)]
pub async fn create_cupping_note(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(brew_id): Path<Uuid>,
    Json(data): Json<CreateCuppingNote>,
) -> AppResult<(StatusCode, Json<CuppingNoteView>)> {
    let note = state
        .services
        .cupping
        .create(claims.account_id(), brew_id, &data)
        .await?;
    Ok((StatusCode::CREATED, Json(note)))
}

/// Get a cupping note
#[utoipa::path(
    get,
    path = "/cupping/{id}",
    tag = "cupping",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Cupping note ID")),
    responses(
        (status = 200, description = "Cupping note", body = CuppingNoteView)
    )
)]
pub async fn get_cupping_note(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<CuppingNoteView>> {
    let note = state.services.cupping.get_by_id(claims.account_id(), id).await?;
    Ok(Json(note))
}

/// Delete a cupping note
#[utoipa::path(
    delete,
    path = "/cupping/{id}",
    tag = "cupping",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Cupping note ID")),
    responses(
        (status = 204, description = "Cupping note deleted")
    )
)]
pub async fn delete_cupping_note(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> AppResult<StatusCode> {
    state.services.cupping.delete(claims.account_id(), id).await?;
    Ok(StatusCode::NO_CONTENT)
}
