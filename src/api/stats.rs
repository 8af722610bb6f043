//! Statistics endpoints

use axum::{
    extract::{Query, State},
    Json,
};
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};

use crate::{
    error::AppResult,
    services::metrics::{offset_from_minutes, Dashboard, DEFAULT_WINDOW_DAYS},
    AppState,
};

use super::AuthenticatedUser;

/// Client timezone, used for calendar-day boundaries
#[derive(Debug, Default, Deserialize, IntoParams, ToSchema)]
pub struct OffsetQuery {
    /// Minutes east of UTC (e.g. 60 for UTC+1). Defaults to 0.
    pub utc_offset_minutes: Option<i32>,
}

#[derive(Debug, Default, Deserialize, IntoParams, ToSchema)]
pub struct DashboardQuery {
    /// Rolling window in days for per-day series (1-365, default 30)
    pub days: Option<u32>,
    /// Minutes east of UTC. Defaults to 0.
    pub utc_offset_minutes: Option<i32>,
}

/// Dashboard chart data for the current account
#[utoipa::path(
    get,
    path = "/stats/dashboard",
    tag = "stats",
    security(("bearer_auth" = [])),
    params(DashboardQuery),
    responses(
        (status = 200, description = "Dashboard aggregates", body = Dashboard),
        (status = 400, description = "Invalid window or offset")
    )
)]
pub async fn get_dashboard(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Query(query): Query<DashboardQuery>,
) -> AppResult<Json<Dashboard>> {
    let offset = offset_from_minutes(query.utc_offset_minutes)?;
    let days = query.days.unwrap_or(DEFAULT_WINDOW_DAYS);
    let dashboard = state
        .services
        .metrics
        .dashboard(claims.account_id(), days, offset)
        .await?;
    Ok(Json(dashboard))
}
