//! Scheduler-triggered jobs

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use axum_extra::{
    headers::{authorization::Bearer, Authorization},
    TypedHeader,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use subtle::ConstantTimeEq;
use utoipa::ToSchema;

use crate::{error::AppError, AppState};

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CronResponse {
    pub success: bool,
    pub alerts_created: usize,
    pub timestamp: DateTime<Utc>,
}

#[derive(Serialize, ToSchema)]
pub struct CronErrorBody {
    pub error: String,
}

/// Cron failure, rendered as `{"error": ...}`
#[derive(Debug)]
pub struct CronError(StatusCode, String);

impl IntoResponse for CronError {
    fn into_response(self) -> Response {
        (self.0, Json(CronErrorBody { error: self.1 })).into_response()
    }
}

impl From<AppError> for CronError {
    fn from(err: AppError) -> Self {
        let (status, _, message) = err.parts();
        CronError(status, message)
    }
}

/// Compare the presented bearer token with the configured secret
pub fn check_cron_secret(configured: Option<&str>, presented: Option<&str>) -> Result<(), CronError> {
    let secret = configured
        .filter(|s| !s.is_empty())
        .ok_or_else(|| CronError::from(AppError::Configuration("cron secret is not set".to_string())))?;

    match presented {
        Some(token) if bool::from(token.as_bytes().ct_eq(secret.as_bytes())) => Ok(()),
        _ => Err(CronError(StatusCode::UNAUTHORIZED, "Unauthorized".to_string())),
    }
}

/// Run the maintenance scanner
#[utoipa::path(
    get,
    path = "/cron/maintenance",
    tag = "cron",
    security(("cron_secret" = [])),
    responses(
        (status = 200, description = "Scan completed", body = CronResponse),
        (status = 401, description = "Bad or missing secret", body = CronErrorBody),
        (status = 500, description = "Misconfigured or store failure", body = CronErrorBody)
    )
)]
pub async fn maintenance_scan(
    State(state): State<AppState>,
    auth: Option<TypedHeader<Authorization<Bearer>>>,
) -> Result<Json<CronResponse>, CronError> {
    let presented = auth.as_ref().map(|TypedHeader(Authorization(bearer))| bearer.token());
    check_cron_secret(state.config.cron.secret.as_deref(), presented)?;

    let now = Utc::now();
    let report = state.services.maintenance.run_scan(now).await?;

    Ok(Json(CronResponse {
        success: true,
        alerts_created: report.alerts_created,
        timestamp: now,
    }))
}
