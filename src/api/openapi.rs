//! OpenAPI documentation

use axum::Router;
use utoipa::{
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    Modify, OpenApi,
};
use utoipa_swagger_ui::SwaggerUi;

use crate::api::{alerts, beans, brews, cron, cupping, equipment, health, stats, water_recipes};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "BrewVault API",
        version = "0.3.0",
        description = "Coffee brewing journal: equipment, beans, brews, cupping and alerts",
        license(name = "AGPL-3.0", url = "https://www.gnu.org/licenses/agpl-3.0.html")
    ),
    servers(
        (url = "/api/v1", description = "API v1")
    ),
    paths(
        // Health
        health::health_check,
        health::readiness_check,
        // Cron
        cron::maintenance_scan,
        // Alerts
        alerts::list_alerts,
        alerts::unread_count,
        alerts::create_alert,
        alerts::dismiss_alert,
        alerts::mark_alert_read,
        alerts::mark_all_read,
        alerts::resolve_maintenance,
        // Equipment
        equipment::list_equipment,
        equipment::get_equipment,
        equipment::create_equipment,
        equipment::update_equipment,
        equipment::delete_equipment,
        equipment::get_maintenance,
        equipment::get_equipment_stats,
        // Beans
        beans::list_beans,
        beans::get_bean,
        beans::create_bean,
        beans::update_bean,
        beans::delete_bean,
        beans::get_stock,
        beans::finish_bean,
        // Brews
        brews::list_brews,
        brews::get_brew,
        brews::create_brew,
        brews::repeat_brew,
        brews::update_brew,
        brews::delete_brew,
        // Cupping
        cupping::list_cupping_notes,
        cupping::create_cupping_note,
        cupping::get_cupping_note,
        cupping::delete_cupping_note,
        // Water
        water_recipes::list_water_recipes,
        water_recipes::create_water_recipe,
        water_recipes::delete_water_recipe,
        // Stats
        stats::get_dashboard,
    ),
    components(
        schemas(
            // Enums
            crate::models::enums::EquipmentType,
            crate::models::enums::AlertType,
            crate::models::enums::AlertPriority,
            crate::models::enums::EntityType,
            crate::models::enums::BeanStatus,
            // Equipment
            crate::models::equipment::Equipment,
            crate::models::equipment::CreateEquipment,
            crate::models::equipment::UpdateEquipment,
            crate::models::equipment::MaintenanceStatus,
            // Alerts
            crate::models::alert::Alert,
            crate::models::alert::CreateAlert,
            crate::models::alert::UnreadCount,
            alerts::MarkAllReadResult,
            // Beans
            crate::models::bean::Bean,
            crate::models::bean::CreateBean,
            crate::models::bean::UpdateBean,
            crate::models::bean::FinishBean,
            crate::models::bean::BeanConsumption,
            crate::models::bean::StockStatus,
            // Brews
            crate::models::brew::Brew,
            crate::models::brew::BrewDetails,
            crate::models::brew::BrewList,
            crate::models::brew::CreateBrew,
            crate::models::brew::UpdateBrew,
            crate::models::brew::RepeatBrew,
            // Cupping
            crate::models::cupping::ScaScores,
            crate::models::cupping::CuppingNote,
            crate::models::cupping::CuppingNoteView,
            crate::models::cupping::CreateCuppingNote,
            // Water
            crate::models::water_recipe::WaterRecipe,
            crate::models::water_recipe::CreateWaterRecipe,
            // Stats
            crate::services::metrics::LastBrew,
            crate::services::metrics::EquipmentQuickStats,
            crate::services::metrics::DailyCount,
            crate::services::metrics::RatingBucket,
            crate::services::metrics::WeeklyConsumption,
            crate::services::metrics::MethodRating,
            crate::services::metrics::AccountSummary,
            crate::services::metrics::Dashboard,
            // Cron
            cron::CronResponse,
            cron::CronErrorBody,
            // Health
            health::HealthResponse,
            // Errors
            crate::error::ErrorResponse,
        )
    ),
    modifiers(&BearerAuth),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "cron", description = "Scheduled jobs"),
        (name = "alerts", description = "Maintenance and stock alerts"),
        (name = "equipment", description = "Brewing equipment"),
        (name = "beans", description = "Beans and stock"),
        (name = "brews", description = "Brew log"),
        (name = "cupping", description = "SCA cupping notes"),
        (name = "water", description = "Water recipes"),
        (name = "stats", description = "Statistics")
    )
)]
pub struct ApiDoc;

struct BearerAuth;

impl Modify for BearerAuth {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
            components.add_security_scheme(
                "cron_secret",
                SecurityScheme::Http(HttpBuilder::new().scheme(HttpAuthScheme::Bearer).build()),
            );
        }
    }
}

/// Create the OpenAPI documentation router
pub fn create_openapi_router() -> Router {
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
}
