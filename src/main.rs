//! BrewVault Server - coffee brewing journal
//!
//! Loads configuration, migrates the database and serves the REST API.

use anyhow::Context;
use axum::{
    routing::{delete, get, post, put},
    Router,
};
use sqlx::postgres::PgPoolOptions;
use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{
    fmt::{self, writer::BoxMakeWriter},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter,
};

use brewvault_server::{
    api,
    config::{AppConfig, LoggingConfig},
    repository::Repository,
    services::Services,
    AppState,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    let config = AppConfig::load().context("Failed to load configuration")?;

    // Keep the guard alive so buffered log lines are flushed on exit
    let _log_guard = init_tracing(&config.logging);

    tracing::info!("Starting BrewVault Server v{}", env!("CARGO_PKG_VERSION"));
    if config.cron.secret.as_deref().map_or(true, str::is_empty) {
        tracing::warn!("CRON_SECRET is not set, the maintenance scan endpoint will refuse every call");
    }

    let pool = PgPoolOptions::new()
        .max_connections(config.database.max_connections)
        .min_connections(config.database.min_connections)
        .connect(&config.database.url)
        .await
        .context("Failed to connect to database")?;

    tracing::info!("Connected to database");

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .context("Failed to run database migrations")?;

    tracing::info!("Database migrations completed");

    let host: IpAddr = config.server.host.parse().context("Invalid host address")?;
    let addr = SocketAddr::new(host, config.server.port);

    let repository = Repository::new(pool);
    let services = Services::new(repository, config.stock.clone());

    let state = AppState {
        config: Arc::new(config),
        services: Arc::new(services),
    };

    let app = create_router(state);

    tracing::info!("Server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Install the global subscriber: pretty or JSON lines, to stdout or a daily file
fn init_tracing(config: &LoggingConfig) -> Option<WorkerGuard> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| format!("brewvault_server={},tower_http=debug", config.level).into());

    let (writer, guard) = match config.directory.as_deref() {
        Some(directory) => {
            let appender = tracing_appender::rolling::daily(directory, "brewvault.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            (BoxMakeWriter::new(writer), Some(guard))
        }
        None => (BoxMakeWriter::new(std::io::stdout), None),
    };

    let registry = tracing_subscriber::registry().with(filter);
    if config.format == "json" {
        registry.with(fmt::layer().json().with_writer(writer)).init();
    } else {
        registry.with(fmt::layer().with_writer(writer)).init();
    }

    guard
}

/// Create the application router with all routes
fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api_v1 = Router::new()
        // Health check
        .route("/health", get(api::health::health_check))
        .route("/ready", get(api::health::readiness_check))
        // Scheduled jobs
        .route("/cron/maintenance", get(api::cron::maintenance_scan))
        // Alerts
        .route("/alerts", get(api::alerts::list_alerts))
        .route("/alerts", post(api::alerts::create_alert))
        .route("/alerts/unread-count", get(api::alerts::unread_count))
        .route("/alerts/read-all", post(api::alerts::mark_all_read))
        .route("/alerts/:id/dismiss", post(api::alerts::dismiss_alert))
        .route("/alerts/:id/read", post(api::alerts::mark_alert_read))
        // Equipment
        .route("/equipment", get(api::equipment::list_equipment))
        .route("/equipment", post(api::equipment::create_equipment))
        .route("/equipment/:id", get(api::equipment::get_equipment))
        .route("/equipment/:id", put(api::equipment::update_equipment))
        .route("/equipment/:id", delete(api::equipment::delete_equipment))
        .route("/equipment/:id/maintenance", get(api::equipment::get_maintenance))
        .route("/equipment/:id/maintenance/resolve", post(api::alerts::resolve_maintenance))
        .route("/equipment/:id/stats", get(api::equipment::get_equipment_stats))
        // Beans
        .route("/beans", get(api::beans::list_beans))
        .route("/beans", post(api::beans::create_bean))
        .route("/beans/:id", get(api::beans::get_bean))
        .route("/beans/:id", put(api::beans::update_bean))
        .route("/beans/:id", delete(api::beans::delete_bean))
        .route("/beans/:id/stock", get(api::beans::get_stock))
        .route("/beans/:id/finish", post(api::beans::finish_bean))
        // Brews
        .route("/brews", get(api::brews::list_brews))
        .route("/brews", post(api::brews::create_brew))
        .route("/brews/:id", get(api::brews::get_brew))
        .route("/brews/:id", put(api::brews::update_brew))
        .route("/brews/:id", delete(api::brews::delete_brew))
        .route("/brews/:id/repeat", post(api::brews::repeat_brew))
        .route("/brews/:id/cupping", get(api::cupping::list_cupping_notes))
        .route("/brews/:id/cupping", post(api::cupping::create_cupping_note))
        // Cupping
        .route("/cupping/:id", get(api::cupping::get_cupping_note))
        .route("/cupping/:id", delete(api::cupping::delete_cupping_note))
        // Water
        .route("/water-recipes", get(api::water_recipes::list_water_recipes))
        .route("/water-recipes", post(api::water_recipes::create_water_recipe))
        .route("/water-recipes/:id", delete(api::water_recipes::delete_water_recipe))
        // Statistics
        .route("/stats/dashboard", get(api::stats::get_dashboard))
        .with_state(state);

    // OpenAPI documentation
    let openapi = api::openapi::create_openapi_router();

    Router::new()
        .nest("/api/v1", api_v1)
        .merge(openapi)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        )
}
