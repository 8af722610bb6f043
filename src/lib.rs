//! BrewVault server
//!
//! REST JSON API for a coffee brewing journal: equipment with maintenance
//! schedules, bean stock, brew logs, cupping notes and the alerts that tie
//! them together.

use std::sync::Arc;

pub mod api;
pub mod config;
pub mod error;
pub mod models;
pub mod repository;
pub mod services;

pub use config::AppConfig;
pub use error::{AppError, AppResult};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub services: Arc<services::Services>,
}
