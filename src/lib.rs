//! Campus GameHub
//!
//! REST JSON API for renting board and video games within a campus: students
//! request rentals, game administrators approve or deny them, and approved
//! rentals are settled with a mock payment.

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
