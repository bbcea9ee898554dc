//! ShareIt server
//!
//! REST JSON backend for peer-to-peer item sharing: users list items,
//! book each other's items for a time range, answer bookings on their own
//! items, comment after a finished rental and post item requests.

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
