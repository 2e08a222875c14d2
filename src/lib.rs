pub mod api;
pub mod client;
pub mod config;
pub mod error;
pub mod favorites;
pub mod headlines;
pub mod logging;
pub mod models;
pub mod storage;
pub mod upstream;

use std::sync::Arc;

use config::Config;
use error::{AppError, Result};

/// Application state that will be shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub client: reqwest::Client,
}

impl AppState {
    pub fn new(config: Config) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .connect_timeout(config.request_timeout)
            .build()
            .map_err(|e| AppError::ConfigError(format!("Failed to build HTTP client: {}", e)))?;

        Ok(AppState {
            config: Arc::new(config),
            client,
        })
    }
}
