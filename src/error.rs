use axum::{
    response::{IntoResponse, Response},
    http::StatusCode,
};

use crate::api::response;

const DEFAULT_UPSTREAM_ERROR: &str = "API request failed";
const DEFAULT_UPSTREAM_MESSAGE: &str = "An error occurred while fetching news";

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("API token not configured")]
    MissingToken,

    #[error("Upstream rate limit exceeded")]
    RateLimited,

    #[error("Upstream authentication failed with status {0}")]
    AuthFailed(u16),

    #[error("Upstream error {status}: {message:?}")]
    Upstream {
        status: u16,
        error: Option<String>,
        message: Option<String>,
    },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Malformed upstream response: {0}")]
    InvalidUpstream(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl AppError {
    /// Status code the gateway answers with for this failure.
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::MissingToken | AppError::Network(_) | AppError::ConfigError(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            AppError::RateLimited => StatusCode::TOO_MANY_REQUESTS,
            AppError::AuthFailed(status) | AppError::Upstream { status, .. } => {
                StatusCode::from_u16(*status).unwrap_or(StatusCode::BAD_GATEWAY)
            }
            AppError::InvalidUpstream(_) => StatusCode::BAD_GATEWAY,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let (error, message) = match self {
            AppError::MissingToken => (
                "Server configuration error".to_string(),
                "API token not configured".to_string(),
            ),
            AppError::RateLimited => (
                "Rate limit exceeded".to_string(),
                "Daily request limit reached. Please try again tomorrow.".to_string(),
            ),
            AppError::AuthFailed(_) => (
                "Authentication failed".to_string(),
                "TheNewsApi authentication failed. Please check your API token.".to_string(),
            ),
            AppError::Upstream { error, message, .. } => (
                error.unwrap_or_else(|| DEFAULT_UPSTREAM_ERROR.to_string()),
                message.unwrap_or_else(|| DEFAULT_UPSTREAM_MESSAGE.to_string()),
            ),
            AppError::Network(_) => (
                "Network error".to_string(),
                "Failed to connect to news API".to_string(),
            ),
            AppError::InvalidUpstream(_) => (
                "Invalid upstream response".to_string(),
                "News API returned malformed data".to_string(),
            ),
            AppError::ConfigError(msg) => ("Server configuration error".to_string(), msg),
        };

        response::error(status, error, message).into_response()
    }
}

pub type Result<T> = std::result::Result<T, AppError>;

/// Failure of a reader-side request to the gateway.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("{message}")]
    Api { status: u16, message: String },

    #[error("Failed to fetch news: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Malformed news response: {0}")]
    Parse(String),
}

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("Storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Storage serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}
