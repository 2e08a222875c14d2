use std::env;
use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;
use std::time::Duration;

use secrecy::SecretString;

use crate::error::{AppError, Result};

pub const DEFAULT_UPSTREAM_BASE_URL: &str = "https://api.thenewsapi.com";

pub struct Config {
    pub server_addr: SocketAddr,
    /// Absent token is not fatal at startup; each news request answers 500 instead.
    pub api_token: Option<SecretString>,
    pub upstream_base_url: String,
    pub request_timeout: Duration,
}

impl Config {
    pub fn load() -> Result<Self> {
        // Load environment variables from .env file if it exists
        dotenv::dotenv().ok();

        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let api_token = lookup("THENEWSAPI_TOKEN")
            .filter(|token| !token.trim().is_empty())
            .map(SecretString::from);

        let host = lookup("HOST").unwrap_or_else(|| "127.0.0.1".to_string());
        let port = lookup("PORT").unwrap_or_else(|| "5177".to_string());
        let port = port.parse::<u16>().map_err(|e| AppError::ConfigError(format!("Invalid port: {}", e)))?;
        let ip = IpAddr::from_str(&host).map_err(|e| AppError::ConfigError(format!("Invalid host address: {}", e)))?;

        let upstream_base_url = lookup("NEWS_API_BASE_URL")
            .unwrap_or_else(|| DEFAULT_UPSTREAM_BASE_URL.to_string())
            .trim_end_matches('/')
            .to_string();
        url::Url::parse(&upstream_base_url)
            .map_err(|e| AppError::ConfigError(format!("Invalid NEWS_API_BASE_URL: {}", e)))?;

        let timeout_secs = match lookup("REQUEST_TIMEOUT_SECS") {
            Some(raw) => raw
                .parse::<u64>()
                .map_err(|e| AppError::ConfigError(format!("Invalid REQUEST_TIMEOUT_SECS: {}", e)))?,
            None => 10,
        };

        Ok(Config {
            server_addr: SocketAddr::new(ip, port),
            api_token,
            upstream_base_url,
            request_timeout: Duration::from_secs(timeout_secs),
        })
    }

    pub fn has_token(&self) -> bool {
        self.api_token.is_some()
    }
}
