use reqwest::{Client, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde_json::Value;
use tracing::{error, info};
use url::Url;

use crate::api::models::{NewsQuery, UpstreamErrorBody};
use crate::error::{AppError, Result};

pub const NEWS_PATH: &str = "/v1/news/all";
pub const LANGUAGE: &str = "en";
pub const LIMIT: &str = "3";
const REDACTED: &str = "[REDACTED]";
const MAX_LOGGED_BODY: usize = 512;

/// Builds the provider URL. Server-injected keys come first, whitelisted caller keys follow.
pub fn build_news_url(base_url: &str, token: &str, query: &NewsQuery) -> Result<Url> {
    let mut url = Url::parse(&format!("{}{}", base_url, NEWS_PATH))
        .map_err(|e| AppError::ConfigError(format!("Invalid upstream URL: {}", e)))?;
    {
        let mut pairs = url.query_pairs_mut();
        pairs
            .append_pair("api_token", token)
            .append_pair("language", LANGUAGE)
            .append_pair("limit", LIMIT);
        for (key, value) in query.pairs() {
            pairs.append_pair(key, value);
        }
    }
    Ok(url)
}

/// Same URL with the credential masked, for logs.
pub fn redacted(url: &Url) -> String {
    let mut masked = url.clone();
    let pairs: Vec<(String, String)> = url
        .query_pairs()
        .map(|(key, value)| {
            let value = if key == "api_token" { REDACTED.to_string() } else { value.into_owned() };
            (key.into_owned(), value)
        })
        .collect();
    masked.query_pairs_mut().clear().extend_pairs(pairs);
    format!("{}?{}", masked.path(), masked.query().unwrap_or_default())
}

pub async fn call_news_api(
    client: &Client,
    base_url: &str,
    token: Option<&SecretString>,
    query: &NewsQuery,
) -> Result<Value> {
    let Some(token) = token else {
        error!("missing THENEWSAPI_TOKEN in environment");
        return Err(AppError::MissingToken);
    };

    let url = build_news_url(base_url, token.expose_secret(), query)?;
    info!(request = %redacted(&url), "proxying GET");

    // reqwest errors carry the request URL, token included; strip it before logging or storing.
    let response = client.get(url).send().await.map_err(|e| {
        let e = e.without_url();
        error!(error = %e, "network error reaching news API");
        AppError::Network(e)
    })?;

    let status = response.status();
    let body = response.bytes().await.map_err(|e| {
        let e = e.without_url();
        error!(error = %e, "network error reading news API response");
        AppError::Network(e)
    })?;

    if !status.is_success() {
        let upstream: UpstreamErrorBody = serde_json::from_slice(&body).unwrap_or_default();
        error!(status = status.as_u16(), body = %truncated(&body), "news API error");
        return Err(map_upstream_error(status, upstream));
    }

    serde_json::from_slice::<Value>(&body).map_err(|e| {
        error!(error = %e, "news API returned a non-JSON body");
        AppError::InvalidUpstream(e.to_string())
    })
}

/// Lossy UTF-8 view of `body`, cut to `MAX_LOGGED_BODY` bytes on a char boundary.
fn truncated(body: &[u8]) -> String {
    let text = String::from_utf8_lossy(body);
    if text.len() <= MAX_LOGGED_BODY {
        return text.into_owned();
    }
    let mut end = MAX_LOGGED_BODY;
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}... ({} bytes total)", &text[..end], body.len())
}

fn map_upstream_error(status: StatusCode, body: UpstreamErrorBody) -> AppError {
    match status.as_u16() {
        429 => AppError::RateLimited,
        code @ (401 | 403) => AppError::AuthFailed(code),
        code => {
            // The provider nests details as {"error": {"code", "message"}}.
            let (error, nested_message) = match body.error {
                Some(Value::String(error)) => (Some(error), None),
                Some(Value::Object(map)) => (
                    map.get("code").and_then(Value::as_str).map(str::to_string),
                    map.get("message").and_then(Value::as_str).map(str::to_string),
                ),
                _ => (None, None),
            };
            AppError::Upstream {
                status: code,
                error,
                message: body.message.or(nested_message),
            }
        }
    }
}
