use std::future::Future;
use std::time::Duration;

use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

use crate::error::FetchError;
use crate::models::{Category, NewsResponse};

const NEWS_ROUTE: &str = "/api/news/all";
const GENERIC_FAILURE: &str = "Failed to fetch news";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// What a page of headlines is filtered by. A non-blank search wins over the category.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Filter {
    Category(Category),
    Search(String),
}

impl Filter {
    pub fn new(category: Category, search: &str) -> Self {
        let search = search.trim();
        if search.is_empty() {
            Filter::Category(category)
        } else {
            Filter::Search(search.to_string())
        }
    }
}

/// Anything that can serve a page of headlines for a filter.
pub trait NewsSource: Send + Sync + 'static {
    fn fetch(
        &self,
        page: u32,
        filter: &Filter,
    ) -> impl Future<Output = Result<NewsResponse, FetchError>> + Send;
}

#[derive(Debug, Default, Deserialize)]
struct ErrorPayload {
    message: Option<String>,
}

/// Reader-side client for the gateway.
#[derive(Debug, Clone)]
pub struct NewsClient {
    http: Client,
    base_url: String,
}

impl NewsClient {
    pub fn new(base_url: impl Into<String>) -> Result<Self, FetchError> {
        Self::with_timeout(base_url, DEFAULT_TIMEOUT)
    }

    /// A stalled gateway fails the request after `timeout` instead of leaving it pending.
    pub fn with_timeout(base_url: impl Into<String>, timeout: Duration) -> Result<Self, FetchError> {
        let http = Client::builder()
            .timeout(timeout)
            .connect_timeout(timeout)
            .build()?;
        Ok(Self::with_client(http, base_url))
    }

    pub fn with_client(http: Client, base_url: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub async fn fetch_news(
        &self,
        page: u32,
        category: Option<Category>,
        search: Option<&str>,
    ) -> Result<NewsResponse, FetchError> {
        let mut params = vec![("page", page.to_string())];
        match search.map(str::trim).filter(|s| !s.is_empty()) {
            Some(search) => {
                debug!(search, page, "fetching news by search");
                params.push(("search", search.to_string()));
            }
            None => {
                let category = category.unwrap_or_default();
                debug!(%category, page, "fetching news by category");
                params.push(("categories", category.to_string()));
            }
        }

        let response = self
            .http
            .get(format!("{}{}", self.base_url, NEWS_ROUTE))
            .query(&params)
            .send()
            .await?;

        let status = response.status();
        let body = response.bytes().await?;

        if !status.is_success() {
            let message = serde_json::from_slice::<ErrorPayload>(&body)
                .ok()
                .and_then(|payload| payload.message)
                .filter(|message| !message.is_empty())
                .unwrap_or_else(|| GENERIC_FAILURE.to_string());
            return Err(FetchError::Api {
                status: status.as_u16(),
                message,
            });
        }

        serde_json::from_slice(&body).map_err(|e| FetchError::Parse(e.to_string()))
    }
}

impl NewsSource for NewsClient {
    async fn fetch(&self, page: u32, filter: &Filter) -> Result<NewsResponse, FetchError> {
        match filter {
            Filter::Category(category) => self.fetch_news(page, Some(*category), None).await,
            Filter::Search(term) => self.fetch_news(page, None, Some(term)).await,
        }
    }
}
