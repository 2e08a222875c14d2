use serde::{Deserialize, Serialize};

/// Query keys the gateway forwards upstream. Anything else the caller sends is dropped.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
pub struct NewsQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub categories: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
}

impl NewsQuery {
    /// Whitelisted pairs in upstream order.
    pub fn pairs(&self) -> Vec<(&'static str, &str)> {
        [
            ("page", self.page.as_deref()),
            ("categories", self.categories.as_deref()),
            ("search", self.search.as_deref()),
        ]
        .into_iter()
        .filter_map(|(key, value)| value.map(|v| (key, v)))
        .collect()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ErrorBody {
    pub error: String,
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: String,
    #[serde(rename = "hasToken")]
    pub has_token: bool,
}

/// Error fields an upstream failure body may carry.
#[derive(Debug, Default, Deserialize)]
pub struct UpstreamErrorBody {
    pub error: Option<serde_json::Value>,
    pub message: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pairs_skip_missing_keys_and_keep_order() {
        let query = NewsQuery {
            page: Some("2".into()),
            categories: None,
            search: Some("ai".into()),
        };
        assert_eq!(query.pairs(), vec![("page", "2"), ("search", "ai")]);
    }

    #[test]
    fn unknown_keys_are_ignored_on_deserialize() {
        let query: NewsQuery =
            serde_json::from_str(r#"{"page":"1","categories":"tech","api_token":"x","limit":"50"}"#)
                .unwrap();
        assert_eq!(query.page.as_deref(), Some("1"));
        assert_eq!(query.categories.as_deref(), Some("tech"));
        assert_eq!(query.search, None);
    }
}
