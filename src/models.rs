use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Articles per page, fixed by the gateway's upstream `limit`.
pub const PAGE_SIZE: usize = 3;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Article {
    pub uuid: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub snippet: String,
    pub url: String,
    #[serde(default)]
    pub image_url: Option<String>,
    pub published_at: DateTime<Utc>,
    pub source: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub categories: Option<Vec<String>>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct NewsMeta {
    pub found: u64,
    pub returned: u64,
    pub limit: u64,
    pub page: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NewsResponse {
    pub data: Vec<Article>,
    pub meta: NewsMeta,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    #[default]
    Tech,
    General,
    Science,
    Sports,
    Business,
    Health,
    Entertainment,
    Politics,
    Food,
    Travel,
}

impl Category {
    pub const ALL: [Category; 10] = [
        Category::Tech,
        Category::General,
        Category::Science,
        Category::Sports,
        Category::Business,
        Category::Health,
        Category::Entertainment,
        Category::Politics,
        Category::Food,
        Category::Travel,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Tech => "tech",
            Category::General => "general",
            Category::Science => "science",
            Category::Sports => "sports",
            Category::Business => "business",
            Category::Health => "health",
            Category::Entertainment => "entertainment",
            Category::Politics => "politics",
            Category::Food => "food",
            Category::Travel => "travel",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown category: {0}")]
pub struct UnknownCategory(pub String);

impl FromStr for Category {
    type Err = UnknownCategory;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Category::ALL
            .into_iter()
            .find(|category| category.as_str() == s)
            .ok_or_else(|| UnknownCategory(s.to_string()))
    }
}
