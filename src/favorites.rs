use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::StorageError;
use crate::models::Article;
use crate::storage::Storage;

pub const FAVORITES_KEY: &str = "news-reader-favorites";

#[derive(Debug, Default, Deserialize)]
struct FavoritesRecord {
    #[serde(default)]
    ids: Vec<String>,
    #[serde(default)]
    articles: Vec<Article>,
}

#[derive(Serialize)]
struct FavoritesRecordRef<'a> {
    ids: Vec<&'a str>,
    articles: &'a [Article],
}

/// Favorited article ids plus their payloads, persisted on every change.
pub struct FavoritesStore {
    ids: HashSet<String>,
    articles: Vec<Article>,
    storage: Box<dyn Storage>,
}

impl FavoritesStore {
    /// Reads the persisted record. Anything unreadable starts an empty store.
    pub fn load(storage: Box<dyn Storage>) -> Self {
        let record = match storage.load(FAVORITES_KEY) {
            Ok(Some(raw)) => serde_json::from_str::<FavoritesRecord>(&raw).unwrap_or_else(|e| {
                warn!(error = %e, "failed to parse favorites, starting empty");
                FavoritesRecord::default()
            }),
            Ok(None) => FavoritesRecord::default(),
            Err(e) => {
                warn!(error = %e, "failed to read favorites, starting empty");
                FavoritesRecord::default()
            }
        };

        debug!(count = record.ids.len(), "favorites loaded");
        Self {
            ids: record.ids.into_iter().collect(),
            articles: record.articles,
            storage,
        }
    }

    pub fn contains(&self, uuid: &str) -> bool {
        self.ids.contains(uuid)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn articles(&self) -> &[Article] {
        &self.articles
    }

    /// Flips membership of `uuid` and returns whether it is now a favorite.
    ///
    /// Adding without a payload records only the id. A failed write is logged;
    /// the in-memory change stands either way.
    pub fn toggle(&mut self, uuid: &str, article: Option<Article>) -> bool {
        let favorited = if self.ids.remove(uuid) {
            self.articles.retain(|a| a.uuid != uuid);
            false
        } else {
            self.ids.insert(uuid.to_string());
            if let Some(article) = article {
                if !self.articles.iter().any(|a| a.uuid == uuid) {
                    self.articles.push(article);
                }
            }
            true
        };

        if let Err(e) = self.persist() {
            warn!(error = %e, "failed to persist favorites");
        }
        favorited
    }

    fn persist(&self) -> Result<(), StorageError> {
        let mut ids: Vec<&str> = self.ids.iter().map(String::as_str).collect();
        ids.sort_unstable();
        let record = FavoritesRecordRef {
            ids,
            articles: &self.articles,
        };
        self.storage.save(FAVORITES_KEY, &serde_json::to_string(&record)?)
    }
}
