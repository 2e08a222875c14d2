//! Paging reader state: one article at a time, three per page.
//!
//! Fetches run as spawned tasks and report back over a channel. Every filter
//! change opens a new session; results tagged with an older session are
//! dropped when they arrive, and a superseded page load only fills the cache.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::client::{Filter, NewsSource};
use crate::error::FetchError;
use crate::favorites::FavoritesStore;
use crate::models::{Article, Category, NewsResponse, PAGE_SIZE};

pub const NO_ARTICLES: &str = "No articles found";

type CacheKey = (Filter, u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FetchKind {
    Load { request: u64 },
    Prefetch,
}

#[derive(Debug)]
struct FetchOutcome {
    session: u64,
    page: u32,
    filter: Filter,
    kind: FetchKind,
    result: Result<NewsResponse, FetchError>,
}

pub struct HeadlinesController<S: NewsSource> {
    source: Arc<S>,
    favorites: FavoritesStore,
    show_favorites: bool,

    category: Category,
    search: String,
    page: u32,
    index: usize,
    loading: bool,
    error: Option<String>,
    articles: Vec<Article>,

    cache: HashMap<CacheKey, Vec<Article>>,
    prefetched: HashSet<u32>,
    prefetch_inflight: HashSet<u32>,

    session: u64,
    request: u64,
    pending: usize,
    outcome_tx: mpsc::UnboundedSender<FetchOutcome>,
    outcome_rx: mpsc::UnboundedReceiver<FetchOutcome>,
}

impl<S: NewsSource> HeadlinesController<S> {
    pub fn new(source: S, favorites: FavoritesStore) -> Self {
        let (outcome_tx, outcome_rx) = mpsc::unbounded_channel();
        Self {
            source: Arc::new(source),
            favorites,
            show_favorites: false,
            category: Category::default(),
            search: String::new(),
            page: 1,
            index: 0,
            loading: true,
            error: None,
            articles: Vec::new(),
            cache: HashMap::new(),
            prefetched: HashSet::new(),
            prefetch_inflight: HashSet::new(),
            session: 0,
            request: 0,
            pending: 0,
            outcome_tx,
            outcome_rx,
        }
    }

    /// Opens the first filter session. Must run inside a tokio runtime.
    pub fn start(&mut self) {
        self.reset_session();
    }

    pub fn category(&self) -> Category {
        self.category
    }

    pub fn search(&self) -> &str {
        &self.search
    }

    pub fn filter(&self) -> Filter {
        Filter::new(self.category, &self.search)
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn articles(&self) -> &[Article] {
        &self.articles
    }

    pub fn favorites(&self) -> &FavoritesStore {
        &self.favorites
    }

    pub fn showing_favorites(&self) -> bool {
        self.show_favorites
    }

    pub fn is_cached(&self, page: u32) -> bool {
        self.cache.contains_key(&(self.filter(), page))
    }

    pub fn was_prefetched(&self, page: u32) -> bool {
        self.prefetched.contains(&page)
    }

    /// Fetches spawned and not yet applied.
    pub fn pending(&self) -> usize {
        self.pending
    }

    /// List currently on screen: the live page or the favorites overlay.
    pub fn display_articles(&self) -> &[Article] {
        if self.show_favorites {
            self.favorites.articles()
        } else {
            &self.articles
        }
    }

    pub fn current_article(&self) -> Option<&Article> {
        self.display_articles().get(self.index)
    }

    /// 1-based position of the current article across all pages.
    pub fn absolute_position(&self) -> usize {
        (self.page as usize - 1) * PAGE_SIZE + self.index + 1
    }

    pub fn set_category(&mut self, category: Category) {
        if category == self.category && self.search.is_empty() {
            return;
        }
        self.category = category;
        self.search.clear();
        self.reset_session();
    }

    pub fn set_search(&mut self, text: impl Into<String>) {
        let text = text.into();
        if text == self.search {
            return;
        }
        self.search = text;
        self.reset_session();
    }

    /// Starts a new filter session and loads page 1 from the network.
    fn reset_session(&mut self) {
        self.session += 1;
        self.page = 1;
        self.index = 0;
        self.articles.clear();
        self.error = None;
        self.cache.clear();
        self.prefetched.clear();
        self.prefetch_inflight.clear();
        debug!(session = self.session, filter = ?self.filter(), "filter session started");

        if self.show_favorites {
            self.loading = false;
            return;
        }
        self.load_page(1, false);
    }

    /// Serves `page` from the cache when allowed, otherwise spawns a fetch.
    fn load_page(&mut self, page: u32, use_cache: bool) {
        let filter = self.filter();
        // Any load still in flight is now superseded, even if this one is a cache hit.
        self.request += 1;
        if use_cache {
            if let Some(articles) = self.cache.get(&(filter.clone(), page)) {
                debug!(?filter, page, "serving page from cache");
                self.articles = articles.clone();
                self.error = None;
                self.loading = false;
                self.maybe_prefetch();
                return;
            }
        }

        self.loading = true;
        self.error = None;
        self.spawn_fetch(page, filter, FetchKind::Load { request: self.request });
    }

    fn spawn_fetch(&mut self, page: u32, filter: Filter, kind: FetchKind) {
        let source = Arc::clone(&self.source);
        let tx = self.outcome_tx.clone();
        let session = self.session;
        self.pending += 1;

        tokio::spawn(async move {
            let result = source.fetch(page, &filter).await;
            // The receiver lives as long as the controller.
            let _ = tx.send(FetchOutcome {
                session,
                page,
                filter,
                kind,
                result,
            });
        });
    }

    fn go_to_page(&mut self, page: u32) {
        if self.show_favorites {
            return;
        }
        self.page = page;
        self.index = 0;
        self.loading = true;
        self.load_page(page, true);
    }

    pub fn first_page(&mut self) {
        self.go_to_page(1);
    }

    pub fn prev_page(&mut self) {
        if self.page > 1 {
            self.go_to_page(self.page - 1);
        }
    }

    pub fn next_page(&mut self) {
        self.go_to_page(self.page + 1);
    }

    pub fn next_article(&mut self) {
        if self.show_favorites {
            let last = self.favorites.articles().len().saturating_sub(1);
            self.index = (self.index + 1).min(last);
            return;
        }

        if self.index + 1 < self.articles.len().min(PAGE_SIZE) {
            self.index += 1;
            self.maybe_prefetch();
        } else {
            self.next_page();
        }
    }

    pub fn prev_article(&mut self) {
        if self.show_favorites {
            self.index = self.index.saturating_sub(1);
            return;
        }

        if self.index > 0 {
            self.index -= 1;
            self.maybe_prefetch();
        } else if self.page > 1 {
            self.prev_page();
        }
    }

    /// Looks one page ahead from the second article and one page back from the first.
    fn maybe_prefetch(&mut self) {
        if self.show_favorites || self.loading || self.articles.is_empty() {
            return;
        }
        if self.index == 1 {
            self.prefetch(self.page + 1);
        }
        if self.index == 0 && self.page > 1 {
            self.prefetch(self.page - 1);
        }
    }

    fn prefetch(&mut self, page: u32) {
        let filter = self.filter();
        if self.cache.contains_key(&(filter.clone(), page))
            || self.prefetched.contains(&page)
            || !self.prefetch_inflight.insert(page)
        {
            return;
        }
        debug!(?filter, page, "prefetching page");
        self.spawn_fetch(page, filter, FetchKind::Prefetch);
    }

    pub fn toggle_favorites_view(&mut self) {
        self.show_favorites = !self.show_favorites;
        self.index = 0;
        if !self.show_favorites {
            self.reset_session();
        }
    }

    /// Favorites or unfavorites the article on screen. Returns the new membership.
    pub fn toggle_current_favorite(&mut self) -> Option<bool> {
        let article = self.current_article()?.clone();
        let uuid = article.uuid.clone();
        let favorited = self.favorites.toggle(&uuid, Some(article));
        if self.show_favorites {
            let last = self.favorites.articles().len().saturating_sub(1);
            self.index = self.index.min(last);
        }
        Some(favorited)
    }

    pub fn toggle_favorite(&mut self, uuid: &str, article: Option<Article>) -> bool {
        self.favorites.toggle(uuid, article)
    }

    pub fn is_favorite(&self, uuid: &str) -> bool {
        self.favorites.contains(uuid)
    }

    /// Waits for the next fetch to finish and applies it. Returns false when none is pending.
    pub async fn next_outcome(&mut self) -> bool {
        if self.pending == 0 {
            return false;
        }
        match self.outcome_rx.recv().await {
            Some(outcome) => {
                self.apply(outcome);
                true
            }
            None => false,
        }
    }

    /// Applies every outcome that has already arrived, without waiting.
    pub fn drain_ready(&mut self) -> usize {
        let mut applied = 0;
        while let Ok(outcome) = self.outcome_rx.try_recv() {
            self.apply(outcome);
            applied += 1;
        }
        applied
    }

    /// Applies outcomes until nothing is in flight, including prefetches started along the way.
    pub async fn settle(&mut self) {
        while self.next_outcome().await {}
    }

    fn apply(&mut self, outcome: FetchOutcome) {
        self.pending = self.pending.saturating_sub(1);

        if outcome.session != self.session {
            debug!(
                page = outcome.page,
                session = outcome.session,
                current = self.session,
                "dropping result from a previous filter session"
            );
            return;
        }

        match outcome.kind {
            FetchKind::Load { request } => {
                if request != self.request {
                    // Still valid for this session, so keep it for later visits.
                    debug!(page = outcome.page, "superseded page load, caching only");
                    if let Ok(response) = outcome.result {
                        if !response.data.is_empty() {
                            self.cache.insert((outcome.filter, outcome.page), response.data);
                        }
                    }
                    return;
                }
                self.loading = false;
                match outcome.result {
                    Ok(response) if response.data.is_empty() => {
                        self.articles.clear();
                        self.error = Some(NO_ARTICLES.to_string());
                    }
                    Ok(response) => {
                        self.articles = response.data.clone();
                        self.cache.insert((outcome.filter, outcome.page), response.data);
                        self.maybe_prefetch();
                    }
                    Err(e) => {
                        warn!(page = outcome.page, error = %e, "page load failed");
                        self.articles.clear();
                        self.error = Some(e.to_string());
                    }
                }
            }
            FetchKind::Prefetch => {
                self.prefetch_inflight.remove(&outcome.page);
                match outcome.result {
                    Ok(response) if !response.data.is_empty() => {
                        self.cache.insert((outcome.filter, outcome.page), response.data);
                        self.prefetched.insert(outcome.page);
                    }
                    Ok(_) => debug!(page = outcome.page, "prefetch returned no articles"),
                    Err(e) => warn!(page = outcome.page, error = %e, "prefetch failed"),
                }
            }
        }
    }
}
