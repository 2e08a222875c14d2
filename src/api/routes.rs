use axum::{
    Router,
    extract::{Query, State},
    response::{IntoResponse, Response},
    routing::get,
};
use std::time::Instant;
use tower_http::cors::{Any, CorsLayer};
use tracing::{info, warn};

use crate::api::models::NewsQuery;
use crate::api::response;
use crate::upstream::call_news_api;
use crate::AppState;

pub fn create_router(app_state: AppState) -> Router {
    Router::new()
        .route("/api/health", get(health_handler))
        .route("/api/news/all", get(news_handler))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(app_state)
}

async fn health_handler(State(state): State<AppState>) -> impl IntoResponse {
    response::health(state.config.has_token())
}

async fn news_handler(State(state): State<AppState>, Query(query): Query<NewsQuery>) -> Response {
    info!(page = ?query.page, categories = ?query.categories, search = ?query.search, "news request");
    let start_time = Instant::now();

    let result = call_news_api(
        &state.client,
        &state.config.upstream_base_url,
        state.config.api_token.as_ref(),
        &query,
    )
    .await;

    let elapsed = start_time.elapsed();
    match result {
        Ok(body) => {
            info!(?elapsed, "news request served");
            response::passthrough(body).into_response()
        }
        Err(err) => {
            warn!(?elapsed, status = err.status().as_u16(), error = %err, "news request failed");
            err.into_response()
        }
    }
}
