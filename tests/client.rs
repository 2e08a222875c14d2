//! Reader-side client tests against a mocked gateway, plus a full pass
//! through the real gateway with the controller on top.

use newsdesk::client::NewsClient;
use newsdesk::error::FetchError;
use newsdesk::favorites::FavoritesStore;
use newsdesk::headlines::HeadlinesController;
use newsdesk::models::Category;
use newsdesk::storage::MemoryStorage;
use newsdesk::{api::routes::create_router, config::Config, AppState};
use serde_json::{json, Value};
use std::time::Duration;
use tokio::net::TcpListener;
use wiremock::matchers::{method, path, query_param, query_param_is_missing};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn page_body(prefix: &str, page: u64) -> Value {
    let data: Vec<Value> = (0..3)
        .map(|i| {
            json!({
                "uuid": format!("{prefix}-{page}-{i}"),
                "title": format!("Story {i}"),
                "description": "Description",
                "snippet": "Snippet",
                "url": format!("https://example.com/{prefix}/{page}/{i}"),
                "image_url": "https://example.com/image.png",
                "published_at": "2024-10-21T07:28:00Z",
                "source": "example.com"
            })
        })
        .collect();
    json!({
        "meta": {"found": 90, "returned": 3, "limit": 3, "page": page},
        "data": data
    })
}

#[tokio::test]
async fn category_defaults_to_tech() {
    let gateway = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/news/all"))
        .and(query_param("page", "1"))
        .and(query_param("categories", "tech"))
        .and(query_param_is_missing("search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page_body("tech", 1)))
        .expect(1)
        .mount(&gateway)
        .await;

    let client = NewsClient::new(gateway.uri()).unwrap();
    let response = client.fetch_news(1, None, None).await.unwrap();

    assert_eq!(response.data.len(), 3);
    assert_eq!(response.data[0].uuid, "tech-1-0");
    assert_eq!(response.meta.found, 90);
}

#[tokio::test]
async fn trimmed_search_supersedes_category() {
    let gateway = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/news/all"))
        .and(query_param("page", "2"))
        .and(query_param("search", "ai"))
        .and(query_param_is_missing("categories"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page_body("ai", 2)))
        .expect(1)
        .mount(&gateway)
        .await;

    let client = NewsClient::new(format!("{}/", gateway.uri())).unwrap();
    let response = client
        .fetch_news(2, Some(Category::Science), Some("  ai  "))
        .await
        .unwrap();
    assert_eq!(response.data[2].uuid, "ai-2-2");
}

#[tokio::test]
async fn blank_search_uses_category() {
    let gateway = MockServer::start().await;
    Mock::given(method("GET"))
        .and(query_param("categories", "sports"))
        .and(query_param_is_missing("search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page_body("sports", 1)))
        .expect(1)
        .mount(&gateway)
        .await;

    let client = NewsClient::new(gateway.uri()).unwrap();
    client
        .fetch_news(1, Some(Category::Sports), Some("   "))
        .await
        .unwrap();
}

#[tokio::test]
async fn error_message_comes_from_body() {
    let gateway = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(429).set_body_json(json!({
            "error": "Rate limit exceeded",
            "message": "Daily request limit reached. Please try again tomorrow."
        })))
        .mount(&gateway)
        .await;

    let client = NewsClient::new(gateway.uri()).unwrap();
    let err = client.fetch_news(1, None, None).await.unwrap_err();

    match &err {
        FetchError::Api { status, message } => {
            assert_eq!(*status, 429);
            assert_eq!(message, "Daily request limit reached. Please try again tomorrow.");
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(err.to_string(), "Daily request limit reached. Please try again tomorrow.");
}

#[tokio::test]
async fn unparseable_error_body_falls_back_to_generic_message() {
    let gateway = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(502).set_body_string("Bad Gateway"))
        .mount(&gateway)
        .await;

    let client = NewsClient::new(gateway.uri()).unwrap();
    let err = client.fetch_news(1, None, None).await.unwrap_err();
    assert!(matches!(err, FetchError::Api { status: 502, .. }));
    assert_eq!(err.to_string(), "Failed to fetch news");
}

#[tokio::test]
async fn malformed_success_body_is_a_parse_error() {
    let gateway = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": [{"uuid": 7}]})))
        .mount(&gateway)
        .await;

    let client = NewsClient::new(gateway.uri()).unwrap();
    let err = client.fetch_news(1, None, None).await.unwrap_err();
    assert!(matches!(err, FetchError::Parse(_)));
}

#[tokio::test]
async fn stalled_gateway_times_out() {
    let gateway = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(page_body("tech", 1))
                .set_delay(Duration::from_secs(5)),
        )
        .mount(&gateway)
        .await;

    let client = NewsClient::with_timeout(gateway.uri(), Duration::from_millis(200)).unwrap();
    let err = client.fetch_news(1, None, None).await.unwrap_err();
    assert!(matches!(err, FetchError::Network(ref e) if e.is_timeout()));
}

#[tokio::test]
async fn reader_surfaces_gateway_timeout_as_error() {
    let gateway = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(page_body("tech", 1))
                .set_delay(Duration::from_secs(5)),
        )
        .mount(&gateway)
        .await;

    let client = NewsClient::with_timeout(gateway.uri(), Duration::from_millis(200)).unwrap();
    let favorites = FavoritesStore::load(Box::new(MemoryStorage::new()));
    let mut reader = HeadlinesController::new(client, favorites);

    reader.start();
    reader.settle().await;
    assert!(!reader.is_loading());
    assert!(reader.error().is_some());
    assert!(reader.articles().is_empty());
}

async fn spawn_gateway(upstream: &str) -> String {
    let config = Config::from_lookup(|key| match key {
        "THENEWSAPI_TOKEN" => Some("token".to_string()),
        "NEWS_API_BASE_URL" => Some(upstream.to_string()),
        _ => None,
    })
    .unwrap();
    let app = create_router(AppState::new(config).unwrap());
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}", addr)
}

#[tokio::test]
async fn reader_prefetches_through_the_gateway() {
    let upstream = MockServer::start().await;
    for page in 1..=2u64 {
        Mock::given(method("GET"))
            .and(path("/v1/news/all"))
            .and(query_param("categories", "tech"))
            .and(query_param("page", page.to_string()))
            .respond_with(ResponseTemplate::new(200).set_body_json(page_body("tech", page)))
            .expect(1)
            .mount(&upstream)
            .await;
    }

    let gateway = spawn_gateway(&upstream.uri()).await;
    let favorites = FavoritesStore::load(Box::new(MemoryStorage::new()));
    let mut reader = HeadlinesController::new(NewsClient::new(gateway).unwrap(), favorites);

    reader.start();
    reader.settle().await;
    assert_eq!(reader.current_article().unwrap().uuid, "tech-1-0");

    // Second article triggers a background fetch of page 2.
    reader.next_article();
    reader.settle().await;
    assert!(reader.is_cached(2));
    assert_eq!(reader.current_article().unwrap().uuid, "tech-1-1");

    reader.next_article();
    reader.next_article();
    assert_eq!(reader.page(), 2);
    assert!(!reader.is_loading());
    assert_eq!(reader.current_article().unwrap().uuid, "tech-2-0");
    assert_eq!(reader.absolute_position(), 4);
}
