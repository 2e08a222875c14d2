use tokio::net::TcpListener;
use tracing::{info, warn};
use newsdesk::{
    config::Config,
    api::routes::create_router,
    logging,
    AppState,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    logging::init();

    // Load configuration
    let config = Config::load()?;
    let server_addr = config.server_addr;
    info!(has_token = config.has_token(), "API token configured: {}", config.has_token());
    if !config.has_token() {
        warn!("THENEWSAPI_TOKEN not set; news requests will fail with 500");
    }

    let app_state = AppState::new(config)?;
    let app = create_router(app_state);

    let listener = TcpListener::bind(server_addr).await?;
    info!("Running on http://{}", server_addr);
    axum::serve(listener, app).await?;

    Ok(())
}
