use rust_phone_check_api::config::Config;
use rust_phone_check_api::handlers::AppState;
use rust_phone_check_api::router;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Main entry point for the application.
///
/// Initializes tracing, loads configuration (failing fast on missing
/// credentials), builds the provider client and starts the Axum server.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "rust_phone_check_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = Config::from_env()?;

    // Provider client is built once and injected through the state
    let app_state = Arc::new(AppState::new(config.clone())?);
    tracing::info!(
        "✓ Provider client initialized (timeout {:?})",
        config.provider_timeout
    );

    // Rate limit + body limit on the API; liveness stays outside
    let api = router::protected_api_routes()?;
    let app = router::build_app(app_state, api);

    // Start server
    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}
