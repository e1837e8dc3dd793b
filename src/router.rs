use crate::errors::AppError;
use crate::handlers::{self, AppState};
use crate::openapi;
use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_governor::{
    governor::GovernorConfigBuilder, key_extractor::SmartIpKeyExtractor, GovernorLayer,
};
use tower_http::{cors::CorsLayer, limit::RequestBodyLimitLayer, trace::TraceLayer};

/// Maximum accepted request body; form payloads are a few hundred bytes.
pub const MAX_BODY_BYTES: usize = 64 * 1024;

/// Milliseconds to replenish one request of a client's quota (10 per second).
pub const RATE_LIMIT_REPLENISH_MS: u64 = 100;

/// Requests a single client may send back to back.
pub const RATE_LIMIT_BURST: u32 = 20;

/// Routes subject to rate limiting and body size limits.
pub fn api_routes() -> Router<Arc<AppState>> {
    Router::new()
        // API Documentation
        .route("/docs", get(openapi::serve_swagger_ui))
        .route("/api-docs/openapi.json", get(openapi::serve_openapi_spec))
        // Phone validation
        .route("/validate-phone", post(handlers::validate_phone))
        // One-time passcode
        .route("/start-verify", post(handlers::start_verify))
        .route("/check-verify", post(handlers::check_verify))
}

/// [`api_routes`] behind the body size limit and the per-IP rate limiter.
///
/// Clients are keyed by forwarding headers, falling back to the peer address,
/// so the app must be served with `into_make_service_with_connect_info`.
pub fn protected_api_routes() -> Result<Router<Arc<AppState>>, AppError> {
    let governor_conf = Arc::new(
        GovernorConfigBuilder::default()
            .per_millisecond(RATE_LIMIT_REPLENISH_MS)
            .burst_size(RATE_LIMIT_BURST)
            .key_extractor(SmartIpKeyExtractor)
            .finish()
            .ok_or_else(|| {
                AppError::InternalError("Invalid rate limiter configuration".to_string())
            })?,
    );

    Ok(api_routes().layer(
        ServiceBuilder::new()
            .layer(RequestBodyLimitLayer::new(MAX_BODY_BYTES))
            .layer(GovernorLayer {
                config: governor_conf,
            }),
    ))
}

/// Builds the final app: liveness route, the given API routes, tracing and CORS.
///
/// `api` is normally [`protected_api_routes`]. The liveness route is added
/// here so it stays outside the rate limiter.
pub fn build_app(state: Arc<AppState>, api: Router<Arc<AppState>>) -> Router {
    Router::new()
        .route("/", get(handlers::root))
        .merge(api)
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}
