//! API routes for the console server

pub mod bundles;
pub mod extract;
pub mod health;
pub mod orders;
pub mod shipping;

use axum::Router;
use http::HeaderValue;
use shared::error::AppError;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::config::Config;
use crate::state::AppState;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

pub type ApiResult<T> = Result<axum::Json<T>, AppError>;

/// Build a router with all routes registered (no middleware, no state)
pub fn build_router() -> Router<AppState> {
    Router::new()
        .merge(health::router())
        .merge(bundles::router())
        .merge(orders::router())
        .merge(shipping::router())
}

/// Build the router with CORS and request tracing
pub fn build_app(config: &Config) -> Result<Router<AppState>, BoxError> {
    let cors = match &config.cors_origin {
        Some(origin) => CorsLayer::new()
            .allow_origin(origin.parse::<HeaderValue>()?)
            .allow_methods(Any)
            .allow_headers(Any),
        None => CorsLayer::permissive(),
    };

    Ok(build_router()
        // CORS - Handle cross-origin requests from the console UI
        .layer(cors)
        // Trace - Request tracing (logs at INFO level)
        .layer(TraceLayer::new_for_http()))
}
