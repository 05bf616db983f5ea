//! HTTP API for the signup service.

mod handlers;
mod middleware;
mod types;

pub use handlers::*;
pub use middleware::{cors_layer, logging_middleware};
pub use types::*;

use crate::config::CorsConfig;
use crate::otp::OtpService;
use axum::{
    middleware as axum_middleware,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// OTP issuer and verifier
    pub service: Arc<OtpService>,
}

impl AppState {
    /// Create new application state.
    pub fn new(service: OtpService) -> Self {
        Self {
            service: Arc::new(service),
        }
    }
}

/// Create the API router allowing any origin.
pub fn create_router(state: AppState) -> Router {
    create_router_with_cors(state, &CorsConfig::default())
}

/// Create the API router with configured CORS.
pub fn create_router_with_cors(state: AppState, cors: &CorsConfig) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        .route(
            "/",
            post(handlers::handle_action).options(handlers::preflight),
        )
        .route(
            "/verify",
            post(handlers::handle_action).options(handlers::preflight),
        )
        .layer(axum_middleware::from_fn(logging_middleware))
        .layer(cors_layer(cors))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
