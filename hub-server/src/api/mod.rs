//! API routes
//!
//! # Layout
//!
//! - [`health`] - liveness
//! - [`auth`] - accounts, login, password reset
//! - [`gigs`] - catalog
//! - [`orders`] - order lifecycle and the realtime event socket
//! - [`messages`] - per-order conversations
//! - [`reviews`] - reviews and rating lookups
//! - [`files`] - uploads
//!
//! Authentication runs once at router level ([`require_auth`] skips public
//! routes); role gates are layered on the sub-routers that need them.

pub mod auth;
pub mod files;
pub mod gigs;
pub mod health;
pub mod messages;
pub mod orders;
pub mod reviews;

use axum::extract::DefaultBodyLimit;
use axum::{Router, middleware};
use tower_http::compression::CompressionLayer;
use tower_http::cors::CorsLayer;

use crate::auth::require_auth;
use crate::core::ServerState;

/// Extra room on top of the upload limit for multipart framing
const MULTIPART_OVERHEAD: usize = 64 * 1024;

/// HTTP access log middleware
async fn log_request(
    request: http::Request<axum::body::Body>,
    next: middleware::Next,
) -> http::Response<axum::body::Body> {
    let method = request.method().clone();
    let uri = request.uri().clone();

    let response = next.run(request).await;

    let status = response.status();

    tracing::info!(target: "http_access", "{} {} {}", method, uri, status);

    response
}

/// Build the Axum router (without state)
pub fn build_app() -> Router<ServerState> {
    Router::<ServerState>::new()
        .merge(health::router())
        .merge(auth::router())
        .merge(gigs::router())
        .merge(orders::router())
        .merge(messages::router())
        .merge(reviews::router())
        .merge(files::router())
}

/// Build the complete application with state and middleware
pub fn router(state: ServerState) -> Router {
    let body_limit = state.config.upload_max_bytes + MULTIPART_OVERHEAD;

    build_app()
        .layer(middleware::from_fn_with_state(state.clone(), require_auth))
        .with_state(state)
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(CorsLayer::permissive())
        .layer(CompressionLayer::new())
        .layer(middleware::from_fn(log_request))
}
