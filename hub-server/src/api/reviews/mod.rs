//! Review API module
//!
//! Lookups by gig or by reviewed user are public.

mod handler;

use axum::{
    Router, middleware,
    routing::{get, post, put},
};

use crate::auth::require_client;
use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/reviews", routes())
}

fn routes() -> Router<ServerState> {
    let public_routes = Router::new()
        .route("/gig/{gig_id}", get(handler::gig_reviews))
        .route("/user/{user_id}", get(handler::user_reviews));

    let reviewer_routes = Router::new()
        .route("/{id}", put(handler::update).delete(handler::delete));

    let buyer_routes = Router::new()
        .route("/", post(handler::create))
        .layer(middleware::from_fn(require_client));

    public_routes.merge(reviewer_routes).merge(buyer_routes)
}
