//! Gig API module
//!
//! Browsing is public; listing management is for freelancers.

mod handler;

use axum::{
    Router, middleware,
    routing::{get, post},
};

use crate::auth::require_freelancer;
use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/gigs", routes())
}

fn routes() -> Router<ServerState> {
    let public_routes = Router::new()
        .route("/", get(handler::list))
        .route("/{id}", get(handler::get_by_id));

    let seller_routes = Router::new()
        .route("/", post(handler::create))
        .route("/my", get(handler::mine))
        .route(
            "/{id}",
            axum::routing::patch(handler::update).delete(handler::delete),
        )
        .layer(middleware::from_fn(require_freelancer));

    public_routes.merge(seller_routes)
}
