//! Order API module
//!
//! Every route needs a signed-in user; participant and party checks happen in
//! [`OrderManager`](crate::orders::OrderManager).

mod events;
mod handler;

use axum::{
    Router, middleware,
    routing::{get, patch, post},
};

use crate::auth::{require_client, require_freelancer};
use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/orders", routes())
}

fn routes() -> Router<ServerState> {
    let participant_routes = Router::new()
        .route("/my-orders", get(handler::my_orders))
        .route("/stats", get(handler::stats))
        .route("/{id}", get(handler::get_by_id))
        .route("/{id}/cancel", patch(handler::cancel))
        .route("/{id}/events", get(events::handle_order_ws));

    let buyer_routes = Router::new()
        .route("/", post(handler::create))
        .route("/{id}/revision", post(handler::request_revision))
        .route("/{id}/complete", patch(handler::complete))
        .layer(middleware::from_fn(require_client));

    let seller_routes = Router::new()
        .route("/{id}/status", patch(handler::update_status))
        .layer(middleware::from_fn(require_freelancer));

    participant_routes.merge(buyer_routes).merge(seller_routes)
}
