//! Message API module

mod handler;

use axum::{
    Router,
    routing::{delete, get, patch, post},
};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/messages", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/", post(handler::send))
        .route("/conversations", get(handler::conversations))
        .route("/conversation/{order_id}", get(handler::conversation))
        .route("/mark-read", patch(handler::mark_read))
        .route("/{id}", delete(handler::delete))
}
