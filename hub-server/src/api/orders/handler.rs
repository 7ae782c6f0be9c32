//! Order API Handlers

use axum::{
    Json,
    extract::{Path, Query, State},
};

use shared::models::{Order, OrderCreate, OrderQuery, OrderStats, RevisionRequest, StatusUpdate};
use shared::pagination::PaginatedResponse;

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::utils::{ApiResponse, AppResult, ok};

/// POST /api/orders - place an order on a gig's plan
pub async fn create(
    State(state): State<ServerState>,
    user: CurrentUser,
    Json(payload): Json<OrderCreate>,
) -> AppResult<Json<ApiResponse<Order>>> {
    Ok(ok(state.orders.create(&user, payload).await?))
}

/// GET /api/orders/my-orders - orders on the caller's side, newest first
pub async fn my_orders(
    State(state): State<ServerState>,
    user: CurrentUser,
    Query(query): Query<OrderQuery>,
) -> AppResult<Json<ApiResponse<PaginatedResponse<Order>>>> {
    Ok(ok(state.orders.list_for_user(&user, query).await?))
}

/// GET /api/orders/stats
pub async fn stats(
    State(state): State<ServerState>,
    user: CurrentUser,
) -> AppResult<Json<ApiResponse<OrderStats>>> {
    Ok(ok(state.orders.stats(&user).await?))
}

/// GET /api/orders/{id}
pub async fn get_by_id(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> AppResult<Json<ApiResponse<Order>>> {
    Ok(ok(state.orders.get(&user, &id).await?))
}

/// PATCH /api/orders/{id}/status
pub async fn update_status(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<String>,
    Json(payload): Json<StatusUpdate>,
) -> AppResult<Json<ApiResponse<Order>>> {
    Ok(ok(state.orders.update_status(&user, &id, payload).await?))
}

/// POST /api/orders/{id}/revision
pub async fn request_revision(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<String>,
    Json(payload): Json<RevisionRequest>,
) -> AppResult<Json<ApiResponse<Order>>> {
    Ok(ok(state
        .orders
        .request_revision(&user, &id, &payload.note)
        .await?))
}

/// PATCH /api/orders/{id}/complete
pub async fn complete(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> AppResult<Json<ApiResponse<Order>>> {
    Ok(ok(state.orders.complete(&user, &id).await?))
}

/// PATCH /api/orders/{id}/cancel
pub async fn cancel(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> AppResult<Json<ApiResponse<Order>>> {
    Ok(ok(state.orders.cancel(&user, &id).await?))
}
