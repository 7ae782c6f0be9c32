//! Message API Handlers

use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::Deserialize;

use shared::models::{ConversationSummary, MarkReadRequest, MarkReadResult, Message, MessageCreate};
use shared::pagination::PaginatedResponse;

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::utils::{ApiResponse, AppResult, ok, ok_with_message};

/// Page of a conversation
#[derive(Debug, Default, Deserialize)]
pub struct ConversationQuery {
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

/// POST /api/messages
pub async fn send(
    State(state): State<ServerState>,
    user: CurrentUser,
    Json(payload): Json<MessageCreate>,
) -> AppResult<Json<ApiResponse<Message>>> {
    Ok(ok(state.messaging.send(&user, payload).await?))
}

/// GET /api/messages/conversations - one entry per order, latest first
pub async fn conversations(
    State(state): State<ServerState>,
    user: CurrentUser,
) -> AppResult<Json<ApiResponse<Vec<ConversationSummary>>>> {
    Ok(ok(state.messaging.my_conversations(&user).await?))
}

/// GET /api/messages/conversation/{order_id}
pub async fn conversation(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(order_id): Path<String>,
    Query(query): Query<ConversationQuery>,
) -> AppResult<Json<ApiResponse<PaginatedResponse<Message>>>> {
    let page = state
        .messaging
        .conversation(&user, &order_id, query.page, query.limit)
        .await?;
    Ok(ok(page))
}

/// PATCH /api/messages/mark-read
pub async fn mark_read(
    State(state): State<ServerState>,
    user: CurrentUser,
    Json(payload): Json<MarkReadRequest>,
) -> AppResult<Json<ApiResponse<MarkReadResult>>> {
    Ok(ok(state
        .messaging
        .mark_read(&user, payload.message_ids)
        .await?))
}

/// DELETE /api/messages/{id} - sender only
pub async fn delete(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> AppResult<Json<ApiResponse<()>>> {
    state.messaging.delete(&user, &id).await?;
    Ok(ok_with_message("Message deleted"))
}
