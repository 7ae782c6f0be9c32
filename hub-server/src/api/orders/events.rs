//! Realtime order events over WebSocket
//!
//! A participant joins the order's room and receives every
//! [`EventEnvelope`](shared::event::EventEnvelope) published there as a JSON
//! text frame. Client frames other than ping and close are ignored.

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::{Path, State};
use axum::response::IntoResponse;
use futures::{SinkExt, StreamExt};

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::utils::AppResult;

/// GET /api/orders/{id}/events - upgrade to WebSocket
pub async fn handle_order_ws(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(order_id): Path<String>,
    ws: WebSocketUpgrade,
) -> AppResult<impl IntoResponse> {
    // participant check before the upgrade
    state.orders.get(&user, &order_id).await?;

    Ok(ws.on_upgrade(move |socket| handle_ws_connection(socket, state, user, order_id)))
}

async fn handle_ws_connection(
    socket: WebSocket,
    state: ServerState,
    user: CurrentUser,
    order_id: String,
) {
    let mut subscription = state.notifier.subscribe(&order_id);
    let connection_id = subscription.connection_id;

    tracing::info!(order_id = %order_id, user_id = %user.id, connection_id, "Order socket connected");

    let (mut ws_sink, mut ws_stream) = socket.split();

    loop {
        tokio::select! {
            msg = ws_stream.next() => {
                match msg {
                    Some(Ok(Message::Ping(data))) => {
                        let _ = ws_sink.send(Message::Pong(data)).await;
                    }
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Err(e)) => {
                        tracing::debug!(order_id = %order_id, connection_id, "WebSocket error: {e}");
                        break;
                    }
                    _ => {}
                }
            }
            event = subscription.events.recv() => {
                match event {
                    Some(envelope) => {
                        let json = match serde_json::to_string(&envelope) {
                            Ok(json) => json,
                            Err(e) => {
                                tracing::error!("Failed to encode order event: {e}");
                                continue;
                            }
                        };
                        if ws_sink.send(Message::Text(json.into())).await.is_err() {
                            break;
                        }
                    }
                    None => break,
                }
            }
        }
    }

    let _ = ws_sink.close().await;
    state.notifier.unsubscribe(&order_id, connection_id);

    tracing::info!(order_id = %order_id, connection_id, "Order socket disconnected");
}
