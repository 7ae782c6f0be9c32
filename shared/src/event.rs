//! Realtime events pushed to order rooms

use serde::{Deserialize, Serialize};

use crate::models::{Message, Order};
use crate::order::OrderStatus;

/// Event payload, tagged by `type`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum OrderEvent {
    /// The order moved to a new status
    OrderStatus {
        order_id: String,
        previous: OrderStatus,
        status: OrderStatus,
        actor_id: String,
        version: u64,
    },
    /// A message was appended to the order's conversation
    NewMessage(Message),
}

impl OrderEvent {
    pub fn status_changed(order: &Order, previous: OrderStatus, actor_id: &str) -> Self {
        OrderEvent::OrderStatus {
            order_id: order.id.clone(),
            previous,
            status: order.status,
            actor_id: actor_id.to_string(),
            version: order.version,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            OrderEvent::OrderStatus { .. } => "order_status",
            OrderEvent::NewMessage(_) => "new_message",
        }
    }

    pub fn order_id(&self) -> &str {
        match self {
            OrderEvent::OrderStatus { order_id, .. } => order_id,
            OrderEvent::NewMessage(m) => &m.order_id,
        }
    }
}

/// Envelope written to subscribers
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventEnvelope {
    pub id: uuid::Uuid,
    pub timestamp: i64,
    #[serde(flatten)]
    pub event: OrderEvent,
}

impl EventEnvelope {
    pub fn new(event: OrderEvent) -> Self {
        Self {
            id: uuid::Uuid::new_v4(),
            timestamp: crate::util::now_millis(),
            event,
        }
    }
}
