//! NotificationHub - per-order realtime rooms
//!
//! ```text
//! OrderManager / MessagingLog
//!       │ publish(order_id, OrderEvent)
//!       ▼
//! NotificationHub
//!   └── rooms: order_id → (connection_id → bounded Sender<EventEnvelope>)
//!         │
//!         ▼
//!   WS handler (one per subscribed connection)
//! ```
//!
//! Delivery is fire-and-forget: a full or closed queue drops the event for
//! that connection only.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use dashmap::DashMap;
use shared::event::{EventEnvelope, OrderEvent};
use tokio::sync::mpsc;

/// Per-connection queue depth
pub const CONNECTION_QUEUE: usize = 64;

/// A live subscription to one order room
#[derive(Debug)]
pub struct Subscription {
    pub order_id: String,
    pub connection_id: u64,
    pub events: mpsc::Receiver<EventEnvelope>,
}

#[derive(Debug, Clone, Default)]
pub struct NotificationHub {
    rooms: Arc<DashMap<String, DashMap<u64, mpsc::Sender<EventEnvelope>>>>,
    next_connection: Arc<AtomicU64>,
}

impl NotificationHub {
    pub fn new() -> Self {
        Self::default()
    }

    /// Join the room of `order_id`
    pub fn subscribe(&self, order_id: &str) -> Subscription {
        let (tx, rx) = mpsc::channel(CONNECTION_QUEUE);
        let connection_id = self.next_connection.fetch_add(1, Ordering::Relaxed);
        self.rooms
            .entry(order_id.to_string())
            .or_default()
            .insert(connection_id, tx);
        tracing::debug!(order_id, connection_id, "Subscribed to order room");
        Subscription {
            order_id: order_id.to_string(),
            connection_id,
            events: rx,
        }
    }

    /// Leave a room; empty rooms are dropped
    pub fn unsubscribe(&self, order_id: &str, connection_id: u64) {
        if let Some(room) = self.rooms.get(order_id) {
            room.remove(&connection_id);
        }
        self.rooms.remove_if(order_id, |_, room| room.is_empty());
        tracing::debug!(order_id, connection_id, "Left order room");
    }

    /// Push `event` to every connection in the room of `order_id`.
    ///
    /// Returns the number of connections the event was queued for.
    pub fn publish(&self, order_id: &str, event: OrderEvent) -> usize {
        let Some(room) = self.rooms.get(order_id) else {
            return 0;
        };

        let envelope = EventEnvelope::new(event);
        let mut delivered = 0;
        for entry in room.iter() {
            match entry.value().try_send(envelope.clone()) {
                Ok(()) => delivered += 1,
                Err(e) => tracing::debug!(
                    order_id,
                    connection_id = *entry.key(),
                    event = envelope.event.name(),
                    error = %e,
                    "Dropped realtime event"
                ),
            }
        }
        delivered
    }

    /// Connections currently in the room of `order_id`
    pub fn room_size(&self, order_id: &str) -> usize {
        self.rooms.get(order_id).map(|r| r.len()).unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::order::OrderStatus;

    fn event(order_id: &str) -> OrderEvent {
        OrderEvent::OrderStatus {
            order_id: order_id.into(),
            previous: OrderStatus::Pending,
            status: OrderStatus::InProgress,
            actor_id: "seller".into(),
            version: 1,
        }
    }

    #[tokio::test]
    async fn test_publish_reaches_room_only() {
        let hub = NotificationHub::new();
        let mut a = hub.subscribe("o1");
        let mut b = hub.subscribe("o2");

        assert_eq!(hub.publish("o1", event("o1")), 1);

        let received = a.events.recv().await.unwrap();
        assert_eq!(received.event.order_id(), "o1");
        assert!(b.events.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_unsubscribe_drops_empty_room() {
        let hub = NotificationHub::new();
        let sub = hub.subscribe("o1");
        assert_eq!(hub.room_size("o1"), 1);
        hub.unsubscribe("o1", sub.connection_id);
        assert_eq!(hub.room_size("o1"), 0);
        assert_eq!(hub.publish("o1", event("o1")), 0);
    }

    #[tokio::test]
    async fn test_full_queue_drops_without_blocking() {
        let hub = NotificationHub::new();
        let _slow = hub.subscribe("o1");
        for _ in 0..CONNECTION_QUEUE {
            assert_eq!(hub.publish("o1", event("o1")), 1);
        }
        assert_eq!(hub.publish("o1", event("o1")), 0);
    }

    #[tokio::test]
    async fn test_closed_connection_is_skipped() {
        let hub = NotificationHub::new();
        let closed = hub.subscribe("o1");
        let mut open = hub.subscribe("o1");
        drop(closed.events);

        assert_eq!(hub.publish("o1", event("o1")), 1);
        assert!(open.events.recv().await.is_some());
    }
}
