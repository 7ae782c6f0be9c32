//! Order lifecycle
//!
//! ```text
//! HTTP handler → OrderManager ─┬─ fresh read (OrderStore)
//!                              ├─ authorize(actor, order, relation)
//!                              ├─ transition(status, action)
//!                              ├─ action preconditions
//!                              ├─ update_if_version (compare-and-swap)
//!                              └─ NotificationHub::publish(order_status)
//! ```

pub mod manager;

pub use manager::OrderManager;
pub use shared::order::{OrderAction, OrderStatus, Relation, transition};
