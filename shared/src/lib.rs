//! Shared types for FreelanceHub
//!
//! Domain models, the order state machine, the unified error system and
//! the realtime event envelope used by hub-server and its clients.

pub mod error;
pub mod event;
pub mod models;
pub mod order;
pub mod pagination;
pub mod util;

// Re-exports
pub use axum::{Json, body};
pub use http;
pub use serde::{Deserialize, Serialize};

pub use error::{ApiResponse, AppError, AppResult, ErrorCode};
pub use event::{EventEnvelope, OrderEvent};
pub use order::{OrderAction, OrderStatus, Party, Relation};
pub use pagination::{PageRequest, PaginatedResponse};
