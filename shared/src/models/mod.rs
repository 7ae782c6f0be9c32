//! Data models
//!
//! Shared between hub-server and its clients.
//! IDs are UUID v4 strings, timestamps are Unix milliseconds.

pub mod gig;
pub mod message;
pub mod order;
pub mod review;
pub mod user;

// Re-exports
pub use gig::*;
pub use message::*;
pub use order::*;
pub use review::*;
pub use user::*;
