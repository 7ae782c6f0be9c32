//! Per-order conversations between buyer and seller

pub mod log;

pub use log::{DEFAULT_CONVERSATION_PAGE, MessagingLog};
