//! FreelanceHub server
//!
//! # Architecture
//!
//! - **Stores** (`db`): user, gig, order, message, review and password-reset
//!   stores behind traits, backed by embedded SurrealDB or memory
//! - **Auth** (`auth`): JWT + Argon2, role gates and the order predicate
//! - **Orders** (`orders`): the order lifecycle state machine
//! - **Messaging** (`messaging`): per-order conversation log
//! - **Reviews** (`reviews`): review ledger with rating recomputation
//! - **Notifications** (`notify`): per-order realtime rooms
//! - **HTTP API** (`api`): axum routes and handlers
//!
//! # Layout
//!
//! ```text
//! hub-server/src/
//! ├── core/          # config, state, server, errors
//! ├── auth/          # JWT, extractor, middleware, policy
//! ├── db/            # store traits and backends
//! ├── orders/        # order lifecycle manager
//! ├── messaging/     # conversation log
//! ├── reviews/       # review ledger + rating hook
//! ├── catalog/       # gigs
//! ├── accounts/      # registration, login, password reset
//! ├── notify/        # notification hub
//! ├── services/      # mailer, file store
//! ├── api/           # HTTP routes
//! └── utils/         # logger, validation
//! ```

pub mod accounts;
pub mod api;
pub mod auth;
pub mod catalog;
pub mod core;
pub mod db;
pub mod messaging;
pub mod notify;
pub mod orders;
pub mod reviews;
pub mod services;
pub mod utils;

#[cfg(test)]
mod test_support;

// Re-export public types
pub use auth::{CurrentUser, JwtService};
pub use crate::core::{Config, Server, ServerState};
pub use orders::OrderManager;
pub use utils::{AppError, AppResult};

// Re-export unified error types from shared
pub use utils::{ApiResponse, ErrorCategory, ErrorCode};

// Re-export logger functions
pub use utils::logger::{init_logger, init_logger_with_file};

// Security logging macro
#[macro_export]
macro_rules! security_log {
    ($level:expr, $event:expr, $($key:ident = $value:expr),*) => {
        tracing::info!(
            target: "security",
            level = $level,
            event = $event,
            $($key = $value),*
        );
    };
}

/// Load `.env`, create the work dir and install the logger
pub fn setup_environment() -> Result<(), crate::core::ServerError> {
    dotenv::dotenv().ok();

    let work_dir = std::env::var("WORK_DIR").unwrap_or_else(|_| "./data".into());
    std::fs::create_dir_all(&work_dir)?;

    let log_level = std::env::var("RUST_LOG").ok();
    let json = std::env::var("LOG_JSON")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(false);
    let log_dir = std::env::var("LOG_DIR").ok();
    init_logger_with_file(log_level.as_deref(), json, log_dir.as_deref());
    Ok(())
}

pub fn print_banner() {
    println!(
        r#"
    ______               __                             __  __      __
   / ____/_______  ___  / /___ _____  ________  ____  / / / /_  __/ /_
  / /_  / ___/ _ \/ _ \/ / __ `/ __ \/ ___/ _ \/ __ \/ /_/ / / / / __ \
 / __/ / /  /  __/  __/ / /_/ / / / / /__/  __/ / / / __  / /_/ / /_/ /
/_/   /_/   \___/\___/_/\__,_/_/ /_/\___/\___/_/ /_/_/ /_/\__,_/_.___/
    "#
    );
}
