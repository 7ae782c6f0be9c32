//! Core - configuration, state and server
//!
//! - [`Config`] - environment configuration
//! - [`ServerState`] - shared handles to stores, collaborators and managers
//! - [`Server`] - HTTP server
//! - [`ServerError`] - startup and runtime errors

pub mod config;
pub mod error;
pub mod server;
pub mod state;

pub use config::{Config, DatabaseBackend, MailBackend};
pub use error::{Result, ServerError};
pub use server::Server;
pub use state::ServerState;
