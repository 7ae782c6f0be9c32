//! Utilities
//!
//! - [`AppError`] / [`ApiResponse`] (from shared::error)
//! - logging setup
//! - input validation helpers

pub mod logger;
pub mod validation;

pub use shared::error::{ApiResponse, AppError, AppResult, ErrorCategory, ErrorCode};

/// Wrap data in a success envelope
pub fn ok<T>(data: T) -> axum::Json<ApiResponse<T>> {
    axum::Json(ApiResponse::success(data))
}

/// Success envelope without data
pub fn ok_with_message(message: impl Into<String>) -> axum::Json<ApiResponse<()>> {
    axum::Json(ApiResponse::ok_with_message(message))
}
