//! Upload Routes
//!
//! | Path | Method | Auth |
//! |------|------|------|
//! | /api/files/upload | POST | user |
//! | /api/files/{name} | GET | none |

mod handler;

use axum::{
    Router,
    extract::Multipart,
    routing::{get, post},
};

use crate::core::ServerState;
use crate::utils::{AppError, AppResult, ErrorCode};

pub fn router() -> Router<ServerState> {
    Router::new()
        .route("/api/files/upload", post(handler::upload))
        .route("/api/files/{name}", get(handler::serve))
}

/// Bytes and original filename of the multipart field `file`
pub(crate) async fn read_file_field(mut multipart: Multipart) -> AppResult<(Vec<u8>, String)> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::validation(format!("Invalid multipart request: {}", e)))?
    {
        if field.name() != Some("file") {
            continue;
        }
        let filename = field
            .file_name()
            .map(|s| s.to_string())
            .ok_or_else(|| AppError::new(ErrorCode::NoFilename))?;
        let data = field
            .bytes()
            .await
            .map_err(|e| AppError::validation(format!("Multipart error: {}", e)))?;
        return Ok((data.to_vec(), filename));
    }

    Err(AppError::with_message(
        ErrorCode::NoFileProvided,
        "No 'file' field found. Field name must be 'file'",
    ))
}
