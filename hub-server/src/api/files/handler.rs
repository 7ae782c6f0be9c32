//! Upload Handlers

use axum::{
    Json,
    extract::{Multipart, Path, State},
    response::IntoResponse,
};
use http::header;

use crate::api::files::read_file_field;
use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::services::StoredFile;
use crate::utils::{ApiResponse, AppResult, ok};

/// POST /api/files/upload (multipart, field `file`)
pub async fn upload(
    State(state): State<ServerState>,
    user: CurrentUser,
    multipart: Multipart,
) -> AppResult<Json<ApiResponse<StoredFile>>> {
    let (bytes, filename) = read_file_field(multipart).await?;
    let stored = state.files.put(bytes, &filename).await?;

    tracing::info!(
        user_id = %user.id,
        original_name = %stored.original_name,
        name = %stored.name,
        size = stored.size,
        "File uploaded"
    );

    Ok(ok(stored))
}

/// GET /api/files/{name}
pub async fn serve(
    State(state): State<ServerState>,
    Path(name): Path<String>,
) -> AppResult<impl IntoResponse> {
    let (bytes, mime) = state.files.open(&name).await?;
    Ok(([(header::CONTENT_TYPE, mime)], bytes))
}
