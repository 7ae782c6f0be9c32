//! Gig API Handlers

use axum::{
    Json,
    extract::{Path, Query, State},
};

use shared::models::{Gig, GigCreate, GigFilter, GigUpdate};
use shared::pagination::PaginatedResponse;

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::utils::{ApiResponse, AppResult, ok, ok_with_message};

/// GET /api/gigs - filtered, paginated catalog
pub async fn list(
    State(state): State<ServerState>,
    Query(filter): Query<GigFilter>,
) -> AppResult<Json<ApiResponse<PaginatedResponse<Gig>>>> {
    Ok(ok(state.catalog.list(filter).await?))
}

/// GET /api/gigs/{id}
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<ApiResponse<Gig>>> {
    Ok(ok(state.catalog.get(&id).await?))
}

/// GET /api/gigs/my - the caller's own gigs
pub async fn mine(
    State(state): State<ServerState>,
    user: CurrentUser,
) -> AppResult<Json<ApiResponse<Vec<Gig>>>> {
    Ok(ok(state.catalog.mine(&user).await?))
}

/// POST /api/gigs
pub async fn create(
    State(state): State<ServerState>,
    user: CurrentUser,
    Json(payload): Json<GigCreate>,
) -> AppResult<Json<ApiResponse<Gig>>> {
    Ok(ok(state.catalog.create(&user, payload).await?))
}

/// PATCH /api/gigs/{id}
pub async fn update(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<String>,
    Json(payload): Json<GigUpdate>,
) -> AppResult<Json<ApiResponse<Gig>>> {
    Ok(ok(state.catalog.update(&user, &id, payload).await?))
}

/// DELETE /api/gigs/{id}
pub async fn delete(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> AppResult<Json<ApiResponse<()>>> {
    state.catalog.delete(&user, &id).await?;
    Ok(ok_with_message("Gig deleted"))
}
