//! Review API Handlers

use axum::{
    Json,
    extract::{Path, Query, State},
};

use shared::models::{Review, ReviewCreate, ReviewPage, ReviewQuery, ReviewUpdate};

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::utils::{ApiResponse, AppResult, ok, ok_with_message};

/// GET /api/reviews/gig/{gig_id}
pub async fn gig_reviews(
    State(state): State<ServerState>,
    Path(gig_id): Path<String>,
    Query(query): Query<ReviewQuery>,
) -> AppResult<Json<ApiResponse<ReviewPage>>> {
    Ok(ok(state.reviews.gig_reviews(&gig_id, query).await?))
}

/// GET /api/reviews/user/{user_id}
pub async fn user_reviews(
    State(state): State<ServerState>,
    Path(user_id): Path<String>,
    Query(query): Query<ReviewQuery>,
) -> AppResult<Json<ApiResponse<ReviewPage>>> {
    Ok(ok(state.reviews.user_reviews(&user_id, query).await?))
}

/// POST /api/reviews - buyer reviews a completed order
pub async fn create(
    State(state): State<ServerState>,
    user: CurrentUser,
    Json(payload): Json<ReviewCreate>,
) -> AppResult<Json<ApiResponse<Review>>> {
    Ok(ok(state.reviews.create(&user, payload).await?))
}

/// PUT /api/reviews/{id}
pub async fn update(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<String>,
    Json(payload): Json<ReviewUpdate>,
) -> AppResult<Json<ApiResponse<Review>>> {
    Ok(ok(state.reviews.update(&user, &id, payload).await?))
}

/// DELETE /api/reviews/{id}
pub async fn delete(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> AppResult<Json<ApiResponse<()>>> {
    state.reviews.delete(&user, &id).await?;
    Ok(ok_with_message("Review deleted"))
}
