//! Post-commit rating recomputation
//!
//! Runs after every successful review create, update or delete. The rating
//! is recomputed from scratch, so concurrent runs converge.

use async_trait::async_trait;
use shared::models::round_rating;

use crate::db::{RepoResult, Stores};

#[async_trait]
pub trait RatingHook: Send + Sync {
    /// Refresh the derived rating of `user_id`.
    ///
    /// Callers log and drop the error; the review mutation stands.
    async fn on_reviews_changed(&self, user_id: &str) -> RepoResult<f64>;
}

/// Mean of the user's public reviews, rounded to one decimal, 0.0 when none
#[derive(Clone)]
pub struct RecomputeRating {
    stores: Stores,
}

impl RecomputeRating {
    pub fn new(stores: Stores) -> Self {
        Self { stores }
    }
}

#[async_trait]
impl RatingHook for RecomputeRating {
    async fn on_reviews_changed(&self, user_id: &str) -> RepoResult<f64> {
        let reviews = self.stores.reviews.find_by_reviewed_user(user_id).await?;
        let (sum, count) = reviews
            .iter()
            .filter(|r| r.is_public)
            .fold((0u64, 0u64), |(sum, count), r| (sum + r.rating as u64, count + 1));
        let rating = round_rating(sum, count);
        self.stores.users.set_rating(user_id, rating).await?;
        tracing::debug!(user_id, rating, reviews = count, "Rating recomputed");
        Ok(rating)
    }
}
