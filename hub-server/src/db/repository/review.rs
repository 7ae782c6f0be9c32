//! Review Repository
//!
//! `review.order_id` carries a unique index, so a second review for the same
//! order fails at the database even if two requests race past the manager.

use async_trait::async_trait;
use shared::models::Review;
use surrealdb::Surreal;
use surrealdb::engine::local::Db;

use super::{BaseRepository, RepoError, RepoResult, ReviewStore};

const TABLE: &str = "review";

#[derive(Clone)]
pub struct ReviewRepository {
    base: BaseRepository,
}

impl ReviewRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db, TABLE),
        }
    }
}

#[async_trait]
impl ReviewStore for ReviewRepository {
    async fn create(&self, review: Review) -> RepoResult<Review> {
        self.base.create(&review.id, &review).await.map_err(|e| match e {
            RepoError::Duplicate(_) => RepoError::Duplicate(format!(
                "Order {} already has a review",
                review.order_id
            )),
            other => other,
        })?;
        Ok(review)
    }

    async fn find_by_id(&self, id: &str) -> RepoResult<Option<Review>> {
        self.base.find_by_id(id).await
    }

    async fn find_by_order(&self, order_id: &str) -> RepoResult<Option<Review>> {
        let reviews: Vec<Review> = self
            .base
            .find_by_field("order_id", order_id, "created_at ASC")
            .await?;
        Ok(reviews.into_iter().next())
    }

    async fn find_by_gig(&self, gig_id: &str) -> RepoResult<Vec<Review>> {
        self.base
            .find_by_field("gig_id", gig_id, "created_at DESC")
            .await
    }

    async fn find_by_reviewed_user(&self, user_id: &str) -> RepoResult<Vec<Review>> {
        self.base
            .find_by_field("reviewed_user_id", user_id, "created_at DESC")
            .await
    }

    async fn update(&self, review: Review) -> RepoResult<Review> {
        self.base.replace(&review.id, &review).await?;
        Ok(review)
    }

    async fn delete(&self, id: &str) -> RepoResult<bool> {
        self.base.delete(id).await
    }
}
