//! ReviewLedger - one review per completed order
//!
//! Uniqueness is checked here and enforced again by the store's unique index
//! on `order_id`. After each mutation the [`RatingHook`] refreshes the seller
//! rating; its failures are logged and never undo the mutation.

use std::sync::Arc;

use shared::models::{
    Feedback, MAX_COMMENT_LEN, Review, ReviewCreate, ReviewPage, ReviewQuery, ReviewStats,
    ReviewUpdate,
};
use shared::order::{OrderStatus, Relation};
use shared::pagination::PageRequest;
use shared::util::{new_id, now_millis};
use shared::{AppError, AppResult, ErrorCode};

use crate::auth::{CurrentUser, authorize};
use crate::db::{RepoError, Stores};
use crate::reviews::hook::RatingHook;
use crate::utils::validation::validate_required_text;

/// Default page size of review listings
pub const DEFAULT_REVIEW_PAGE: u32 = 10;

#[derive(Clone)]
pub struct ReviewLedger {
    stores: Stores,
    hook: Arc<dyn RatingHook>,
}

impl std::fmt::Debug for ReviewLedger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReviewLedger").finish_non_exhaustive()
    }
}

fn validate_rating(rating: u8) -> AppResult<()> {
    if !(1..=5).contains(&rating) {
        return Err(AppError::with_message(
            ErrorCode::InvalidRating,
            format!("Rating must be between 1 and 5, got {}", rating),
        )
        .with_detail("field", "rating"));
    }
    Ok(())
}

fn review_not_found(review_id: &str) -> AppError {
    AppError::new(ErrorCode::ReviewNotFound).with_detail("review_id", review_id)
}

fn already_reviewed(order_id: &str) -> AppError {
    AppError::new(ErrorCode::ReviewAlreadyExists).with_detail("order_id", order_id)
}

impl ReviewLedger {
    pub fn new(stores: Stores, hook: Arc<dyn RatingHook>) -> Self {
        Self { stores, hook }
    }

    async fn run_hook(&self, user_id: &str) {
        if let Err(e) = self.hook.on_reviews_changed(user_id).await {
            tracing::error!(user_id, error = %e, "Rating recomputation failed");
        }
    }

    pub async fn create(&self, actor: &CurrentUser, input: ReviewCreate) -> AppResult<Review> {
        let mut order = self
            .stores
            .orders
            .find_by_id(&input.order_id)
            .await?
            .ok_or_else(|| {
                AppError::new(ErrorCode::OrderNotFound).with_detail("order_id", input.order_id.as_str())
            })?;
        authorize(&actor.id, &order, Relation::Buyer)?;

        if order.status != OrderStatus::Completed {
            return Err(AppError::new(ErrorCode::OrderNotCompleted)
                .with_detail("status", order.status.as_str()));
        }

        validate_rating(input.rating)?;
        let comment = input.comment.trim().to_string();
        validate_required_text(&comment, "comment", MAX_COMMENT_LEN)?;

        if self.stores.reviews.find_by_order(&order.id).await?.is_some() {
            return Err(already_reviewed(&order.id));
        }

        let now = now_millis();
        let review = Review {
            id: new_id(),
            order_id: order.id.clone(),
            gig_id: order.gig_id.clone(),
            reviewer_id: actor.id.clone(),
            reviewed_user_id: order.seller_id.clone(),
            rating: input.rating,
            comment,
            category: input.category.unwrap_or_default(),
            is_public: input.is_public.unwrap_or(true),
            created_at: now,
            updated_at: now,
        };

        let review = match self.stores.reviews.create(review).await {
            Ok(review) => review,
            Err(RepoError::Duplicate(_)) => return Err(already_reviewed(&order.id)),
            Err(e) => return Err(e.into()),
        };
        tracing::info!(
            review_id = %review.id,
            order_id = %review.order_id,
            rating = review.rating,
            "Review created"
        );

        if order.feedback.is_none() {
            let expected = order.version;
            order.feedback = Some(Feedback {
                rating: review.rating,
                comment: review.comment.clone(),
            });
            order.version = expected + 1;
            order.updated_at = now;
            if let Err(e) = self.stores.orders.update_if_version(order, expected).await {
                tracing::warn!(order_id = %review.order_id, error = %e, "Could not copy feedback to order");
            }
        }

        self.run_hook(&review.reviewed_user_id).await;
        Ok(review)
    }

    async fn own_review(&self, actor: &CurrentUser, review_id: &str) -> AppResult<Review> {
        let review = self
            .stores
            .reviews
            .find_by_id(review_id)
            .await?
            .ok_or_else(|| review_not_found(review_id))?;
        if review.reviewer_id != actor.id {
            return Err(AppError::forbidden("Only the reviewer can change this review")
                .with_detail("review_id", review_id));
        }
        Ok(review)
    }

    pub async fn update(
        &self,
        actor: &CurrentUser,
        review_id: &str,
        update: ReviewUpdate,
    ) -> AppResult<Review> {
        let mut review = self.own_review(actor, review_id).await?;

        if let Some(rating) = update.rating {
            validate_rating(rating)?;
            review.rating = rating;
        }
        if let Some(comment) = update.comment {
            let comment = comment.trim().to_string();
            validate_required_text(&comment, "comment", MAX_COMMENT_LEN)?;
            review.comment = comment;
        }
        if let Some(category) = update.category {
            review.category = category;
        }
        if let Some(is_public) = update.is_public {
            review.is_public = is_public;
        }
        review.updated_at = now_millis();

        let review = self.stores.reviews.update(review).await.map_err(|e| match e {
            RepoError::NotFound(_) => review_not_found(review_id),
            other => other.into(),
        })?;
        tracing::info!(review_id, "Review updated");

        self.run_hook(&review.reviewed_user_id).await;
        Ok(review)
    }

    pub async fn delete(&self, actor: &CurrentUser, review_id: &str) -> AppResult<()> {
        let review = self.own_review(actor, review_id).await?;
        if !self.stores.reviews.delete(review_id).await? {
            return Err(review_not_found(review_id));
        }
        tracing::info!(review_id, order_id = %review.order_id, "Review deleted");

        self.run_hook(&review.reviewed_user_id).await;
        Ok(())
    }

    fn page(reviews: Vec<Review>, query: ReviewQuery) -> ReviewPage {
        let public: Vec<Review> = reviews.into_iter().filter(|r| r.is_public).collect();
        let stats = ReviewStats::from_ratings(public.iter().map(|r| r.rating));
        let filtered: Vec<Review> = public
            .into_iter()
            .filter(|r| query.rating.is_none_or(|rating| r.rating == rating))
            .collect();
        let page = PageRequest::new(query.page, query.limit, DEFAULT_REVIEW_PAGE);
        ReviewPage {
            reviews: page.slice(filtered),
            stats,
        }
    }

    /// Public reviews of a gig, newest first
    pub async fn gig_reviews(&self, gig_id: &str, query: ReviewQuery) -> AppResult<ReviewPage> {
        let reviews = self.stores.reviews.find_by_gig(gig_id).await?;
        Ok(Self::page(reviews, query))
    }

    /// Public reviews a user received, newest first
    pub async fn user_reviews(&self, user_id: &str, query: ReviewQuery) -> AppResult<ReviewPage> {
        let reviews = self.stores.reviews.find_by_reviewed_user(user_id).await?;
        Ok(Self::page(reviews, query))
    }
}
