//! In-memory store backend
//!
//! One [`MemoryStore`] implements every store trait over plain maps guarded by
//! `parking_lot` locks. Used for `DATABASE=memory` and by the test suites;
//! nothing survives a restart.

use std::collections::HashMap;

use async_trait::async_trait;
use parking_lot::RwLock;
use shared::models::{Gig, Message, Order, Review, User, UserRole};

use crate::db::models::PasswordReset;
use crate::db::repository::{
    GigStore, MessageStore, OrderStore, PasswordResetStore, RepoError, RepoResult, ReviewStore,
    UserStore,
};

#[derive(Debug, Default)]
pub struct MemoryStore {
    users: RwLock<HashMap<String, User>>,
    gigs: RwLock<HashMap<String, Gig>>,
    orders: RwLock<HashMap<String, Order>>,
    messages: RwLock<HashMap<String, Message>>,
    reviews: RwLock<HashMap<String, Review>>,
    resets: RwLock<HashMap<String, PasswordReset>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Newest first by `created_at`
fn newest_first<T>(mut items: Vec<T>, created_at: impl Fn(&T) -> i64) -> Vec<T> {
    items.sort_by_key(|item| std::cmp::Reverse(created_at(item)));
    items
}

/// Send order: `created_at`, then the time-ordered id
fn oldest_first(mut messages: Vec<Message>) -> Vec<Message> {
    messages.sort_by(|a, b| (a.created_at, &a.id).cmp(&(b.created_at, &b.id)));
    messages
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn create(&self, user: User) -> RepoResult<User> {
        let mut users = self.users.write();
        if users.values().any(|u| u.email == user.email) {
            return Err(RepoError::Duplicate(format!(
                "Email '{}' already registered",
                user.email
            )));
        }
        users.insert(user.id.clone(), user.clone());
        Ok(user)
    }

    async fn find_by_id(&self, id: &str) -> RepoResult<Option<User>> {
        Ok(self.users.read().get(id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> RepoResult<Option<User>> {
        Ok(self.users.read().values().find(|u| u.email == email).cloned())
    }

    async fn find_by_role(&self, role: UserRole) -> RepoResult<Vec<User>> {
        let users: Vec<User> = self
            .users
            .read()
            .values()
            .filter(|u| u.role == role)
            .cloned()
            .collect();
        Ok(newest_first(users, |u| u.created_at))
    }

    async fn update(&self, user: User) -> RepoResult<User> {
        let mut users = self.users.write();
        match users.get_mut(&user.id) {
            Some(slot) => {
                *slot = user.clone();
                Ok(user)
            }
            None => Err(RepoError::NotFound(format!("User {} not found", user.id))),
        }
    }

    async fn set_rating(&self, id: &str, rating: f64) -> RepoResult<()> {
        match self.users.write().get_mut(id) {
            Some(user) => {
                user.rating = rating;
                Ok(())
            }
            None => Err(RepoError::NotFound(format!("User {} not found", id))),
        }
    }

    async fn delete(&self, id: &str) -> RepoResult<bool> {
        Ok(self.users.write().remove(id).is_some())
    }

    async fn references_file(&self, reference: &str) -> RepoResult<bool> {
        Ok(self.users.read().values().any(|u| u.profile_pic == reference))
    }
}

#[async_trait]
impl GigStore for MemoryStore {
    async fn create(&self, gig: Gig) -> RepoResult<Gig> {
        self.gigs.write().insert(gig.id.clone(), gig.clone());
        Ok(gig)
    }

    async fn find_by_id(&self, id: &str) -> RepoResult<Option<Gig>> {
        Ok(self.gigs.read().get(id).cloned())
    }

    async fn find_all(&self) -> RepoResult<Vec<Gig>> {
        let gigs: Vec<Gig> = self.gigs.read().values().cloned().collect();
        Ok(newest_first(gigs, |g| g.created_at))
    }

    async fn find_by_owner(&self, owner_id: &str) -> RepoResult<Vec<Gig>> {
        let gigs: Vec<Gig> = self
            .gigs
            .read()
            .values()
            .filter(|g| g.owner_id == owner_id)
            .cloned()
            .collect();
        Ok(newest_first(gigs, |g| g.created_at))
    }

    async fn update(&self, gig: Gig) -> RepoResult<Gig> {
        let mut gigs = self.gigs.write();
        match gigs.get_mut(&gig.id) {
            Some(slot) => {
                *slot = gig.clone();
                Ok(gig)
            }
            None => Err(RepoError::NotFound(format!("Gig {} not found", gig.id))),
        }
    }

    async fn delete(&self, id: &str) -> RepoResult<bool> {
        Ok(self.gigs.write().remove(id).is_some())
    }

    async fn references_file(&self, reference: &str) -> RepoResult<bool> {
        Ok(self.gigs.read().values().any(|g| {
            g.thumbnail.as_deref() == Some(reference) || g.images.iter().any(|i| i == reference)
        }))
    }
}

#[async_trait]
impl OrderStore for MemoryStore {
    async fn create(&self, order: Order) -> RepoResult<Order> {
        self.orders.write().insert(order.id.clone(), order.clone());
        Ok(order)
    }

    async fn find_by_id(&self, id: &str) -> RepoResult<Option<Order>> {
        Ok(self.orders.read().get(id).cloned())
    }

    async fn update_if_version(&self, order: Order, expected: u64) -> RepoResult<Order> {
        let mut orders = self.orders.write();
        let slot = orders
            .get_mut(&order.id)
            .ok_or_else(|| RepoError::NotFound(format!("Order {} not found", order.id)))?;
        if slot.version != expected {
            return Err(RepoError::Conflict(format!(
                "Order {} changed concurrently (expected version {}, found {})",
                order.id, expected, slot.version
            )));
        }
        *slot = order.clone();
        Ok(order)
    }

    async fn find_by_buyer(&self, buyer_id: &str) -> RepoResult<Vec<Order>> {
        let orders: Vec<Order> = self
            .orders
            .read()
            .values()
            .filter(|o| o.buyer_id == buyer_id)
            .cloned()
            .collect();
        Ok(newest_first(orders, |o| o.created_at))
    }

    async fn find_by_seller(&self, seller_id: &str) -> RepoResult<Vec<Order>> {
        let orders: Vec<Order> = self
            .orders
            .read()
            .values()
            .filter(|o| o.seller_id == seller_id)
            .cloned()
            .collect();
        Ok(newest_first(orders, |o| o.created_at))
    }

    async fn references_file(&self, reference: &str) -> RepoResult<bool> {
        Ok(self
            .orders
            .read()
            .values()
            .any(|o| o.delivery_files.iter().any(|f| f == reference)))
    }
}

#[async_trait]
impl MessageStore for MemoryStore {
    async fn create(&self, message: Message) -> RepoResult<Message> {
        self.messages
            .write()
            .insert(message.id.clone(), message.clone());
        Ok(message)
    }

    async fn find_by_id(&self, id: &str) -> RepoResult<Option<Message>> {
        Ok(self.messages.read().get(id).cloned())
    }

    async fn find_by_order(&self, order_id: &str) -> RepoResult<Vec<Message>> {
        let messages: Vec<Message> = self
            .messages
            .read()
            .values()
            .filter(|m| m.order_id == order_id)
            .cloned()
            .collect();
        Ok(oldest_first(messages))
    }

    async fn find_by_participant(&self, user_id: &str) -> RepoResult<Vec<Message>> {
        let messages: Vec<Message> = self
            .messages
            .read()
            .values()
            .filter(|m| m.sender_id == user_id || m.receiver_id == user_id)
            .cloned()
            .collect();
        Ok(oldest_first(messages))
    }

    async fn mark_read(&self, ids: &[String], receiver_id: &str, read_at: i64) -> RepoResult<u64> {
        let mut messages = self.messages.write();
        let mut updated = 0;
        for id in ids {
            if let Some(message) = messages.get_mut(id)
                && message.receiver_id == receiver_id
                && !message.is_read
            {
                message.is_read = true;
                message.read_at = Some(read_at);
                updated += 1;
            }
        }
        Ok(updated)
    }

    async fn delete(&self, id: &str) -> RepoResult<bool> {
        Ok(self.messages.write().remove(id).is_some())
    }

    async fn references_file(&self, reference: &str) -> RepoResult<bool> {
        Ok(self
            .messages
            .read()
            .values()
            .any(|m| m.file_url.as_deref() == Some(reference)))
    }
}

#[async_trait]
impl ReviewStore for MemoryStore {
    async fn create(&self, review: Review) -> RepoResult<Review> {
        let mut reviews = self.reviews.write();
        if reviews.values().any(|r| r.order_id == review.order_id) {
            return Err(RepoError::Duplicate(format!(
                "Order {} already has a review",
                review.order_id
            )));
        }
        reviews.insert(review.id.clone(), review.clone());
        Ok(review)
    }

    async fn find_by_id(&self, id: &str) -> RepoResult<Option<Review>> {
        Ok(self.reviews.read().get(id).cloned())
    }

    async fn find_by_order(&self, order_id: &str) -> RepoResult<Option<Review>> {
        Ok(self
            .reviews
            .read()
            .values()
            .find(|r| r.order_id == order_id)
            .cloned())
    }

    async fn find_by_gig(&self, gig_id: &str) -> RepoResult<Vec<Review>> {
        let reviews: Vec<Review> = self
            .reviews
            .read()
            .values()
            .filter(|r| r.gig_id == gig_id)
            .cloned()
            .collect();
        Ok(newest_first(reviews, |r| r.created_at))
    }

    async fn find_by_reviewed_user(&self, user_id: &str) -> RepoResult<Vec<Review>> {
        let reviews: Vec<Review> = self
            .reviews
            .read()
            .values()
            .filter(|r| r.reviewed_user_id == user_id)
            .cloned()
            .collect();
        Ok(newest_first(reviews, |r| r.created_at))
    }

    async fn update(&self, review: Review) -> RepoResult<Review> {
        let mut reviews = self.reviews.write();
        match reviews.get_mut(&review.id) {
            Some(slot) => {
                *slot = review.clone();
                Ok(review)
            }
            None => Err(RepoError::NotFound(format!("Review {} not found", review.id))),
        }
    }

    async fn delete(&self, id: &str) -> RepoResult<bool> {
        Ok(self.reviews.write().remove(id).is_some())
    }
}

#[async_trait]
impl PasswordResetStore for MemoryStore {
    async fn upsert(&self, reset: PasswordReset) -> RepoResult<()> {
        self.resets.write().insert(reset.email.clone(), reset);
        Ok(())
    }

    async fn find(&self, email: &str) -> RepoResult<Option<PasswordReset>> {
        Ok(self.resets.read().get(email).cloned())
    }

    async fn increment_attempts(&self, email: &str) -> RepoResult<u32> {
        match self.resets.write().get_mut(email) {
            Some(reset) => {
                reset.attempts += 1;
                Ok(reset.attempts)
            }
            None => Err(RepoError::NotFound(format!("No reset pending for {}", email))),
        }
    }

    async fn delete(&self, email: &str) -> RepoResult<bool> {
        Ok(self.resets.write().remove(email).is_some())
    }
}
