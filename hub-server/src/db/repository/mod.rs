//! Repository Module
//!
//! Store traits for every persisted entity plus the SurrealDB
//! implementations. The in-memory implementations live in [`crate::db::memory`].
//!
//! Managers only see `Arc<dyn …Store>` handles bundled in [`Stores`].

pub mod gig;
pub mod message;
pub mod order;
pub mod password_reset;
pub mod review;
pub mod user;

pub use gig::GigRepository;
pub use message::MessageRepository;
pub use order::OrderRepository;
pub use password_reset::PasswordResetRepository;
pub use review::ReviewRepository;
pub use user::UserRepository;

use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;
use serde::de::DeserializeOwned;
use shared::models::{Gig, Message, Order, Review, User, UserRole};
use shared::{AppError, ErrorCode};
use surrealdb::engine::local::Db;
use surrealdb::{RecordId, Surreal};
use thiserror::Error;

use crate::db::models::PasswordReset;

/// Repository error types
#[derive(Debug, Error)]
pub enum RepoError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Duplicate: {0}")]
    Duplicate(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Validation error: {0}")]
    Validation(String),

    /// Compare-and-swap lost against a concurrent write
    #[error("Conflict: {0}")]
    Conflict(String),
}

impl From<surrealdb::Error> for RepoError {
    fn from(err: surrealdb::Error) -> Self {
        let message = err.to_string();
        // Unique index violations surface as "Database index `x` already contains ..."
        if message.contains("already contains") || message.contains("already exists") {
            RepoError::Duplicate(message)
        } else {
            RepoError::Database(message)
        }
    }
}

impl From<RepoError> for AppError {
    fn from(err: RepoError) -> Self {
        match err {
            RepoError::NotFound(msg) => AppError::with_message(ErrorCode::NotFound, msg),
            RepoError::Duplicate(msg) => AppError::conflict(msg),
            RepoError::Database(msg) => AppError::database(msg),
            RepoError::Validation(msg) => AppError::validation(msg),
            RepoError::Conflict(msg) => AppError::with_message(ErrorCode::OrderVersionConflict, msg),
        }
    }
}

/// Result type for repository operations
pub type RepoResult<T> = Result<T, RepoError>;

// =============================================================================
// Store traits
// =============================================================================

#[async_trait]
pub trait UserStore: Send + Sync {
    /// Insert a new user; `Duplicate` when the email is taken
    async fn create(&self, user: User) -> RepoResult<User>;
    async fn find_by_id(&self, id: &str) -> RepoResult<Option<User>>;
    /// Lookup by normalized email
    async fn find_by_email(&self, email: &str) -> RepoResult<Option<User>>;
    async fn find_by_role(&self, role: UserRole) -> RepoResult<Vec<User>>;
    /// Replace a stored user; `NotFound` when absent
    async fn update(&self, user: User) -> RepoResult<User>;
    /// Write the derived rating only
    async fn set_rating(&self, id: &str, rating: f64) -> RepoResult<()>;
    async fn delete(&self, id: &str) -> RepoResult<bool>;
    /// Whether any profile picture points at `reference`
    async fn references_file(&self, reference: &str) -> RepoResult<bool>;
}

#[async_trait]
pub trait GigStore: Send + Sync {
    async fn create(&self, gig: Gig) -> RepoResult<Gig>;
    async fn find_by_id(&self, id: &str) -> RepoResult<Option<Gig>>;
    /// All gigs, newest first
    async fn find_all(&self) -> RepoResult<Vec<Gig>>;
    /// Gigs of one owner, newest first
    async fn find_by_owner(&self, owner_id: &str) -> RepoResult<Vec<Gig>>;
    async fn update(&self, gig: Gig) -> RepoResult<Gig>;
    async fn delete(&self, id: &str) -> RepoResult<bool>;
    /// Whether any thumbnail or gallery image points at `reference`
    async fn references_file(&self, reference: &str) -> RepoResult<bool>;
}

#[async_trait]
pub trait OrderStore: Send + Sync {
    async fn create(&self, order: Order) -> RepoResult<Order>;
    async fn find_by_id(&self, id: &str) -> RepoResult<Option<Order>>;
    /// Store `order` only if the stored version still equals `expected`.
    ///
    /// `Conflict` when another write got there first, `NotFound` when the
    /// order does not exist. Nothing is written on either error.
    async fn update_if_version(&self, order: Order, expected: u64) -> RepoResult<Order>;
    /// Orders placed by `buyer_id`, newest first
    async fn find_by_buyer(&self, buyer_id: &str) -> RepoResult<Vec<Order>>;
    /// Orders sold by `seller_id`, newest first
    async fn find_by_seller(&self, seller_id: &str) -> RepoResult<Vec<Order>>;
    /// Whether any delivery lists `reference`
    async fn references_file(&self, reference: &str) -> RepoResult<bool>;
}

#[async_trait]
pub trait MessageStore: Send + Sync {
    async fn create(&self, message: Message) -> RepoResult<Message>;
    async fn find_by_id(&self, id: &str) -> RepoResult<Option<Message>>;
    /// Conversation of one order, oldest first
    async fn find_by_order(&self, order_id: &str) -> RepoResult<Vec<Message>>;
    /// Messages sent or received by `user_id`, oldest first
    async fn find_by_participant(&self, user_id: &str) -> RepoResult<Vec<Message>>;
    /// Mark the unread messages among `ids` addressed to `receiver_id` as read.
    ///
    /// Returns the number of messages changed.
    async fn mark_read(&self, ids: &[String], receiver_id: &str, read_at: i64) -> RepoResult<u64>;
    async fn delete(&self, id: &str) -> RepoResult<bool>;
    /// Whether any message attaches `reference`
    async fn references_file(&self, reference: &str) -> RepoResult<bool>;
}

#[async_trait]
pub trait ReviewStore: Send + Sync {
    /// Insert a review; `Duplicate` when the order already has one
    async fn create(&self, review: Review) -> RepoResult<Review>;
    async fn find_by_id(&self, id: &str) -> RepoResult<Option<Review>>;
    async fn find_by_order(&self, order_id: &str) -> RepoResult<Option<Review>>;
    /// Reviews of a gig, newest first
    async fn find_by_gig(&self, gig_id: &str) -> RepoResult<Vec<Review>>;
    /// Reviews received by a user, newest first
    async fn find_by_reviewed_user(&self, user_id: &str) -> RepoResult<Vec<Review>>;
    async fn update(&self, review: Review) -> RepoResult<Review>;
    async fn delete(&self, id: &str) -> RepoResult<bool>;
}

#[async_trait]
pub trait PasswordResetStore: Send + Sync {
    /// Insert or replace the record for `reset.email`
    async fn upsert(&self, reset: PasswordReset) -> RepoResult<()>;
    async fn find(&self, email: &str) -> RepoResult<Option<PasswordReset>>;
    /// Count one verification attempt, returning the new total
    async fn increment_attempts(&self, email: &str) -> RepoResult<u32>;
    async fn delete(&self, email: &str) -> RepoResult<bool>;
}

/// Store handles shared by the managers
#[derive(Clone)]
pub struct Stores {
    pub users: Arc<dyn UserStore>,
    pub gigs: Arc<dyn GigStore>,
    pub orders: Arc<dyn OrderStore>,
    pub messages: Arc<dyn MessageStore>,
    pub reviews: Arc<dyn ReviewStore>,
    pub resets: Arc<dyn PasswordResetStore>,
}

impl std::fmt::Debug for Stores {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Stores").finish_non_exhaustive()
    }
}

impl Stores {
    /// SurrealDB-backed stores
    pub fn surreal(db: Surreal<Db>) -> Self {
        Self {
            users: Arc::new(UserRepository::new(db.clone())),
            gigs: Arc::new(GigRepository::new(db.clone())),
            orders: Arc::new(OrderRepository::new(db.clone())),
            messages: Arc::new(MessageRepository::new(db.clone())),
            reviews: Arc::new(ReviewRepository::new(db.clone())),
            resets: Arc::new(PasswordResetRepository::new(db)),
        }
    }

    /// Whether a stored record still points at an uploaded file.
    ///
    /// Uploads are content addressed, so one file can back several records.
    pub async fn file_in_use(&self, reference: &str) -> RepoResult<bool> {
        Ok(self.users.references_file(reference).await?
            || self.gigs.references_file(reference).await?
            || self.orders.references_file(reference).await?
            || self.messages.references_file(reference).await?)
    }

    /// Process-memory stores
    pub fn memory() -> Self {
        let store = Arc::new(crate::db::memory::MemoryStore::new());
        Self {
            users: store.clone(),
            gigs: store.clone(),
            orders: store.clone(),
            messages: store.clone(),
            reviews: store.clone(),
            resets: store,
        }
    }
}

// =============================================================================
// ID Convention
// =============================================================================
//
// Domain ids are the bare record key (a UUID string). Queries project it back
// with `record::id(id) AS id`, writes address `type::thing($tb, $id)` and send
// the entity without its `id` field.

/// Select clause projecting the record key as `id`
pub(crate) const SELECT_WITH_ID: &str = "SELECT *, record::id(id) AS id";

/// Base repository with database reference
#[derive(Clone)]
pub struct BaseRepository {
    db: Surreal<Db>,
    table: &'static str,
}

/// Row returned by writes that only report which record they touched
#[derive(Debug, serde::Deserialize)]
pub(crate) struct Touched {
    #[allow(dead_code)]
    pub id: RecordId,
}

impl BaseRepository {
    pub fn new(db: Surreal<Db>, table: &'static str) -> Self {
        Self { db, table }
    }

    pub fn db(&self) -> &Surreal<Db> {
        &self.db
    }

    pub fn table(&self) -> &'static str {
        self.table
    }

    /// Serialize `entity` for a CONTENT clause, dropping `id`
    pub fn content<T: Serialize>(entity: &T) -> RepoResult<serde_json::Value> {
        let mut value =
            serde_json::to_value(entity).map_err(|e| RepoError::Database(e.to_string()))?;
        if let Some(obj) = value.as_object_mut() {
            obj.remove("id");
        }
        Ok(value)
    }

    /// Insert `entity` under record key `id`
    pub async fn create<T: Serialize>(&self, id: &str, entity: &T) -> RepoResult<()> {
        let mut result = self
            .db
            .query("CREATE type::thing($tb, $id) CONTENT $data RETURN NONE")
            .bind(("tb", self.table))
            .bind(("id", id.to_string()))
            .bind(("data", Self::content(entity)?))
            .await?;
        // Statement errors (unique index violations) surface on take
        let _: Vec<Touched> = result.take(0)?;
        Ok(())
    }

    /// Replace the content of an existing record
    pub async fn replace<T: Serialize>(&self, id: &str, entity: &T) -> RepoResult<()> {
        let mut result = self
            .db
            .query("UPDATE type::thing($tb, $id) CONTENT $data RETURN id")
            .bind(("tb", self.table))
            .bind(("id", id.to_string()))
            .bind(("data", Self::content(entity)?))
            .await?;
        let touched: Vec<Touched> = result.take(0)?;
        if touched.is_empty() {
            return Err(RepoError::NotFound(format!("{} {} not found", self.table, id)));
        }
        Ok(())
    }

    pub async fn find_by_id<T: DeserializeOwned>(&self, id: &str) -> RepoResult<Option<T>> {
        let mut result = self
            .db
            .query(format!("{SELECT_WITH_ID} FROM type::thing($tb, $id)"))
            .bind(("tb", self.table))
            .bind(("id", id.to_string()))
            .await?;
        let rows: Vec<T> = result.take(0)?;
        Ok(rows.into_iter().next())
    }

    /// Rows where `field = $value`, ordered by `order`
    pub async fn find_by_field<T: DeserializeOwned>(
        &self,
        field: &'static str,
        value: &str,
        order: &'static str,
    ) -> RepoResult<Vec<T>> {
        let mut result = self
            .db
            .query(format!(
                "{SELECT_WITH_ID} FROM type::table($tb) WHERE {field} = $value ORDER BY {order}"
            ))
            .bind(("tb", self.table))
            .bind(("value", value.to_string()))
            .await?;
        Ok(result.take(0)?)
    }

    /// Whether a row matches `condition`, with `$value` bound
    pub async fn exists_where(&self, condition: &'static str, value: &str) -> RepoResult<bool> {
        let mut result = self
            .db
            .query(format!("SELECT id FROM type::table($tb) WHERE {condition} LIMIT 1"))
            .bind(("tb", self.table))
            .bind(("value", value.to_string()))
            .await?;
        let rows: Vec<Touched> = result.take(0)?;
        Ok(!rows.is_empty())
    }

    pub async fn delete(&self, id: &str) -> RepoResult<bool> {
        let mut result = self
            .db
            .query("DELETE type::thing($tb, $id) RETURN BEFORE")
            .bind(("tb", self.table))
            .bind(("id", id.to_string()))
            .await?;
        let removed: Vec<Touched> = result.take(0)?;
        Ok(!removed.is_empty())
    }
}
