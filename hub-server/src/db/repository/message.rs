//! Message Repository

use async_trait::async_trait;
use shared::models::Message;
use surrealdb::engine::local::Db;
use surrealdb::{RecordId, Surreal};

use super::{BaseRepository, MessageStore, RepoResult, SELECT_WITH_ID, Touched};

const TABLE: &str = "message";

#[derive(Clone)]
pub struct MessageRepository {
    base: BaseRepository,
}

impl MessageRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db, TABLE),
        }
    }
}

#[async_trait]
impl MessageStore for MessageRepository {
    async fn create(&self, message: Message) -> RepoResult<Message> {
        self.base.create(&message.id, &message).await?;
        Ok(message)
    }

    async fn find_by_id(&self, id: &str) -> RepoResult<Option<Message>> {
        self.base.find_by_id(id).await
    }

    async fn find_by_order(&self, order_id: &str) -> RepoResult<Vec<Message>> {
        self.base
            .find_by_field("order_id", order_id, "created_at ASC, id ASC")
            .await
    }

    async fn find_by_participant(&self, user_id: &str) -> RepoResult<Vec<Message>> {
        let mut result = self
            .base
            .db()
            .query(format!(
                "{SELECT_WITH_ID} FROM message \
                 WHERE sender_id = $user OR receiver_id = $user ORDER BY created_at ASC, id ASC"
            ))
            .bind(("user", user_id.to_string()))
            .await?;
        Ok(result.take(0)?)
    }

    async fn mark_read(&self, ids: &[String], receiver_id: &str, read_at: i64) -> RepoResult<u64> {
        if ids.is_empty() {
            return Ok(0);
        }
        let things: Vec<RecordId> = ids
            .iter()
            .map(|id| RecordId::from_table_key(TABLE, id.clone()))
            .collect();
        let mut result = self
            .base
            .db()
            .query(
                "UPDATE $things SET is_read = true, read_at = $read_at \
                 WHERE receiver_id = $receiver AND is_read = false RETURN id",
            )
            .bind(("things", things))
            .bind(("receiver", receiver_id.to_string()))
            .bind(("read_at", read_at))
            .await?;
        let touched: Vec<Touched> = result.take(0)?;
        Ok(touched.len() as u64)
    }

    async fn delete(&self, id: &str) -> RepoResult<bool> {
        self.base.delete(id).await
    }

    async fn references_file(&self, reference: &str) -> RepoResult<bool> {
        self.base.exists_where("file_url = $value", reference).await
    }
}
