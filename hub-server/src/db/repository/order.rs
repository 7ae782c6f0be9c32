//! Order Repository
//!
//! Every update is a compare-and-swap on `version`.

use async_trait::async_trait;
use shared::models::Order;
use surrealdb::Surreal;
use surrealdb::engine::local::Db;

use super::{BaseRepository, OrderStore, RepoError, RepoResult, Touched};

const TABLE: &str = "order";

#[derive(Clone)]
pub struct OrderRepository {
    base: BaseRepository,
}

impl OrderRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db, TABLE),
        }
    }
}

#[async_trait]
impl OrderStore for OrderRepository {
    async fn create(&self, order: Order) -> RepoResult<Order> {
        self.base.create(&order.id, &order).await?;
        Ok(order)
    }

    async fn find_by_id(&self, id: &str) -> RepoResult<Option<Order>> {
        self.base.find_by_id(id).await
    }

    async fn update_if_version(&self, order: Order, expected: u64) -> RepoResult<Order> {
        let mut result = self
            .base
            .db()
            .query(
                "UPDATE type::thing('order', $id) CONTENT $data \
                 WHERE version = $expected RETURN id",
            )
            .bind(("id", order.id.clone()))
            .bind(("data", BaseRepository::content(&order)?))
            .bind(("expected", expected))
            .await?;
        let touched: Vec<Touched> = result.take(0)?;
        if !touched.is_empty() {
            return Ok(order);
        }

        match self.find_by_id(&order.id).await? {
            Some(current) => Err(RepoError::Conflict(format!(
                "Order {} changed concurrently (expected version {}, found {})",
                order.id, expected, current.version
            ))),
            None => Err(RepoError::NotFound(format!("Order {} not found", order.id))),
        }
    }

    async fn find_by_buyer(&self, buyer_id: &str) -> RepoResult<Vec<Order>> {
        self.base
            .find_by_field("buyer_id", buyer_id, "created_at DESC")
            .await
    }

    async fn find_by_seller(&self, seller_id: &str) -> RepoResult<Vec<Order>> {
        self.base
            .find_by_field("seller_id", seller_id, "created_at DESC")
            .await
    }

    async fn references_file(&self, reference: &str) -> RepoResult<bool> {
        self.base
            .exists_where("delivery_files CONTAINS $value", reference)
            .await
    }
}
