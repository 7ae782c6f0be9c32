//! Gig Repository

use async_trait::async_trait;
use shared::models::Gig;
use surrealdb::Surreal;
use surrealdb::engine::local::Db;

use super::{BaseRepository, GigStore, RepoResult, SELECT_WITH_ID};

const TABLE: &str = "gig";

#[derive(Clone)]
pub struct GigRepository {
    base: BaseRepository,
}

impl GigRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db, TABLE),
        }
    }
}

#[async_trait]
impl GigStore for GigRepository {
    async fn create(&self, gig: Gig) -> RepoResult<Gig> {
        self.base.create(&gig.id, &gig).await?;
        Ok(gig)
    }

    async fn find_by_id(&self, id: &str) -> RepoResult<Option<Gig>> {
        self.base.find_by_id(id).await
    }

    async fn find_all(&self) -> RepoResult<Vec<Gig>> {
        let gigs: Vec<Gig> = self
            .base
            .db()
            .query(format!("{SELECT_WITH_ID} FROM gig ORDER BY created_at DESC"))
            .await?
            .take(0)?;
        Ok(gigs)
    }

    async fn find_by_owner(&self, owner_id: &str) -> RepoResult<Vec<Gig>> {
        self.base
            .find_by_field("owner_id", owner_id, "created_at DESC")
            .await
    }

    async fn update(&self, gig: Gig) -> RepoResult<Gig> {
        self.base.replace(&gig.id, &gig).await?;
        Ok(gig)
    }

    async fn delete(&self, id: &str) -> RepoResult<bool> {
        self.base.delete(id).await
    }

    async fn references_file(&self, reference: &str) -> RepoResult<bool> {
        self.base
            .exists_where("thumbnail = $value OR images CONTAINS $value", reference)
            .await
    }
}
