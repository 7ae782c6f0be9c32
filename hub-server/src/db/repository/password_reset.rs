//! Password Reset Repository
//!
//! Records are keyed by the normalized email, so re-requesting a code
//! replaces the previous one.

use async_trait::async_trait;
use surrealdb::Surreal;
use surrealdb::engine::local::Db;

use super::{BaseRepository, PasswordResetStore, RepoError, RepoResult};
use crate::db::models::PasswordReset;

const TABLE: &str = "password_reset";

#[derive(Clone)]
pub struct PasswordResetRepository {
    base: BaseRepository,
}

impl PasswordResetRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db, TABLE),
        }
    }
}

#[derive(serde::Deserialize)]
struct Attempts {
    attempts: u32,
}

#[async_trait]
impl PasswordResetStore for PasswordResetRepository {
    async fn upsert(&self, reset: PasswordReset) -> RepoResult<()> {
        self.base
            .db()
            .query("UPSERT type::thing('password_reset', $email) CONTENT $data RETURN NONE")
            .bind(("email", reset.email.clone()))
            .bind(("data", BaseRepository::content(&reset)?))
            .await?
            .check()?;
        Ok(())
    }

    async fn find(&self, email: &str) -> RepoResult<Option<PasswordReset>> {
        let mut result = self
            .base
            .db()
            .query("SELECT email, code_hash, expires_at, attempts, created_at FROM type::thing('password_reset', $email)")
            .bind(("email", email.to_string()))
            .await?;
        let rows: Vec<PasswordReset> = result.take(0)?;
        Ok(rows.into_iter().next())
    }

    async fn increment_attempts(&self, email: &str) -> RepoResult<u32> {
        let mut result = self
            .base
            .db()
            .query("UPDATE type::thing('password_reset', $email) SET attempts += 1 RETURN attempts")
            .bind(("email", email.to_string()))
            .await?;
        let rows: Vec<Attempts> = result.take(0)?;
        rows.into_iter()
            .next()
            .map(|r| r.attempts)
            .ok_or_else(|| RepoError::NotFound(format!("No reset pending for {}", email)))
    }

    async fn delete(&self, email: &str) -> RepoResult<bool> {
        self.base.delete(email).await
    }
}
