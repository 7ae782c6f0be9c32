//! User Repository

use async_trait::async_trait;
use shared::models::{User, UserRole};
use surrealdb::Surreal;
use surrealdb::engine::local::Db;

use super::{BaseRepository, RepoError, RepoResult, SELECT_WITH_ID, Touched, UserStore};

const TABLE: &str = "user";

#[derive(Clone)]
pub struct UserRepository {
    base: BaseRepository,
}

impl UserRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db, TABLE),
        }
    }
}

#[async_trait]
impl UserStore for UserRepository {
    async fn create(&self, user: User) -> RepoResult<User> {
        self.base.create(&user.id, &user).await.map_err(|e| match e {
            RepoError::Duplicate(_) => {
                RepoError::Duplicate(format!("Email '{}' already registered", user.email))
            }
            other => other,
        })?;
        Ok(user)
    }

    async fn find_by_id(&self, id: &str) -> RepoResult<Option<User>> {
        self.base.find_by_id(id).await
    }

    async fn find_by_email(&self, email: &str) -> RepoResult<Option<User>> {
        let mut result = self
            .base
            .db()
            .query(format!("{SELECT_WITH_ID} FROM user WHERE email = $email LIMIT 1"))
            .bind(("email", email.to_string()))
            .await?;
        let users: Vec<User> = result.take(0)?;
        Ok(users.into_iter().next())
    }

    async fn find_by_role(&self, role: UserRole) -> RepoResult<Vec<User>> {
        self.base
            .find_by_field("role", role.as_str(), "created_at DESC")
            .await
    }

    async fn update(&self, user: User) -> RepoResult<User> {
        self.base.replace(&user.id, &user).await?;
        Ok(user)
    }

    async fn set_rating(&self, id: &str, rating: f64) -> RepoResult<()> {
        let mut result = self
            .base
            .db()
            .query("UPDATE type::thing('user', $id) SET rating = $rating RETURN id")
            .bind(("id", id.to_string()))
            .bind(("rating", rating))
            .await?;
        let touched: Vec<Touched> = result.take(0)?;
        if touched.is_empty() {
            return Err(RepoError::NotFound(format!("User {} not found", id)));
        }
        Ok(())
    }

    async fn delete(&self, id: &str) -> RepoResult<bool> {
        self.base.delete(id).await
    }

    async fn references_file(&self, reference: &str) -> RepoResult<bool> {
        self.base.exists_where("profile_pic = $value", reference).await
    }
}
