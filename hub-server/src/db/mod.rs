//! Database Module
//!
//! Embedded SurrealDB (RocksDB) connection, schema and stores.

pub mod memory;
pub mod models;
pub mod repository;

pub use repository::{RepoError, RepoResult, Stores};

use std::path::Path;

use surrealdb::Surreal;
use surrealdb::engine::local::{Db, RocksDb};

/// Namespace / database used by the server
pub const NAMESPACE: &str = "freelancehub";
pub const DATABASE: &str = "main";

/// Tables and indexes, applied idempotently on every start
const SCHEMA: &str = r#"
DEFINE TABLE IF NOT EXISTS user SCHEMALESS;
DEFINE INDEX IF NOT EXISTS user_email ON user FIELDS email UNIQUE;
DEFINE INDEX IF NOT EXISTS user_role ON user FIELDS role;

DEFINE TABLE IF NOT EXISTS gig SCHEMALESS;
DEFINE INDEX IF NOT EXISTS gig_owner ON gig FIELDS owner_id, created_at;

DEFINE TABLE IF NOT EXISTS order SCHEMALESS;
DEFINE INDEX IF NOT EXISTS order_buyer ON order FIELDS buyer_id, created_at;
DEFINE INDEX IF NOT EXISTS order_seller ON order FIELDS seller_id, created_at;

DEFINE TABLE IF NOT EXISTS message SCHEMALESS;
DEFINE INDEX IF NOT EXISTS message_order ON message FIELDS order_id, created_at;

DEFINE TABLE IF NOT EXISTS review SCHEMALESS;
DEFINE INDEX IF NOT EXISTS review_order ON review FIELDS order_id UNIQUE;
DEFINE INDEX IF NOT EXISTS review_gig ON review FIELDS gig_id, created_at;
DEFINE INDEX IF NOT EXISTS review_reviewed_user ON review FIELDS reviewed_user_id, created_at;

DEFINE TABLE IF NOT EXISTS password_reset SCHEMALESS;
DEFINE INDEX IF NOT EXISTS password_reset_email ON password_reset FIELDS email UNIQUE;
"#;

/// Database service, owns the embedded SurrealDB handle
#[derive(Clone)]
pub struct DbService {
    pub db: Surreal<Db>,
}

impl DbService {
    /// Open (or create) a RocksDB database at `path` and apply the schema
    pub async fn new(path: impl AsRef<Path>) -> Result<Self, surrealdb::Error> {
        let db: Surreal<Db> = Surreal::new::<RocksDb>(path.as_ref()).await?;
        Self::prepare(db).await
    }

    async fn prepare(db: Surreal<Db>) -> Result<Self, surrealdb::Error> {
        db.use_ns(NAMESPACE).use_db(DATABASE).await?;
        db.query(SCHEMA).await?.check()?;
        tracing::info!("Database connection established (SurrealDB, schema applied)");
        Ok(Self { db })
    }

    pub fn stores(&self) -> Stores {
        Stores::surreal(self.db.clone())
    }
}
