use std::path::PathBuf;
use std::str::FromStr;

use crate::auth::JwtConfig;
use crate::core::ServerError;

/// Store backend
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DatabaseBackend {
    /// Embedded SurrealDB on RocksDB under `WORK_DIR/database`
    RocksDb,
    /// Process memory, lost on exit
    Memory,
}

impl FromStr for DatabaseBackend {
    type Err = ServerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "rocksdb" => Ok(DatabaseBackend::RocksDb),
            "memory" => Ok(DatabaseBackend::Memory),
            other => Err(ServerError::Config(format!(
                "DATABASE must be 'rocksdb' or 'memory', got '{other}'"
            ))),
        }
    }
}

/// Mail sender
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MailBackend {
    /// Write messages to the log
    Log,
    /// AWS SES v2
    Ses,
}

impl FromStr for MailBackend {
    type Err = ServerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "log" => Ok(MailBackend::Log),
            "ses" => Ok(MailBackend::Ses),
            other => Err(ServerError::Config(format!(
                "MAIL_BACKEND must be 'log' or 'ses', got '{other}'"
            ))),
        }
    }
}

/// Server configuration
///
/// # Environment variables
///
/// | Variable | Default | Meaning |
/// |----------|---------|---------|
/// | WORK_DIR | ./data | database, uploads |
/// | HTTP_PORT | 5000 | listen port |
/// | DATABASE | rocksdb | `rocksdb` or `memory` |
/// | ENVIRONMENT | development | development / production |
/// | JWT_SECRET | generated in development | ≥ 32 chars |
/// | JWT_EXPIRATION_MINUTES | 10080 | token lifetime |
/// | JWT_ISSUER / JWT_AUDIENCE | freelancehub / freelancehub-clients | claims |
/// | MAIL_BACKEND | log | `log` or `ses` |
/// | MAIL_FROM | no-reply@freelancehub.local | sender address |
/// | SES_REGION | AWS default | SES region override |
/// | UPLOAD_MAX_BYTES | 5242880 | upload size limit |
/// | OTP_TTL_MINUTES | 10 | password reset code lifetime |
/// | PUBLIC_BASE_URL | empty | prefix for file references |
///
/// # Example
///
/// ```ignore
/// WORK_DIR=/srv/hub HTTP_PORT=8080 DATABASE=memory cargo run
/// ```
#[derive(Debug, Clone)]
pub struct Config {
    /// Working directory holding the database and uploads
    pub work_dir: String,
    pub http_port: u16,
    pub database: DatabaseBackend,
    /// development | production
    pub environment: String,
    pub jwt: JwtConfig,
    pub mail_backend: MailBackend,
    pub mail_from: String,
    pub ses_region: Option<String>,
    pub upload_max_bytes: usize,
    pub otp_ttl_minutes: i64,
    /// Prepended to `/api/files/{name}` in stored references
    pub public_base_url: String,
}

fn env_or<T: FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

impl Config {
    /// Load configuration from the environment
    ///
    /// Unset variables take their defaults; malformed backend names and a
    /// missing production JWT secret are errors.
    pub fn from_env() -> Result<Self, ServerError> {
        let environment = std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".into());
        let production = environment == "production";

        Ok(Self {
            work_dir: std::env::var("WORK_DIR").unwrap_or_else(|_| "./data".into()),
            http_port: env_or("HTTP_PORT", 5000),
            database: std::env::var("DATABASE")
                .map(|v| v.parse())
                .unwrap_or(Ok(DatabaseBackend::RocksDb))?,
            jwt: JwtConfig::from_env(production)?,
            environment,
            mail_backend: std::env::var("MAIL_BACKEND")
                .map(|v| v.parse())
                .unwrap_or(Ok(MailBackend::Log))?,
            mail_from: std::env::var("MAIL_FROM")
                .unwrap_or_else(|_| "no-reply@freelancehub.local".into()),
            ses_region: std::env::var("SES_REGION").ok().filter(|r| !r.is_empty()),
            upload_max_bytes: env_or("UPLOAD_MAX_BYTES", 5 * 1024 * 1024),
            otp_ttl_minutes: env_or("OTP_TTL_MINUTES", 10),
            public_base_url: std::env::var("PUBLIC_BASE_URL")
                .unwrap_or_default()
                .trim_end_matches('/')
                .to_string(),
        })
    }

    /// In-memory configuration rooted at `work_dir`
    ///
    /// Used by tests and local tooling: memory store, log mailer, fixed secret.
    pub fn in_memory(work_dir: impl Into<String>) -> Self {
        Self {
            work_dir: work_dir.into(),
            http_port: 0,
            database: DatabaseBackend::Memory,
            environment: "test".into(),
            jwt: JwtConfig::with_secret("in-memory-secret-for-tests-0123456789"),
            mail_backend: MailBackend::Log,
            mail_from: "no-reply@freelancehub.local".into(),
            ses_region: None,
            upload_max_bytes: 5 * 1024 * 1024,
            otp_ttl_minutes: 10,
            public_base_url: String::new(),
        }
    }

    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }

    pub fn database_dir(&self) -> PathBuf {
        PathBuf::from(&self.work_dir).join("database")
    }

    pub fn uploads_dir(&self) -> PathBuf {
        PathBuf::from(&self.work_dir).join("uploads")
    }

    /// Create the working directory layout
    pub fn ensure_work_dir_structure(&self) -> std::io::Result<()> {
        std::fs::create_dir_all(self.uploads_dir())?;
        if self.database == DatabaseBackend::RocksDb {
            std::fs::create_dir_all(self.database_dir())?;
        }
        Ok(())
    }
}
