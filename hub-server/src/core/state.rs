use std::sync::Arc;

use crate::accounts::AccountService;
use crate::auth::JwtService;
use crate::catalog::CatalogService;
use crate::core::{Config, DatabaseBackend, MailBackend, Result};
use crate::db::{DbService, Stores};
use crate::messaging::MessagingLog;
use crate::notify::NotificationHub;
use crate::orders::OrderManager;
use crate::reviews::{RecomputeRating, ReviewLedger};
use crate::services::{FileStore, LocalFileStore, LogMailer, Mailer, SesMailer};

/// Server state, shared by every handler
///
/// Every field is a cheap handle; cloning the state clones the handles.
///
/// | Field | Type | Purpose |
/// |------|------|------|
/// | config | Config | configuration (immutable) |
/// | stores | Stores | user, gig, order, message, review and reset stores |
/// | jwt_service | Arc<JwtService> | token issue and validation |
/// | notifier | NotificationHub | per-order realtime rooms |
/// | mailer | Arc<dyn Mailer> | reset code delivery |
/// | files | Arc<dyn FileStore> | uploads |
/// | orders | OrderManager | order lifecycle |
/// | messaging | MessagingLog | per-order conversations |
/// | reviews | ReviewLedger | reviews and rating upkeep |
/// | catalog | CatalogService | gigs |
/// | accounts | AccountService | registration, login, password reset |
#[derive(Clone)]
pub struct ServerState {
    pub config: Config,
    pub stores: Stores,
    pub jwt_service: Arc<JwtService>,
    pub notifier: NotificationHub,
    pub mailer: Arc<dyn Mailer>,
    pub files: Arc<dyn FileStore>,
    pub orders: OrderManager,
    pub messaging: MessagingLog,
    pub reviews: ReviewLedger,
    pub catalog: CatalogService,
    pub accounts: AccountService,
}

impl std::fmt::Debug for ServerState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServerState")
            .field("config", &self.config)
            .field("notifier", &self.notifier)
            .finish_non_exhaustive()
    }
}

impl ServerState {
    /// Build the state from configuration
    ///
    /// Creates the work dir layout, opens the configured store backend and
    /// picks the mail sender.
    pub async fn initialize(config: &Config) -> Result<Self> {
        config.ensure_work_dir_structure()?;

        let stores = match config.database {
            DatabaseBackend::RocksDb => {
                let path = config.database_dir();
                tracing::info!(path = %path.display(), "Opening database");
                DbService::new(&path).await?.stores()
            }
            DatabaseBackend::Memory => {
                tracing::warn!("Using in-memory stores, data is lost on exit");
                Stores::memory()
            }
        };

        let mailer: Arc<dyn Mailer> = match config.mail_backend {
            MailBackend::Ses => Arc::new(
                SesMailer::from_env(config.mail_from.clone(), config.ses_region.as_deref()).await,
            ),
            MailBackend::Log => Arc::new(LogMailer),
        };

        Ok(Self::with_stores(config.clone(), stores, mailer))
    }

    /// Assemble the state around existing stores and mailer
    pub fn with_stores(config: Config, stores: Stores, mailer: Arc<dyn Mailer>) -> Self {
        let jwt_service = Arc::new(JwtService::with_config(config.jwt.clone()));
        let notifier = NotificationHub::new();
        let files: Arc<dyn FileStore> = Arc::new(LocalFileStore::new(
            config.uploads_dir(),
            config.upload_max_bytes,
            config.public_base_url.clone(),
        ));

        let orders = OrderManager::new(stores.clone(), notifier.clone());
        let messaging = MessagingLog::new(stores.clone(), notifier.clone());
        let reviews = ReviewLedger::new(
            stores.clone(),
            Arc::new(RecomputeRating::new(stores.clone())),
        );
        let catalog = CatalogService::new(stores.clone());
        let accounts = AccountService::new(
            stores.clone(),
            jwt_service.clone(),
            mailer.clone(),
            files.clone(),
            config.otp_ttl_minutes,
        );

        Self {
            config,
            stores,
            jwt_service,
            notifier,
            mailer,
            files,
            orders,
            messaging,
            reviews,
            catalog,
            accounts,
        }
    }

    pub fn get_jwt_service(&self) -> Arc<JwtService> {
        self.jwt_service.clone()
    }
}
