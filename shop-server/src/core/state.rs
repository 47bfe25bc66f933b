use std::sync::Arc;
use std::time::Duration;

use aws_sdk_sesv2::Client as SesClient;
use sqlx::SqlitePool;

use crate::auth::{IdentityVerifier, JwtService, OidcVerifier};
use crate::core::Config;
use crate::db::DbService;
use crate::notify::{NotificationService, Notifier};
use crate::services::OrderService;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Shared handles for every request handler
///
/// | Field | Description |
/// |-------|-------------|
/// | config | immutable configuration |
/// | pool | SQLite pool, repositories borrow it |
/// | jwt_service | session token issue/verify |
/// | identity | external identity provider |
/// | orders | order assembly service (owns the notifier) |
#[derive(Clone)]
pub struct ServerState {
    pub config: Arc<Config>,
    pub pool: SqlitePool,
    pub jwt_service: Arc<JwtService>,
    pub identity: Arc<dyn IdentityVerifier>,
    pub orders: OrderService,
}

impl ServerState {
    /// Assemble state from already-built capabilities
    ///
    /// Tests use this with in-memory pools and fake capabilities.
    pub fn new(
        config: Config,
        pool: SqlitePool,
        notifier: Arc<dyn Notifier>,
        identity: Arc<dyn IdentityVerifier>,
    ) -> Self {
        let jwt_service = Arc::new(JwtService::with_config(config.jwt.clone()));
        Self {
            orders: OrderService::new(pool.clone(), notifier),
            config: Arc::new(config),
            pool,
            jwt_service,
            identity,
        }
    }

    /// Open the database and build the production capabilities
    pub async fn initialize(config: Config) -> Result<Self, BoxError> {
        let db = DbService::new(&config.database_url).await?;

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()?;

        let ses = if config.ses_from_email.is_some() {
            Some(Self::ses_client().await)
        } else {
            None
        };

        let notifier = Arc::new(NotificationService::new(&config, http.clone(), ses));
        let identity = Arc::new(OidcVerifier::new(http, &config));

        Ok(Self::new(config, db.pool, notifier, identity))
    }

    async fn ses_client() -> SesClient {
        let aws_config = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;
        if let Ok(ses_region) = std::env::var("SES_REGION") {
            let ses_config = aws_config
                .to_builder()
                .region(aws_config::Region::new(ses_region))
                .build();
            SesClient::new(&ses_config)
        } else {
            SesClient::new(&aws_config)
        }
    }

    pub fn get_jwt_service(&self) -> &JwtService {
        &self.jwt_service
    }
}
