use std::str::FromStr;
use std::time::Duration;

use crate::auth::JwtConfig;
use crate::auth::jwt::MIN_SECRET_LEN;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Server configuration
///
/// # Environment variables
///
/// | Variable | Default | Description |
/// |----------|---------|-------------|
/// | ENVIRONMENT | development | development / staging / production |
/// | HTTP_PORT | 8080 | HTTP listen port |
/// | DATABASE_URL | shop.db | SQLite file path |
/// | JWT_SECRET | dev value | session token secret (required outside development) |
/// | JWT_EXPIRATION_MINUTES | 1440 | session token lifetime |
/// | JWT_ISSUER / JWT_AUDIENCE | shop-server / shop-clients | session token claims |
/// | OAUTH_PROVIDER_URL | https://accounts.google.com | OIDC issuer |
/// | OAUTH_CLIENT_ID / OAUTH_CLIENT_SECRET | - | OIDC client (secret required outside development) |
/// | OAUTH_REDIRECT_URL | http://localhost:8080/auth/callback | OIDC redirect |
/// | SES_FROM_EMAIL | - | sender address, email disabled when unset |
/// | SES_REGION | AWS default | SES region override |
/// | ADMIN_EMAIL | - | receives new-order emails |
/// | CURRENCY | KES | currency label in messages |
/// | AFRICA_TALKING_API_KEY / AFRICA_TALKING_USERNAME | - | SMS credentials, SMS disabled when unset |
/// | SMS_SENDER_ID | - | optional SMS sender id |
/// | NOTIFY_TIMEOUT_MS | 5000 | per-channel notification timeout |
/// | REQUEST_TIMEOUT_MS | 30000 | HTTP request timeout |
/// | LOG_LEVEL | info | log level when RUST_LOG is unset |
/// | LOG_JSON | false | JSON log output |
/// | LOG_DIR | - | daily rolling log files |
#[derive(Debug, Clone)]
pub struct Config {
    pub environment: String,
    pub http_port: u16,
    pub database_url: String,
    pub request_timeout_ms: u64,
    pub jwt: JwtConfig,

    // === Identity provider ===
    pub oauth_provider_url: String,
    pub oauth_client_id: String,
    pub oauth_client_secret: String,
    pub oauth_redirect_url: String,

    // === Notifications ===
    pub ses_from_email: Option<String>,
    pub admin_email: Option<String>,
    pub currency: String,
    pub africa_talking_api_key: Option<String>,
    pub africa_talking_username: Option<String>,
    pub sms_sender_id: Option<String>,
    pub notify_timeout_ms: u64,

    // === Logging ===
    pub log_level: String,
    pub log_json: bool,
    pub log_dir: Option<String>,
}

impl Config {
    /// Load configuration from the environment
    ///
    /// Secrets fall back to development placeholders only when
    /// `ENVIRONMENT=development`.
    pub fn from_env() -> Result<Self, BoxError> {
        let defaults = Self::default();
        let environment =
            std::env::var("ENVIRONMENT").unwrap_or_else(|_| defaults.environment.clone());

        let jwt_secret = Self::require_secret("JWT_SECRET", &environment)?;
        if environment != "development" && jwt_secret.len() < MIN_SECRET_LEN {
            return Err(format!("JWT_SECRET must be at least {MIN_SECRET_LEN} bytes").into());
        }

        Ok(Self {
            http_port: env_or("HTTP_PORT", defaults.http_port),
            database_url: std::env::var("DATABASE_URL").unwrap_or(defaults.database_url),
            request_timeout_ms: env_or("REQUEST_TIMEOUT_MS", defaults.request_timeout_ms),
            jwt: JwtConfig {
                secret: jwt_secret,
                expiration_minutes: env_or(
                    "JWT_EXPIRATION_MINUTES",
                    defaults.jwt.expiration_minutes,
                ),
                issuer: std::env::var("JWT_ISSUER").unwrap_or(defaults.jwt.issuer),
                audience: std::env::var("JWT_AUDIENCE").unwrap_or(defaults.jwt.audience),
            },

            oauth_provider_url: std::env::var("OAUTH_PROVIDER_URL")
                .unwrap_or(defaults.oauth_provider_url),
            oauth_client_id: std::env::var("OAUTH_CLIENT_ID").unwrap_or_default(),
            oauth_client_secret: Self::require_secret("OAUTH_CLIENT_SECRET", &environment)?,
            oauth_redirect_url: std::env::var("OAUTH_REDIRECT_URL")
                .unwrap_or(defaults.oauth_redirect_url),

            ses_from_email: env_opt("SES_FROM_EMAIL"),
            admin_email: env_opt("ADMIN_EMAIL"),
            currency: std::env::var("CURRENCY").unwrap_or(defaults.currency),
            africa_talking_api_key: env_opt("AFRICA_TALKING_API_KEY"),
            africa_talking_username: env_opt("AFRICA_TALKING_USERNAME"),
            sms_sender_id: env_opt("SMS_SENDER_ID"),
            notify_timeout_ms: env_or("NOTIFY_TIMEOUT_MS", defaults.notify_timeout_ms),

            log_level: std::env::var("LOG_LEVEL").unwrap_or(defaults.log_level),
            log_json: env_or("LOG_JSON", defaults.log_json),
            log_dir: env_opt("LOG_DIR"),
            environment,
        })
    }

    fn require_secret(name: &str, environment: &str) -> Result<String, BoxError> {
        let val = match std::env::var(name) {
            Ok(v) => v,
            Err(_) => {
                if environment != "development" {
                    return Err(format!("{name} must be set in {environment} environment").into());
                }
                format!("dev-{name}-not-for-production")
            }
        };
        if val.is_empty() && environment != "development" {
            return Err(format!("{name} must not be empty in {environment} environment").into());
        }
        Ok(val)
    }

    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    pub fn notify_timeout(&self) -> Duration {
        Duration::from_millis(self.notify_timeout_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}

/// Development defaults, no environment lookups
impl Default for Config {
    fn default() -> Self {
        Self {
            environment: "development".into(),
            http_port: 8080,
            database_url: "shop.db".into(),
            request_timeout_ms: 30_000,
            jwt: JwtConfig::default(),
            oauth_provider_url: "https://accounts.google.com".into(),
            oauth_client_id: String::new(),
            oauth_client_secret: "dev-OAUTH_CLIENT_SECRET-not-for-production".into(),
            oauth_redirect_url: "http://localhost:8080/auth/callback".into(),
            ses_from_email: None,
            admin_email: None,
            currency: "KES".into(),
            africa_talking_api_key: None,
            africa_talking_username: None,
            sms_sender_id: None,
            notify_timeout_ms: 5_000,
            log_level: "info".into(),
            log_json: false,
            log_dir: None,
        }
    }
}

fn env_or<T: FromStr>(name: &str, default: T) -> T {
    std::env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

/// Unset and empty both mean "not configured"
fn env_opt(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}
