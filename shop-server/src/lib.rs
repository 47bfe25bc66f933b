//! Shop Server - storefront backend
//!
//! Customers log in through an external identity provider, browse a
//! two-level category tree of products, and place orders whose prices are
//! frozen at checkout. Order confirmations and status changes go out by SMS
//! and email.
//!
//! # Module layout
//!
//! ```text
//! shop-server/src/
//! ├── core/       # config, shared state, server lifecycle
//! ├── auth/       # identity provider, session tokens, middleware
//! ├── api/        # HTTP routes and handlers
//! ├── services/   # order assembly
//! ├── notify/     # SMS + email notifications
//! ├── db/         # SQLite pool and repositories
//! └── utils/      # logging, money, validation
//! ```

pub mod api;
pub mod auth;
pub mod core;
pub mod db;
pub mod notify;
pub mod services;
pub mod utils;

pub use auth::{CurrentCustomer, JwtService};
pub use core::{Config, Server, ServerState};
pub use utils::{ApiResponse, AppError, AppResult, ErrorCode};

pub use utils::logger::{init_logger, init_logger_with_file};

// Security event logging under the `security` target
#[macro_export]
macro_rules! security_log {
    ($level:expr, $event:expr, $($key:ident = $value:expr),*) => {
        tracing::info!(
            target: "security",
            level = $level,
            event = $event,
            $($key = $value),*
        );
    };
}

/// Load `.env`, read the configuration and install the logger
pub fn setup_environment() -> Result<Config, Box<dyn std::error::Error + Send + Sync>> {
    // a missing .env file is fine
    let _ = dotenvy::dotenv();

    let config = Config::from_env()?;
    init_logger_with_file(
        Some(&config.log_level),
        config.log_json,
        config.log_dir.as_deref(),
    );
    Ok(config)
}
