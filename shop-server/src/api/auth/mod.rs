//! Login API
//!
//! | Path | Method | Description |
//! |------|--------|-------------|
//! | /auth/login | GET | redirect to the identity provider |
//! | /auth/callback | GET | finish login, returns a session token |

mod handler;

use axum::Router;
use axum::routing::get;

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new()
        .route("/auth/login", get(handler::login))
        .route("/auth/callback", get(handler::callback))
}
