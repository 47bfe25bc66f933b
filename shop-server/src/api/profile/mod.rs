//! Profile API
//!
//! | Path | Method | Description |
//! |------|--------|-------------|
//! | /api/v1/profile | GET | the authenticated customer |
//! | /api/v1/profile | PUT | update names, phone, address |

mod handler;

use axum::Router;
use axum::routing::get;

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().route("/profile", get(handler::get).put(handler::update))
}
