//! Order API
//!
//! | Path | Method | Description |
//! |------|--------|-------------|
//! | /api/v1/orders | POST | place an order for the caller |
//! | /api/v1/orders | GET | the caller's orders, newest first |
//! | /api/v1/orders/{id} | GET | one of the caller's orders |
//! | /api/v1/orders/{id}/status | PUT | overwrite the status |

mod handler;

use axum::Router;
use axum::routing::{get, put};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/orders", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/", get(handler::list).post(handler::create))
        .route("/{id}", get(handler::get_by_id))
        .route("/{id}/status", put(handler::update_status))
}
