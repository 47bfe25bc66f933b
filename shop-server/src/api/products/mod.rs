//! Product API
//!
//! | Path | Method | Description |
//! |------|--------|-------------|
//! | /api/v1/products | POST | create |
//! | /api/v1/products | GET | paginated list |
//! | /api/v1/products/{id} | GET | single product |
//! | /api/v1/products/{id} | PUT | partial update |
//! | /api/v1/products/{id} | DELETE | delete when no order references it |

mod handler;

use axum::Router;
use axum::routing::get;

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/products", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/", get(handler::list).post(handler::create))
        .route(
            "/{id}",
            get(handler::get_by_id)
                .put(handler::update)
                .delete(handler::delete),
        )
}
