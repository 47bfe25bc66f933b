//! Category API
//!
//! | Path | Method | Description |
//! |------|--------|-------------|
//! | /api/v1/categories | POST | create |
//! | /api/v1/categories | GET | root categories with their children |
//! | /api/v1/categories/{id} | GET | category with children and products |
//! | /api/v1/categories/{id} | PUT | rename / move |
//! | /api/v1/categories/{id} | DELETE | delete an empty leaf |
//! | /api/v1/categories/{id}/products | GET | products of the category and its direct children |
//! | /api/v1/categories/{id}/average-price | GET | mean price over the same set |

mod handler;

use axum::Router;
use axum::routing::get;

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/categories", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/", get(handler::list_roots).post(handler::create))
        .route(
            "/{id}",
            get(handler::get_by_id)
                .put(handler::update)
                .delete(handler::delete),
        )
        .route("/{id}/products", get(handler::list_products))
        .route("/{id}/average-price", get(handler::average_price))
}
