//! HTTP API
//!
//! - [`health`] - liveness
//! - [`auth`] - login through the identity provider
//! - [`profile`] - the authenticated customer
//! - [`categories`] - category tree and subtree queries
//! - [`products`] - product catalog
//! - [`orders`] - order placement and lookup
//!
//! Everything under `/api/v1` requires a session token.

pub mod extract;

pub mod auth;
pub mod categories;
pub mod health;
pub mod orders;
pub mod products;
pub mod profile;

use std::time::Duration;

use axum::Router;
use axum::middleware;
use http::header::{AUTHORIZATION, CONTENT_TYPE, ORIGIN};
use http::{HeaderName, HeaderValue, Method, StatusCode};
use tower_http::cors::{Any, CorsLayer};
use tower_http::request_id::{
    MakeRequestId, PropagateRequestIdLayer, RequestId, SetRequestIdLayer,
};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use uuid::Uuid;

use crate::auth::require_auth;
use crate::core::ServerState;

const REQUEST_ID_HEADER: &str = "x-request-id";

#[derive(Clone)]
struct XRequestId;

impl MakeRequestId for XRequestId {
    fn make_request_id<B>(&mut self, _request: &http::Request<B>) -> Option<RequestId> {
        HeaderValue::from_str(&Uuid::new_v4().to_string())
            .ok()
            .map(RequestId::new)
    }
}

/// Routes that require a session token, mounted under `/api/v1`
fn protected_routes() -> Router<ServerState> {
    Router::new()
        .merge(profile::router())
        .merge(categories::router())
        .merge(products::router())
        .merge(orders::router())
}

/// Requests running past `timeout` are answered with 408
fn timeout_layer(timeout: Duration) -> TimeoutLayer {
    TimeoutLayer::with_status_code(StatusCode::REQUEST_TIMEOUT, timeout)
}

/// All routes, without state or middleware
pub fn build_router(state: &ServerState) -> Router<ServerState> {
    let api = protected_routes().route_layer(middleware::from_fn_with_state(
        state.clone(),
        require_auth,
    ));

    Router::new()
        .merge(health::router())
        .merge(auth::router())
        .nest("/api/v1", api)
}

/// Fully layered application; call `.with_state(state)` to serve it
pub fn build_app(state: &ServerState) -> Router<ServerState> {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([ORIGIN, CONTENT_TYPE, AUTHORIZATION]);

    build_router(state)
        .layer(timeout_layer(state.config.request_timeout()))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .layer(PropagateRequestIdLayer::new(HeaderName::from_static(
            REQUEST_ID_HEADER,
        )))
        .layer(SetRequestIdLayer::new(
            HeaderName::from_static(REQUEST_ID_HEADER),
            XRequestId,
        ))
}
