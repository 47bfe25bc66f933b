//! Order API Handlers

use axum::Json;
use axum::extract::{Query, State};
use http::StatusCode;
use shared::models::{Order, OrderCreate, OrderStatusUpdate};
use shared::response::{PageQuery, PaginatedResponse};

use crate::api::extract::{self, PathId};
use crate::auth::CurrentCustomer;
use crate::core::ServerState;
use crate::utils::{ApiResponse, AppResult, ok};

/// POST /api/v1/orders
pub async fn create(
    State(state): State<ServerState>,
    current: CurrentCustomer,
    extract::Json(payload): extract::Json<OrderCreate>,
) -> AppResult<(StatusCode, Json<ApiResponse<Order>>)> {
    let order = state.orders.create_order(current.id, &payload.items).await?;
    Ok((StatusCode::CREATED, ok(order)))
}

/// GET /api/v1/orders?page=&limit=
pub async fn list(
    State(state): State<ServerState>,
    current: CurrentCustomer,
    Query(query): Query<PageQuery>,
) -> AppResult<Json<ApiResponse<PaginatedResponse<Order>>>> {
    let page = state.orders.list_orders(current.id, query).await?;
    Ok(ok(page))
}

/// GET /api/v1/orders/{id}
pub async fn get_by_id(
    State(state): State<ServerState>,
    current: CurrentCustomer,
    PathId(id): PathId,
) -> AppResult<Json<ApiResponse<Order>>> {
    let order = state.orders.get_order(current.id, id).await?;
    Ok(ok(order))
}

/// PUT /api/v1/orders/{id}/status
pub async fn update_status(
    State(state): State<ServerState>,
    current: CurrentCustomer,
    PathId(id): PathId,
    extract::Json(payload): extract::Json<OrderStatusUpdate>,
) -> AppResult<Json<ApiResponse<Order>>> {
    tracing::debug!(order_id = id, customer_id = current.id, status = %payload.status, "Status change requested");
    let order = state.orders.update_status(id, payload.status).await?;
    Ok(ok(order))
}
