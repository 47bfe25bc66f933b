//! Product API Handlers

use axum::Json;
use axum::extract::{Query, State};
use http::StatusCode;
use shared::models::{Product, ProductCreate, ProductUpdate};
use shared::response::{PageQuery, PaginatedResponse};

use crate::api::extract::{self, PathId};
use crate::core::ServerState;
use crate::db::repository::{RepoError, product};
use crate::utils::{ApiResponse, AppError, AppResult, ErrorCode, ok, validation};

/// Product-specific codes for the generic repository errors
fn product_error(err: RepoError) -> AppError {
    match err {
        RepoError::NotFound(msg) => AppError::with_message(ErrorCode::ProductNotFound, msg),
        RepoError::Duplicate(msg) => AppError::with_message(ErrorCode::ProductSkuExists, msg),
        other => other.into(),
    }
}

/// POST /api/v1/products
pub async fn create(
    State(state): State<ServerState>,
    extract::Json(payload): extract::Json<ProductCreate>,
) -> AppResult<(StatusCode, Json<ApiResponse<Product>>)> {
    validation::validate_product_create(&payload)?;
    let product = product::create(&state.pool, payload)
        .await
        .map_err(product_error)?;
    tracing::info!(product_id = product.id, sku = %product.sku, "Product created");
    Ok((StatusCode::CREATED, ok(product)))
}

/// GET /api/v1/products?page=&limit=
pub async fn list(
    State(state): State<ServerState>,
    Query(query): Query<PageQuery>,
) -> AppResult<Json<ApiResponse<PaginatedResponse<Product>>>> {
    let items = product::find_page(&state.pool, i64::from(query.limit()), query.offset()).await?;
    let total = product::count(&state.pool).await?;
    Ok(ok(PaginatedResponse::new(items, query, total)))
}

/// GET /api/v1/products/{id}
pub async fn get_by_id(
    State(state): State<ServerState>,
    PathId(id): PathId,
) -> AppResult<Json<ApiResponse<Product>>> {
    let product = product::find_by_id(&state.pool, id).await?.ok_or_else(|| {
        AppError::with_message(ErrorCode::ProductNotFound, format!("Product {id} not found"))
    })?;
    Ok(ok(product))
}

/// PUT /api/v1/products/{id}
pub async fn update(
    State(state): State<ServerState>,
    PathId(id): PathId,
    extract::Json(payload): extract::Json<ProductUpdate>,
) -> AppResult<Json<ApiResponse<Product>>> {
    validation::validate_product_update(&payload)?;
    let product = product::update(&state.pool, id, payload)
        .await
        .map_err(product_error)?;
    tracing::info!(product_id = id, "Product updated");
    Ok(ok(product))
}

/// DELETE /api/v1/products/{id}
pub async fn delete(State(state): State<ServerState>, PathId(id): PathId) -> AppResult<StatusCode> {
    product::delete(&state.pool, id)
        .await
        .map_err(product_error)?;
    tracing::info!(product_id = id, "Product deleted");
    Ok(StatusCode::NO_CONTENT)
}
