//! Category API Handlers

use axum::Json;
use axum::extract::{Query, State};
use http::StatusCode;
use shared::models::{AveragePrice, Category, CategoryCreate, CategoryUpdate, Product};
use shared::response::{PageQuery, PaginatedResponse};

use crate::api::extract::{self, PathId};
use crate::core::ServerState;
use crate::db::repository::{RepoError, category};
use crate::utils::{ApiResponse, AppError, AppResult, ErrorCode, ok, validation};

/// Category-specific codes for the generic repository errors
fn category_error(err: RepoError) -> AppError {
    match err {
        RepoError::NotFound(msg) => AppError::with_message(ErrorCode::CategoryNotFound, msg),
        RepoError::Duplicate(msg) => AppError::with_message(ErrorCode::CategoryNameExists, msg),
        other => other.into(),
    }
}

/// POST /api/v1/categories
pub async fn create(
    State(state): State<ServerState>,
    extract::Json(payload): extract::Json<CategoryCreate>,
) -> AppResult<(StatusCode, Json<ApiResponse<Category>>)> {
    validation::validate_category_create(&payload)?;
    let category = category::create(&state.pool, payload)
        .await
        .map_err(category_error)?;
    tracing::info!(category_id = category.id, name = %category.name, "Category created");
    Ok((StatusCode::CREATED, ok(category)))
}

/// GET /api/v1/categories
pub async fn list_roots(
    State(state): State<ServerState>,
) -> AppResult<Json<ApiResponse<Vec<Category>>>> {
    let roots = category::find_roots(&state.pool)
        .await
        .map_err(category_error)?;
    Ok(ok(roots))
}

/// GET /api/v1/categories/{id}
pub async fn get_by_id(
    State(state): State<ServerState>,
    PathId(id): PathId,
) -> AppResult<Json<ApiResponse<Category>>> {
    let category = category::find_with_relations(&state.pool, id)
        .await
        .map_err(category_error)?;
    Ok(ok(category))
}

/// GET /api/v1/categories/{id}/products?page=&limit=
pub async fn list_products(
    State(state): State<ServerState>,
    PathId(id): PathId,
    Query(query): Query<PageQuery>,
) -> AppResult<Json<ApiResponse<PaginatedResponse<Product>>>> {
    let (products, total) = category::find_subtree_products(
        &state.pool,
        id,
        i64::from(query.limit()),
        query.offset(),
    )
    .await
    .map_err(category_error)?;
    Ok(ok(PaginatedResponse::new(products, query, total)))
}

/// GET /api/v1/categories/{id}/average-price
pub async fn average_price(
    State(state): State<ServerState>,
    PathId(id): PathId,
) -> AppResult<Json<ApiResponse<AveragePrice>>> {
    let average_price = category::average_price(&state.pool, id)
        .await
        .map_err(category_error)?;
    Ok(ok(AveragePrice { average_price }))
}

/// PUT /api/v1/categories/{id}
pub async fn update(
    State(state): State<ServerState>,
    PathId(id): PathId,
    extract::Json(payload): extract::Json<CategoryUpdate>,
) -> AppResult<Json<ApiResponse<Category>>> {
    validation::validate_category_update(&payload)?;
    let category = category::update(&state.pool, id, payload)
        .await
        .map_err(category_error)?;
    tracing::info!(category_id = id, "Category updated");
    Ok(ok(category))
}

/// DELETE /api/v1/categories/{id}
pub async fn delete(State(state): State<ServerState>, PathId(id): PathId) -> AppResult<StatusCode> {
    category::delete(&state.pool, id)
        .await
        .map_err(category_error)?;
    tracing::info!(category_id = id, "Category deleted");
    Ok(StatusCode::NO_CONTENT)
}
