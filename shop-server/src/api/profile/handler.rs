use axum::Json;
use axum::extract::State;
use shared::models::{Customer, CustomerUpdate};

use crate::api::extract;
use crate::auth::CurrentCustomer;
use crate::core::ServerState;
use crate::db::repository::{RepoError, customer};
use crate::utils::{ApiResponse, AppError, AppResult, ErrorCode, ok, validation};

/// GET /api/v1/profile
pub async fn get(
    State(state): State<ServerState>,
    current: CurrentCustomer,
) -> AppResult<Json<ApiResponse<Customer>>> {
    let customer = customer::find_by_id(&state.pool, current.id)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::CustomerNotFound))?;
    Ok(ok(customer))
}

/// PUT /api/v1/profile
pub async fn update(
    State(state): State<ServerState>,
    current: CurrentCustomer,
    extract::Json(payload): extract::Json<CustomerUpdate>,
) -> AppResult<Json<ApiResponse<Customer>>> {
    validation::validate_customer_update(&payload)?;
    let customer = customer::update(&state.pool, current.id, payload)
        .await
        .map_err(|e| match e {
            RepoError::NotFound(_) => AppError::new(ErrorCode::CustomerNotFound),
            other => other.into(),
        })?;
    tracing::info!(customer_id = current.id, "Profile updated");
    Ok(ok(customer))
}
