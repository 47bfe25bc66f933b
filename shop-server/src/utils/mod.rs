//! Utility modules: logging setup, money arithmetic, input validation

pub mod logger;
pub mod money;
pub mod validation;

use axum::Json;
use serde::Serialize;

pub use shared::error::{ApiResponse, AppError, AppResult, ErrorCode};

/// Wrap data in the success envelope
pub fn ok<T: Serialize>(data: T) -> Json<ApiResponse<T>> {
    Json(ApiResponse::success(data))
}
