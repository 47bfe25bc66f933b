//! Unified error system for the storefront API
//!
//! - [`ErrorCode`]: numeric codes grouped by domain
//! - [`ErrorCategory`]: classification of codes by range
//! - [`AppError`]: error carrying a code, a message and optional details
//! - [`ApiResponse`]: the JSON envelope every endpoint returns
//!
//! # Example
//!
//! ```
//! use shared::error::{AppError, ErrorCode, ApiResponse};
//!
//! let err = AppError::with_message(ErrorCode::CategoryNotFound, "Category 7 not found")
//!     .with_detail("id", 7);
//! assert_eq!(err.http_status(), shared::http::StatusCode::NOT_FOUND);
//!
//! let body = ApiResponse::<()>::error(&err);
//! assert_eq!(body.code, Some(6101));
//! ```

mod category;
mod codes;
mod http;
mod types;

pub use category::ErrorCategory;
pub use codes::{ErrorCode, InvalidErrorCode};
pub use types::{ApiResponse, AppError, AppResult};
