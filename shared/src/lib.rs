//! Shared types for the storefront
//!
//! Models, error codes and response envelopes used by the server crate and
//! by anything that talks to its HTTP API.

pub mod error;
pub mod models;
pub mod response;
pub mod util;

// Re-exports
pub use axum::Json;
pub use http;
pub use serde::{Deserialize, Serialize};

pub use error::{ApiResponse, AppError, AppResult, ErrorCode};
pub use response::{PageQuery, PaginatedResponse, Pagination};
