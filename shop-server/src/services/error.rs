//! Service-layer error type
//!
//! `ServiceError` sits between repository errors and the API-layer
//! [`AppError`], so services can use `?` on both.

use axum::response::IntoResponse;
use shared::error::{AppError, ErrorCode};

use crate::db::repository::RepoError;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// - `Db`: storage or infrastructure failure (logged, mapped to `DatabaseError`)
/// - `App`: business-rule error passed through to the client unchanged
#[derive(Debug)]
pub enum ServiceError {
    Db(BoxError),
    App(AppError),
}

impl From<sqlx::Error> for ServiceError {
    fn from(e: sqlx::Error) -> Self {
        ServiceError::Db(e.into())
    }
}

impl From<RepoError> for ServiceError {
    fn from(e: RepoError) -> Self {
        match e {
            RepoError::Database(msg) => ServiceError::Db(msg.into()),
            other => ServiceError::App(other.into()),
        }
    }
}

impl From<AppError> for ServiceError {
    fn from(e: AppError) -> Self {
        ServiceError::App(e)
    }
}

impl From<ServiceError> for AppError {
    fn from(e: ServiceError) -> Self {
        match e {
            ServiceError::App(app_err) => app_err,
            ServiceError::Db(db_err) => {
                tracing::error!(error = %db_err, "Service database error");
                AppError::new(ErrorCode::DatabaseError)
            }
        }
    }
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> axum::response::Response {
        let app_error: AppError = self.into();
        app_error.into_response()
    }
}

pub type ServiceResult<T> = Result<T, ServiceError>;

impl ServiceError {
    /// Error code carried to the client, `DatabaseError` for storage failures
    pub fn code(&self) -> ErrorCode {
        match self {
            ServiceError::App(e) => e.code,
            ServiceError::Db(_) => ErrorCode::DatabaseError,
        }
    }
}
