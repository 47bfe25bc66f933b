//! Authentication middleware
//!
//! Guards every `/api/v1` route with the session token issued at login.

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};

use crate::auth::{CurrentCustomer, JwtError, JwtService};
use crate::core::ServerState;
use crate::security_log;
use crate::utils::AppError;

/// Resolve an `Authorization` header value into the calling customer
///
/// | Failure | Error |
/// |---------|-------|
/// | header missing | `NotAuthenticated` |
/// | not a Bearer value | `TokenInvalid` |
/// | expired | `TokenExpired` |
/// | bad signature / claims | `TokenInvalid` |
pub(crate) fn authenticate(
    jwt_service: &JwtService,
    auth_header: Option<&str>,
    uri: &http::Uri,
) -> Result<CurrentCustomer, AppError> {
    let token = match auth_header {
        Some(header) => JwtService::extract_from_header(header)
            .ok_or_else(|| AppError::invalid_token("Invalid authorization header"))?,
        None => {
            security_log!("WARN", "auth_missing", uri = uri.to_string());
            return Err(AppError::unauthorized());
        }
    };

    match jwt_service.validate_token(token) {
        Ok(claims) => CurrentCustomer::try_from(claims)
            .map_err(|e| AppError::invalid_token(format!("Malformed JWT claims: {e}"))),
        Err(e) => {
            security_log!(
                "WARN",
                "auth_failed",
                error = e.to_string(),
                uri = uri.to_string()
            );
            match e {
                JwtError::ExpiredToken => Err(AppError::token_expired()),
                _ => Err(AppError::invalid_token("Invalid token")),
            }
        }
    }
}

/// Require a valid session token
///
/// On success the [`CurrentCustomer`] is inserted into the request
/// extensions. CORS preflight requests pass through untouched.
pub async fn require_auth(
    State(state): State<ServerState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    if req.method() == http::Method::OPTIONS {
        return Ok(next.run(req).await);
    }

    let auth_header = req
        .headers()
        .get(http::header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok());

    let customer = authenticate(state.get_jwt_service(), auth_header, req.uri())?;
    req.extensions_mut().insert(customer);
    Ok(next.run(req).await)
}
