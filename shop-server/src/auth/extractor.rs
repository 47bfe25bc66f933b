//! Session extractor
//!
//! Handlers take [`CurrentCustomer`] as an argument. The value normally comes
//! from the middleware; the header is re-checked when the middleware did not
//! run.

use axum::{extract::FromRequestParts, http::request::Parts};

use crate::auth::CurrentCustomer;
use crate::auth::middleware::authenticate;
use crate::core::ServerState;
use crate::utils::AppError;

impl FromRequestParts<ServerState> for CurrentCustomer {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &ServerState,
    ) -> Result<Self, Self::Rejection> {
        if let Some(customer) = parts.extensions.get::<CurrentCustomer>() {
            return Ok(customer.clone());
        }

        let auth_header = parts
            .headers
            .get(http::header::AUTHORIZATION)
            .and_then(|h| h.to_str().ok());

        let customer = authenticate(state.get_jwt_service(), auth_header, &parts.uri)?;
        parts.extensions.insert(customer.clone());
        Ok(customer)
    }
}
