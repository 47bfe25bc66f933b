//! Authentication
//!
//! - [`IdentityVerifier`] - external identity provider (login)
//! - [`JwtService`] - session tokens issued after login
//! - [`CurrentCustomer`] - the authenticated caller
//! - [`require_auth`] - middleware guarding `/api/v1`

pub mod extractor;
pub mod identity;
pub mod jwt;
pub mod middleware;

pub use identity::{IdentityClaims, IdentityError, IdentityVerifier, OidcVerifier};
pub use jwt::{Claims, CurrentCustomer, JwtConfig, JwtError, JwtService};
pub use middleware::require_auth;
