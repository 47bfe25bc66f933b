//! External identity provider
//!
//! Login is delegated to an OpenID Connect provider. The provider metadata is
//! discovered once from `{issuer}/.well-known/openid-configuration`; the ID
//! token returned by the code exchange is verified against the provider's
//! JWKS before any claim is trusted.

use async_trait::async_trait;
use jsonwebtoken::jwk::JwkSet;
use jsonwebtoken::{DecodingKey, Validation, decode, decode_header};
use serde::Deserialize;
use thiserror::Error;
use tokio::sync::OnceCell;

use crate::core::Config;

const SCOPES: &str = "openid profile email";

/// Identity attested by the provider
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentityClaims {
    /// Stable provider subject, stored as the customer's `oauth_id`
    pub subject: String,
    pub email: String,
    pub name: String,
}

#[derive(Error, Debug)]
pub enum IdentityError {
    #[error("Provider discovery failed: {0}")]
    Discovery(String),

    #[error("Code exchange failed: {0}")]
    Exchange(String),

    #[error("Invalid ID token: {0}")]
    InvalidToken(String),

    #[error("ID token is missing the {0} claim")]
    MissingClaim(&'static str),
}

impl From<reqwest::Error> for IdentityError {
    fn from(e: reqwest::Error) -> Self {
        IdentityError::Exchange(e.to_string())
    }
}

/// Capability to authenticate a customer with an external provider
#[async_trait]
pub trait IdentityVerifier: Send + Sync + 'static {
    /// URL the browser is redirected to, carrying the CSRF `state`
    async fn authorize_url(&self, state: &str) -> Result<String, IdentityError>;

    /// Exchange an authorization code and return the verified identity
    async fn authenticate(&self, code: &str) -> Result<IdentityClaims, IdentityError>;
}

#[derive(Debug, Clone, Deserialize)]
struct ProviderMetadata {
    issuer: String,
    authorization_endpoint: String,
    token_endpoint: String,
    jwks_uri: String,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    id_token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct IdTokenClaims {
    sub: String,
    email: Option<String>,
    name: Option<String>,
    given_name: Option<String>,
    family_name: Option<String>,
}

impl IdTokenClaims {
    fn into_identity(self) -> Result<IdentityClaims, IdentityError> {
        let email = self
            .email
            .filter(|e| !e.is_empty())
            .ok_or(IdentityError::MissingClaim("email"))?;
        let name = match self.name.filter(|n| !n.trim().is_empty()) {
            Some(name) => name,
            None => [self.given_name, self.family_name]
                .into_iter()
                .flatten()
                .collect::<Vec<_>>()
                .join(" "),
        };
        Ok(IdentityClaims {
            subject: self.sub,
            email,
            name,
        })
    }
}

/// OpenID Connect authorization-code client
pub struct OidcVerifier {
    http: reqwest::Client,
    provider_url: String,
    client_id: String,
    client_secret: String,
    redirect_url: String,
    metadata: OnceCell<ProviderMetadata>,
}

impl OidcVerifier {
    pub fn new(http: reqwest::Client, config: &Config) -> Self {
        Self {
            http,
            provider_url: config.oauth_provider_url.trim_end_matches('/').to_string(),
            client_id: config.oauth_client_id.clone(),
            client_secret: config.oauth_client_secret.clone(),
            redirect_url: config.oauth_redirect_url.clone(),
            metadata: OnceCell::new(),
        }
    }

    async fn metadata(&self) -> Result<&ProviderMetadata, IdentityError> {
        self.metadata
            .get_or_try_init(|| async {
                let url = format!("{}/.well-known/openid-configuration", self.provider_url);
                let metadata: ProviderMetadata = self
                    .http
                    .get(&url)
                    .send()
                    .await
                    .and_then(|r| r.error_for_status())
                    .map_err(|e| IdentityError::Discovery(e.to_string()))?
                    .json()
                    .await
                    .map_err(|e| IdentityError::Discovery(e.to_string()))?;
                tracing::info!(issuer = %metadata.issuer, "Identity provider discovered");
                Ok::<_, IdentityError>(metadata)
            })
            .await
    }

    async fn exchange(&self, code: &str) -> Result<String, IdentityError> {
        let metadata = self.metadata().await?;
        let resp = self
            .http
            .post(&metadata.token_endpoint)
            .form(&[
                ("grant_type", "authorization_code"),
                ("code", code),
                ("redirect_uri", self.redirect_url.as_str()),
                ("client_id", self.client_id.as_str()),
                ("client_secret", self.client_secret.as_str()),
            ])
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(IdentityError::Exchange(format!("status {status}: {body}")));
        }

        let token: TokenResponse = resp.json().await?;
        token
            .id_token
            .ok_or_else(|| IdentityError::Exchange("no id_token in token response".into()))
    }

    async fn verify(&self, id_token: &str) -> Result<IdentityClaims, IdentityError> {
        let metadata = self.metadata().await?;
        let header =
            decode_header(id_token).map_err(|e| IdentityError::InvalidToken(e.to_string()))?;

        let jwks: JwkSet = self
            .http
            .get(&metadata.jwks_uri)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| IdentityError::Discovery(e.to_string()))?
            .json()
            .await
            .map_err(|e| IdentityError::Discovery(e.to_string()))?;

        let jwk = match header.kid.as_deref() {
            Some(kid) => jwks.find(kid),
            None => jwks.keys.first(),
        }
        .ok_or_else(|| IdentityError::InvalidToken("no matching signing key".into()))?;

        let key =
            DecodingKey::from_jwk(jwk).map_err(|e| IdentityError::InvalidToken(e.to_string()))?;

        let mut validation = Validation::new(header.alg);
        validation.set_audience(&[&self.client_id]);
        validation.set_issuer(&[&metadata.issuer]);

        let data = decode::<IdTokenClaims>(id_token, &key, &validation)
            .map_err(|e| IdentityError::InvalidToken(e.to_string()))?;
        data.claims.into_identity()
    }
}

#[async_trait]
impl IdentityVerifier for OidcVerifier {
    async fn authorize_url(&self, state: &str) -> Result<String, IdentityError> {
        let metadata = self.metadata().await?;
        let url = reqwest::Url::parse_with_params(
            &metadata.authorization_endpoint,
            &[
                ("response_type", "code"),
                ("client_id", self.client_id.as_str()),
                ("redirect_uri", self.redirect_url.as_str()),
                ("scope", SCOPES),
                ("state", state),
            ],
        )
        .map_err(|e| IdentityError::Discovery(e.to_string()))?;
        Ok(url.into())
    }

    async fn authenticate(&self, code: &str) -> Result<IdentityClaims, IdentityError> {
        let id_token = self.exchange(code).await?;
        self.verify(&id_token).await
    }
}
