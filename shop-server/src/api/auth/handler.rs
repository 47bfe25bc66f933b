//! Login Handlers
//!
//! `login` stores a random CSRF state in the `oauthstate` cookie and sends
//! the browser to the provider. `callback` checks the state echoed by the
//! provider against that cookie before the code is redeemed.

use axum::Json;
use axum::extract::{Query, State};
use axum::response::{IntoResponse, Redirect, Response};
use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use http::HeaderMap;
use http::header::{COOKIE, SET_COOKIE};
use rand::RngCore;
use serde::{Deserialize, Serialize};
use shared::models::{Customer, CustomerCreate};
use shared::util::split_full_name;

use crate::core::ServerState;
use crate::db::repository::customer;
use crate::security_log;
use crate::utils::{ApiResponse, AppError, AppResult, ErrorCode, ok};

pub(crate) const STATE_COOKIE: &str = "oauthstate";
const STATE_TTL_SECS: u32 = 300;

#[derive(Debug, Deserialize)]
pub struct CallbackQuery {
    pub state: Option<String>,
    pub code: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub customer: Customer,
    pub access_token: String,
    pub token_type: &'static str,
    /// Seconds until the token expires
    pub expires_in: i64,
}

/// GET /auth/login
pub async fn login(State(state): State<ServerState>) -> AppResult<Response> {
    let csrf = generate_state();
    let url = state.identity.authorize_url(&csrf).await.map_err(|e| {
        tracing::error!(error = %e, "Failed to build authorization URL");
        AppError::upstream("Identity provider unavailable")
    })?;

    let cookie = state_cookie(&csrf, STATE_TTL_SECS, state.config.is_production());
    Ok(([(SET_COOKIE, cookie)], Redirect::temporary(&url)).into_response())
}

/// GET /auth/callback?state=&code=
pub async fn callback(
    State(state): State<ServerState>,
    headers: HeaderMap,
    Query(query): Query<CallbackQuery>,
) -> AppResult<Response> {
    let expected = cookie_value(&headers, STATE_COOKIE);
    match (query.state.as_deref(), expected.as_deref()) {
        (Some(got), Some(want)) if !got.is_empty() && got == want => {}
        _ => {
            security_log!("WARN", "oauth_state_mismatch", has_cookie = expected.is_some());
            return Err(AppError::new(ErrorCode::OAuthStateMismatch));
        }
    }

    let code = query
        .code
        .as_deref()
        .filter(|c| !c.is_empty())
        .ok_or_else(|| AppError::new(ErrorCode::OAuthCodeMissing))?;

    let identity = state.identity.authenticate(code).await.map_err(|e| {
        security_log!("WARN", "oauth_exchange_failed", error = e.to_string());
        AppError::upstream(format!("Authentication failed: {e}"))
    })?;

    let (first_name, last_name) = split_full_name(&identity.name);
    let customer = customer::find_or_create(
        &state.pool,
        CustomerCreate {
            first_name,
            last_name,
            email: identity.email,
            oauth_id: identity.subject,
        },
    )
    .await?;

    let access_token = state
        .get_jwt_service()
        .generate_token(&customer)
        .map_err(|e| AppError::internal(e.to_string()))?;

    security_log!("INFO", "login_success", customer_id = customer.id);

    let body: Json<ApiResponse<LoginResponse>> = ok(LoginResponse {
        customer,
        access_token,
        token_type: "Bearer",
        expires_in: state.config.jwt.expiration_minutes * 60,
    });
    let clear = state_cookie("", 0, state.config.is_production());
    Ok(([(SET_COOKIE, clear)], body).into_response())
}

/// 16 random bytes, URL-safe base64
fn generate_state() -> String {
    let mut bytes = [0u8; 16];
    rand::thread_rng().fill_bytes(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}

fn state_cookie(value: &str, max_age: u32, secure: bool) -> String {
    let mut cookie =
        format!("{STATE_COOKIE}={value}; Path=/; Max-Age={max_age}; HttpOnly; SameSite=Lax");
    if secure {
        cookie.push_str("; Secure");
    }
    cookie
}

/// Value of the named cookie across all `Cookie` headers
fn cookie_value(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(k, _)| *k == name)
        .map(|(_, v)| v.to_string())
}
