//! # Authentication Middleware
//!
//! Bearer-token verification for the LocumDesk API. Tokens are issued by an
//! external identity provider and verified here with a shared HMAC secret.
//! Service-to-service callers skip JWT entirely by presenting the
//! `x-internal-key` header instead.

use async_trait::async_trait;
use axum::{
    extract::FromRequestParts,
    http::{header, request::Parts},
};
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use std::sync::Arc;

use locumdesk_core::{
    errors::{LocumError, LocumResult},
    models::auth::{AuthUser, Claims},
};

use crate::{middleware::error_handling::AppError, ApiState};

/// Header carrying the internal service key for machine callers.
pub const INTERNAL_KEY_HEADER: &str = "x-internal-key";

/// Extracts the raw token from an `Authorization` header value.
///
/// Tolerates a case-insensitive `Bearer` prefix and tokens wrapped in
/// quotes, both of which show up in practice from shell scripts and older
/// clients.
pub fn bearer_token(header_value: &str) -> Option<&str> {
    let value = header_value.trim();
    let rest = if value.len() >= 7 && value[..7].eq_ignore_ascii_case("bearer ") {
        &value[7..]
    } else {
        value
    };
    let token = rest.trim().trim_matches('"').trim_matches('\'');
    if token.is_empty() {
        None
    } else {
        Some(token)
    }
}

/// Verifies the token signature and expiry, returning the typed caller.
pub fn decode_claims(token: &str, secret: &str) -> LocumResult<AuthUser> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.validate_exp = true;

    let data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    )
    .map_err(|e| LocumError::Authentication(format!("invalid token: {e}")))?;

    AuthUser::from_claims(data.claims)
}

/// Authenticated request extractor.
///
/// Accepts either the internal service key or a bearer token; requests with
/// neither are rejected with 401 before the handler runs.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub AuthUser);

#[async_trait]
impl FromRequestParts<Arc<ApiState>> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<ApiState>,
    ) -> Result<Self, Self::Rejection> {
        // Internal service key takes precedence over any bearer token
        if let Some(key) = parts
            .headers
            .get(INTERNAL_KEY_HEADER)
            .and_then(|v| v.to_str().ok())
        {
            if !key.is_empty() && key == state.config.internal_service_key {
                return Ok(CurrentUser(AuthUser::internal()));
            }
        }

        let header_value = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| {
                AppError(LocumError::Authentication(
                    "missing authorization header".to_string(),
                ))
            })?;

        let token = bearer_token(header_value).ok_or_else(|| {
            AppError(LocumError::Authentication(
                "malformed authorization header".to_string(),
            ))
        })?;

        let user = decode_claims(token, &state.config.jwt_secret)?;
        Ok(CurrentUser(user))
    }
}
