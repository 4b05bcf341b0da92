// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! JWT authentication middleware.

use crate::error::AppError;
use crate::AppState;
use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::Response,
};
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

/// Default session lifetime.
pub const TOKEN_TTL: Duration = Duration::from_secs(7 * 24 * 60 * 60);

/// JWT claims structure.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Subject (user ID)
    pub sub: String,
    /// Expiration time (Unix timestamp)
    pub exp: usize,
    /// Issued at (Unix timestamp)
    pub iat: usize,
}

/// Authenticated user extracted from JWT.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: String,
}

/// Middleware that requires valid JWT authentication.
pub async fn require_auth(
    State(state): State<Arc<AppState>>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(bearer_token)
        .ok_or(AppError::Unauthorized)?;

    let user_id = verify_jwt(token, &state.config.jwt_signing_key)?;

    request.extensions_mut().insert(AuthUser { user_id });

    Ok(next.run(request).await)
}

/// Extract the credentials from a `Bearer` authorization header.
/// The scheme name is case-insensitive (RFC 7235).
fn bearer_token(header: &str) -> Option<&str> {
    let (scheme, token) = header.split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    let token = token.trim();
    (!token.is_empty()).then_some(token)
}

/// Validate a token and return its subject.
pub fn verify_jwt(token: &str, signing_key: &[u8]) -> Result<String, AppError> {
    let key = DecodingKey::from_secret(signing_key);
    let mut validation = Validation::new(Algorithm::HS256);
    validation.leeway = 0;

    let token_data = decode::<Claims>(token, &key, &validation).map_err(|e| {
        tracing::debug!(error = %e, "Rejected bearer token");
        AppError::InvalidToken
    })?;

    let sub = token_data.claims.sub;
    if sub.is_empty() {
        return Err(AppError::InvalidToken);
    }
    Ok(sub)
}

/// Create a JWT for a user session.
pub fn create_jwt(user_id: &str, signing_key: &[u8]) -> anyhow::Result<String> {
    create_jwt_with_ttl(user_id, signing_key, TOKEN_TTL)
}

/// Create a JWT with an explicit lifetime.
pub fn create_jwt_with_ttl(
    user_id: &str,
    signing_key: &[u8],
    ttl: Duration,
) -> anyhow::Result<String> {
    use jsonwebtoken::{encode, EncodingKey, Header};
    use std::time::{SystemTime, UNIX_EPOCH};

    let now = SystemTime::now().duration_since(UNIX_EPOCH)?.as_secs() as usize;

    let claims = Claims {
        sub: user_id.to_string(),
        iat: now,
        exp: now + ttl.as_secs() as usize,
    };

    Ok(encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(signing_key),
    )?)
}
