// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Account registration, login and session identity routes.

use crate::error::{AppError, Result};
use crate::middleware::auth::{create_jwt, AuthUser};
use crate::models::{User, UserResponse};
use crate::routes::not_blank;
use crate::services::password::{hash_password_blocking, verify_password_blocking};
use crate::AppState;
use axum::{
    extract::State,
    routing::{get, post},
    Extension, Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;
use validator::Validate;

/// Routes that issue tokens (no auth).
pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
}

/// Routes that require a bearer token.
pub fn protected_routes() -> Router<Arc<AppState>> {
    Router::new().route("/auth/me", get(get_me))
}

#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 1, message = "must not be empty"))]
    pub password: String,
    #[validate(custom(function = "not_blank"))]
    pub name: String,
    #[serde(default)]
    pub phone: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(email)]
    pub email: String,
    pub password: String,
}

/// Session token plus the user it belongs to.
#[derive(Debug, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: String,
    pub user: UserResponse,
}

impl TokenResponse {
    fn bearer(access_token: String, user: User) -> Self {
        Self {
            access_token,
            token_type: "bearer".to_string(),
            user: user.into(),
        }
    }
}

/// Create an account and start a session.
async fn register(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<RegisterRequest>,
) -> Result<Json<TokenResponse>> {
    payload.validate()?;

    // Fast path; the email claim written by create_user is authoritative.
    if state.db.find_user_by_email(&payload.email).await?.is_some() {
        return Err(AppError::EmailAlreadyExists);
    }

    let password_hash = hash_password_blocking(payload.password).await?;
    let user = User::new(
        payload.email,
        payload.name,
        payload.phone,
        password_hash,
    );
    state.db.create_user(&user).await?;

    let token = create_jwt(&user.id, &state.config.jwt_signing_key)?;

    tracing::info!(user_id = %user.id, "User registered");

    Ok(Json(TokenResponse::bearer(token, user)))
}

/// Exchange email and password for a session token.
async fn login(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<TokenResponse>> {
    payload.validate()?;

    let Some(user) = state.db.find_user_by_email(&payload.email).await? else {
        tracing::debug!("Login attempt for unknown email");
        return Err(AppError::InvalidCredentials);
    };

    if !verify_password_blocking(payload.password, user.password_hash.clone()).await? {
        tracing::debug!(user_id = %user.id, "Login attempt with wrong password");
        return Err(AppError::InvalidCredentials);
    }

    let token = create_jwt(&user.id, &state.config.jwt_signing_key)?;

    tracing::info!(user_id = %user.id, "User logged in");

    Ok(Json(TokenResponse::bearer(token, user)))
}

/// Get current user profile.
async fn get_me(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
) -> Result<Json<UserResponse>> {
    let user = state
        .db
        .get_user(&auth.user_id)
        .await?
        .ok_or(AppError::UserNotFound)?;

    Ok(Json(user.into()))
}
