// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Account data removal.

use crate::error::Result;
use crate::middleware::auth::AuthUser;
use crate::routes::MessageResponse;
use crate::AppState;
use axum::{extract::State, routing::delete, Extension, Json, Router};
use std::sync::Arc;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/user/clear", delete(clear_user_data))
}

/// Delete the caller's contacts, alerts and account.
///
/// Outstanding tokens stay cryptographically valid until they expire but
/// resolve to no user afterwards.
async fn clear_user_data(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
) -> Result<Json<MessageResponse>> {
    tracing::info!(user_id = %auth.user_id, "User-initiated data deletion");

    let deleted = state.db.delete_user_data(&auth.user_id).await?;

    tracing::info!(user_id = %auth.user_id, deleted, "User data cleared");

    Ok(MessageResponse::new("All data has been removed"))
}
