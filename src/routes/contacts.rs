// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Trusted contact management.

use crate::error::{AppError, Result};
use crate::middleware::auth::AuthUser;
use crate::models::TrustedContact;
use crate::routes::{not_blank, MessageResponse};
use crate::AppState;
use axum::{
    extract::{Path, State},
    routing::{delete, get},
    Extension, Json, Router,
};
use serde::Deserialize;
use std::sync::Arc;
use validator::Validate;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/contacts", get(list_contacts).post(create_contact))
        .route("/contacts/{id}", delete(delete_contact))
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateContactRequest {
    #[validate(custom(function = "not_blank"))]
    pub name: String,
    #[validate(email)]
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
}

async fn create_contact(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    Json(payload): Json<CreateContactRequest>,
) -> Result<Json<TrustedContact>> {
    payload.validate()?;

    let contact = TrustedContact::new(
        &auth.user_id,
        payload.name,
        payload.email,
        payload.phone,
    );
    state.db.create_contact(&contact).await?;

    tracing::info!(
        user_id = %auth.user_id,
        contact_id = %contact.id,
        "Trusted contact added"
    );

    Ok(Json(contact))
}

/// The caller's contacts in insertion order.
async fn list_contacts(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
) -> Result<Json<Vec<TrustedContact>>> {
    let contacts = state.db.list_contacts(&auth.user_id).await?;
    Ok(Json(contacts))
}

/// Remove one of the caller's contacts. Other users' contacts look missing.
async fn delete_contact(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    Path(contact_id): Path<String>,
) -> Result<Json<MessageResponse>> {
    if !state.db.delete_contact(&auth.user_id, &contact_id).await? {
        return Err(AppError::ContactNotFound);
    }

    tracing::info!(user_id = %auth.user_id, contact_id = %contact_id, "Trusted contact removed");

    Ok(MessageResponse::new("Contact removed"))
}
