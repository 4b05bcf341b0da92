// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Emergency alert dispatch and history.

use crate::error::{AppError, Result};
use crate::middleware::auth::AuthUser;
use crate::models::Alert;
use crate::routes::non_empty;
use crate::AppState;
use axum::{
    extract::State,
    routing::{get, post},
    Extension, Json, Router,
};
use serde::Deserialize;
use std::sync::Arc;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/alerts", get(list_alerts))
        .route("/alerts/send", post(send_alert))
}

#[derive(Debug, Deserialize)]
pub struct SendAlertRequest {
    #[serde(default)]
    pub location: Option<String>,
}

/// Email every trusted contact and record the alert.
///
/// Not idempotent: each call sends fresh emails and stores a new alert.
/// Provider failures only shrink `sent_to`; they never fail the request.
async fn send_alert(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    Json(payload): Json<SendAlertRequest>,
) -> Result<Json<Alert>> {
    let location = non_empty(payload.location);

    let user = state
        .db
        .get_user(&auth.user_id)
        .await?
        .ok_or(AppError::UserNotFound)?;

    let contacts = state.db.list_contacts(&user.id).await?;
    if contacts.is_empty() {
        return Err(AppError::NoContactsRegistered);
    }

    let sent_to = state
        .email_service
        .notify_contacts(&contacts, &user.name, location.as_deref())
        .await;

    tracing::info!(
        user_id = %user.id,
        contacts = contacts.len(),
        delivered = sent_to.len(),
        "Emergency alert dispatched"
    );

    // Emails already sent stay sent if this write fails.
    let alert = Alert::new(&user.id, location, sent_to);
    state.db.create_alert(&alert).await?;

    Ok(Json(alert))
}

/// The caller's alerts, newest first.
async fn list_alerts(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
) -> Result<Json<Vec<Alert>>> {
    let alerts = state.db.list_alerts(&auth.user_id).await?;
    Ok(Json(alerts))
}
