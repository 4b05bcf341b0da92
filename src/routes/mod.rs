// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! HTTP route handlers.

pub mod alerts;
pub mod auth;
pub mod contacts;
pub mod user;

use crate::config::{CorsOrigins, API_PREFIX};
use crate::middleware::auth::require_auth;
use crate::AppState;
use axum::http::{header, HeaderValue, Method};
use axum::{middleware, routing::get, Json, Router};
use serde::Serialize;
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;
use validator::ValidationError;

#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct HealthResponse {
    pub status: String,
    pub build_id: String,
}

/// Plain confirmation body used by delete operations.
#[derive(Debug, Serialize, serde::Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Json<Self> {
        Json(Self {
            message: message.into(),
        })
    }
}

/// Health check response
async fn health_check() -> Json<HealthResponse> {
    let build_id = option_env!("BUILD_ID").unwrap_or("unknown").to_string();
    Json(HealthResponse {
        status: "ok".to_string(),
        build_id,
    })
}

async fn root() -> Json<MessageResponse> {
    MessageResponse::new("SafeHaven API is running")
}

/// Validator for required free-text fields.
pub(crate) fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        let mut err = ValidationError::new("blank");
        err.message = Some("must not be blank".into());
        return Err(err);
    }
    Ok(())
}

/// Treat blank optional strings as absent; other values pass through untouched.
pub(crate) fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn cors_layer(origins: &CorsOrigins) -> CorsLayer {
    let cors = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION, header::ACCEPT]);

    match origins {
        CorsOrigins::Any => cors.allow_origin(AllowOrigin::any()),
        CorsOrigins::List(list) => {
            let allowed: Vec<HeaderValue> = list
                .iter()
                .filter_map(|origin| match origin.parse() {
                    Ok(value) => Some(value),
                    Err(_) => {
                        tracing::warn!(origin = %origin, "Ignoring invalid CORS origin");
                        None
                    }
                })
                .collect();
            cors.allow_origin(AllowOrigin::list(allowed))
                .allow_credentials(true)
        }
    }
}

/// Build the complete router with all routes.
pub fn create_router(state: Arc<AppState>) -> Router {
    let cors = cors_layer(&state.config.cors_origins);

    // Public API routes (no auth required)
    let public_api = auth::routes();

    // Protected API routes (auth required)
    let protected_api = auth::protected_routes()
        .merge(contacts::routes())
        .merge(alerts::routes())
        .merge(user::routes())
        .route_layer(middleware::from_fn_with_state(state.clone(), require_auth));

    Router::new()
        .route("/", get(root))
        .route("/health", get(health_check))
        .nest(API_PREFIX, public_api.merge(protected_api))
        .layer(middleware::from_fn(
            crate::middleware::security::add_security_headers,
        ))
        .layer(cors)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .with_state(state)
}
