// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Application error types with consistent API responses.

use axum::{
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use std::collections::BTreeMap;

/// Application error type that converts to HTTP responses.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Authentication required")]
    Unauthorized,

    #[error("Invalid or expired token")]
    InvalidToken,

    /// Same message for unknown email and wrong password.
    #[error("Incorrect email or password")]
    InvalidCredentials,

    #[error("Email already registered")]
    EmailAlreadyExists,

    #[error("User not found")]
    UserNotFound,

    #[error("Contact not found")]
    ContactNotFound,

    #[error("No trusted contacts registered")]
    NoContactsRegistered,

    #[error("Validation failed: {0}")]
    Validation(#[from] validator::ValidationErrors),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

/// JSON error response body
#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    fields: Option<BTreeMap<String, Vec<String>>>,
}

impl AppError {
    fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            AppError::Unauthorized => (StatusCode::UNAUTHORIZED, "unauthorized"),
            AppError::InvalidToken => (StatusCode::UNAUTHORIZED, "invalid_token"),
            AppError::InvalidCredentials => (StatusCode::UNAUTHORIZED, "invalid_credentials"),
            AppError::EmailAlreadyExists => (StatusCode::BAD_REQUEST, "email_already_exists"),
            AppError::UserNotFound => (StatusCode::NOT_FOUND, "user_not_found"),
            AppError::ContactNotFound => (StatusCode::NOT_FOUND, "contact_not_found"),
            AppError::NoContactsRegistered => (StatusCode::BAD_REQUEST, "no_contacts_registered"),
            AppError::Validation(_) => (StatusCode::UNPROCESSABLE_ENTITY, "validation_error"),
            AppError::Conflict(_) => (StatusCode::CONFLICT, "conflict"),
            AppError::Database(_) => (StatusCode::INTERNAL_SERVER_ERROR, "database_error"),
            AppError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "internal_error"),
        }
    }
}

/// Flatten validator output into `field -> [messages]`.
fn field_errors(errors: &validator::ValidationErrors) -> BTreeMap<String, Vec<String>> {
    errors
        .field_errors()
        .into_iter()
        .map(|(field, errs)| {
            let messages = errs
                .iter()
                .map(|e| {
                    e.message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| e.code.to_string())
                })
                .collect();
            (field.to_string(), messages)
        })
        .collect()
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error) = self.status_and_code();

        let (details, fields) = match &self {
            AppError::Conflict(msg) => (Some(msg.clone()), None),
            AppError::Validation(errors) => (None, Some(field_errors(errors))),
            AppError::Database(msg) => {
                tracing::error!(error = %msg, "Database error");
                (None, None)
            }
            AppError::Internal(err) => {
                tracing::error!(error = %err, "Internal server error");
                (None, None)
            }
            other => (Some(other.to_string()), None),
        };

        let body = ErrorResponse {
            error: error.to_string(),
            details,
            fields,
        };

        let mut response = (status, Json(body)).into_response();
        if matches!(self, AppError::Unauthorized | AppError::InvalidToken) {
            response
                .headers_mut()
                .insert(header::WWW_AUTHENTICATE, HeaderValue::from_static("Bearer"));
        }
        response
    }
}

/// Result type alias for handlers
pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unauthenticated_sets_www_authenticate() {
        for err in [AppError::Unauthorized, AppError::InvalidToken] {
            let response = err.into_response();
            assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
            assert_eq!(
                response.headers().get(header::WWW_AUTHENTICATE).unwrap(),
                "Bearer"
            );
        }
    }

    #[test]
    fn test_invalid_credentials_has_no_challenge_header() {
        let response = AppError::InvalidCredentials.into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert!(response.headers().get(header::WWW_AUTHENTICATE).is_none());
    }

    #[tokio::test]
    async fn test_conflict_body_carries_details() {
        let response = AppError::Conflict("user_emails/a".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::CONFLICT);

        let bytes = axum::body::to_bytes(response.into_body(), 1024)
            .await
            .unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["error"], "conflict");
        assert_eq!(body["details"], "user_emails/a");
        assert!(body.get("fields").is_none());
    }

    #[test]
    fn test_domain_errors_map_to_statuses() {
        assert_eq!(
            AppError::EmailAlreadyExists.into_response().status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::NoContactsRegistered.into_response().status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::ContactNotFound.into_response().status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            AppError::UserNotFound.into_response().status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            AppError::Database("boom".to_string())
                .into_response()
                .status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
