// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use axum::{
    body::Body,
    extract::State,
    http::{header, Request, Response, StatusCode},
    routing::post,
    Json, Router,
};
use safehaven::config::Config;
use safehaven::db::{Database, FirestoreDb};
use safehaven::routes::create_router;
use safehaven::services::EmailService;
use safehaven::AppState;
use serde_json::{json, Value};
use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use tower::ServiceExt;

/// Check if emulator is available via environment variable.
#[allow(dead_code)]
pub fn emulator_available() -> bool {
    std::env::var("FIRESTORE_EMULATOR_HOST").is_ok()
}

/// Skip test with message if emulator not available.
#[macro_export]
macro_rules! require_emulator {
    () => {
        if !crate::common::emulator_available() {
            eprintln!("⚠️  Skipping: FIRESTORE_EMULATOR_HOST not set");
            return;
        }
    };
}

/// Create a test database connection.
#[allow(dead_code)]
pub async fn test_db() -> FirestoreDb {
    FirestoreDb::new("test-project", None)
        .await
        .expect("Failed to connect to Firestore emulator")
}

/// Stand-in for the SendGrid mail endpoint.
///
/// Accepts every message with 202 except those addressed to a recipient in
/// `failing`, which get 500. Accepted and rejected recipients are recorded.
#[allow(dead_code)]
#[derive(Clone, Default)]
pub struct MockMailer {
    failing: Arc<Mutex<HashSet<String>>>,
    received: Arc<Mutex<Vec<Value>>>,
}

#[allow(dead_code)]
impl MockMailer {
    /// Make the provider reject mail to `email`.
    pub fn fail_for(&self, email: &str) {
        self.failing.lock().unwrap().insert(email.to_string());
    }

    /// Every request body the provider has seen.
    pub fn received(&self) -> Vec<Value> {
        self.received.lock().unwrap().clone()
    }

    /// Recipients of every request the provider has seen.
    pub fn recipients(&self) -> Vec<String> {
        self.received()
            .iter()
            .filter_map(|body| body["personalizations"][0]["to"][0]["email"].as_str())
            .map(str::to_string)
            .collect()
    }

    /// Serve on an ephemeral local port and return the base URL.
    pub async fn spawn(&self) -> String {
        let app = Router::new()
            .route("/v3/mail/send", post(mock_send))
            .with_state(self.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind mock mailer");
        let addr = listener.local_addr().expect("mock mailer address");
        tokio::spawn(async move {
            axum::serve(listener, app).await.ok();
        });

        format!("http://{}", addr)
    }
}

#[allow(dead_code)]
async fn mock_send(State(mailer): State<MockMailer>, Json(body): Json<Value>) -> StatusCode {
    let recipient = body["personalizations"][0]["to"][0]["email"]
        .as_str()
        .unwrap_or_default()
        .to_string();
    mailer.received.lock().unwrap().push(body);

    if mailer.failing.lock().unwrap().contains(&recipient) {
        StatusCode::INTERNAL_SERVER_ERROR
    } else {
        StatusCode::ACCEPTED
    }
}

/// Build state over the in-memory store with the given mail endpoint.
#[allow(dead_code)]
pub fn test_state(sendgrid_api_url: &str) -> Arc<AppState> {
    let mut config = Config::test_default();
    config.sendgrid_api_url = sendgrid_api_url.to_string();

    let email_service = EmailService::new(
        config.sendgrid_api_url.clone(),
        config.sendgrid_api_key.clone(),
        config.sender_email.clone(),
    );

    Arc::new(AppState {
        config,
        db: Database::in_memory(),
        email_service,
    })
}

/// Create a test app over the in-memory store.
/// Mail goes to an unreachable port, so every send fails.
#[allow(dead_code)]
pub fn create_test_app() -> (Router, Arc<AppState>) {
    let state = test_state("http://127.0.0.1:9");
    (create_router(state.clone()), state)
}

/// Create a test app whose mail goes to a local mock provider.
#[allow(dead_code)]
pub async fn create_test_app_with_mailer() -> (Router, Arc<AppState>, MockMailer) {
    let mailer = MockMailer::default();
    let url = mailer.spawn().await;
    let state = test_state(&url);
    (create_router(state.clone()), state, mailer)
}

/// Send a JSON request, optionally with a bearer token.
#[allow(dead_code)]
pub async fn send_json(
    app: &Router,
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> Response<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    let body = match body {
        Some(value) => {
            builder = builder.header(header::CONTENT_TYPE, "application/json");
            Body::from(value.to_string())
        }
        None => Body::empty(),
    };

    app.clone()
        .oneshot(builder.body(body).unwrap())
        .await
        .unwrap()
}

/// Read a response body as JSON.
#[allow(dead_code)]
pub async fn body_json(response: Response<Body>) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

/// Register a user and return their access token.
#[allow(dead_code)]
pub async fn register(app: &Router, email: &str, name: &str) -> String {
    let response = send_json(
        app,
        "POST",
        "/api/auth/register",
        None,
        Some(json!({
            "email": email,
            "password": "correct horse battery staple",
            "name": name,
        })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK, "registration failed");

    let body = body_json(response).await;
    body["access_token"].as_str().unwrap().to_string()
}

/// Add a trusted contact for the token's user and return its id.
#[allow(dead_code)]
pub async fn add_contact(app: &Router, token: &str, name: &str, email: &str) -> String {
    let response = send_json(
        app,
        "POST",
        "/api/contacts",
        Some(token),
        Some(json!({ "name": name, "email": email })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK, "adding contact failed");

    let body = body_json(response).await;
    body["id"].as_str().unwrap().to_string()
}
