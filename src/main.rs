// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! SafeHaven API Server
//!
//! Stores users, trusted contacts and alerts, and emails contacts when a
//! user raises an emergency alert.

use safehaven::{
    config::{Config, StoreBackend},
    db::Database,
    services::EmailService,
    AppState,
};
use std::sync::Arc;
use tokio::signal;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize structured JSON logging for GCP
    init_logging()?;

    // Load configuration from environment
    let config = Config::from_env()?;
    tracing::info!(port = config.port, "Starting SafeHaven API");

    // Open the document store
    let db = match config.store_backend {
        StoreBackend::Firestore => {
            Database::connect(&config.gcp_project_id, config.firestore_database.as_deref())
                .await?
        }
        StoreBackend::Memory => {
            tracing::warn!("Using in-memory store; data will not survive a restart");
            Database::in_memory()
        }
    };

    if config.sendgrid_api_key.is_none() {
        tracing::warn!("SENDGRID_API_KEY not set; alert emails will not be delivered");
    }
    let email_service = EmailService::new(
        config.sendgrid_api_url.clone(),
        config.sendgrid_api_key.clone(),
        config.sender_email.clone(),
    );

    // Build shared state
    let state = Arc::new(AppState {
        config: config.clone(),
        db: db.clone(),
        email_service,
    });

    // Build router
    let app = safehaven::routes::create_router(state);

    // Start server
    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(address = %addr, "Server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    db.close().await;
    tracing::info!("Server stopped");
    Ok(())
}

/// Initialize structured JSON logging (GCP-compliant).
fn init_logging() -> Result<(), Box<dyn std::error::Error>> {
    let format = tracing_subscriber::fmt::layer()
        .json()
        .with_target(false)
        .with_current_span(true)
        .flatten_event(true);

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("safehaven=debug".parse()?)
                .add_directive("info".parse()?),
        )
        .with(format)
        .init();
    Ok(())
}

/// Resolve on Ctrl-C or SIGTERM (Cloud Run sends the latter).
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
        tracing::info!("Received Ctrl+C, shutting down");
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
                tracing::info!("Received terminate signal, shutting down");
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
