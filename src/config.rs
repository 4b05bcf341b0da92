// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Application configuration loaded from environment variables.
//!
//! Cloud Run injects secrets as environment variables via secret bindings,
//! so everything is read once at startup and cached in memory.

use std::env;

/// Path prefix shared by every API route.
pub const API_PREFIX: &str = "/api";

/// Which document store backs the application.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    /// Google Cloud Firestore (or the emulator).
    Firestore,
    /// In-process store; data is lost on restart.
    Memory,
}

impl std::str::FromStr for StoreBackend {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "firestore" => Ok(Self::Firestore),
            "memory" => Ok(Self::Memory),
            other => Err(ConfigError::Invalid("STORE_BACKEND", other.to_string())),
        }
    }
}

/// Allowed CORS origins.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CorsOrigins {
    Any,
    List(Vec<String>),
}

impl CorsOrigins {
    /// Parse a comma-separated origin list; `*` anywhere means any origin.
    pub fn parse(raw: &str) -> Self {
        let origins: Vec<String> = raw
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect();

        if origins.is_empty() || origins.iter().any(|o| o == "*") {
            Self::Any
        } else {
            Self::List(origins)
        }
    }
}

/// Application configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    // --- Environment Variables (non-sensitive) ---
    /// Server port
    pub port: u16,
    /// Document store backend
    pub store_backend: StoreBackend,
    /// GCP project ID
    pub gcp_project_id: String,
    /// Firestore database ID (None = "(default)")
    pub firestore_database: Option<String>,
    /// Base URL of the SendGrid API
    pub sendgrid_api_url: String,
    /// From address on alert emails
    pub sender_email: String,
    /// Allowed CORS origins
    pub cors_origins: CorsOrigins,

    // --- Secrets ---
    /// JWT signing key for session tokens (raw bytes)
    pub jwt_signing_key: Vec<u8>,
    /// SendGrid API key; alerts cannot be emailed without it
    pub sendgrid_api_key: Option<String>,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        let store_backend = match env::var("STORE_BACKEND") {
            Ok(raw) => raw.parse()?,
            Err(_) => StoreBackend::Firestore,
        };

        let jwt_signing_key = env::var("JWT_SIGNING_KEY")
            .map(|v| v.trim().to_string())
            .map_err(|_| ConfigError::Missing("JWT_SIGNING_KEY"))?;
        if jwt_signing_key.is_empty() {
            return Err(ConfigError::Missing("JWT_SIGNING_KEY"));
        }

        Ok(Self {
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .unwrap_or(8080),
            store_backend,
            gcp_project_id: env::var("GCP_PROJECT_ID").unwrap_or_else(|_| "local-dev".to_string()),
            firestore_database: env::var("FIRESTORE_DATABASE")
                .ok()
                .filter(|v| !v.trim().is_empty()),
            sendgrid_api_url: env::var("SENDGRID_API_URL")
                .map(|v| v.trim_end_matches('/').to_string())
                .unwrap_or_else(|_| "https://api.sendgrid.com".to_string()),
            sender_email: env::var("SENDER_EMAIL")
                .unwrap_or_else(|_| "noreply@safehaven.com".to_string()),
            cors_origins: CorsOrigins::parse(
                &env::var("CORS_ORIGINS").unwrap_or_else(|_| "*".to_string()),
            ),
            jwt_signing_key: jwt_signing_key.into_bytes(),
            sendgrid_api_key: env::var("SENDGRID_API_KEY")
                .ok()
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty()),
        })
    }

    /// Fixed configuration for tests.
    pub fn test_default() -> Self {
        Self {
            port: 8080,
            store_backend: StoreBackend::Memory,
            gcp_project_id: "test-project".to_string(),
            firestore_database: None,
            sendgrid_api_url: "http://127.0.0.1:9".to_string(),
            sender_email: "noreply@safehaven.test".to_string(),
            cors_origins: CorsOrigins::Any,
            jwt_signing_key: b"test_jwt_key_32_bytes_minimum!!".to_vec(),
            sendgrid_api_key: Some("test_sendgrid_key".to_string()),
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),

    #[error("Invalid value for {0}: {1}")]
    Invalid(&'static str, String),
}
