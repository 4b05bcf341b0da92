// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! SafeHaven: personal-safety alert backend
//!
//! Users register, keep a list of trusted contacts, and send emergency
//! alerts that email those contacts with an optional location.

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod time_utils;

use config::Config;
use db::Database;
use services::EmailService;

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub db: Database,
    pub email_service: EmailService,
}
