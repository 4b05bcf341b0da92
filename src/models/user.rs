// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! User model for storage and API.

use crate::db::{collections, Document};
use crate::time_utils;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// User account stored in Firestore.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct User {
    /// Generated UUID (also used as document ID)
    pub id: String,
    /// Login email, unique across users
    pub email: String,
    /// Display name used in alert emails
    pub name: String,
    pub phone: Option<String>,
    /// Argon2 PHC string
    pub password_hash: String,
    #[serde(with = "time_utils::rfc3339")]
    pub created_at: DateTime<Utc>,
}

impl User {
    pub fn new(email: String, name: String, phone: Option<String>, password_hash: String) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            email,
            name,
            phone,
            password_hash,
            created_at: time_utils::now(),
        }
    }
}

impl Document for User {
    const COLLECTION: &'static str = collections::USERS;

    fn id(&self) -> &str {
        &self.id
    }
}

/// Public view of a user; never carries the password hash.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct UserResponse {
    pub id: String,
    pub email: String,
    pub name: String,
    pub phone: Option<String>,
    #[serde(with = "time_utils::rfc3339")]
    #[cfg_attr(feature = "binding-generation", ts(type = "string"))]
    pub created_at: DateTime<Utc>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            email: user.email,
            name: user.name,
            phone: user.phone,
            created_at: user.created_at,
        }
    }
}

/// Reservation of an email address for a single user.
///
/// Keyed by the URL-encoded email and written with create-only semantics,
/// so two registrations racing on the same address cannot both succeed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmailClaim {
    pub id: String,
    pub email: String,
    pub user_id: String,
}

impl EmailClaim {
    pub fn new(email: &str, user_id: &str) -> Self {
        Self {
            id: Self::key(email),
            email: email.to_string(),
            user_id: user_id.to_string(),
        }
    }

    /// Document ID for an email address (Firestore IDs may not contain `/`).
    pub fn key(email: &str) -> String {
        urlencoding::encode(email).into_owned()
    }
}

impl Document for EmailClaim {
    const COLLECTION: &'static str = collections::USER_EMAILS;

    fn id(&self) -> &str {
        &self.id
    }
}
