// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Trusted contact model.

use crate::db::{collections, Document};
use crate::time_utils;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// A person who receives a user's emergency alerts.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct TrustedContact {
    pub id: String,
    /// Owning user
    pub user_id: String,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    #[serde(with = "time_utils::rfc3339")]
    #[cfg_attr(feature = "binding-generation", ts(type = "string"))]
    pub created_at: DateTime<Utc>,
}

impl TrustedContact {
    pub fn new(user_id: &str, name: String, email: String, phone: Option<String>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            name,
            email,
            phone,
            created_at: time_utils::now(),
        }
    }
}

impl Document for TrustedContact {
    const COLLECTION: &'static str = collections::TRUSTED_CONTACTS;

    fn id(&self) -> &str {
        &self.id
    }
}
