// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Emergency alert record.

use crate::db::{collections, Document};
use crate::time_utils;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// One emergency-notification event. Written once, never updated.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct Alert {
    pub id: String,
    pub user_id: String,
    /// Server-assigned creation time
    #[serde(with = "time_utils::rfc3339")]
    #[cfg_attr(feature = "binding-generation", ts(type = "string"))]
    pub timestamp: DateTime<Utc>,
    /// Free-text location supplied by the user
    pub location: Option<String>,
    /// Contacts whose email was accepted by the provider
    #[serde(default)]
    pub sent_to: Vec<String>,
}

impl Alert {
    pub fn new(user_id: &str, location: Option<String>, sent_to: Vec<String>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            timestamp: time_utils::now(),
            location,
            sent_to,
        }
    }
}

impl Document for Alert {
    const COLLECTION: &'static str = collections::ALERTS;

    fn id(&self) -> &str {
        &self.id
    }
}
