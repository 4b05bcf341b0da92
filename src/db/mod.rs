// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Database layer.
//!
//! Documents are typed records addressed by a generated ID inside a named
//! collection. Reads and deletes are always scoped by at least one equality
//! filter; there is no API for scanning a whole collection.

pub mod firestore;
pub mod memory;
mod operations;

pub use firestore::FirestoreDb;
pub use memory::MemoryDb;
pub use operations::{MAX_ALERTS, MAX_CONTACTS};

use crate::error::AppError;
use serde::{de::DeserializeOwned, Serialize};

/// Collection names as constants.
pub mod collections {
    pub const USERS: &str = "users";
    /// Email reservations (keyed by URL-encoded email)
    pub const USER_EMAILS: &str = "user_emails";
    pub const TRUSTED_CONTACTS: &str = "trusted_contacts";
    pub const ALERTS: &str = "alerts";
}

/// A record stored in one collection under its own ID.
pub trait Document: Serialize + DeserializeOwned + Send + Sync + 'static {
    const COLLECTION: &'static str;

    fn id(&self) -> &str;
}

/// Equality filter on a string field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Filter {
    pub field: &'static str,
    pub value: String,
}

impl Filter {
    pub fn eq(field: &'static str, value: impl Into<String>) -> Self {
        Self {
            field,
            value: value.into(),
        }
    }
}

/// Sort direction for ordered queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Ascending,
    Descending,
}

/// Ordering applied to a query: `(field, direction)`.
pub type OrderBy = (&'static str, Direction);

fn ensure_scoped(collection: &str, filters: &[Filter]) -> Result<(), AppError> {
    if filters.is_empty() {
        return Err(AppError::Database(format!(
            "Refusing unscoped query on {}",
            collection
        )));
    }
    Ok(())
}

/// Store client shared by all handlers.
///
/// Opened once at startup and closed explicitly at shutdown.
#[derive(Clone)]
pub enum Database {
    Firestore(FirestoreDb),
    Memory(MemoryDb),
}

impl Database {
    /// Connect to Firestore.
    ///
    /// For local development with emulator, set FIRESTORE_EMULATOR_HOST.
    pub async fn connect(project_id: &str, database_id: Option<&str>) -> Result<Self, AppError> {
        Ok(Self::Firestore(
            FirestoreDb::new(project_id, database_id).await?,
        ))
    }

    /// Create an empty in-process store.
    pub fn in_memory() -> Self {
        Self::Memory(MemoryDb::new())
    }

    pub fn backend_name(&self) -> &'static str {
        match self {
            Self::Firestore(_) => "firestore",
            Self::Memory(_) => "memory",
        }
    }

    /// Release the store client.
    pub async fn close(self) {
        let backend = self.backend_name();
        drop(self);
        tracing::info!(backend, "Database connection closed");
    }

    // ─── Generic Document Operations ─────────────────────────────

    /// Create a document. Fails with `AppError::Conflict` if the ID exists.
    pub async fn insert<T: Document>(&self, doc: &T) -> Result<(), AppError> {
        match self {
            Self::Firestore(db) => db.insert(doc).await,
            Self::Memory(db) => db.insert(doc),
        }
    }

    /// Fetch a document by ID.
    pub async fn get<T: Document>(&self, id: &str) -> Result<Option<T>, AppError> {
        match self {
            Self::Firestore(db) => db.get(id).await,
            Self::Memory(db) => db.get(id),
        }
    }

    /// Fetch the first document matching all filters.
    pub async fn find_one<T: Document>(&self, filters: &[Filter]) -> Result<Option<T>, AppError> {
        Ok(self.list(filters, None, 1).await?.into_iter().next())
    }

    /// List documents matching all filters, optionally ordered, up to `limit`.
    pub async fn list<T: Document>(
        &self,
        filters: &[Filter],
        order_by: Option<OrderBy>,
        limit: u32,
    ) -> Result<Vec<T>, AppError> {
        ensure_scoped(T::COLLECTION, filters)?;
        match self {
            Self::Firestore(db) => db.query(filters, order_by, Some(limit)).await,
            Self::Memory(db) => db.query(filters, order_by, Some(limit)),
        }
    }

    /// Delete a document by ID. Deleting a missing document is not an error.
    pub async fn delete<T: Document>(&self, id: &str) -> Result<(), AppError> {
        match self {
            Self::Firestore(db) => db.delete::<T>(id).await,
            Self::Memory(db) => db.delete::<T>(id),
        }
    }

    /// Delete every document matching all filters; returns how many matched.
    pub async fn delete_where<T: Document>(&self, filters: &[Filter]) -> Result<usize, AppError> {
        ensure_scoped(T::COLLECTION, filters)?;
        match self {
            Self::Firestore(db) => db.delete_where::<T>(filters).await,
            Self::Memory(db) => db.delete_where::<T>(filters),
        }
    }
}
