// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! In-process document store.
//!
//! Mirrors the Firestore backend's semantics (create-only inserts, equality
//! filters, ordering on string fields) for tests and local development.
//! Documents round-trip through `serde_json`, so the same serde attributes
//! are exercised as with Firestore.

use super::{Direction, Document, Filter, OrderBy};
use crate::error::AppError;
use dashmap::DashMap;
use serde_json::Value;
use std::sync::Arc;

/// Collection name -> documents in insertion order.
#[derive(Clone, Default)]
pub struct MemoryDb {
    collections: Arc<DashMap<&'static str, Vec<Value>>>,
}

fn matches(doc: &Value, filters: &[Filter]) -> bool {
    filters
        .iter()
        .all(|f| doc.get(f.field).and_then(Value::as_str) == Some(f.value.as_str()))
}

fn sort_key<'a>(doc: &'a Value, field: &str) -> &'a str {
    doc.get(field).and_then(Value::as_str).unwrap_or("")
}

fn decode<T: Document>(doc: Value) -> Result<T, AppError> {
    serde_json::from_value(doc).map_err(|e| {
        AppError::Database(format!("Corrupt document in {}: {}", T::COLLECTION, e))
    })
}

impl MemoryDb {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert<T: Document>(&self, doc: &T) -> Result<(), AppError> {
        let value = serde_json::to_value(doc).map_err(|e| AppError::Database(e.to_string()))?;

        // The shard lock is held across check and push, so concurrent inserts
        // of the same ID cannot both succeed.
        let mut docs = self.collections.entry(T::COLLECTION).or_default();
        if docs.iter().any(|d| sort_key(d, "id") == doc.id()) {
            return Err(AppError::Conflict(format!(
                "Document {} already exists in {}",
                doc.id(),
                T::COLLECTION
            )));
        }
        docs.push(value);
        Ok(())
    }

    pub fn get<T: Document>(&self, id: &str) -> Result<Option<T>, AppError> {
        Ok(self
            .query(&[Filter::eq("id", id)], None, Some(1))?
            .into_iter()
            .next())
    }

    pub fn query<T: Document>(
        &self,
        filters: &[Filter],
        order_by: Option<OrderBy>,
        limit: Option<u32>,
    ) -> Result<Vec<T>, AppError> {
        let mut found: Vec<Value> = match self.collections.get(T::COLLECTION) {
            Some(docs) => docs.iter().filter(|d| matches(d, filters)).cloned().collect(),
            None => return Ok(Vec::new()),
        };

        if let Some((field, direction)) = order_by {
            // Stable sort keeps insertion order for equal keys.
            found.sort_by(|a, b| {
                let ord = sort_key(a, field).cmp(sort_key(b, field));
                match direction {
                    Direction::Ascending => ord,
                    Direction::Descending => ord.reverse(),
                }
            });
        }

        if let Some(limit) = limit {
            found.truncate(limit as usize);
        }

        found.into_iter().map(decode::<T>).collect()
    }

    pub fn delete<T: Document>(&self, id: &str) -> Result<(), AppError> {
        self.delete_where::<T>(&[Filter::eq("id", id)]).map(|_| ())
    }

    pub fn delete_where<T: Document>(&self, filters: &[Filter]) -> Result<usize, AppError> {
        let Some(mut docs) = self.collections.get_mut(T::COLLECTION) else {
            return Ok(0);
        };
        let before = docs.len();
        docs.retain(|d| !matches(d, filters));
        Ok(before - docs.len())
    }
}
