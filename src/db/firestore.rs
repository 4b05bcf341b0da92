// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Firestore client wrapper with typed document operations.

use super::{Direction, Document, Filter, OrderBy};
use crate::error::AppError;

// Firestore limits batch/transaction writes to 500 operations.
// We use a safe limit of 400 to allow headroom.
const BATCH_SIZE: usize = 400;

impl From<Direction> for firestore::FirestoreQueryDirection {
    fn from(direction: Direction) -> Self {
        match direction {
            Direction::Ascending => firestore::FirestoreQueryDirection::Ascending,
            Direction::Descending => firestore::FirestoreQueryDirection::Descending,
        }
    }
}

fn db_error(e: firestore::errors::FirestoreError) -> AppError {
    AppError::Database(e.to_string())
}

/// Firestore database client.
#[derive(Clone)]
pub struct FirestoreDb {
    client: firestore::FirestoreDb,
}

impl FirestoreDb {
    /// Create a new Firestore client.
    ///
    /// For local development with emulator, set FIRESTORE_EMULATOR_HOST.
    pub async fn new(project_id: &str, database_id: Option<&str>) -> Result<Self, AppError> {
        let mut options = firestore::FirestoreDbOptions::new(project_id.to_string());
        if let Some(database_id) = database_id {
            options = options.with_database_id(database_id.to_string());
        }

        // If the emulator environment variable is set, use unauthenticated connection
        // to avoid local credential warnings and leakage.
        if std::env::var("FIRESTORE_EMULATOR_HOST").is_ok() {
            return Self::create_emulator_client(options).await;
        }

        let client = firestore::FirestoreDb::with_options(options)
            .await
            .map_err(|e| AppError::Database(format!("Failed to connect to Firestore: {}", e)))?;

        tracing::info!(project = project_id, database = ?database_id, "Connected to Firestore");

        Ok(Self { client })
    }

    /// Create a Firestore client for the emulator with unauthenticated access.
    async fn create_emulator_client(
        options: firestore::FirestoreDbOptions,
    ) -> Result<Self, AppError> {
        tracing::info!("Using unauthenticated connection for Firestore Emulator");

        let project_id = options.google_project_id.clone();
        let token_source = gcloud_sdk::ExternalJwtFunctionSource::new(|| async {
            Ok(gcloud_sdk::Token {
                token_type: "Bearer".to_string(),
                token: gcloud_sdk::SecretValue::new(
                    "eyJhbGciOiJub25lIn0.eyJ1aWQiOiJ0ZXN0In0."
                        .to_string()
                        .into(),
                ),
                expiry: chrono::Utc::now() + chrono::Duration::hours(1),
            })
        });

        let client = firestore::FirestoreDb::with_options_token_source(
            options,
            gcloud_sdk::GCP_DEFAULT_SCOPES.clone(),
            gcloud_sdk::TokenSourceType::ExternalSource(Box::new(token_source)),
        )
        .await
        .map_err(|e| {
            AppError::Database(format!("Failed to connect to Firestore Emulator: {}", e))
        })?;

        tracing::info!(
            project = %project_id,
            "Connected to Firestore (Emulator/Unauthenticated)"
        );

        Ok(Self { client })
    }

    /// Create a document, failing if its ID is already taken.
    pub async fn insert<T: Document>(&self, doc: &T) -> Result<(), AppError> {
        let result: Result<T, _> = self
            .client
            .fluent()
            .insert()
            .into(T::COLLECTION)
            .document_id(doc.id())
            .object(doc)
            .execute()
            .await;

        result.map(|_| ()).map_err(|e| match e {
            firestore::errors::FirestoreError::DataConflictError(_) => AppError::Conflict(
                format!("Document {} already exists in {}", doc.id(), T::COLLECTION),
            ),
            other => db_error(other),
        })
    }

    pub async fn get<T: Document>(&self, id: &str) -> Result<Option<T>, AppError> {
        self.client
            .fluent()
            .select()
            .by_id_in(T::COLLECTION)
            .obj::<T>()
            .one(id)
            .await
            .map_err(db_error)
    }

    /// Run an equality-filtered query.
    pub async fn query<T: Document>(
        &self,
        filters: &[Filter],
        order_by: Option<OrderBy>,
        limit: Option<u32>,
    ) -> Result<Vec<T>, AppError> {
        let filters = filters.to_vec();
        let mut query = self
            .client
            .fluent()
            .select()
            .from(T::COLLECTION)
            .filter(move |q| {
                q.for_all(
                    filters
                        .iter()
                        .map(|f| q.field(f.field).eq(f.value.clone()))
                        .collect::<Vec<_>>(),
                )
            });

        if let Some((field, direction)) = order_by {
            query = query.order_by([(field, firestore::FirestoreQueryDirection::from(direction))]);
        }
        if let Some(limit) = limit {
            query = query.limit(limit);
        }

        query.obj::<T>().query().await.map_err(db_error)
    }

    pub async fn delete<T: Document>(&self, id: &str) -> Result<(), AppError> {
        self.client
            .fluent()
            .delete()
            .from(T::COLLECTION)
            .document_id(id)
            .execute()
            .await
            .map_err(db_error)?;
        Ok(())
    }

    /// Delete all matching documents in batched transactions.
    ///
    /// Returns the number of documents deleted.
    pub async fn delete_where<T: Document>(&self, filters: &[Filter]) -> Result<usize, AppError> {
        let docs: Vec<T> = self.query(filters, None, None).await?;

        for chunk in docs.chunks(BATCH_SIZE) {
            let mut transaction = self
                .client
                .begin_transaction()
                .await
                .map_err(|e| AppError::Database(format!("Failed to begin transaction: {}", e)))?;

            for doc in chunk {
                self.client
                    .fluent()
                    .delete()
                    .from(T::COLLECTION)
                    .document_id(doc.id())
                    .add_to_transaction(&mut transaction)
                    .map_err(|e| {
                        AppError::Database(format!(
                            "Failed to add deletion to transaction for {}: {}",
                            T::COLLECTION,
                            e
                        ))
                    })?;
            }

            transaction.commit().await.map_err(|e| {
                AppError::Database(format!("Failed to commit batch deletion: {}", e))
            })?;
        }

        tracing::debug!(
            collection = T::COLLECTION,
            count = docs.len(),
            "Deleted documents"
        );

        Ok(docs.len())
    }
}
