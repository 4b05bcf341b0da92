// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Typed operations for users, trusted contacts and alerts.

use super::{Database, Direction, Filter};
use crate::error::AppError;
use crate::models::{Alert, EmailClaim, TrustedContact, User};

/// Maximum contacts returned by a listing (and notified per alert).
pub const MAX_CONTACTS: u32 = 100;
/// Maximum alerts returned by a listing.
pub const MAX_ALERTS: u32 = 50;

impl Database {
    // ─── User Operations ─────────────────────────────────────────

    /// Store a new user, reserving their email first.
    ///
    /// A taken email yields `AppError::EmailAlreadyExists`. If the user write
    /// fails after the claim succeeded, the claim is released again.
    pub async fn create_user(&self, user: &User) -> Result<(), AppError> {
        let claim = EmailClaim::new(&user.email, &user.id);
        self.insert(&claim).await.map_err(|e| match e {
            AppError::Conflict(_) => AppError::EmailAlreadyExists,
            other => other,
        })?;

        if let Err(e) = self.insert(user).await {
            if let Err(cleanup) = self.delete::<EmailClaim>(&claim.id).await {
                tracing::warn!(
                    user_id = %user.id,
                    error = %cleanup,
                    "Failed to release email claim after user write failure"
                );
            }
            return Err(e);
        }

        tracing::info!(user_id = %user.id, "User created");
        Ok(())
    }

    pub async fn get_user(&self, user_id: &str) -> Result<Option<User>, AppError> {
        self.get(user_id).await
    }

    /// Exact (case-sensitive) email lookup.
    pub async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        self.find_one(&[Filter::eq("email", email)]).await
    }

    // ─── Trusted Contact Operations ──────────────────────────────

    pub async fn create_contact(&self, contact: &TrustedContact) -> Result<(), AppError> {
        self.insert(contact).await
    }

    /// Contacts owned by a user, oldest first.
    pub async fn list_contacts(&self, user_id: &str) -> Result<Vec<TrustedContact>, AppError> {
        self.list(
            &[Filter::eq("user_id", user_id)],
            Some(("created_at", Direction::Ascending)),
            MAX_CONTACTS,
        )
        .await
    }

    /// Delete a contact only if it belongs to `user_id`.
    ///
    /// Returns `false` when nothing matched.
    pub async fn delete_contact(&self, user_id: &str, contact_id: &str) -> Result<bool, AppError> {
        let deleted = self
            .delete_where::<TrustedContact>(&[
                Filter::eq("id", contact_id),
                Filter::eq("user_id", user_id),
            ])
            .await?;
        Ok(deleted > 0)
    }

    // ─── Alert Operations ────────────────────────────────────────

    pub async fn create_alert(&self, alert: &Alert) -> Result<(), AppError> {
        self.insert(alert).await
    }

    /// Alerts sent by a user, newest first.
    pub async fn list_alerts(&self, user_id: &str) -> Result<Vec<Alert>, AppError> {
        self.list(
            &[Filter::eq("user_id", user_id)],
            Some(("timestamp", Direction::Descending)),
            MAX_ALERTS,
        )
        .await
    }

    // ─── User Data Deletion ──────────────────────────────────────

    /// Delete ALL data for a user.
    ///
    /// Deletes from all collections:
    /// - `trusted_contacts` (query by user_id)
    /// - `alerts` (query by user_id)
    /// - `user_emails` (query by user_id)
    /// - `users/{user_id}`
    ///
    /// Returns the number of documents deleted.
    pub async fn delete_user_data(&self, user_id: &str) -> Result<usize, AppError> {
        let by_owner = [Filter::eq("user_id", user_id)];
        let mut deleted_count = 0;

        let count = self.delete_where::<TrustedContact>(&by_owner).await?;
        deleted_count += count;
        tracing::debug!(user_id, count, "Deleted trusted contacts");

        let count = self.delete_where::<Alert>(&by_owner).await?;
        deleted_count += count;
        tracing::debug!(user_id, count, "Deleted alerts");

        let count = self.delete_where::<EmailClaim>(&by_owner).await?;
        deleted_count += count;
        tracing::debug!(user_id, count, "Released email claims");

        let count = self
            .delete_where::<User>(&[Filter::eq("id", user_id)])
            .await?;
        deleted_count += count;
        tracing::debug!(user_id, "Deleted user profile");

        tracing::info!(user_id, deleted_count, "User data deletion complete");

        Ok(deleted_count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(email: &str) -> User {
        User::new(email.to_string(), "Test".to_string(), None, "hash".to_string())
    }

    #[tokio::test]
    async fn test_create_user_enforces_unique_email() {
        let db = Database::in_memory();
        db.create_user(&user("alice@example.com")).await.unwrap();

        let err = db.create_user(&user("alice@example.com")).await.unwrap_err();
        assert!(matches!(err, AppError::EmailAlreadyExists));

        // Case-sensitive as stored
        db.create_user(&user("Alice@example.com")).await.unwrap();
    }

    #[tokio::test]
    async fn test_delete_contact_scoped_to_owner() {
        let db = Database::in_memory();
        let contact = TrustedContact::new(
            "owner",
            "Bob".to_string(),
            "bob@example.com".to_string(),
            None,
        );
        db.create_contact(&contact).await.unwrap();

        assert!(!db.delete_contact("intruder", &contact.id).await.unwrap());
        assert_eq!(db.list_contacts("owner").await.unwrap().len(), 1);

        assert!(db.delete_contact("owner", &contact.id).await.unwrap());
        assert!(db.list_contacts("owner").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_list_contacts_caps_and_orders() {
        let db = Database::in_memory();
        let mut ids = Vec::new();
        for i in 0..(MAX_CONTACTS + 5) {
            let mut contact = TrustedContact::new(
                "u1",
                format!("Contact {}", i),
                format!("c{}@example.com", i),
                None,
            );
            contact.created_at = contact.created_at + chrono::Duration::seconds(i as i64);
            ids.push(contact.id.clone());
            db.create_contact(&contact).await.unwrap();
        }

        let contacts = db.list_contacts("u1").await.unwrap();
        let listed: Vec<String> = contacts.into_iter().map(|c| c.id).collect();
        assert_eq!(listed, ids[..MAX_CONTACTS as usize]);
    }

    #[tokio::test]
    async fn test_list_alerts_caps_and_orders() {
        let db = Database::in_memory();
        for i in 0..(MAX_ALERTS + 5) {
            let mut alert = Alert::new("u1", Some(format!("spot {}", i)), vec![]);
            alert.timestamp = alert.timestamp + chrono::Duration::seconds(i as i64);
            db.create_alert(&alert).await.unwrap();
        }

        let alerts = db.list_alerts("u1").await.unwrap();
        assert_eq!(alerts.len(), MAX_ALERTS as usize);
        assert!(alerts.windows(2).all(|w| w[0].timestamp >= w[1].timestamp));
        assert_eq!(
            alerts[0].location.as_deref(),
            Some(format!("spot {}", MAX_ALERTS + 4).as_str())
        );
    }

    #[tokio::test]
    async fn test_delete_user_data_frees_email() {
        let db = Database::in_memory();
        let alice = user("alice@example.com");
        db.create_user(&alice).await.unwrap();
        db.create_contact(&TrustedContact::new(
            &alice.id,
            "Bob".to_string(),
            "bob@example.com".to_string(),
            None,
        ))
        .await
        .unwrap();
        db.create_alert(&Alert::new(&alice.id, None, vec![]))
            .await
            .unwrap();

        // contact + alert + claim + user
        assert_eq!(db.delete_user_data(&alice.id).await.unwrap(), 4);
        assert!(db.get_user(&alice.id).await.unwrap().is_none());
        assert!(db.list_alerts(&alice.id).await.unwrap().is_empty());

        db.create_user(&user("alice@example.com")).await.unwrap();
    }
}
