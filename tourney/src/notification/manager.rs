//! Notification outbox implementation.

use super::models::{NewNotification, Notice, Notification};
use crate::auth::UserId;
use crate::db::{Store, StoreError};
use crate::errors::ErrorKind;
use log::debug;
use std::sync::Arc;
use thiserror::Error;

/// Notification errors
#[derive(Debug, Error)]
pub enum NotificationError {
    #[error("Notification message cannot be empty")]
    EmptyMessage,

    #[error("Storage error: {0}")]
    Store(#[from] StoreError),
}

impl NotificationError {
    /// Error category
    pub fn kind(&self) -> ErrorKind {
        match self {
            NotificationError::EmptyMessage => ErrorKind::Validation,
            NotificationError::Store(_) => ErrorKind::Internal,
        }
    }

    /// Get a client-safe error message
    pub fn client_message(&self) -> String {
        match self {
            NotificationError::Store(_) => "Internal server error".to_string(),
            _ => self.to_string(),
        }
    }
}

pub type NotificationResult<T> = Result<T, NotificationError>;

/// Notification outbox
#[derive(Clone)]
pub struct NotificationManager {
    store: Arc<dyn Store>,
}

impl NotificationManager {
    /// Create a new notification outbox
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    /// Append an unread notification for a user
    pub async fn emit(&self, user_id: UserId, message: String) -> NotificationResult<Notification> {
        if message.trim().is_empty() {
            return Err(NotificationError::EmptyMessage);
        }

        let notification = self
            .store
            .create_notification(&NewNotification { user_id, message })
            .await?;
        Ok(notification)
    }

    /// Append the message of a domain event for a user
    pub async fn emit_notice(
        &self,
        user_id: UserId,
        notice: &Notice,
    ) -> NotificationResult<Notification> {
        self.emit(user_id, notice.to_string()).await
    }

    /// Take every unread notification of a user, most recent first, marking them read
    ///
    /// Never fails for a user without unread notifications; the result is
    /// simply empty.
    pub async fn poll(&self, user_id: UserId) -> NotificationResult<Vec<Notification>> {
        let mut delivered = self.store.take_unread(user_id).await?;
        newest_first(&mut delivered);

        if !delivered.is_empty() {
            debug!("Delivered {} notification(s) to user {}", delivered.len(), user_id);
        }
        Ok(delivered)
    }
}

/// Ids grow with insertion order in every store; timestamps may not
fn newest_first(notifications: &mut [Notification]) {
    notifications.sort_by(|a, b| b.id.cmp(&a.id));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::MemoryStore;

    #[tokio::test]
    async fn test_poll_marks_read() {
        let outbox = NotificationManager::new(Arc::new(MemoryStore::new()));
        outbox.emit(1, "first".to_string()).await.unwrap();
        outbox.emit(1, "second".to_string()).await.unwrap();
        outbox.emit(2, "other user".to_string()).await.unwrap();

        let delivered = outbox.poll(1).await.unwrap();
        let messages: Vec<_> = delivered.iter().map(|n| n.message.as_str()).collect();
        assert_eq!(messages, vec!["second", "first"]);
        assert!(delivered.iter().all(|n| n.read && n.user_id == 1));

        assert!(outbox.poll(1).await.unwrap().is_empty());
        assert_eq!(outbox.poll(2).await.unwrap().len(), 1);
    }

    #[test]
    fn test_newest_first_ignores_clock_skew() {
        use chrono::{Duration, Utc};

        let now = Utc::now();
        let note = |id, created_at| Notification {
            id,
            user_id: 1,
            message: format!("n{id}"),
            read: true,
            created_at,
        };
        // Wall clock stepped backwards between the second and third insert
        let mut batch = vec![
            note(1, now),
            note(3, now - Duration::seconds(30)),
            note(2, now + Duration::seconds(1)),
        ];

        newest_first(&mut batch);
        let ids: Vec<_> = batch.iter().map(|n| n.id).collect();
        assert_eq!(ids, vec![3, 2, 1]);
    }

    #[tokio::test]
    async fn test_poll_unknown_user_is_empty() {
        let outbox = NotificationManager::new(Arc::new(MemoryStore::new()));
        assert!(outbox.poll(9999).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_emit_rejects_blank_messages() {
        let outbox = NotificationManager::new(Arc::new(MemoryStore::new()));
        let err = outbox.emit(1, "  ".to_string()).await.unwrap_err();
        assert!(matches!(err, NotificationError::EmptyMessage));
        assert_eq!(err.kind(), ErrorKind::Validation);
    }

    #[tokio::test]
    async fn test_emit_notice() {
        let outbox = NotificationManager::new(Arc::new(MemoryStore::new()));
        let notice = Notice::Enrolled {
            tournament: "Cup".to_string(),
        };
        let n = outbox.emit_notice(5, &notice).await.unwrap();
        assert_eq!(n.message, "Você se inscreveu no: Cup");
        assert!(!n.read);
    }
}
