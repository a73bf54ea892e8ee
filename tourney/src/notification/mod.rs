//! Notification outbox with pull-based, exactly-once delivery.
//!
//! Domain operations queue [`NewNotification`]s in the same store operation as
//! the state change that triggered them. Clients poll; a poll takes every
//! unread notification of the user and marks it read in one atomic step, so a
//! notification is handed out at most once even under concurrent polling.

pub mod manager;
pub mod models;

pub use manager::{NotificationError, NotificationManager, NotificationResult};
pub use models::{NewNotification, Notice, Notification, NotificationId};
