//! Notification delivery port.

use crate::board::domain::Notification;
use async_trait::async_trait;
use thiserror::Error;

/// Result type for notification delivery.
pub type NotificationResult<T> = Result<T, NotificationError>;

/// Delivers rendered notifications to their recipient.
#[async_trait]
pub trait NotificationSender: Send + Sync {
    /// Sends a single notification.
    ///
    /// # Errors
    ///
    /// Returns [`NotificationError::Transport`] when the message could not be
    /// handed to the transport.
    async fn send(&self, notification: &Notification) -> NotificationResult<()>;
}

/// Errors raised while producing or delivering a notification.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum NotificationError {
    /// The transport rejected or failed to deliver the message.
    #[error("notification transport failed: {0}")]
    Transport(String),

    /// The subject or body template could not be rendered.
    #[error("failed to render notification template: {0}")]
    Template(String),
}
