//! In-memory notification sender that records what it was asked to send.

use async_trait::async_trait;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::board::{
    domain::Notification,
    ports::{NotificationError, NotificationResult, NotificationSender},
};

/// Thread-safe sender that keeps every delivered notification in memory.
///
/// Can be switched into a failing mode to exercise best-effort delivery.
#[derive(Debug, Clone, Default)]
pub struct RecordingNotificationSender {
    state: Arc<RwLock<RecorderState>>,
}

#[derive(Debug, Default)]
struct RecorderState {
    sent: Vec<Notification>,
    attempts: usize,
    failure: Option<String>,
}

impl RecordingNotificationSender {
    /// Creates a sender that accepts every notification.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a sender that rejects every notification with `reason`.
    #[must_use]
    pub fn failing(reason: impl Into<String>) -> Self {
        let state = RecorderState {
            failure: Some(reason.into()),
            ..RecorderState::default()
        };
        Self {
            state: Arc::new(RwLock::new(state)),
        }
    }

    /// Switches failing mode on (`Some`) or off (`None`).
    ///
    /// # Errors
    ///
    /// Returns [`NotificationError::Transport`] if the recorder lock is poisoned.
    pub fn set_failure(&self, failure: Option<String>) -> NotificationResult<()> {
        self.write()?.failure = failure;
        Ok(())
    }

    /// Returns the notifications delivered so far.
    ///
    /// # Errors
    ///
    /// Returns [`NotificationError::Transport`] if the recorder lock is poisoned.
    pub fn sent(&self) -> NotificationResult<Vec<Notification>> {
        Ok(self.read()?.sent.clone())
    }

    /// Returns the number of send attempts, including failed ones.
    ///
    /// # Errors
    ///
    /// Returns [`NotificationError::Transport`] if the recorder lock is poisoned.
    pub fn attempts(&self) -> NotificationResult<usize> {
        Ok(self.read()?.attempts)
    }

    fn read(&self) -> NotificationResult<RwLockReadGuard<'_, RecorderState>> {
        self.state
            .read()
            .map_err(|err| NotificationError::Transport(err.to_string()))
    }

    fn write(&self) -> NotificationResult<RwLockWriteGuard<'_, RecorderState>> {
        self.state
            .write()
            .map_err(|err| NotificationError::Transport(err.to_string()))
    }
}

#[async_trait]
impl NotificationSender for RecordingNotificationSender {
    async fn send(&self, notification: &Notification) -> NotificationResult<()> {
        let mut state = self.write()?;
        state.attempts += 1;
        if let Some(reason) = &state.failure {
            return Err(NotificationError::Transport(reason.clone()));
        }
        state.sent.push(notification.clone());
        Ok(())
    }
}
