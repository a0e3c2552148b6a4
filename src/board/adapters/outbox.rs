//! Notification outbox.
//!
//! [`OutboxNotificationSender`] stands in for a real transport on the update
//! path: it only enqueues, so task updates never wait on mail delivery.
//! [`OutboxRelay`] drains the queue into a real [`NotificationSender`] from a
//! separate task, retrying failed entries up to a configured limit.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};
use uuid::Uuid;

use crate::board::{
    domain::Notification,
    ports::{NotificationError, NotificationResult, NotificationSender},
};

/// Outbox relay settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutboxConfig {
    /// Delivery attempts per entry before it is dropped.
    pub max_attempts: u32,
    /// Maximum number of entries delivered per relay pass.
    pub batch_size: usize,
}

impl Default for OutboxConfig {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            batch_size: 100,
        }
    }
}

/// A queued notification awaiting delivery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboxEntry {
    /// Stable entry identifier.
    pub id: Uuid,
    /// The notification to deliver.
    pub notification: Notification,
    /// Failed delivery attempts so far.
    pub attempts: u32,
}

/// Shared queue of pending notifications.
#[derive(Debug, Clone, Default)]
pub struct NotificationOutbox {
    entries: Arc<Mutex<VecDeque<OutboxEntry>>>,
}

impl NotificationOutbox {
    /// Creates an empty outbox.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of entries awaiting delivery.
    ///
    /// # Errors
    ///
    /// Returns [`NotificationError::Transport`] if the queue lock is poisoned.
    pub fn len(&self) -> NotificationResult<usize> {
        Ok(self.lock()?.len())
    }

    /// Returns `true` if nothing is awaiting delivery.
    ///
    /// # Errors
    ///
    /// Returns [`NotificationError::Transport`] if the queue lock is poisoned.
    pub fn is_empty(&self) -> NotificationResult<bool> {
        Ok(self.lock()?.is_empty())
    }

    /// Returns a copy of the pending entries, oldest first.
    ///
    /// # Errors
    ///
    /// Returns [`NotificationError::Transport`] if the queue lock is poisoned.
    pub fn pending(&self) -> NotificationResult<Vec<OutboxEntry>> {
        Ok(self.lock()?.iter().cloned().collect())
    }

    fn lock(&self) -> NotificationResult<MutexGuard<'_, VecDeque<OutboxEntry>>> {
        self.entries
            .lock()
            .map_err(|err| NotificationError::Transport(err.to_string()))
    }

    fn push(&self, entry: OutboxEntry) -> NotificationResult<()> {
        self.lock()?.push_back(entry);
        Ok(())
    }

    fn take(&self, limit: usize) -> NotificationResult<Vec<OutboxEntry>> {
        let mut entries = self.lock()?;
        let count = limit.min(entries.len());
        Ok(entries.drain(..count).collect())
    }
}

/// [`NotificationSender`] that records notifications into an outbox.
#[derive(Debug, Clone, Default)]
pub struct OutboxNotificationSender {
    outbox: NotificationOutbox,
}

impl OutboxNotificationSender {
    /// Creates a sender writing into `outbox`.
    #[must_use]
    pub const fn new(outbox: NotificationOutbox) -> Self {
        Self { outbox }
    }

    /// Returns the outbox this sender writes into.
    #[must_use]
    pub const fn outbox(&self) -> &NotificationOutbox {
        &self.outbox
    }
}

#[async_trait]
impl NotificationSender for OutboxNotificationSender {
    async fn send(&self, notification: &Notification) -> NotificationResult<()> {
        self.outbox.push(OutboxEntry {
            id: Uuid::new_v4(),
            notification: notification.clone(),
            attempts: 0,
        })
    }
}

/// Summary of one relay pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RelayReport {
    /// Entries handed to the transport.
    pub delivered: usize,
    /// Entries that failed and were queued again.
    pub requeued: usize,
    /// Entries that failed for the last permitted time and were dropped.
    pub dropped: usize,
}

/// Drains an outbox into a real transport.
#[derive(Debug, Clone)]
pub struct OutboxRelay<N>
where
    N: NotificationSender,
{
    outbox: NotificationOutbox,
    transport: Arc<N>,
    config: OutboxConfig,
}

impl<N> OutboxRelay<N>
where
    N: NotificationSender,
{
    /// Creates a relay from `outbox` to `transport`.
    #[must_use]
    pub const fn new(outbox: NotificationOutbox, transport: Arc<N>, config: OutboxConfig) -> Self {
        Self {
            outbox,
            transport,
            config,
        }
    }

    /// Delivers up to [`OutboxConfig::batch_size`] pending entries.
    ///
    /// Failed entries go to the back of the queue until they have failed
    /// [`OutboxConfig::max_attempts`] times.
    ///
    /// # Errors
    ///
    /// Returns [`NotificationError::Transport`] only when the outbox itself
    /// is unusable; delivery failures are reported in the [`RelayReport`].
    pub async fn relay(&self) -> NotificationResult<RelayReport> {
        let batch = self.outbox.take(self.config.batch_size)?;
        let mut report = RelayReport::default();
        for mut entry in batch {
            match self.transport.send(&entry.notification).await {
                Ok(()) => report.delivered += 1,
                Err(err) => {
                    entry.attempts += 1;
                    if entry.attempts >= self.config.max_attempts {
                        tracing::warn!(
                            entry_id = %entry.id,
                            attempts = entry.attempts,
                            %err,
                            "dropping undeliverable notification"
                        );
                        report.dropped += 1;
                    } else {
                        tracing::debug!(entry_id = %entry.id, %err, "requeueing notification");
                        self.outbox.push(entry)?;
                        report.requeued += 1;
                    }
                }
            }
        }
        Ok(report)
    }
}
