//! Completion notifications for tasks moving into a completed column.
//!
//! Column states collapse into [`CompletionState`]. An update that moves a
//! task from a `NotCompleted` column into a `Completed` one sends a single
//! notification to the task owner. Delivery is best-effort: once the update
//! has been written nothing here can fail it.

use super::{BoardServiceResult, NotificationTemplates};
use crate::board::{
    domain::{ColumnId, CompletionState, EmailAddress, Notification, Task},
    ports::{
        ColumnRepository, ColumnRepositoryError, NotificationError, NotificationResult,
        NotificationSender, UserRepository,
    },
};
use minijinja::Environment;
use serde_json::{Map, Value};
use std::sync::Arc;

/// Why a triggered notification was not sent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// The task has no owner.
    NoOwner,
    /// The owner reference does not resolve to a user.
    OwnerNotFound,
    /// The owner has no email address on file.
    NoEmail,
}

/// Result of evaluating one task update for a completion notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotificationOutcome {
    /// The update did not cross into a completed column.
    NotTriggered,
    /// A notification was handed to the sender.
    Sent,
    /// The update completed the task but there was nobody to notify.
    Skipped(SkipReason),
    /// The notification could not be produced or delivered.
    Failed(String),
}

/// Detects completion transitions and notifies task owners.
#[derive(Clone)]
pub struct TransitionNotifier<K, U, N>
where
    K: ColumnRepository,
    U: UserRepository,
    N: NotificationSender,
{
    columns: Arc<K>,
    users: Arc<U>,
    sender: Arc<N>,
    templates: NotificationTemplates,
}

impl<K, U, N> TransitionNotifier<K, U, N>
where
    K: ColumnRepository,
    U: UserRepository,
    N: NotificationSender,
{
    /// Creates a new transition notifier.
    #[must_use]
    pub const fn new(
        columns: Arc<K>,
        users: Arc<U>,
        sender: Arc<N>,
        templates: NotificationTemplates,
    ) -> Self {
        Self {
            columns,
            users,
            sender,
            templates,
        }
    }

    /// Reads the completion state of `column_id` ahead of an update.
    ///
    /// # Errors
    ///
    /// Returns [`super::BoardServiceError::ColumnRepository`] when the column
    /// does not exist or the lookup fails.
    pub async fn capture(&self, column_id: ColumnId) -> BoardServiceResult<CompletionState> {
        let column = self
            .columns
            .find_by_id(column_id)
            .await?
            .ok_or(ColumnRepositoryError::NotFound(column_id))?;
        Ok(column.completion())
    }

    /// Evaluates an applied update and notifies the owner when `task` has
    /// just entered a completed column.
    ///
    /// `previous` is the state captured with [`Self::capture`] before the
    /// update. Must be called once per update.
    pub async fn settle(&self, previous: CompletionState, task: &Task) -> NotificationOutcome {
        let outcome = self.evaluate(previous, task).await;
        match &outcome {
            NotificationOutcome::NotTriggered => {}
            NotificationOutcome::Sent => {
                tracing::info!(task_id = %task.id(), "sent task completion notification");
            }
            NotificationOutcome::Skipped(reason) => {
                tracing::debug!(
                    task_id = %task.id(),
                    ?reason,
                    "skipped task completion notification"
                );
            }
            NotificationOutcome::Failed(reason) => {
                tracing::warn!(
                    task_id = %task.id(),
                    %reason,
                    "task completion notification failed"
                );
            }
        }
        outcome
    }

    async fn evaluate(&self, previous: CompletionState, task: &Task) -> NotificationOutcome {
        if previous == CompletionState::Completed {
            return NotificationOutcome::NotTriggered;
        }
        let resulting = match self.capture(task.column_id()).await {
            Ok(state) => state,
            Err(err) => return NotificationOutcome::Failed(err.to_string()),
        };
        if !previous.completes_on(resulting) {
            return NotificationOutcome::NotTriggered;
        }

        let recipient = match self.recipient(task).await {
            Ok(recipient) => recipient,
            Err(outcome) => return outcome,
        };
        match self.deliver(recipient, task).await {
            Ok(()) => NotificationOutcome::Sent,
            Err(err) => NotificationOutcome::Failed(err.to_string()),
        }
    }

    async fn recipient(&self, task: &Task) -> Result<EmailAddress, NotificationOutcome> {
        let owner_id = task
            .owner_id()
            .ok_or(NotificationOutcome::Skipped(SkipReason::NoOwner))?;
        let owner = self
            .users
            .find_by_id(owner_id)
            .await
            .map_err(|err| NotificationOutcome::Failed(err.to_string()))?
            .ok_or(NotificationOutcome::Skipped(SkipReason::OwnerNotFound))?;
        owner
            .email()
            .cloned()
            .ok_or(NotificationOutcome::Skipped(SkipReason::NoEmail))
    }

    async fn deliver(&self, recipient: EmailAddress, task: &Task) -> NotificationResult<()> {
        let notification = render_notification(&self.templates, recipient, task)?;
        self.sender.send(&notification).await
    }
}

/// Renders the completion notification for `task`.
///
/// # Errors
///
/// Returns [`NotificationError::Template`] when either template fails to
/// render.
pub fn render_notification(
    templates: &NotificationTemplates,
    recipient: EmailAddress,
    task: &Task,
) -> NotificationResult<Notification> {
    let environment = Environment::new();
    let context = build_template_context(task);
    let render = |template: &str| {
        environment
            .render_str(template, &context)
            .map_err(|error| NotificationError::Template(error.to_string()))
    };
    let subject = render(&templates.subject)?;
    let body = render(&templates.body)?;
    Ok(Notification::new(recipient, subject, body))
}

fn build_template_context(task: &Task) -> Map<String, Value> {
    let mut context = Map::new();
    context.insert(
        "title".to_owned(),
        Value::String(task.title().as_str().to_owned()),
    );
    context.insert("task_id".to_owned(), Value::String(task.id().to_string()));
    context.insert(
        "column_id".to_owned(),
        Value::from(task.column_id().value()),
    );
    context
}
