//! Board service configuration.

use serde::{Deserialize, Serialize};

/// How strictly a caller-supplied ordering is checked before it is applied.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderingPolicy {
    /// The ordering must list every task of the column exactly once.
    #[default]
    Strict,
    /// Any subset of the column's tasks is accepted; a repeated identifier
    /// takes its last position.
    Lenient,
}

/// Subject and body templates for task completion notifications.
///
/// Both are `minijinja` templates rendered with a `title` variable holding
/// the task title.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NotificationTemplates {
    /// Subject line template.
    pub subject: String,
    /// Plain-text body template.
    pub body: String,
}

impl Default for NotificationTemplates {
    fn default() -> Self {
        Self {
            subject: r#"Task "{{ title }}" completed!"#.to_owned(),
            body: r#"Good job! Your task "{{ title }}" has been marked as completed."#.to_owned(),
        }
    }
}

/// Configuration for [`super::BoardService`].
///
/// # Examples
///
/// ```
/// use taskboard::board::services::{BoardConfig, OrderingPolicy};
///
/// let config = BoardConfig::default();
/// assert_eq!(config.ordering_policy, OrderingPolicy::Strict);
///
/// let lenient = BoardConfig::lenient();
/// assert_eq!(lenient.ordering_policy, OrderingPolicy::Lenient);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BoardConfig {
    /// Validation applied to reorder requests.
    pub ordering_policy: OrderingPolicy,
    /// Extra attempts made when a freshly computed rank loses a race with a
    /// concurrent writer.
    pub rank_retry_limit: u8,
    /// Completion notification templates.
    pub notification: NotificationTemplates,
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self {
            ordering_policy: OrderingPolicy::Strict,
            rank_retry_limit: 3,
            notification: NotificationTemplates::default(),
        }
    }
}

impl BoardConfig {
    /// Creates a configuration that rejects partial or repeated orderings.
    #[must_use]
    pub fn strict() -> Self {
        Self::default()
    }

    /// Creates a configuration that applies partial orderings as given.
    ///
    /// The store's rank uniqueness check still rejects orderings that would
    /// collide with tasks left out of the request.
    #[must_use]
    pub fn lenient() -> Self {
        Self {
            ordering_policy: OrderingPolicy::Lenient,
            ..Self::default()
        }
    }

    /// Sets the notification templates.
    #[must_use]
    pub fn with_notification(mut self, notification: NotificationTemplates) -> Self {
        self.notification = notification;
        self
    }
}
