//! Board columns and their lifecycle states.

use super::{ColumnId, ParseColumnStateError};
use serde::{Deserialize, Serialize};

/// Lifecycle state carried by a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnState {
    /// Work on tasks in this column has not started.
    #[serde(rename = "todo")]
    NotStarted,
    /// Tasks in this column are being worked on.
    InProgress,
    /// Tasks in this column are finished.
    Completed,
}

impl ColumnState {
    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::NotStarted => "todo",
            Self::InProgress => "in_progress",
            Self::Completed => "completed",
        }
    }

    /// Collapses the lifecycle state into its completion state.
    #[must_use]
    pub const fn completion(self) -> CompletionState {
        match self {
            Self::NotStarted | Self::InProgress => CompletionState::NotCompleted,
            Self::Completed => CompletionState::Completed,
        }
    }
}

impl TryFrom<&str> for ColumnState {
    type Error = ParseColumnStateError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let normalized = value.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "todo" | "not_started" => Ok(Self::NotStarted),
            "in_progress" => Ok(Self::InProgress),
            "completed" => Ok(Self::Completed),
            _ => Err(ParseColumnStateError(value.to_owned())),
        }
    }
}

/// Two-state view of a column used for completion notifications.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CompletionState {
    /// The column is not-started or in-progress.
    NotCompleted,
    /// The column is completed.
    Completed,
}

impl CompletionState {
    /// Returns `true` when moving from `self` to `next` completes a task.
    ///
    /// Only the `NotCompleted -> Completed` edge qualifies.
    #[must_use]
    pub const fn completes_on(self, next: Self) -> bool {
        matches!((self, next), (Self::NotCompleted, Self::Completed))
    }
}

/// A board column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Column {
    id: ColumnId,
    state: ColumnState,
}

impl Column {
    /// Creates a column value.
    #[must_use]
    pub const fn new(id: ColumnId, state: ColumnState) -> Self {
        Self { id, state }
    }

    /// Returns the column identifier.
    #[must_use]
    pub const fn id(&self) -> ColumnId {
        self.id
    }

    /// Returns the lifecycle state.
    #[must_use]
    pub const fn state(&self) -> ColumnState {
        self.state
    }

    /// Returns the collapsed completion state.
    #[must_use]
    pub const fn completion(&self) -> CompletionState {
        self.state.completion()
    }
}
