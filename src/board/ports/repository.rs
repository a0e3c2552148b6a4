//! Repository ports for tasks, columns, and task owners.

use crate::board::domain::{Column, ColumnId, Task, TaskId, TaskOrder, User, UserId};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for task repository operations.
pub type TaskRepositoryResult<T> = Result<T, TaskRepositoryError>;

/// Result type for column repository operations.
pub type ColumnRepositoryResult<T> = Result<T, ColumnRepositoryError>;

/// Result type for user repository operations.
pub type UserRepositoryResult<T> = Result<T, UserRepositoryError>;

/// Direction in which a task scan is ordered by rank.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RankDirection {
    /// Lowest rank first.
    #[default]
    Ascending,
    /// Highest rank first.
    Descending,
}

/// Filter, ordering, and pagination for task scans.
///
/// Results are ordered by rank in the requested direction; ties are broken by
/// creation time and then by task identifier so scans are deterministic.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskQuery {
    /// Restricts results to tasks in this column.
    pub column_id: Option<ColumnId>,
    /// Restricts results to tasks with these identifiers.
    pub ids: Option<Vec<TaskId>>,
    /// Restricts results to tasks owned by this user.
    pub owner_id: Option<UserId>,
    /// Rank ordering of the results.
    pub direction: RankDirection,
    /// Number of matching tasks to skip.
    pub offset: usize,
    /// Maximum number of tasks to return.
    pub limit: Option<usize>,
}

impl TaskQuery {
    /// Matches every task.
    #[must_use]
    pub fn all() -> Self {
        Self::default()
    }

    /// Matches tasks in `column_id`.
    #[must_use]
    pub fn in_column(column_id: ColumnId) -> Self {
        Self {
            column_id: Some(column_id),
            ..Self::default()
        }
    }

    /// Matches tasks whose identifier is in `ids`.
    #[must_use]
    pub fn with_ids(ids: impl IntoIterator<Item = TaskId>) -> Self {
        Self {
            ids: Some(ids.into_iter().collect()),
            ..Self::default()
        }
    }

    /// Restricts results to tasks owned by `owner_id`.
    #[must_use]
    pub const fn owned_by(mut self, owner_id: UserId) -> Self {
        self.owner_id = Some(owner_id);
        self
    }

    /// Sets the rank ordering.
    #[must_use]
    pub const fn ordered(mut self, direction: RankDirection) -> Self {
        self.direction = direction;
        self
    }

    /// Skips the first `offset` matches.
    #[must_use]
    pub const fn skip(mut self, offset: usize) -> Self {
        self.offset = offset;
        self
    }

    /// Returns at most `limit` matches.
    #[must_use]
    pub const fn take(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Returns `true` when `task` passes every filter of this query.
    #[must_use]
    pub fn matches(&self, task: &Task) -> bool {
        self.column_id.is_none_or(|id| task.column_id() == id)
            && self.owner_id.is_none_or(|id| task.owner_id() == Some(id))
            && self
                .ids
                .as_ref()
                .is_none_or(|ids| ids.contains(&task.id()))
    }
}

/// Task persistence contract.
///
/// Implementations enforce that no two tasks in one column share a rank.
#[async_trait]
pub trait TaskRepository: Send + Sync {
    /// Stores a new task.
    ///
    /// # Errors
    ///
    /// Returns [`TaskRepositoryError::DuplicateTask`] when the task ID already
    /// exists or [`TaskRepositoryError::DuplicateOrder`] when the task's rank
    /// is taken in its column.
    async fn store(&self, task: &Task) -> TaskRepositoryResult<()>;

    /// Persists changes to an existing task.
    ///
    /// # Errors
    ///
    /// Returns [`TaskRepositoryError::NotFound`] when the task does not exist
    /// or [`TaskRepositoryError::DuplicateOrder`] when the new rank is taken.
    async fn update(&self, task: &Task) -> TaskRepositoryResult<()>;

    /// Persists changes to several existing tasks as one unit.
    ///
    /// Either every task is written or none is. Rank uniqueness is checked
    /// against the state after all writes, so tasks may swap ranks.
    ///
    /// # Errors
    ///
    /// Returns [`TaskRepositoryError::NotFound`] when any task does not exist
    /// or [`TaskRepositoryError::DuplicateOrder`] when the resulting ranks
    /// collide.
    async fn update_many(&self, tasks: &[Task]) -> TaskRepositoryResult<()>;

    /// Deletes a task and returns its last persisted state.
    ///
    /// # Errors
    ///
    /// Returns [`TaskRepositoryError::NotFound`] when the task does not exist.
    async fn delete(&self, id: TaskId) -> TaskRepositoryResult<Task>;

    /// Finds a task by identifier.
    ///
    /// Returns `None` when the task does not exist.
    async fn find_by_id(&self, id: TaskId) -> TaskRepositoryResult<Option<Task>>;

    /// Returns the tasks matching `query`.
    async fn find_many(&self, query: &TaskQuery) -> TaskRepositoryResult<Vec<Task>>;
}

/// Errors returned by task repository implementations.
#[derive(Debug, Clone, Error)]
pub enum TaskRepositoryError {
    /// A task with the same identifier already exists.
    #[error("duplicate task identifier: {0}")]
    DuplicateTask(TaskId),

    /// Another task in the column already holds the rank.
    #[error("order {order} is already taken in column {column_id}")]
    DuplicateOrder {
        /// Column in which the collision happened.
        column_id: ColumnId,
        /// Colliding rank.
        order: TaskOrder,
    },

    /// The task was not found.
    #[error("task not found: {0}")]
    NotFound(TaskId),

    /// Persistence-layer failure.
    #[error("persistence error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl TaskRepositoryError {
    /// Wraps a persistence error.
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }
}

/// Column lookup contract.
#[async_trait]
pub trait ColumnRepository: Send + Sync {
    /// Finds a column by identifier.
    ///
    /// Returns `None` when the column does not exist.
    async fn find_by_id(&self, id: ColumnId) -> ColumnRepositoryResult<Option<Column>>;

    /// Returns all columns ordered by identifier.
    async fn list(&self) -> ColumnRepositoryResult<Vec<Column>>;
}

/// Errors returned by column repository implementations.
#[derive(Debug, Clone, Error)]
pub enum ColumnRepositoryError {
    /// The column was not found.
    #[error("column not found: {0}")]
    NotFound(ColumnId),

    /// Persistence-layer failure.
    #[error("persistence error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl ColumnRepositoryError {
    /// Wraps a persistence error.
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }
}

/// Task owner lookup contract.
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Finds a user by identifier.
    ///
    /// Returns `None` when the user does not exist.
    async fn find_by_id(&self, id: UserId) -> UserRepositoryResult<Option<User>>;
}

/// Errors returned by user repository implementations.
#[derive(Debug, Clone, Error)]
pub enum UserRepositoryError {
    /// Persistence-layer failure.
    #[error("persistence error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl UserRepositoryError {
    /// Wraps a persistence error.
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }
}
