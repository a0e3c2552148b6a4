//! Service-level errors for board operations.

use crate::board::{
    domain::{BoardDomainError, ColumnId, TaskId, UserId},
    ports::{ColumnRepositoryError, TaskRepositoryError, UserRepositoryError},
};
use thiserror::Error;

/// A reorder request that cannot be applied to the column.
///
/// Raised before any rank is written.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum OrderingError {
    /// The task does not exist or lives in another column.
    #[error("task {task_id} does not belong to column {column_id}")]
    TaskNotInColumn {
        /// Offending task.
        task_id: TaskId,
        /// Column being reordered.
        column_id: ColumnId,
    },

    /// The task is listed more than once.
    #[error("task {0} appears more than once in the ordering")]
    DuplicateTask(TaskId),

    /// Some tasks of the column are missing from the ordering.
    #[error("ordering for column {column_id} omits {} task(s)", .missing.len())]
    IncompleteOrdering {
        /// Column being reordered.
        column_id: ColumnId,
        /// Tasks of the column that were not listed.
        missing: Vec<TaskId>,
    },
}

/// Errors returned by board services.
#[derive(Debug, Error)]
pub enum BoardServiceError {
    /// Domain validation failed.
    #[error(transparent)]
    Domain(#[from] BoardDomainError),

    /// A reorder request was rejected.
    #[error(transparent)]
    Ordering(#[from] OrderingError),

    /// The referenced owner does not exist.
    #[error("owner not found: {0}")]
    UnknownOwner(UserId),

    /// Task repository operation failed.
    #[error(transparent)]
    TaskRepository(#[from] TaskRepositoryError),

    /// Column repository operation failed.
    #[error(transparent)]
    ColumnRepository(#[from] ColumnRepositoryError),

    /// User repository operation failed.
    #[error(transparent)]
    UserRepository(#[from] UserRepositoryError),
}

/// Result type for board service operations.
pub type BoardServiceResult<T> = Result<T, BoardServiceError>;
