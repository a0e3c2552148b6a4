//! Rank assignment for tasks entering a column.

use super::BoardServiceResult;
use crate::board::{
    domain::{ColumnId, TaskOrder},
    ports::{RankDirection, TaskQuery, TaskRepository, TaskRepositoryError},
};
use std::sync::Arc;

/// Computes the rank for a task appended to a column.
#[derive(Clone)]
pub struct OrderAssigner<T>
where
    T: TaskRepository,
{
    tasks: Arc<T>,
}

impl<T> OrderAssigner<T>
where
    T: TaskRepository,
{
    /// Creates a new order assigner.
    #[must_use]
    pub const fn new(tasks: Arc<T>) -> Self {
        Self { tasks }
    }

    /// Returns one past the highest rank in `column_id`, or
    /// [`TaskOrder::FIRST`] when the column is empty.
    ///
    /// The result is only a candidate: a concurrent writer may claim it
    /// first, in which case the store rejects the later write with
    /// [`TaskRepositoryError::DuplicateOrder`].
    ///
    /// # Errors
    ///
    /// Returns [`super::BoardServiceError::TaskRepository`] when the scan
    /// fails, or [`super::BoardServiceError::Domain`] when the column's
    /// highest rank has no successor.
    pub async fn next_order(&self, column_id: ColumnId) -> BoardServiceResult<TaskOrder> {
        let query = TaskQuery::in_column(column_id)
            .ordered(RankDirection::Descending)
            .take(1);
        let last = self.tasks.find_many(&query).await?.into_iter().next();
        let next = match last {
            Some(task) => task.order().successor()?,
            None => TaskOrder::FIRST,
        };
        tracing::debug!(%column_id, order = %next, "computed next task order");
        Ok(next)
    }
}

/// Returns `true` when `error` is a lost rank race that may be retried.
pub(crate) const fn is_rank_collision(
    error: &TaskRepositoryError,
    attempt: u8,
    retry_limit: u8,
) -> bool {
    matches!(error, TaskRepositoryError::DuplicateOrder { .. }) && attempt < retry_limit
}
