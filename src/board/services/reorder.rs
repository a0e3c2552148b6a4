//! Applying caller-supplied orderings to a column.

use super::{BoardServiceResult, OrderingError, OrderingPolicy};
use crate::board::{
    domain::{ColumnId, Task, TaskId, TaskOrder},
    ports::{TaskQuery, TaskRepository},
};
use mockable::Clock;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

/// Rewrites the ranks of one column's tasks to match a given sequence.
#[derive(Clone)]
pub struct Reorderer<T, C>
where
    T: TaskRepository,
    C: Clock + Send + Sync,
{
    tasks: Arc<T>,
    clock: Arc<C>,
    policy: OrderingPolicy,
}

impl<T, C> Reorderer<T, C>
where
    T: TaskRepository,
    C: Clock + Send + Sync,
{
    /// Creates a new reorderer.
    #[must_use]
    pub const fn new(tasks: Arc<T>, clock: Arc<C>, policy: OrderingPolicy) -> Self {
        Self {
            tasks,
            clock,
            policy,
        }
    }

    /// Gives the task at position `i` of `ordered_task_ids` rank `i + 1`.
    ///
    /// Every identifier must name a task currently in `column_id`. Under
    /// [`OrderingPolicy::Strict`] the sequence must also list each of the
    /// column's tasks exactly once. All checks run before any write, and the
    /// changed ranks are persisted in a single batch.
    ///
    /// Returns the tasks whose rank changed, lowest rank first.
    ///
    /// # Errors
    ///
    /// Returns [`super::BoardServiceError::Ordering`] when the sequence is
    /// rejected, or a repository error when a read or the batch write fails.
    pub async fn reorder(
        &self,
        column_id: ColumnId,
        ordered_task_ids: &[TaskId],
    ) -> BoardServiceResult<Vec<Task>> {
        let mut listed = self.load_listed(column_id, ordered_task_ids).await?;
        if self.policy == OrderingPolicy::Strict {
            self.ensure_permutation(column_id, ordered_task_ids).await?;
        }

        let mut ranks = HashMap::with_capacity(ordered_task_ids.len());
        for (position, task_id) in ordered_task_ids.iter().enumerate() {
            ranks.insert(*task_id, TaskOrder::from_position(position)?);
        }

        let mut changed: Vec<Task> = Vec::new();
        for (task_id, order) in ranks {
            let Some(task) = listed.get_mut(&task_id) else {
                continue;
            };
            if task.order() != order {
                task.rank(order, &*self.clock);
                changed.push(task.clone());
            }
        }
        changed.sort_by_key(Task::order);

        if !changed.is_empty() {
            self.tasks.update_many(&changed).await?;
        }
        tracing::debug!(
            %column_id,
            listed = ordered_task_ids.len(),
            changed = changed.len(),
            "reordered column"
        );
        Ok(changed)
    }

    /// Loads the listed tasks, failing if any is unknown or in another column.
    async fn load_listed(
        &self,
        column_id: ColumnId,
        ordered_task_ids: &[TaskId],
    ) -> BoardServiceResult<HashMap<TaskId, Task>> {
        if ordered_task_ids.is_empty() {
            return Ok(HashMap::new());
        }
        let query = TaskQuery::with_ids(ordered_task_ids.iter().copied());
        let listed: HashMap<TaskId, Task> = self
            .tasks
            .find_many(&query)
            .await?
            .into_iter()
            .map(|task| (task.id(), task))
            .collect();

        let stray = ordered_task_ids.iter().find(|task_id| {
            listed
                .get(task_id)
                .is_none_or(|task| task.column_id() != column_id)
        });
        if let Some(task_id) = stray {
            return Err(OrderingError::TaskNotInColumn {
                task_id: *task_id,
                column_id,
            }
            .into());
        }
        Ok(listed)
    }

    async fn ensure_permutation(
        &self,
        column_id: ColumnId,
        ordered_task_ids: &[TaskId],
    ) -> BoardServiceResult<()> {
        let mut seen = HashSet::with_capacity(ordered_task_ids.len());
        if let Some(repeated) = ordered_task_ids.iter().find(|id| !seen.insert(**id)) {
            return Err(OrderingError::DuplicateTask(*repeated).into());
        }

        let missing: Vec<TaskId> = self
            .tasks
            .find_many(&TaskQuery::in_column(column_id))
            .await?
            .iter()
            .map(Task::id)
            .filter(|task_id| !seen.contains(task_id))
            .collect();
        if !missing.is_empty() {
            return Err(OrderingError::IncompleteOrdering { column_id, missing }.into());
        }
        Ok(())
    }
}
