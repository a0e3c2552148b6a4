//! Moving several tasks into one column.

use super::{
    BoardServiceResult, OrderAssigner, TransitionNotifier, ordering::is_rank_collision,
};
use crate::board::{
    domain::{ColumnId, CompletionState, Task, TaskId},
    ports::{
        ColumnRepository, ColumnRepositoryError, NotificationSender, RankDirection, TaskQuery,
        TaskRepository, UserRepository,
    },
};
use mockable::Clock;
use std::collections::HashMap;
use std::sync::Arc;

/// Appends a set of tasks to a target column as one contiguous block.
///
/// The tasks keep their relative rank order, whatever columns they came
/// from. Each task that changes column is evaluated for a completion
/// notification individually.
#[derive(Clone)]
pub struct BulkMover<T, K, U, N, C>
where
    T: TaskRepository,
    K: ColumnRepository,
    U: UserRepository,
    N: NotificationSender,
    C: Clock + Send + Sync,
{
    tasks: Arc<T>,
    columns: Arc<K>,
    assigner: OrderAssigner<T>,
    notifier: TransitionNotifier<K, U, N>,
    clock: Arc<C>,
    rank_retry_limit: u8,
}

/// Parameter object for [`BulkMover::new`].
pub struct BulkMoverParts<T, K, U, N, C>
where
    T: TaskRepository,
    K: ColumnRepository,
    U: UserRepository,
    N: NotificationSender,
    C: Clock + Send + Sync,
{
    /// Task store.
    pub tasks: Arc<T>,
    /// Column store.
    pub columns: Arc<K>,
    /// Completion notifier shared with the single-task update path.
    pub notifier: TransitionNotifier<K, U, N>,
    /// Clock used to stamp updated tasks.
    pub clock: Arc<C>,
    /// Extra attempts after losing a rank race.
    pub rank_retry_limit: u8,
}

impl<T, K, U, N, C> BulkMover<T, K, U, N, C>
where
    T: TaskRepository,
    K: ColumnRepository,
    U: UserRepository,
    N: NotificationSender,
    C: Clock + Send + Sync,
{
    /// Creates a new bulk mover.
    #[must_use]
    pub fn new(parts: BulkMoverParts<T, K, U, N, C>) -> Self {
        Self {
            assigner: OrderAssigner::new(Arc::clone(&parts.tasks)),
            tasks: parts.tasks,
            columns: parts.columns,
            notifier: parts.notifier,
            clock: parts.clock,
            rank_retry_limit: parts.rank_retry_limit,
        }
    }

    /// Moves `task_ids` to the end of `target_column_id`.
    ///
    /// The tasks are taken in ascending rank order and given consecutive
    /// ranks starting one past the target's current maximum. Unknown
    /// identifiers are ignored. An empty request touches nothing.
    ///
    /// Returns the moved tasks in their new order.
    ///
    /// # Errors
    ///
    /// Returns [`super::BoardServiceError::ColumnRepository`] when the target
    /// column does not exist, or a repository error when a read or the batch
    /// write fails. Nothing is written on error.
    pub async fn bulk_move(
        &self,
        task_ids: &[TaskId],
        target_column_id: ColumnId,
    ) -> BoardServiceResult<Vec<Task>> {
        if task_ids.is_empty() {
            return Ok(Vec::new());
        }
        self.columns
            .find_by_id(target_column_id)
            .await?
            .ok_or(ColumnRepositoryError::NotFound(target_column_id))?;

        let mut attempt: u8 = 0;
        loop {
            let query = TaskQuery::with_ids(task_ids.iter().copied())
                .ordered(RankDirection::Ascending);
            let selected = self.tasks.find_many(&query).await?;
            if selected.is_empty() {
                return Ok(Vec::new());
            }

            let previous = self.capture_sources(&selected, target_column_id).await?;
            let moved = self.place(selected, target_column_id).await?;
            match self.tasks.update_many(&moved).await {
                Ok(()) => {
                    tracing::debug!(
                        target_column_id = %target_column_id,
                        moved = moved.len(),
                        "bulk moved tasks"
                    );
                    for task in &moved {
                        if let Some(state) = previous.get(&task.id()) {
                            self.notifier.settle(*state, task).await;
                        }
                    }
                    return Ok(moved);
                }
                Err(err) if is_rank_collision(&err, attempt, self.rank_retry_limit) => {
                    attempt += 1;
                    tracing::debug!(%err, attempt, "rank collision during bulk move, retrying");
                }
                Err(err) => return Err(err.into()),
            }
        }
    }

    /// Captures the completion state of each task's source column, for tasks
    /// that are about to change column.
    async fn capture_sources(
        &self,
        selected: &[Task],
        target_column_id: ColumnId,
    ) -> BoardServiceResult<HashMap<TaskId, CompletionState>> {
        let mut by_column: HashMap<ColumnId, CompletionState> = HashMap::new();
        let mut previous = HashMap::with_capacity(selected.len());
        for task in selected {
            let source = task.column_id();
            if source == target_column_id {
                continue;
            }
            let state = match by_column.get(&source) {
                Some(state) => *state,
                None => {
                    let captured = self.notifier.capture(source).await?;
                    by_column.insert(source, captured);
                    captured
                }
            };
            previous.insert(task.id(), state);
        }
        Ok(previous)
    }

    async fn place(
        &self,
        selected: Vec<Task>,
        target_column_id: ColumnId,
    ) -> BoardServiceResult<Vec<Task>> {
        let mut order = self.assigner.next_order(target_column_id).await?;
        let mut moved = Vec::with_capacity(selected.len());
        let mut pending = selected.into_iter().peekable();
        while let Some(mut task) = pending.next() {
            task.place(target_column_id, order, &*self.clock);
            moved.push(task);
            if pending.peek().is_some() {
                order = order.successor()?;
            }
        }
        Ok(moved)
    }
}
