//! Caller-facing board operations.

use super::{
    BoardConfig, BoardServiceError, BoardServiceResult, BulkMover, BulkMoverParts,
    OrderAssigner, Reorderer, TransitionNotifier, ordering::is_rank_collision,
};
use crate::board::{
    domain::{
        Column, ColumnId, Task, TaskChanges, TaskDraft, TaskId, TaskOrder, TaskTitle, UserId,
    },
    ports::{
        ColumnRepository, ColumnRepositoryError, NotificationSender, TaskQuery, TaskRepository,
        TaskRepositoryError, UserRepository,
    },
};
use mockable::Clock;
use std::sync::Arc;

/// Request payload for creating a task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateTaskRequest {
    title: String,
    column_id: ColumnId,
    description: Option<String>,
    owner_id: Option<UserId>,
}

impl CreateTaskRequest {
    /// Creates a request with the required fields.
    #[must_use]
    pub fn new(title: impl Into<String>, column_id: ColumnId) -> Self {
        Self {
            title: title.into(),
            column_id,
            description: None,
            owner_id: None,
        }
    }

    /// Sets the task description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Sets the task owner.
    #[must_use]
    pub const fn with_owner(mut self, owner_id: UserId) -> Self {
        self.owner_id = Some(owner_id);
        self
    }
}

/// Request payload for a field-level task update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateTaskRequest {
    task_id: TaskId,
    title: Option<String>,
    description: Option<String>,
    owner_id: Option<UserId>,
    column_id: Option<ColumnId>,
}

impl UpdateTaskRequest {
    /// Creates an update that changes nothing yet.
    #[must_use]
    pub const fn new(task_id: TaskId) -> Self {
        Self {
            task_id,
            title: None,
            description: None,
            owner_id: None,
            column_id: None,
        }
    }

    /// Replaces the title.
    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Replaces the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Reassigns the task.
    #[must_use]
    pub const fn with_owner(mut self, owner_id: UserId) -> Self {
        self.owner_id = Some(owner_id);
        self
    }

    /// Moves the task to another column.
    #[must_use]
    pub const fn with_column(mut self, column_id: ColumnId) -> Self {
        self.column_id = Some(column_id);
        self
    }

    /// Returns the identifier of the task being updated.
    #[must_use]
    pub const fn task_id(&self) -> TaskId {
        self.task_id
    }

    fn into_changes(self) -> BoardServiceResult<TaskChanges> {
        let title = self.title.map(TaskTitle::new).transpose()?;
        Ok(TaskChanges {
            title,
            description: self.description,
            owner_id: self.owner_id,
            column_id: self.column_id,
        })
    }
}

/// A column together with its tasks, lowest rank first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnWithTasks {
    /// The column.
    pub column: Column,
    /// Tasks currently in the column.
    pub tasks: Vec<Task>,
}

/// Board orchestration service.
///
/// Creation, column changes, reordering, and bulk moves all go through here.
/// Every update that changes a task's column is checked for a completion
/// notification.
pub struct BoardService<T, K, U, N, C>
where
    T: TaskRepository,
    K: ColumnRepository,
    U: UserRepository,
    N: NotificationSender,
    C: Clock + Send + Sync,
{
    tasks: Arc<T>,
    columns: Arc<K>,
    users: Arc<U>,
    sender: Arc<N>,
    clock: Arc<C>,
    config: BoardConfig,
}

impl<T, K, U, N, C> Clone for BoardService<T, K, U, N, C>
where
    T: TaskRepository,
    K: ColumnRepository,
    U: UserRepository,
    N: NotificationSender,
    C: Clock + Send + Sync,
{
    fn clone(&self) -> Self {
        Self {
            tasks: Arc::clone(&self.tasks),
            columns: Arc::clone(&self.columns),
            users: Arc::clone(&self.users),
            sender: Arc::clone(&self.sender),
            clock: Arc::clone(&self.clock),
            config: self.config.clone(),
        }
    }
}

impl<T, K, U, N, C> BoardService<T, K, U, N, C>
where
    T: TaskRepository,
    K: ColumnRepository,
    U: UserRepository,
    N: NotificationSender,
    C: Clock + Send + Sync,
{
    /// Creates a new board service with the default configuration.
    #[must_use]
    pub fn new(
        tasks: Arc<T>,
        columns: Arc<K>,
        users: Arc<U>,
        sender: Arc<N>,
        clock: Arc<C>,
    ) -> Self {
        Self {
            tasks,
            columns,
            users,
            sender,
            clock,
            config: BoardConfig::default(),
        }
    }

    /// Replaces the service configuration.
    #[must_use]
    pub fn with_config(mut self, config: BoardConfig) -> Self {
        self.config = config;
        self
    }

    /// Returns the active configuration.
    #[must_use]
    pub const fn config(&self) -> &BoardConfig {
        &self.config
    }

    fn assigner(&self) -> OrderAssigner<T> {
        OrderAssigner::new(Arc::clone(&self.tasks))
    }

    fn notifier(&self) -> TransitionNotifier<K, U, N> {
        TransitionNotifier::new(
            Arc::clone(&self.columns),
            Arc::clone(&self.users),
            Arc::clone(&self.sender),
            self.config.notification.clone(),
        )
    }

    /// Returns the rank a task appended to `column_id` would receive.
    ///
    /// # Errors
    ///
    /// Returns [`BoardServiceError::TaskRepository`] when the scan fails.
    pub async fn assign_next_order(&self, column_id: ColumnId) -> BoardServiceResult<TaskOrder> {
        self.assigner().next_order(column_id).await
    }

    /// Creates a task at the end of its column.
    ///
    /// # Errors
    ///
    /// Returns [`BoardServiceError::Domain`] for an empty title,
    /// [`BoardServiceError::UnknownOwner`] when the owner does not exist,
    /// [`ColumnRepositoryError::NotFound`] when the column does not exist, or
    /// a repository error when persistence fails.
    pub async fn create_task(&self, request: CreateTaskRequest) -> BoardServiceResult<Task> {
        let draft = TaskDraft {
            title: TaskTitle::new(request.title)?,
            description: request.description,
            owner_id: request.owner_id,
            column_id: request.column_id,
        };
        self.ensure_column(draft.column_id).await?;
        if let Some(owner_id) = draft.owner_id {
            self.ensure_owner(owner_id).await?;
        }

        let assigner = self.assigner();
        let mut attempt: u8 = 0;
        loop {
            let order = assigner.next_order(draft.column_id).await?;
            let task = Task::new(draft.clone(), order, &*self.clock);
            match self.tasks.store(&task).await {
                Ok(()) => return Ok(task),
                Err(err) if is_rank_collision(&err, attempt, self.config.rank_retry_limit) => {
                    attempt += 1;
                    tracing::debug!(%err, attempt, "rank collision on task creation, retrying");
                }
                Err(err) => return Err(err.into()),
            }
        }
    }

    /// Applies field-level changes to a task.
    ///
    /// When the update moves the task to another column, the task is
    /// appended to that column and the owner is notified if the move crosses
    /// into a completed column. Notification problems never fail the update.
    ///
    /// # Errors
    ///
    /// Returns [`TaskRepositoryError::NotFound`] when the task does not
    /// exist, [`BoardServiceError::Domain`] for an empty title,
    /// [`BoardServiceError::UnknownOwner`] when the new owner does not exist,
    /// [`ColumnRepositoryError::NotFound`] when either column does not exist,
    /// or a repository error when persistence fails.
    pub async fn update_task_with_transition_check(
        &self,
        request: UpdateTaskRequest,
    ) -> BoardServiceResult<Task> {
        let task_id = request.task_id();
        let changes = request.into_changes()?;
        let current = self
            .tasks
            .find_by_id(task_id)
            .await?
            .ok_or(TaskRepositoryError::NotFound(task_id))?;
        if let Some(owner_id) = changes.owner_id {
            self.ensure_owner(owner_id).await?;
        }

        let notifier = self.notifier();
        let target = changes.column_id.filter(|_| changes.moves(&current));
        let Some(target_column_id) = target else {
            let mut updated = current;
            updated.edit(&changes, &*self.clock);
            self.tasks.update(&updated).await?;
            return Ok(updated);
        };

        let previous = notifier.capture(current.column_id()).await?;
        self.ensure_column(target_column_id).await?;
        let updated = self.write_move(&current, &changes, target_column_id).await?;
        notifier.settle(previous, &updated).await;
        Ok(updated)
    }

    async fn write_move(
        &self,
        current: &Task,
        changes: &TaskChanges,
        target_column_id: ColumnId,
    ) -> BoardServiceResult<Task> {
        let assigner = self.assigner();
        let mut attempt: u8 = 0;
        loop {
            let order = assigner.next_order(target_column_id).await?;
            let mut updated = current.clone();
            updated.edit(changes, &*self.clock);
            updated.place(target_column_id, order, &*self.clock);
            match self.tasks.update(&updated).await {
                Ok(()) => return Ok(updated),
                Err(err) if is_rank_collision(&err, attempt, self.config.rank_retry_limit) => {
                    attempt += 1;
                    tracing::debug!(%err, attempt, "rank collision on task move, retrying");
                }
                Err(err) => return Err(err.into()),
            }
        }
    }

    /// Gives the tasks of `column_id` the ranks 1..n in the order listed.
    ///
    /// See [`Reorderer::reorder`].
    ///
    /// # Errors
    ///
    /// Returns [`BoardServiceError::Ordering`] when the sequence is rejected,
    /// or a repository error when persistence fails.
    pub async fn reorder(
        &self,
        column_id: ColumnId,
        ordered_task_ids: &[TaskId],
    ) -> BoardServiceResult<Vec<Task>> {
        Reorderer::new(
            Arc::clone(&self.tasks),
            Arc::clone(&self.clock),
            self.config.ordering_policy,
        )
        .reorder(column_id, ordered_task_ids)
        .await
    }

    /// Appends `task_ids` to `target_column_id`, preserving their relative
    /// order.
    ///
    /// See [`BulkMover::bulk_move`].
    ///
    /// # Errors
    ///
    /// Returns [`ColumnRepositoryError::NotFound`] when the target column
    /// does not exist, or a repository error when persistence fails.
    pub async fn bulk_move(
        &self,
        task_ids: &[TaskId],
        target_column_id: ColumnId,
    ) -> BoardServiceResult<Vec<Task>> {
        BulkMover::new(BulkMoverParts {
            tasks: Arc::clone(&self.tasks),
            columns: Arc::clone(&self.columns),
            notifier: self.notifier(),
            clock: Arc::clone(&self.clock),
            rank_retry_limit: self.config.rank_retry_limit,
        })
        .bulk_move(task_ids, target_column_id)
        .await
    }

    /// Finds a task by identifier.
    ///
    /// # Errors
    ///
    /// Returns [`BoardServiceError::TaskRepository`] when the lookup fails.
    pub async fn find_task(&self, task_id: TaskId) -> BoardServiceResult<Option<Task>> {
        Ok(self.tasks.find_by_id(task_id).await?)
    }

    /// Returns the tasks matching `query`.
    ///
    /// # Errors
    ///
    /// Returns [`BoardServiceError::TaskRepository`] when the scan fails.
    pub async fn list_tasks(&self, query: &TaskQuery) -> BoardServiceResult<Vec<Task>> {
        Ok(self.tasks.find_many(query).await?)
    }

    /// Deletes a task. The ranks of the remaining tasks are left as they are.
    ///
    /// # Errors
    ///
    /// Returns [`TaskRepositoryError::NotFound`] when the task does not exist.
    pub async fn delete_task(&self, task_id: TaskId) -> BoardServiceResult<Task> {
        Ok(self.tasks.delete(task_id).await?)
    }

    /// Returns all columns ordered by identifier.
    ///
    /// # Errors
    ///
    /// Returns [`BoardServiceError::ColumnRepository`] when the scan fails.
    pub async fn list_columns(&self) -> BoardServiceResult<Vec<Column>> {
        Ok(self.columns.list().await?)
    }

    /// Returns a column and its tasks, lowest rank first.
    ///
    /// # Errors
    ///
    /// Returns [`ColumnRepositoryError::NotFound`] when the column does not
    /// exist, or a repository error when a read fails.
    pub async fn column_with_tasks(&self, column_id: ColumnId) -> BoardServiceResult<ColumnWithTasks> {
        let column = self.ensure_column(column_id).await?;
        let tasks = self.tasks.find_many(&TaskQuery::in_column(column_id)).await?;
        Ok(ColumnWithTasks { column, tasks })
    }

    async fn ensure_column(&self, column_id: ColumnId) -> BoardServiceResult<Column> {
        let column = self
            .columns
            .find_by_id(column_id)
            .await?
            .ok_or(ColumnRepositoryError::NotFound(column_id))?;
        Ok(column)
    }

    async fn ensure_owner(&self, owner_id: UserId) -> BoardServiceResult<()> {
        self.users
            .find_by_id(owner_id)
            .await?
            .map(|_| ())
            .ok_or(BoardServiceError::UnknownOwner(owner_id))
    }
}
