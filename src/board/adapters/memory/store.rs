//! In-memory board store for tests and embedding.

use async_trait::async_trait;
use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, RwLock};

use crate::board::{
    domain::{Column, ColumnId, Task, TaskId, TaskOrder, User, UserId},
    ports::{
        ColumnRepository, ColumnRepositoryError, ColumnRepositoryResult, RankDirection,
        TaskQuery, TaskRepository, TaskRepositoryError, TaskRepositoryResult, UserRepository,
        UserRepositoryError, UserRepositoryResult,
    },
};

/// Thread-safe in-memory store implementing the task, column, and user ports.
///
/// Every write runs under one write lock, so [`TaskRepository::update_many`]
/// is atomic and rank uniqueness is checked against a consistent snapshot.
#[derive(Debug, Clone, Default)]
pub struct InMemoryBoardStore {
    state: Arc<RwLock<InMemoryBoardState>>,
}

#[derive(Debug, Default)]
struct InMemoryBoardState {
    tasks: HashMap<TaskId, Task>,
    ranks: HashMap<(ColumnId, TaskOrder), TaskId>,
    columns: BTreeMap<ColumnId, Column>,
    users: HashMap<UserId, User>,
}

impl InMemoryBoardStore {
    /// Creates an empty in-memory store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces a column.
    ///
    /// # Errors
    ///
    /// Returns [`ColumnRepositoryError::Persistence`] when the lock is
    /// poisoned.
    pub fn insert_column(&self, column: Column) -> ColumnRepositoryResult<()> {
        let mut state = self.state.write().map_err(|err| {
            ColumnRepositoryError::persistence(std::io::Error::other(err.to_string()))
        })?;
        state.columns.insert(column.id(), column);
        Ok(())
    }

    /// Inserts or replaces a user.
    ///
    /// # Errors
    ///
    /// Returns [`UserRepositoryError::Persistence`] when the lock is poisoned.
    pub fn insert_user(&self, user: User) -> UserRepositoryResult<()> {
        let mut state = self.state.write().map_err(|err| {
            UserRepositoryError::persistence(std::io::Error::other(err.to_string()))
        })?;
        state.users.insert(user.id(), user);
        Ok(())
    }
}

fn task_lock_error(err: impl ToString) -> TaskRepositoryError {
    TaskRepositoryError::persistence(std::io::Error::other(err.to_string()))
}

/// Returns the first rank collision `tasks` would cause once written.
fn find_rank_collision(state: &InMemoryBoardState, tasks: &[Task]) -> Option<TaskRepositoryError> {
    let mut claimed: HashMap<(ColumnId, TaskOrder), TaskId> = state
        .ranks
        .iter()
        .filter(|(_, holder)| !tasks.iter().any(|task| task.id() == **holder))
        .map(|(slot, holder)| (*slot, *holder))
        .collect();
    tasks.iter().find_map(|task| {
        let slot = (task.column_id(), task.order());
        claimed
            .insert(slot, task.id())
            .map(|_| TaskRepositoryError::DuplicateOrder {
                column_id: task.column_id(),
                order: task.order(),
            })
    })
}

fn write_task(state: &mut InMemoryBoardState, task: &Task) {
    if let Some(old) = state.tasks.get(&task.id()) {
        let old_slot = (old.column_id(), old.order());
        if state.ranks.get(&old_slot) == Some(&task.id()) {
            state.ranks.remove(&old_slot);
        }
    }
    state
        .ranks
        .insert((task.column_id(), task.order()), task.id());
    state.tasks.insert(task.id(), task.clone());
}

fn compare_rank(direction: RankDirection) -> impl Fn(&Task, &Task) -> std::cmp::Ordering {
    move |left, right| {
        let by_rank = match direction {
            RankDirection::Ascending => left.order().cmp(&right.order()),
            RankDirection::Descending => right.order().cmp(&left.order()),
        };
        by_rank
            .then_with(|| left.created_at().cmp(&right.created_at()))
            .then_with(|| left.id().cmp(&right.id()))
    }
}

#[async_trait]
impl TaskRepository for InMemoryBoardStore {
    async fn store(&self, task: &Task) -> TaskRepositoryResult<()> {
        let mut state = self.state.write().map_err(task_lock_error)?;
        if state.tasks.contains_key(&task.id()) {
            return Err(TaskRepositoryError::DuplicateTask(task.id()));
        }
        if let Some(collision) = find_rank_collision(&state, std::slice::from_ref(task)) {
            return Err(collision);
        }
        write_task(&mut state, task);
        Ok(())
    }

    async fn update(&self, task: &Task) -> TaskRepositoryResult<()> {
        self.update_many(std::slice::from_ref(task)).await
    }

    async fn update_many(&self, tasks: &[Task]) -> TaskRepositoryResult<()> {
        let mut state = self.state.write().map_err(task_lock_error)?;
        if let Some(missing) = tasks.iter().find(|task| !state.tasks.contains_key(&task.id())) {
            return Err(TaskRepositoryError::NotFound(missing.id()));
        }
        if let Some(collision) = find_rank_collision(&state, tasks) {
            return Err(collision);
        }

        // Clear every old slot first so tasks may swap ranks within the batch.
        for task in tasks {
            if let Some(old) = state.tasks.get(&task.id()) {
                let old_slot = (old.column_id(), old.order());
                state.ranks.remove(&old_slot);
            }
        }
        for task in tasks {
            write_task(&mut state, task);
        }
        Ok(())
    }

    async fn delete(&self, id: TaskId) -> TaskRepositoryResult<Task> {
        let mut state = self.state.write().map_err(task_lock_error)?;
        let task = state
            .tasks
            .remove(&id)
            .ok_or(TaskRepositoryError::NotFound(id))?;
        let slot = (task.column_id(), task.order());
        if state.ranks.get(&slot) == Some(&id) {
            state.ranks.remove(&slot);
        }
        Ok(task)
    }

    async fn find_by_id(&self, id: TaskId) -> TaskRepositoryResult<Option<Task>> {
        let state = self.state.read().map_err(task_lock_error)?;
        Ok(state.tasks.get(&id).cloned())
    }

    async fn find_many(&self, query: &TaskQuery) -> TaskRepositoryResult<Vec<Task>> {
        let state = self.state.read().map_err(task_lock_error)?;
        let mut matching: Vec<Task> = state
            .tasks
            .values()
            .filter(|task| query.matches(task))
            .cloned()
            .collect();
        matching.sort_by(compare_rank(query.direction));
        let page = matching
            .into_iter()
            .skip(query.offset)
            .take(query.limit.unwrap_or(usize::MAX))
            .collect();
        Ok(page)
    }
}

#[async_trait]
impl ColumnRepository for InMemoryBoardStore {
    async fn find_by_id(&self, id: ColumnId) -> ColumnRepositoryResult<Option<Column>> {
        let state = self.state.read().map_err(|err| {
            ColumnRepositoryError::persistence(std::io::Error::other(err.to_string()))
        })?;
        Ok(state.columns.get(&id).copied())
    }

    async fn list(&self) -> ColumnRepositoryResult<Vec<Column>> {
        let state = self.state.read().map_err(|err| {
            ColumnRepositoryError::persistence(std::io::Error::other(err.to_string()))
        })?;
        Ok(state.columns.values().copied().collect())
    }
}

#[async_trait]
impl UserRepository for InMemoryBoardStore {
    async fn find_by_id(&self, id: UserId) -> UserRepositoryResult<Option<User>> {
        let state = self.state.read().map_err(|err| {
            UserRepositoryError::persistence(std::io::Error::other(err.to_string()))
        })?;
        Ok(state.users.get(&id).cloned())
    }
}
