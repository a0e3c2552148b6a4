//! `PostgreSQL` repository implementation for board storage.

use super::{
    models::{ColumnRow, TaskRow, UserRow},
    schema::{board_columns, tasks, users},
};
use crate::board::{
    domain::{Column, ColumnId, Task, TaskId, TaskOrder, User, UserId},
    ports::{
        ColumnRepository, ColumnRepositoryError, ColumnRepositoryResult, RankDirection,
        TaskQuery, TaskRepository, TaskRepositoryError, TaskRepositoryResult, UserRepository,
        UserRepositoryError, UserRepositoryResult,
    },
};
use async_trait::async_trait;
use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};
use diesel::result::{DatabaseErrorInformation, DatabaseErrorKind, Error as DieselError};

/// `PostgreSQL` connection pool type used by board adapters.
pub type BoardPgPool = Pool<ConnectionManager<PgConnection>>;

const COLUMN_ORDER_CONSTRAINT: &str = "tasks_column_order_unique";

/// `PostgreSQL`-backed store implementing the task, column, and user ports.
#[derive(Debug, Clone)]
pub struct PostgresBoardRepository {
    pool: BoardPgPool,
}

/// Errors that can wrap an arbitrary persistence failure.
trait PersistenceFailure: Sized {
    fn from_persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self;
}

impl PersistenceFailure for TaskRepositoryError {
    fn from_persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::persistence(err)
    }
}

impl PersistenceFailure for ColumnRepositoryError {
    fn from_persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::persistence(err)
    }
}

impl PersistenceFailure for UserRepositoryError {
    fn from_persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::persistence(err)
    }
}

impl PostgresBoardRepository {
    /// Creates a new repository from a `PostgreSQL` connection pool.
    #[must_use]
    pub const fn new(pool: BoardPgPool) -> Self {
        Self { pool }
    }

    async fn run_blocking<F, T, E>(&self, f: F) -> Result<T, E>
    where
        F: FnOnce(&mut PgConnection) -> Result<T, E> + Send + 'static,
        T: Send + 'static,
        E: PersistenceFailure + Send + 'static,
    {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || {
            let mut connection = pool.get().map_err(E::from_persistence)?;
            f(&mut connection)
        })
        .await
        .map_err(E::from_persistence)?
    }
}

/// Failure inside a batch update transaction.
#[derive(Debug)]
enum BatchFailure {
    Missing(TaskId),
    Database(DieselError),
}

impl From<DieselError> for BatchFailure {
    fn from(err: DieselError) -> Self {
        Self::Database(err)
    }
}

#[async_trait]
impl TaskRepository for PostgresBoardRepository {
    async fn store(&self, task: &Task) -> TaskRepositoryResult<()> {
        let row = TaskRow::from_task(task);
        let stored = task.clone();
        self.run_blocking(move |connection| {
            diesel::insert_into(tasks::table)
                .values(&row)
                .execute(connection)
                .map_err(|err| map_write_error(err, &stored))?;
            Ok(())
        })
        .await
    }

    async fn update(&self, task: &Task) -> TaskRepositoryResult<()> {
        let row = TaskRow::from_task(task);
        let updated = task.clone();
        self.run_blocking(move |connection| {
            let affected = diesel::update(tasks::table.find(row.id))
                .set(&row)
                .execute(connection)
                .map_err(|err| map_write_error(err, &updated))?;
            if affected == 0 {
                return Err(TaskRepositoryError::NotFound(updated.id()));
            }
            Ok(())
        })
        .await
    }

    async fn update_many(&self, tasks_to_write: &[Task]) -> TaskRepositoryResult<()> {
        let rows: Vec<TaskRow> = tasks_to_write.iter().map(TaskRow::from_task).collect();
        let Some(first) = tasks_to_write.first().cloned() else {
            return Ok(());
        };
        self.run_blocking(move |connection| {
            let outcome = connection.transaction::<_, BatchFailure, _>(|tx| {
                diesel::sql_query(format!("SET CONSTRAINTS {COLUMN_ORDER_CONSTRAINT} DEFERRED"))
                    .execute(tx)?;
                for row in &rows {
                    let affected = diesel::update(tasks::table.find(row.id))
                        .set(row)
                        .execute(tx)?;
                    if affected == 0 {
                        return Err(BatchFailure::Missing(TaskId::from_uuid(row.id)));
                    }
                }
                Ok(())
            });
            match outcome {
                Ok(()) => Ok(()),
                Err(BatchFailure::Missing(task_id)) => Err(TaskRepositoryError::NotFound(task_id)),
                Err(BatchFailure::Database(err)) => Err(map_write_error(err, &first)),
            }
        })
        .await
    }

    async fn delete(&self, id: TaskId) -> TaskRepositoryResult<Task> {
        self.run_blocking(move |connection| {
            let row = diesel::delete(tasks::table.find(id.into_inner()))
                .returning(TaskRow::as_returning())
                .get_result::<TaskRow>(connection)
                .optional()
                .map_err(TaskRepositoryError::persistence)?
                .ok_or(TaskRepositoryError::NotFound(id))?;
            row.into_task().map_err(TaskRepositoryError::persistence)
        })
        .await
    }

    async fn find_by_id(&self, id: TaskId) -> TaskRepositoryResult<Option<Task>> {
        self.run_blocking(move |connection| {
            let row = tasks::table
                .find(id.into_inner())
                .select(TaskRow::as_select())
                .first::<TaskRow>(connection)
                .optional()
                .map_err(TaskRepositoryError::persistence)?;
            row.map(TaskRow::into_task)
                .transpose()
                .map_err(TaskRepositoryError::persistence)
        })
        .await
    }

    async fn find_many(&self, query: &TaskQuery) -> TaskRepositoryResult<Vec<Task>> {
        let filter = query.clone();
        self.run_blocking(move |connection| {
            let offset = i64::try_from(filter.offset).map_err(TaskRepositoryError::persistence)?;
            let mut statement = tasks::table.select(TaskRow::as_select()).into_boxed();
            if let Some(column_id) = filter.column_id {
                statement = statement.filter(tasks::column_id.eq(column_id.value()));
            }
            if let Some(ids) = &filter.ids {
                let uuids: Vec<uuid::Uuid> = ids.iter().map(|id| id.into_inner()).collect();
                statement = statement.filter(tasks::id.eq_any(uuids));
            }
            if let Some(owner_id) = filter.owner_id {
                statement = statement.filter(tasks::owner_id.eq(owner_id.into_inner()));
            }
            statement = match filter.direction {
                RankDirection::Ascending => statement.order((
                    tasks::task_order.asc(),
                    tasks::created_at.asc(),
                    tasks::id.asc(),
                )),
                RankDirection::Descending => statement.order((
                    tasks::task_order.desc(),
                    tasks::created_at.asc(),
                    tasks::id.asc(),
                )),
            };
            if offset > 0 {
                statement = statement.offset(offset);
            }
            if let Some(limit) = filter.limit {
                let page_size = i64::try_from(limit).map_err(TaskRepositoryError::persistence)?;
                statement = statement.limit(page_size);
            }

            statement
                .load::<TaskRow>(connection)
                .map_err(TaskRepositoryError::persistence)?
                .into_iter()
                .map(TaskRow::into_task)
                .collect::<Result<Vec<_>, _>>()
                .map_err(TaskRepositoryError::persistence)
        })
        .await
    }
}

#[async_trait]
impl ColumnRepository for PostgresBoardRepository {
    async fn find_by_id(&self, id: ColumnId) -> ColumnRepositoryResult<Option<Column>> {
        self.run_blocking(move |connection| {
            let row = board_columns::table
                .find(id.value())
                .select(ColumnRow::as_select())
                .first::<ColumnRow>(connection)
                .optional()
                .map_err(ColumnRepositoryError::persistence)?;
            row.map(ColumnRow::into_column)
                .transpose()
                .map_err(ColumnRepositoryError::persistence)
        })
        .await
    }

    async fn list(&self) -> ColumnRepositoryResult<Vec<Column>> {
        self.run_blocking(move |connection| {
            board_columns::table
                .order(board_columns::id.asc())
                .select(ColumnRow::as_select())
                .load::<ColumnRow>(connection)
                .map_err(ColumnRepositoryError::persistence)?
                .into_iter()
                .map(ColumnRow::into_column)
                .collect::<Result<Vec<_>, _>>()
                .map_err(ColumnRepositoryError::persistence)
        })
        .await
    }
}

#[async_trait]
impl UserRepository for PostgresBoardRepository {
    async fn find_by_id(&self, id: UserId) -> UserRepositoryResult<Option<User>> {
        self.run_blocking(move |connection| {
            let row = users::table
                .find(id.into_inner())
                .select(UserRow::as_select())
                .first::<UserRow>(connection)
                .optional()
                .map_err(UserRepositoryError::persistence)?;
            row.map(UserRow::into_user)
                .transpose()
                .map_err(UserRepositoryError::persistence)
        })
        .await
    }
}

/// Maps a failed task write onto the repository error it represents.
///
/// `written` is the task whose column and rank are reported when the
/// database does not say which rank collided.
fn map_write_error(err: DieselError, written: &Task) -> TaskRepositoryError {
    match err {
        DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, ref info)
            if is_column_order_violation(info.as_ref()) =>
        {
            let (column_id, order) = collided_rank(info.as_ref())
                .unwrap_or((written.column_id(), written.order()));
            TaskRepositoryError::DuplicateOrder { column_id, order }
        }
        DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => {
            TaskRepositoryError::DuplicateTask(written.id())
        }
        _ => TaskRepositoryError::persistence(err),
    }
}

fn is_column_order_violation(info: &dyn DatabaseErrorInformation) -> bool {
    info.constraint_name()
        .is_some_and(|name| name == COLUMN_ORDER_CONSTRAINT)
}

/// Reads the colliding key from a detail such as
/// `Key (column_id, task_order)=(3, 2) already exists.`
fn collided_rank(info: &dyn DatabaseErrorInformation) -> Option<(ColumnId, TaskOrder)> {
    let detail = info.details()?;
    let (_, tail) = detail.split_once(")=(")?;
    let (values, _) = tail.split_once(')')?;
    let (raw_column, raw_order) = values.split_once(',')?;
    let column_id = ColumnId::new(raw_column.trim().parse().ok()?);
    let order = TaskOrder::new(raw_order.trim().parse().ok()?).ok()?;
    Some((column_id, order))
}
