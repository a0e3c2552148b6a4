//! Diesel row models for board persistence.

use super::schema::{board_columns, tasks, users};
use crate::board::domain::{
    Column, ColumnId, ColumnState, EmailAddress, PersistedTaskData, Task, TaskId, TaskOrder,
    TaskTitle, User, UserId,
};
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use std::fmt;

/// Query result and insert row for task records.
#[derive(Debug, Clone, Queryable, Selectable, Insertable, AsChangeset)]
#[diesel(table_name = tasks)]
#[diesel(check_for_backend(diesel::pg::Pg))]
#[diesel(treat_none_as_null = true)]
pub struct TaskRow {
    /// Task identifier.
    pub id: uuid::Uuid,
    /// Task title.
    pub title: String,
    /// Optional description.
    pub description: Option<String>,
    /// Optional owner reference.
    pub owner_id: Option<uuid::Uuid>,
    /// Column reference.
    pub column_id: i64,
    /// Rank within the column.
    pub task_order: i64,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Query result row for columns.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = board_columns)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct ColumnRow {
    /// Column identifier.
    pub id: i64,
    /// Column lifecycle state.
    pub state: String,
}

/// Query result row for users.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct UserRow {
    /// User identifier.
    pub id: uuid::Uuid,
    /// Email address, if any.
    pub email: Option<String>,
    /// First name, if any.
    pub name: Option<String>,
    /// Last name, if any.
    pub last_name: Option<String>,
}

/// A persisted row that does not map onto a valid domain value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowConversionError(String);

impl fmt::Display for RowConversionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid persisted row: {}", self.0)
    }
}

impl std::error::Error for RowConversionError {}

impl TaskRow {
    /// Builds the row for `task`.
    ///
    /// `task_order` is stored as `BIGINT`, so every [`TaskOrder`] fits.
    #[must_use]
    pub fn from_task(task: &Task) -> Self {
        Self {
            id: task.id().into_inner(),
            title: task.title().as_str().to_owned(),
            description: task.description().map(str::to_owned),
            owner_id: task.owner_id().map(UserId::into_inner),
            column_id: task.column_id().value(),
            task_order: i64::from(task.order().value()),
            created_at: task.created_at(),
            updated_at: task.updated_at(),
        }
    }

    /// Reconstructs the task held by this row.
    pub fn into_task(self) -> Result<Task, RowConversionError> {
        let title = TaskTitle::new(self.title)
            .map_err(|err| RowConversionError(format!("task {}: {err}", self.id)))?;
        let order = u32::try_from(self.task_order)
            .map_err(|err| err.to_string())
            .and_then(|value| TaskOrder::new(value).map_err(|err| err.to_string()))
            .map_err(|reason| RowConversionError(format!("task {}: {reason}", self.id)))?;
        Ok(Task::from_persisted(PersistedTaskData {
            id: TaskId::from_uuid(self.id),
            title,
            description: self.description,
            owner_id: self.owner_id.map(UserId::from_uuid),
            column_id: ColumnId::new(self.column_id),
            order,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }))
    }
}

impl ColumnRow {
    /// Reconstructs the column held by this row.
    pub fn into_column(self) -> Result<Column, RowConversionError> {
        let state = ColumnState::try_from(self.state.as_str())
            .map_err(|err| RowConversionError(format!("column {}: {err}", self.id)))?;
        Ok(Column::new(ColumnId::new(self.id), state))
    }
}

impl UserRow {
    /// Reconstructs the user held by this row.
    pub fn into_user(self) -> Result<User, RowConversionError> {
        let mut user = User::new(UserId::from_uuid(self.id));
        if let Some(email) = self.email {
            let address = EmailAddress::new(email)
                .map_err(|err| RowConversionError(format!("user {}: {err}", self.id)))?;
            user = user.with_email(address);
        }
        if let Some(name) = self.name {
            user = user.with_name(name);
        }
        if let Some(last_name) = self.last_name {
            user = user.with_last_name(last_name);
        }
        Ok(user)
    }
}
