//! Domain model for the task board.
//!
//! Tasks, columns, and users are plain values here; ranking rules and the
//! completion state machine live alongside them while persistence and
//! delivery stay outside the domain boundary.

mod column;
mod error;
mod ids;
mod notification;
mod task;
mod user;

pub use column::{Column, ColumnState, CompletionState};
pub use error::{BoardDomainError, ParseColumnStateError};
pub use ids::{ColumnId, TaskId, TaskOrder, UserId};
pub use notification::Notification;
pub use task::{PersistedTaskData, Task, TaskChanges, TaskDraft, TaskTitle};
pub use user::{EmailAddress, User};
