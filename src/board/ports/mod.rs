//! Port contracts for the task board.
//!
//! Ports define infrastructure-agnostic interfaces used by board services.

pub mod notification;
pub mod repository;

pub use notification::{NotificationError, NotificationResult, NotificationSender};
pub use repository::{
    ColumnRepository, ColumnRepositoryError, ColumnRepositoryResult, RankDirection, TaskQuery,
    TaskRepository, TaskRepositoryError, TaskRepositoryResult, UserRepository,
    UserRepositoryError, UserRepositoryResult,
};
