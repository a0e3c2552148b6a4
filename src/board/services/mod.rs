//! Application services for task ranking and completion notification.

mod board_service;
mod bulk_move;
mod config;
mod error;
mod ordering;
mod reorder;
mod transition;

pub use board_service::{BoardService, ColumnWithTasks, CreateTaskRequest, UpdateTaskRequest};
pub use bulk_move::{BulkMover, BulkMoverParts};
pub use config::{BoardConfig, NotificationTemplates, OrderingPolicy};
pub use error::{BoardServiceError, BoardServiceResult, OrderingError};
pub use ordering::OrderAssigner;
pub use reorder::Reorderer;
pub use transition::{NotificationOutcome, SkipReason, TransitionNotifier, render_notification};
