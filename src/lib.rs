//! Taskboard: task ordering and completion notification for board backends.
//!
//! This crate provides the core of a task board: users own tasks, tasks live
//! in columns with a lifecycle state, and tasks within a column keep a
//! user-controlled display order.
//!
//! # Architecture
//!
//! Taskboard follows hexagonal architecture principles:
//!
//! - **Domain**: Pure business logic with no infrastructure dependencies
//! - **Ports**: Abstract trait interfaces for persistence and notification
//! - **Adapters**: Concrete implementations of ports (memory, `PostgreSQL`,
//!   notification outbox)
//!
//! # Modules
//!
//! - [`board`]: Rank assignment, reordering, bulk moves, and completion
//!   notification

pub mod board;
