//! `PostgreSQL` adapters for board persistence.
//!
//! Rank uniqueness is enforced by the deferrable
//! `tasks_column_order_unique` constraint; batch updates defer it to commit
//! so tasks can swap ranks inside one transaction.

mod models;
mod repository;
mod schema;

pub use repository::{BoardPgPool, PostgresBoardRepository};
