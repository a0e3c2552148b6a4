//! Task board ordering and column-transition management.
//!
//! Tasks live in columns and carry a per-column display rank. This module
//! assigns ranks to new tasks, applies caller-supplied orderings, moves tasks
//! between columns in bulk, and notifies task owners when a task lands in a
//! completed column. The module follows hexagonal architecture:
//!
//! - Domain types in [`domain`]
//! - Port contracts in [`ports`]
//! - Adapter implementations in [`adapters`]
//! - Orchestration services in [`services`]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod services;

#[cfg(test)]
mod tests;
