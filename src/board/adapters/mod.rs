//! Adapter implementations for board ports.

pub mod memory;
pub mod outbox;
pub mod postgres;
