//! In-memory adapter implementations.
//!
//! These adapters provide simple, thread-safe implementations suitable for
//! unit testing without database or mail dependencies.

mod notification;
mod store;

pub use notification::RecordingNotificationSender;
pub use store::InMemoryBoardStore;
