//! Shared test helpers for in-memory board integration tests.

use std::sync::Arc;

use mockable::DefaultClock;
use rstest::fixture;
use taskboard::board::{
    adapters::memory::InMemoryBoardStore,
    domain::{Column, ColumnId, ColumnState, EmailAddress, User, UserId},
    ports::NotificationSender,
    services::BoardService,
};

pub const BACKLOG: ColumnId = ColumnId::new(10);
pub const ACTIVE: ColumnId = ColumnId::new(20);
pub const SHIPPED: ColumnId = ColumnId::new(30);

/// A seeded store plus the owner registered in it.
pub struct SeededStore {
    pub store: Arc<InMemoryBoardStore>,
    pub owner: UserId,
}

/// Provides a store with backlog, active, and shipped columns and one owner.
#[fixture]
pub fn seeded() -> SeededStore {
    let store = Arc::new(InMemoryBoardStore::new());
    for (id, state) in [
        (BACKLOG, ColumnState::NotStarted),
        (ACTIVE, ColumnState::InProgress),
        (SHIPPED, ColumnState::Completed),
    ] {
        store
            .insert_column(Column::new(id, state))
            .expect("seed column");
    }
    let owner = User::new(UserId::new())
        .with_email(EmailAddress::new("dana@example.com").expect("valid email"))
        .with_name("Dana")
        .with_last_name("Reyes");
    let owner_id = owner.id();
    store.insert_user(owner).expect("seed owner");
    SeededStore {
        store,
        owner: owner_id,
    }
}

/// Builds a service over `seeded` that delivers through `sender`.
pub fn service_with<N: NotificationSender>(
    seeded: &SeededStore,
    sender: Arc<N>,
) -> BoardService<InMemoryBoardStore, InMemoryBoardStore, InMemoryBoardStore, N, DefaultClock> {
    BoardService::new(
        Arc::clone(&seeded.store),
        Arc::clone(&seeded.store),
        Arc::clone(&seeded.store),
        sender,
        Arc::new(DefaultClock),
    )
}
