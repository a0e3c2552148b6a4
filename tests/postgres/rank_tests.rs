//! Rank assignment and batch rank updates against `PostgreSQL`.

use std::sync::Arc;

use crate::postgres::helpers::{
    CleanupGuard, DOING, TODO, ensure_template, ranked_task, setup_repository, test_runtime,
};
use mockable::DefaultClock;
use pg_embedded_setup_unpriv::TestCluster;
use pg_embedded_setup_unpriv::test_support::shared_test_cluster;
use rstest::rstest;
use taskboard::board::{
    domain::{BoardDomainError, ColumnId, TaskId, TaskOrder},
    ports::{RankDirection, TaskQuery, TaskRepository, TaskRepositoryError},
    services::{BoardServiceError, OrderAssigner},
};

fn ranks_in(
    repo: &impl TaskRepository,
    rt: &tokio::runtime::Runtime,
    column: ColumnId,
) -> Vec<(TaskId, u32)> {
    rt.block_on(repo.find_many(&TaskQuery::in_column(column).ordered(RankDirection::Ascending)))
        .expect("scan should succeed")
        .iter()
        .map(|task| (task.id(), task.order().value()))
        .collect()
}

#[rstest]
fn next_order_returns_one_for_empty_column(shared_test_cluster: &'static TestCluster) {
    ensure_template(shared_test_cluster).expect("template setup");
    let db_name = format!("test_next_order_empty_{}", uuid::Uuid::new_v4());
    let _guard = CleanupGuard::new(shared_test_cluster, db_name.clone());
    let repo = setup_repository(shared_test_cluster, &db_name).expect("repository setup");

    let rt = test_runtime().expect("runtime");
    let next = rt
        .block_on(OrderAssigner::new(Arc::new(repo)).next_order(TODO))
        .expect("next_order");

    assert_eq!(next, TaskOrder::FIRST);
}

#[rstest]
fn next_order_returns_max_plus_one(shared_test_cluster: &'static TestCluster) {
    ensure_template(shared_test_cluster).expect("template setup");
    let db_name = format!("test_next_order_max_{}", uuid::Uuid::new_v4());
    let _guard = CleanupGuard::new(shared_test_cluster, db_name.clone());
    let repo = Arc::new(setup_repository(shared_test_cluster, &db_name).expect("repository setup"));

    let rt = test_runtime().expect("runtime");
    for (title, order) in [("one", 1), ("two", 2), ("five", 5)] {
        let task = ranked_task(title, TODO, order).expect("task");
        rt.block_on(repo.store(&task)).expect("store");
    }
    let elsewhere = ranked_task("other column", DOING, 9).expect("task");
    rt.block_on(repo.store(&elsewhere)).expect("store");

    let next = rt
        .block_on(OrderAssigner::new(Arc::clone(&repo)).next_order(TODO))
        .expect("next_order");

    assert_eq!(next.value(), 6);
}

#[rstest]
fn update_many_swaps_ranks_in_one_transaction(shared_test_cluster: &'static TestCluster) {
    ensure_template(shared_test_cluster).expect("template setup");
    let db_name = format!("test_rank_swap_{}", uuid::Uuid::new_v4());
    let _guard = CleanupGuard::new(shared_test_cluster, db_name.clone());
    let repo = setup_repository(shared_test_cluster, &db_name).expect("repository setup");

    let rt = test_runtime().expect("runtime");
    let mut first = ranked_task("first", TODO, 1).expect("task");
    let mut second = ranked_task("second", TODO, 2).expect("task");
    rt.block_on(repo.store(&first)).expect("store first");
    rt.block_on(repo.store(&second)).expect("store second");

    first.rank(TaskOrder::new(2).expect("valid order"), &DefaultClock);
    second.rank(TaskOrder::FIRST, &DefaultClock);
    rt.block_on(repo.update_many(&[first.clone(), second.clone()]))
        .expect("swap should commit");

    assert_eq!(
        ranks_in(&repo, &rt, TODO),
        vec![(second.id(), 1), (first.id(), 2)]
    );
}

#[rstest]
fn colliding_batch_rolls_back_with_duplicate_order(shared_test_cluster: &'static TestCluster) {
    ensure_template(shared_test_cluster).expect("template setup");
    let db_name = format!("test_rank_collision_{}", uuid::Uuid::new_v4());
    let _guard = CleanupGuard::new(shared_test_cluster, db_name.clone());
    let repo = setup_repository(shared_test_cluster, &db_name).expect("repository setup");

    let rt = test_runtime().expect("runtime");
    let mut first = ranked_task("first", TODO, 1).expect("task");
    let mut second = ranked_task("second", TODO, 2).expect("task");
    let third = ranked_task("third", TODO, 3).expect("task");
    for task in [&first, &second, &third] {
        rt.block_on(repo.store(task)).expect("store");
    }

    second.rank(TaskOrder::FIRST, &DefaultClock);
    first.rank(TaskOrder::new(3).expect("valid order"), &DefaultClock);
    let result = rt.block_on(repo.update_many(&[second.clone(), first.clone()]));

    assert!(
        matches!(
            result,
            Err(TaskRepositoryError::DuplicateOrder { column_id, .. }) if column_id == TODO
        ),
        "expected DuplicateOrder, got {result:?}"
    );
    assert_eq!(
        ranks_in(&repo, &rt, TODO),
        vec![(first.id(), 1), (second.id(), 2), (third.id(), 3)]
    );
}

#[rstest]
fn store_rejects_taken_rank(shared_test_cluster: &'static TestCluster) {
    ensure_template(shared_test_cluster).expect("template setup");
    let db_name = format!("test_store_taken_rank_{}", uuid::Uuid::new_v4());
    let _guard = CleanupGuard::new(shared_test_cluster, db_name.clone());
    let repo = setup_repository(shared_test_cluster, &db_name).expect("repository setup");

    let rt = test_runtime().expect("runtime");
    let holder = ranked_task("holder", TODO, 4).expect("task");
    rt.block_on(repo.store(&holder)).expect("store holder");
    let intruder = ranked_task("intruder", TODO, 4).expect("task");

    let result = rt.block_on(repo.store(&intruder));

    assert!(matches!(
        result,
        Err(TaskRepositoryError::DuplicateOrder { column_id, order })
            if column_id == TODO && order.value() == 4
    ));
}

#[rstest]
fn largest_rank_survives_a_round_trip(shared_test_cluster: &'static TestCluster) {
    ensure_template(shared_test_cluster).expect("template setup");
    let db_name = format!("test_largest_rank_{}", uuid::Uuid::new_v4());
    let _guard = CleanupGuard::new(shared_test_cluster, db_name.clone());
    let repo = Arc::new(setup_repository(shared_test_cluster, &db_name).expect("repository setup"));

    let rt = test_runtime().expect("runtime");
    let task = ranked_task("last in line", TODO, u32::MAX).expect("task");
    rt.block_on(repo.store(&task)).expect("store");

    let stored = rt
        .block_on(repo.find_by_id(task.id()))
        .expect("lookup")
        .expect("task should exist");
    assert_eq!(stored.order().value(), u32::MAX);

    let next = rt.block_on(OrderAssigner::new(Arc::clone(&repo)).next_order(TODO));
    assert!(matches!(
        next,
        Err(BoardServiceError::Domain(BoardDomainError::OrderOverflow))
    ));
}
