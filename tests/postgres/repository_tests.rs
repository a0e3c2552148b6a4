//! Board service flows and repository reads against `PostgreSQL`.

use std::sync::Arc;

use crate::postgres::helpers::{
    CleanupGuard, DOING, DONE, OWNER_EMAIL, PgBoardService, TODO, ensure_template, insert_owner,
    ranked_task, setup_repository, test_runtime,
};
use mockable::DefaultClock;
use pg_embedded_setup_unpriv::TestCluster;
use pg_embedded_setup_unpriv::test_support::shared_test_cluster;
use rstest::rstest;
use taskboard::board::{
    adapters::memory::RecordingNotificationSender,
    domain::{ColumnState, TaskId, UserId},
    ports::{RankDirection, TaskQuery, TaskRepository, TaskRepositoryError},
    services::{BoardService, BoardServiceError, CreateTaskRequest, UpdateTaskRequest},
};

fn board_service(
    cluster: &TestCluster,
    db_name: &str,
) -> (PgBoardService, Arc<RecordingNotificationSender>) {
    let repo = Arc::new(setup_repository(cluster, db_name).expect("repository setup"));
    let sender = Arc::new(RecordingNotificationSender::new());
    let service = BoardService::new(
        Arc::clone(&repo),
        Arc::clone(&repo),
        repo,
        Arc::clone(&sender),
        Arc::new(DefaultClock),
    );
    (service, sender)
}

#[rstest]
fn created_tasks_are_appended_and_reordered(shared_test_cluster: &'static TestCluster) {
    ensure_template(shared_test_cluster).expect("template setup");
    let db_name = format!("test_create_reorder_{}", uuid::Uuid::new_v4());
    let _guard = CleanupGuard::new(shared_test_cluster, db_name.clone());
    let (service, _sender) = board_service(shared_test_cluster, &db_name);

    let rt = test_runtime().expect("runtime");
    let mut ids = Vec::new();
    for title in ["alpha", "beta", "gamma"] {
        let task = rt
            .block_on(service.create_task(CreateTaskRequest::new(title, TODO)))
            .expect("create");
        ids.push(task.id());
    }
    ids.reverse();

    rt.block_on(service.reorder(TODO, &ids)).expect("reorder");

    let listed: Vec<TaskId> = rt
        .block_on(service.list_tasks(&TaskQuery::in_column(TODO).ordered(RankDirection::Ascending)))
        .expect("list")
        .iter()
        .map(|task| task.id())
        .collect();
    assert_eq!(listed, ids);
}

#[rstest]
fn bulk_move_into_completed_column_notifies_owner(shared_test_cluster: &'static TestCluster) {
    ensure_template(shared_test_cluster).expect("template setup");
    let db_name = format!("test_bulk_move_{}", uuid::Uuid::new_v4());
    let _guard = CleanupGuard::new(shared_test_cluster, db_name.clone());
    let (service, sender) = board_service(shared_test_cluster, &db_name);
    let owner_id = insert_owner(shared_test_cluster, &db_name).expect("owner");

    let rt = test_runtime().expect("runtime");
    rt.block_on(service.create_task(CreateTaskRequest::new("done already", DONE)))
        .expect("create");
    rt.block_on(service.create_task(CreateTaskRequest::new("stays in progress", DOING)))
        .expect("create");
    let first = rt
        .block_on(service.create_task(CreateTaskRequest::new("first", TODO).with_owner(owner_id)))
        .expect("create");
    let second = rt
        .block_on(service.create_task(CreateTaskRequest::new("second", DOING)))
        .expect("create");

    let moved = rt
        .block_on(service.bulk_move(&[second.id(), first.id()], DONE))
        .expect("bulk move");

    let placed: Vec<(TaskId, u32)> = moved
        .iter()
        .map(|task| (task.id(), task.order().value()))
        .collect();
    assert_eq!(placed, vec![(first.id(), 2), (second.id(), 3)]);
    let sent = sender.sent().expect("recorder lock");
    assert_eq!(sent.len(), 1);
    assert_eq!(
        sent.first().map(|notification| notification.to().as_str()),
        Some(OWNER_EMAIL)
    );
}

#[rstest]
fn column_change_appends_to_target(shared_test_cluster: &'static TestCluster) {
    ensure_template(shared_test_cluster).expect("template setup");
    let db_name = format!("test_column_change_{}", uuid::Uuid::new_v4());
    let _guard = CleanupGuard::new(shared_test_cluster, db_name.clone());
    let (service, _sender) = board_service(shared_test_cluster, &db_name);

    let rt = test_runtime().expect("runtime");
    rt.block_on(service.create_task(CreateTaskRequest::new("occupant", DOING)))
        .expect("create");
    let task = rt
        .block_on(service.create_task(CreateTaskRequest::new("mover", TODO)))
        .expect("create");

    let updated = rt
        .block_on(service.update_task_with_transition_check(
            UpdateTaskRequest::new(task.id()).with_column(DOING),
        ))
        .expect("update");

    assert_eq!(updated.order().value(), 2);
    let stored = rt
        .block_on(service.find_task(task.id()))
        .expect("lookup")
        .expect("task should exist");
    assert_eq!(stored.column_id(), DOING);
}

#[rstest]
fn find_many_pages_in_rank_order(shared_test_cluster: &'static TestCluster) {
    ensure_template(shared_test_cluster).expect("template setup");
    let db_name = format!("test_find_many_page_{}", uuid::Uuid::new_v4());
    let _guard = CleanupGuard::new(shared_test_cluster, db_name.clone());
    let repo = setup_repository(shared_test_cluster, &db_name).expect("repository setup");

    let rt = test_runtime().expect("runtime");
    for order in [4, 1, 3, 2, 5] {
        let task = ranked_task(&format!("task {order}"), TODO, order).expect("task");
        rt.block_on(repo.store(&task)).expect("store");
    }

    let page = rt
        .block_on(
            repo.find_many(
                &TaskQuery::in_column(TODO)
                    .ordered(RankDirection::Ascending)
                    .skip(1)
                    .take(2),
            ),
        )
        .expect("scan");
    let ranks: Vec<u32> = page.iter().map(|task| task.order().value()).collect();
    assert_eq!(ranks, vec![2, 3]);

    let top = rt
        .block_on(repo.find_many(&TaskQuery::in_column(TODO).ordered(RankDirection::Descending).take(1)))
        .expect("scan");
    assert_eq!(top.first().map(|task| task.order().value()), Some(5));
}

#[rstest]
fn store_rejects_duplicate_identifier(shared_test_cluster: &'static TestCluster) {
    ensure_template(shared_test_cluster).expect("template setup");
    let db_name = format!("test_duplicate_task_{}", uuid::Uuid::new_v4());
    let _guard = CleanupGuard::new(shared_test_cluster, db_name.clone());
    let repo = setup_repository(shared_test_cluster, &db_name).expect("repository setup");

    let rt = test_runtime().expect("runtime");
    let task = ranked_task("once", TODO, 1).expect("task");
    rt.block_on(repo.store(&task)).expect("store");

    let result = rt.block_on(repo.store(&task));

    assert!(matches!(
        result,
        Err(TaskRepositoryError::DuplicateTask(id)) if id == task.id()
    ));
}

#[rstest]
fn delete_returns_task_and_leaves_gap(shared_test_cluster: &'static TestCluster) {
    ensure_template(shared_test_cluster).expect("template setup");
    let db_name = format!("test_delete_gap_{}", uuid::Uuid::new_v4());
    let _guard = CleanupGuard::new(shared_test_cluster, db_name.clone());
    let (service, _sender) = board_service(shared_test_cluster, &db_name);

    let rt = test_runtime().expect("runtime");
    let first = rt
        .block_on(service.create_task(CreateTaskRequest::new("first", TODO)))
        .expect("create");
    let last = rt
        .block_on(service.create_task(CreateTaskRequest::new("last", TODO)))
        .expect("create");

    let deleted = rt.block_on(service.delete_task(first.id())).expect("delete");
    assert_eq!(deleted.id(), first.id());
    let missing = rt.block_on(service.delete_task(first.id()));
    assert!(matches!(
        missing,
        Err(BoardServiceError::TaskRepository(TaskRepositoryError::NotFound(id))) if id == first.id()
    ));

    let next = rt.block_on(service.assign_next_order(TODO)).expect("next order");
    assert_eq!(next.value(), last.order().value() + 1);
}

#[rstest]
fn columns_and_users_load_from_rows(shared_test_cluster: &'static TestCluster) {
    ensure_template(shared_test_cluster).expect("template setup");
    let db_name = format!("test_columns_users_{}", uuid::Uuid::new_v4());
    let _guard = CleanupGuard::new(shared_test_cluster, db_name.clone());
    let (service, _sender) = board_service(shared_test_cluster, &db_name);
    let owner_id = insert_owner(shared_test_cluster, &db_name).expect("owner");

    let rt = test_runtime().expect("runtime");
    let states: Vec<ColumnState> = rt
        .block_on(service.list_columns())
        .expect("columns")
        .iter()
        .map(|column| column.state())
        .collect();
    assert_eq!(
        states,
        vec![ColumnState::NotStarted, ColumnState::InProgress, ColumnState::Completed]
    );

    let missing = rt.block_on(service.create_task(
        CreateTaskRequest::new("orphan", TODO).with_owner(UserId::new()),
    ));
    assert!(matches!(missing, Err(BoardServiceError::UnknownOwner(_))));
    rt.block_on(service.create_task(CreateTaskRequest::new("owned", TODO).with_owner(owner_id)))
        .expect("owner exists");
}
