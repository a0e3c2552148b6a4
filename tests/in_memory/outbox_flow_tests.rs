//! Completion notifications delivered through the outbox.

use std::sync::Arc;

use super::helpers::{ACTIVE, SHIPPED, SeededStore, seeded, service_with};
use rstest::rstest;
use taskboard::board::{
    adapters::{
        memory::RecordingNotificationSender,
        outbox::{NotificationOutbox, OutboxConfig, OutboxNotificationSender, OutboxRelay},
    },
    services::{CreateTaskRequest, UpdateTaskRequest},
};

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn completion_is_queued_then_relayed(seeded: SeededStore) {
    let outbox = NotificationOutbox::new();
    let service = service_with(&seeded, Arc::new(OutboxNotificationSender::new(outbox.clone())));
    let task = service
        .create_task(CreateTaskRequest::new("Deploy", ACTIVE).with_owner(seeded.owner))
        .await
        .expect("create should succeed");

    service
        .update_task_with_transition_check(UpdateTaskRequest::new(task.id()).with_column(SHIPPED))
        .await
        .expect("update should succeed");
    assert_eq!(outbox.len().expect("outbox lock"), 1);

    let transport = Arc::new(RecordingNotificationSender::new());
    let relay = OutboxRelay::new(outbox.clone(), Arc::clone(&transport), OutboxConfig::default());
    let report = relay.relay().await.expect("relay should run");

    assert_eq!(report.delivered, 1);
    assert!(outbox.is_empty().expect("outbox lock"));
    let sent = transport.sent().expect("recorder lock");
    assert_eq!(sent.len(), 1);
    assert_eq!(
        sent.first().map(|notification| notification.to().as_str()),
        Some("dana@example.com")
    );
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn outbox_keeps_entry_while_transport_is_down(seeded: SeededStore) {
    let outbox = NotificationOutbox::new();
    let service = service_with(&seeded, Arc::new(OutboxNotificationSender::new(outbox.clone())));
    let task = service
        .create_task(CreateTaskRequest::new("Launch", ACTIVE).with_owner(seeded.owner))
        .await
        .expect("create should succeed");
    service
        .bulk_move(&[task.id()], SHIPPED)
        .await
        .expect("bulk move should succeed");

    let transport = Arc::new(RecordingNotificationSender::failing("smtp down"));
    let relay = OutboxRelay::new(outbox.clone(), Arc::clone(&transport), OutboxConfig::default());
    let report = relay.relay().await.expect("relay should run");

    assert_eq!(report.requeued, 1);
    assert_eq!(outbox.len().expect("outbox lock"), 1);
}
