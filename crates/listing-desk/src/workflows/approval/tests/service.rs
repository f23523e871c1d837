use std::sync::Arc;

use serde_json::Value;

use crate::workflows::approval::domain::RecipientId;
use crate::workflows::approval::service::{ApprovalError, ApprovalService};
use crate::workflows::approval::table::{
    InMemoryRowTable, RowTable, TableRecipientDirectory, TableStore, PENDING_TAB,
};
use crate::workflows::approval::transport::NoopPacer;

use super::common::*;

const URLS: [&str; 3] = ["https://img/1.jpg", "https://img/2.jpg", "https://img/3.jpg"];

#[tokio::test]
async fn confirm_dispatches_marks_sent_and_logs() {
    let (service, table, transport) = build_service();
    seed_pending(&table, "9001", &sample_extra("301", &URLS));

    let outcome = service
        .confirm(CUSTOMER, "9001", true, "0,2,9,-1,x")
        .await
        .expect("confirm succeeds");

    assert_eq!(outcome.room_id, "9001");
    assert_eq!(outcome.recipient, RecipientId(RECIPIENT.to_string()));
    assert_eq!(outcome.image_count, 2);

    let pushes = transport.pushes();
    assert_eq!(pushes.len(), 1);
    let (recipient, payload) = &pushes[0];
    assert_eq!(recipient, &RecipientId(RECIPIENT.to_string()));
    assert_eq!(payload.card.hero_image_url.as_deref(), Some(URLS[0]));
    let action = payload.card.action.as_ref().expect("view action");
    assert!(action.url.contains("action=view"));
    assert!(action.url.contains("room_id=9001"));

    assert_eq!(status_cell(&table, 0), "sent");
    let stamp = table.rows(PENDING_TAB).expect("pending rows")[0][12].clone();
    assert_eq!(stamp.len(), "2024-12-01 12:34:56".len());

    let seen = seen_rows(&table);
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0][0], CUSTOMER);
    assert_eq!(seen[0][1], "b-100");
    assert_eq!(seen[0][2], "9001");
    assert_eq!(seen[0][3], "グランメゾン新宿");
    assert_eq!(seen[0][4], "85000");
    assert_eq!(seen[0][5], stamp);
}

#[tokio::test]
async fn confirm_persists_the_curated_subset_and_keeps_sibling_keys() {
    let (service, table, _) = build_service();
    seed_pending(&table, "9001", &sample_extra("301", &URLS));

    service
        .confirm(CUSTOMER, "9001", true, "2,0")
        .await
        .expect("confirm succeeds");

    let blob: Value = serde_json::from_str(&extra_cell(&table, 0)).expect("blob stays JSON");
    assert_eq!(blob["room_number"], "301");
    assert_eq!(blob["deposit"], "1ヶ月");
    assert_eq!(
        blob["selected_image_urls"],
        serde_json::json!([URLS[2], URLS[0]])
    );
}

#[tokio::test]
async fn imageless_confirm_persists_no_selection() {
    let (service, table, transport) = build_service();
    let extra = sample_extra("301", &URLS);
    seed_pending(&table, "9001", &extra);

    let outcome = service
        .confirm(CUSTOMER, "9001", false, "")
        .await
        .expect("confirm succeeds");

    assert_eq!(outcome.image_count, 0);
    assert_eq!(transport.pushes()[0].1.card.hero_image_url, None);
    // The blob column was never rewritten.
    assert_eq!(extra_cell(&table, 0), extra);
}

#[tokio::test]
async fn terminal_rows_are_indistinguishable_from_absent_ones() {
    let (service, table, _) = build_service();
    seed_pending(&table, "9001", &sample_extra("301", &URLS));
    seed_pending(&table, "9002", &sample_extra("302", &[]));

    service
        .confirm(CUSTOMER, "9001", false, "")
        .await
        .expect("first confirm succeeds");
    service.skip(CUSTOMER, "9002").expect("skip succeeds");

    for room_id in ["9001", "9002", "no-such-room"] {
        match service.confirm(CUSTOMER, room_id, false, "").await {
            Err(ApprovalError::NotFoundOrProcessed) => {}
            other => panic!("expected NotFoundOrProcessed for {room_id}, got {other:?}"),
        }
        match service.preview(CUSTOMER, room_id) {
            Err(ApprovalError::NotFoundOrProcessed) => {}
            other => panic!("expected NotFoundOrProcessed for {room_id}, got {other:?}"),
        }
    }
}

#[tokio::test]
async fn skip_is_terminal_and_sends_nothing() {
    let (service, table, transport) = build_service();
    seed_pending(&table, "9001", &sample_extra("301", &URLS));

    let skipped = service.skip(CUSTOMER, "9001").expect("skip succeeds");

    assert_eq!(skipped, "9001");
    assert_eq!(status_cell(&table, 0), "skipped");
    assert!(transport.pushes().is_empty());
    assert!(seen_rows(&table).is_empty());

    match service.skip(CUSTOMER, "9001") {
        Err(ApprovalError::NotFoundOrProcessed) => {}
        other => panic!("expected NotFoundOrProcessed, got {other:?}"),
    }
}

#[tokio::test]
async fn unregistered_customer_blocks_the_send_before_dispatch() {
    let (service, table, transport) = build_service();
    seed_pending_for(&table, "佐藤花子", "9001", &sample_extra("301", &URLS));

    match service.confirm("佐藤花子", "9001", true, "0").await {
        Err(ApprovalError::RecipientUnresolved(name)) => assert_eq!(name, "佐藤花子"),
        other => panic!("expected RecipientUnresolved, got {other:?}"),
    }
    assert!(transport.pushes().is_empty());
    assert_eq!(status_cell(&table, 0), "pending");
}

#[tokio::test]
async fn dispatch_failure_leaves_the_row_pending() {
    let (service, table) = build_service_with_transport(Arc::new(FailingTransport));
    seed_pending(&table, "9001", &sample_extra("301", &URLS));

    match service.confirm(CUSTOMER, "9001", true, "0").await {
        Err(ApprovalError::Dispatch(_)) => {}
        other => panic!("expected Dispatch error, got {other:?}"),
    }
    assert_eq!(status_cell(&table, 0), "pending");
    assert!(seen_rows(&table).is_empty());

    // The row is still actionable, so a retry can succeed later.
    assert!(service.preview(CUSTOMER, "9001").is_ok());
}

#[tokio::test]
async fn batch_confirm_honors_per_room_image_inclusion() {
    let (service, table, transport) = build_service();
    seed_pending(&table, "9001", &sample_extra("301", &URLS));
    seed_pending(&table, "9002", &sample_extra("302", &URLS));

    let outcome = service
        .confirm_all(CUSTOMER, "9002")
        .await
        .expect("batch confirm succeeds");

    assert_eq!(outcome.sent, vec!["9001", "9002"]);
    assert!(outcome.failed.is_empty());

    let pushes = transport.pushes();
    assert_eq!(pushes.len(), 2);
    assert_eq!(pushes[0].1.card.hero_image_url, None);
    assert_eq!(pushes[1].1.card.hero_image_url.as_deref(), Some(URLS[0]));

    assert_eq!(status_cell(&table, 0), "sent");
    assert_eq!(status_cell(&table, 1), "sent");
    assert!(!extra_cell(&table, 0).contains("selected_image_urls"));
    let blob: Value = serde_json::from_str(&extra_cell(&table, 1)).expect("blob stays JSON");
    assert_eq!(
        blob["selected_image_urls"],
        serde_json::json!([URLS[0], URLS[1], URLS[2]])
    );
    assert_eq!(seen_rows(&table).len(), 2);
}

#[tokio::test]
async fn batch_confirm_continues_past_a_failed_send() {
    let (service, table) = build_service_with_transport(Arc::new(FlakyTransport::default()));
    seed_pending(&table, "9001", &sample_extra("301", &URLS));
    seed_pending(&table, "9002", &sample_extra("302", &URLS));

    let outcome = service
        .confirm_all(CUSTOMER, "")
        .await
        .expect("batch confirm returns an outcome");

    assert_eq!(outcome.failed, vec!["9001"]);
    assert_eq!(outcome.sent, vec!["9002"]);
    assert_eq!(status_cell(&table, 0), "pending");
    assert_eq!(status_cell(&table, 1), "sent");
    assert_eq!(seen_rows(&table).len(), 1);
}

#[tokio::test]
async fn batch_confirm_with_no_pending_rows_is_not_found() {
    let (service, _, _) = build_service();

    match service.confirm_all(CUSTOMER, "").await {
        Err(ApprovalError::NotFoundOrProcessed) => {}
        other => panic!("expected NotFoundOrProcessed, got {other:?}"),
    }
}

#[tokio::test]
async fn view_links_append_to_a_query_bearing_base() {
    let table = Arc::new(InMemoryRowTable::default());
    seed_recipient_for(&table, CUSTOMER, RECIPIENT);
    seed_pending(&table, "9001", &sample_extra("301", &URLS));
    let transport = Arc::new(MemoryTransport::default());
    let service = ApprovalService::new(
        Arc::new(TableStore::new(table.clone())),
        Arc::new(TableRecipientDirectory::new(table)),
        transport.clone(),
        Arc::new(NoopPacer),
        "http://127.0.0.1:3000/approval?src=msg",
    );

    service
        .confirm(CUSTOMER, "9001", false, "")
        .await
        .expect("confirm succeeds");

    let pushes = transport.pushes();
    let action = pushes[0].1.card.action.as_ref().expect("view action");
    assert!(action
        .url
        .starts_with("http://127.0.0.1:3000/approval?src=msg&action=view"));
    assert_eq!(action.url.matches('?').count(), 1);
}

#[tokio::test]
async fn preview_mutates_nothing() {
    let (service, table, transport) = build_service();
    seed_pending(&table, "9001", &sample_extra("301", &URLS));
    let before = table.rows(PENDING_TAB).expect("pending rows");

    let preview = service.preview(CUSTOMER, "9001").expect("preview succeeds");
    assert_eq!(preview.images.len(), 3);
    assert!(preview.images.iter().all(|choice| choice.selected));

    let cards = service.preview_all(CUSTOMER).expect("batch preview succeeds");
    assert_eq!(cards.len(), 1);
    assert!(cards[0].include_images);

    assert_eq!(table.rows(PENDING_TAB).expect("pending rows"), before);
    assert!(transport.pushes().is_empty());
    assert!(seen_rows(&table).is_empty());
}
