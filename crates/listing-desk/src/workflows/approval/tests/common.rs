use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::json;

use crate::workflows::approval::domain::{Listing, RecipientId};
use crate::workflows::approval::message::MessagePayload;
use crate::workflows::approval::service::ApprovalService;
use crate::workflows::approval::table::{
    encode_pending_row, InMemoryRowTable, RowTable, TableRecipientDirectory, TableStore,
    PENDING_TAB, RECIPIENTS_TAB, SEEN_TAB,
};
use crate::workflows::approval::transport::{DispatchError, MessageTransport, NoopPacer};

pub(super) const CUSTOMER: &str = "山田太郎";
pub(super) const RECIPIENT: &str = "U-20241201";
pub(super) const VIEW_BASE: &str = "http://127.0.0.1:3000/approval";

pub(super) fn sample_extra(room_number: &str, urls: &[&str]) -> String {
    json!({
        "building_age": "築5年",
        "floor": 3,
        "address": "東京都新宿区西新宿1-1-1",
        "room_number": room_number,
        "deposit": "1ヶ月",
        "key_money": "",
        "image_urls": urls,
    })
    .to_string()
}

pub(super) fn seed_pending_for(
    table: &InMemoryRowTable,
    customer: &str,
    room_id: &str,
    extra: &str,
) {
    table
        .append_row(
            PENDING_TAB,
            encode_pending_row(
                customer,
                "b-100",
                room_id,
                "グランメゾン新宿",
                85000,
                5000,
                "1LDK",
                35.2,
                "新宿駅 徒歩5分",
                extra,
            ),
        )
        .expect("seed pending row");
}

pub(super) fn seed_pending(table: &InMemoryRowTable, room_id: &str, extra: &str) {
    seed_pending_for(table, CUSTOMER, room_id, extra);
}

pub(super) fn seed_recipient_for(table: &InMemoryRowTable, customer: &str, recipient: &str) {
    table
        .append_row(
            RECIPIENTS_TAB,
            vec![customer.to_string(), recipient.to_string()],
        )
        .expect("seed recipient row");
}

/// Raw cell peeks for assertions; the tests seeded raw rows, so reading them back raw
/// keeps the adapter's round trip honest.
pub(super) fn status_cell(table: &InMemoryRowTable, index: usize) -> String {
    table.rows(PENDING_TAB).expect("pending rows")[index][10].clone()
}

pub(super) fn extra_cell(table: &InMemoryRowTable, index: usize) -> String {
    table.rows(PENDING_TAB).expect("pending rows")[index][9].clone()
}

pub(super) fn seen_rows(table: &InMemoryRowTable) -> Vec<Vec<String>> {
    table.rows(SEEN_TAB).expect("seen rows")
}

pub(super) fn sample_listing(urls: &[&str]) -> Listing {
    Listing {
        customer_name: CUSTOMER.to_string(),
        building_id: "b-100".to_string(),
        room_id: "9001".to_string(),
        building_name: "グランメゾン新宿".to_string(),
        rent: 85000,
        management_fee: 5000,
        layout: "1LDK".to_string(),
        area: 35.2,
        building_age: "築5年".to_string(),
        floor: 3,
        station_info: "新宿駅 徒歩5分".to_string(),
        address: "東京都新宿区西新宿1-1-1".to_string(),
        room_number: "301".to_string(),
        deposit: "1ヶ月".to_string(),
        key_money: String::new(),
        image_urls: urls.iter().map(|u| u.to_string()).collect(),
        image_url: None,
        selected_image_urls: None,
    }
}

#[derive(Default)]
pub(super) struct MemoryTransport {
    pushes: Mutex<Vec<(RecipientId, MessagePayload)>>,
}

impl MemoryTransport {
    pub(super) fn pushes(&self) -> Vec<(RecipientId, MessagePayload)> {
        self.pushes.lock().expect("transport mutex poisoned").clone()
    }
}

#[async_trait]
impl MessageTransport for MemoryTransport {
    async fn push(
        &self,
        recipient: &RecipientId,
        message: &MessagePayload,
    ) -> Result<(), DispatchError> {
        self.pushes
            .lock()
            .expect("transport mutex poisoned")
            .push((recipient.clone(), message.clone()));
        Ok(())
    }
}

pub(super) struct FailingTransport;

#[async_trait]
impl MessageTransport for FailingTransport {
    async fn push(
        &self,
        _recipient: &RecipientId,
        _message: &MessagePayload,
    ) -> Result<(), DispatchError> {
        Err(DispatchError::Transport("connection refused".to_string()))
    }
}

/// Fails the first push only; later pushes succeed. Exercises batch partial failure.
#[derive(Default)]
pub(super) struct FlakyTransport {
    calls: Mutex<usize>,
}

#[async_trait]
impl MessageTransport for FlakyTransport {
    async fn push(
        &self,
        _recipient: &RecipientId,
        _message: &MessagePayload,
    ) -> Result<(), DispatchError> {
        let mut calls = self.calls.lock().expect("transport mutex poisoned");
        *calls += 1;
        if *calls == 1 {
            return Err(DispatchError::Transport("connection reset".to_string()));
        }
        Ok(())
    }
}

pub(super) type TestStore = TableStore<InMemoryRowTable>;
pub(super) type TestDirectory = TableRecipientDirectory<InMemoryRowTable>;

pub(super) fn build_service_with_transport<T>(
    transport: Arc<T>,
) -> (
    Arc<ApprovalService<TestStore, TestDirectory, T>>,
    Arc<InMemoryRowTable>,
)
where
    T: MessageTransport + 'static,
{
    let table = Arc::new(InMemoryRowTable::default());
    seed_recipient_for(&table, CUSTOMER, RECIPIENT);
    let store = Arc::new(TableStore::new(table.clone()));
    let directory = Arc::new(TableRecipientDirectory::new(table.clone()));
    let service = Arc::new(ApprovalService::new(
        store,
        directory,
        transport,
        Arc::new(NoopPacer),
        VIEW_BASE,
    ));
    (service, table)
}

pub(super) fn build_service() -> (
    Arc<ApprovalService<TestStore, TestDirectory, MemoryTransport>>,
    Arc<InMemoryRowTable>,
    Arc<MemoryTransport>,
) {
    let transport = Arc::new(MemoryTransport::default());
    let (service, table) = build_service_with_transport(transport.clone());
    (service, table, transport)
}
