use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use async_trait::async_trait;
use metrics_exporter_prometheus::PrometheusHandle;
use tracing::info;

use listing_desk::workflows::approval::table::{
    encode_pending_row, InMemoryRowTable, RowTable, PENDING_TAB, RECIPIENTS_TAB,
};
use listing_desk::workflows::approval::{
    DispatchError, MessagePayload, MessageTransport, RecipientId, StoreError,
};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Logging stand-in for the push transport, used when no endpoint is configured and by
/// the demo. Messages land in the log stream instead of a customer's chat.
pub(crate) struct ConsoleTransport;

#[async_trait]
impl MessageTransport for ConsoleTransport {
    async fn push(
        &self,
        recipient: &RecipientId,
        message: &MessagePayload,
    ) -> Result<(), DispatchError> {
        let payload = serde_json::to_string(message)
            .map_err(|err| DispatchError::Transport(err.to_string()))?;
        info!(recipient = %recipient.0, %payload, "push (console transport)");
        Ok(())
    }
}

/// Seed the demo table: a recipient mapping and two pending candidates for one customer.
pub(crate) fn seed_demo_rows(table: &InMemoryRowTable, customer: &str) -> Result<(), StoreError> {
    table.append_row(
        RECIPIENTS_TAB,
        vec![customer.to_string(), "U-demo-0001".to_string()],
    )?;

    let extra_a = serde_json::json!({
        "building_age": "築5年",
        "floor": 3,
        "address": "東京都新宿区西新宿1-1-1",
        "room_number": "301",
        "deposit": "1ヶ月",
        "key_money": "",
        "image_urls": [
            "https://images.example/9001/01.jpg",
            "https://images.example/9001/02.jpg",
            "https://images.example/9001/03.jpg",
        ],
    })
    .to_string();
    table.append_row(
        PENDING_TAB,
        encode_pending_row(
            customer,
            "b-100",
            "9001",
            "グランメゾン新宿",
            85000,
            5000,
            "1LDK",
            35.2,
            "新宿駅 徒歩5分",
            &extra_a,
        ),
    )?;

    let extra_b = serde_json::json!({
        "building_age": "築12年",
        "floor": 4,
        "address": "東京都世田谷区三軒茶屋2-2-2",
        "room_number": "402",
        "deposit": "1ヶ月",
        "key_money": "1ヶ月",
        "image_urls": ["https://images.example/9002/01.jpg"],
    })
    .to_string();
    table.append_row(
        PENDING_TAB,
        encode_pending_row(
            customer,
            "b-210",
            "9002",
            "サンライズ三軒茶屋",
            98000,
            8000,
            "2DK",
            42.8,
            "三軒茶屋駅 徒歩7分",
            &extra_b,
        ),
    )?;

    Ok(())
}
