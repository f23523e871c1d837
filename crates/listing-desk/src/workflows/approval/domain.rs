use serde::{Deserialize, Serialize};

/// Lifecycle of a candidate row. `Sent` and `Skipped` are terminal: once a row leaves
/// `Pending` it is never written again, apart from the one-shot selected-image merge
/// performed at approval time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ListingStatus {
    Pending,
    Sent,
    Skipped,
}

impl ListingStatus {
    pub const fn label(self) -> &'static str {
        match self {
            ListingStatus::Pending => "pending",
            ListingStatus::Sent => "sent",
            ListingStatus::Skipped => "skipped",
        }
    }

    /// Unknown status text yields `None`; callers treat such rows as non-pending and
    /// leave them alone.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "pending" => Some(ListingStatus::Pending),
            "sent" => Some(ListingStatus::Sent),
            "skipped" => Some(ListingStatus::Skipped),
            _ => None,
        }
    }
}

/// Opaque handle to one physical row of the pending tab, valid for the duration of a
/// single request. Writes go through the store with this reference so nothing above the
/// adapter ever addresses columns by position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RowRef(pub usize);

/// Delivery identity for a customer on the push-messaging side.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecipientId(pub String);

/// Named-field record for one candidate row, as handed out by the store adapter.
/// Numeric columns stay as text here; coercion happens in the entity mapper so its
/// tolerance rules live in exactly one place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PendingRow {
    pub row_ref: RowRef,
    pub customer_name: String,
    pub building_id: String,
    pub room_id: String,
    pub building_name: String,
    pub rent_text: String,
    pub management_fee_text: String,
    pub layout: String,
    pub area_text: String,
    pub station_info: String,
    pub extra_json: String,
    pub status: Option<ListingStatus>,
    pub updated_at: String,
}

/// Normalized in-memory view of one candidate listing. Constructed per request from a
/// row; the table stays the source of truth and the entity is never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Listing {
    pub customer_name: String,
    pub building_id: String,
    pub room_id: String,
    pub building_name: String,
    /// Yen, minor-unit free. 0 means absent or unparsable.
    pub rent: i64,
    pub management_fee: i64,
    pub layout: String,
    pub area: f64,
    pub building_age: String,
    pub floor: i64,
    pub station_info: String,
    pub address: String,
    pub room_number: String,
    pub deposit: String,
    pub key_money: String,
    /// Ordered image URLs; may be empty.
    pub image_urls: Vec<String>,
    /// Legacy singular image, used only when `image_urls` is empty.
    pub image_url: Option<String>,
    /// Reviewer-curated subset persisted at approval time.
    pub selected_image_urls: Option<Vec<String>>,
}

/// One line of the append-only notified log, written once per successful send and never
/// read back by the workflow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeenEntry {
    pub customer_name: String,
    pub building_id: String,
    pub room_id: String,
    pub building_name: String,
    pub rent: i64,
    pub notified_at: String,
}
