use super::domain::{ListingStatus, PendingRow, RowRef, SeenEntry};

/// Storage abstraction over the pending-listings table and the notified log, so the
/// state machine can be exercised against in-memory fakes. Every operation re-reads the
/// backing rows; the adapter holds no state between requests.
pub trait PendingStore: Send + Sync {
    /// First pending row matching the natural key `(customer, room_id)`, in storage
    /// order. Uniqueness among pending rows makes first-match safe. Rows that are
    /// already `sent` or `skipped` are invisible here, which is what makes
    /// "already processed" indistinguishable from "not found".
    fn find_pending(&self, customer: &str, room_id: &str) -> Result<Option<PendingRow>, StoreError>;

    /// All pending rows for a customer, in storage order.
    fn find_all_pending(&self, customer: &str) -> Result<Vec<PendingRow>, StoreError>;

    /// First row matching the key with status exactly `sent`. Used by the customer view
    /// gate only.
    fn find_sent(&self, customer: &str, room_id: &str) -> Result<Option<PendingRow>, StoreError>;

    /// Write status plus the formatted timestamp in one row write. No cross-row
    /// transaction guarantee.
    fn update_status(
        &self,
        row: &RowRef,
        status: ListingStatus,
        stamp: &str,
    ) -> Result<(), StoreError>;

    /// Append one line to the notified log.
    fn append_seen(&self, entry: &SeenEntry) -> Result<(), StoreError>;

    /// Read-modify-write merge of `selected_image_urls` into the row's JSON blob.
    /// Sibling keys must survive; concurrent writers to the same row are last-write-wins.
    fn save_selected_images(&self, row: &RowRef, urls: &[String]) -> Result<(), StoreError>;
}

/// Error enumeration for store failures.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("row reference is no longer valid")]
    StaleRowRef,
    #[error("table unavailable: {0}")]
    Unavailable(String),
}
