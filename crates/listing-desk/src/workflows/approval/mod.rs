//! Single-reviewer approval workflow for sourced rental listings.
//!
//! A pending candidate row moves along `pending -> sent` (approve: curate photos, push a
//! card to the customer, log the send) or `pending -> skipped`. Both terminal states are
//! invisible to further actions, which deliberately makes "already processed" and
//! "not found" the same answer. A separate read-only path renders the customer view,
//! gated on the `sent` status.

pub mod domain;
pub mod mapper;
pub mod message;
pub mod pages;
pub mod router;
pub mod selection;
pub mod service;
pub mod store;
pub mod table;
pub mod transport;
pub mod view;

#[cfg(test)]
mod tests;

pub use domain::{Listing, ListingStatus, PendingRow, RecipientId, RowRef, SeenEntry};
pub use mapper::{parse_extra, row_to_listing, ListingExtra};
pub use message::{build_message, format_man_yen, MessageOptions, MessagePayload};
pub use router::approval_router;
pub use selection::ImageChoice;
pub use service::{
    ApprovalError, ApprovalPreview, ApprovalService, BatchCard, BatchOutcome, SendOutcome,
};
pub use store::{PendingStore, StoreError};
pub use table::{InMemoryRowTable, RowTable, TableRecipientDirectory, TableStore};
pub use transport::{
    DirectoryError, DispatchError, DispatchPacer, FixedDelayPacer, HttpPushTransport,
    MessageTransport, NoopPacer, RecipientDirectory,
};
pub use view::CustomerListingView;
