use std::sync::Arc;

use chrono::Local;
use tracing::{info, warn};

use super::domain::{Listing, ListingStatus, PendingRow, RecipientId, SeenEntry};
use super::mapper::row_to_listing;
use super::message::{build_message, MessageOptions};
use super::selection::{
    image_choices, parse_room_id_csv, resolve_batch, resolve_single, ImageChoice,
};
use super::store::{PendingStore, StoreError};
use super::transport::{
    DirectoryError, DispatchError, DispatchPacer, MessageTransport, RecipientDirectory,
};
use super::view::CustomerListingView;

/// Single-listing preview: the normalized listing plus its image candidates, all
/// selected by default.
#[derive(Debug, Clone)]
pub struct ApprovalPreview {
    pub listing: Listing,
    pub images: Vec<ImageChoice>,
}

/// One card of the batch preview. Images default to included; the confirmation step
/// sends back the room ids that stayed checked.
#[derive(Debug, Clone)]
pub struct BatchCard {
    pub listing: Listing,
    pub include_images: bool,
}

/// Result of a confirmed single approval.
#[derive(Debug, Clone)]
pub struct SendOutcome {
    pub room_id: String,
    pub recipient: RecipientId,
    pub image_count: usize,
}

/// Row-by-row result of a batch approval. Partial success is expected: failed rows keep
/// their pending status and can be retried.
#[derive(Debug, Clone, Default)]
pub struct BatchOutcome {
    pub sent: Vec<String>,
    pub failed: Vec<String>,
}

/// Error raised by the approval workflow.
#[derive(Debug, thiserror::Error)]
pub enum ApprovalError {
    #[error("missing required parameter `{0}`")]
    MissingParam(&'static str),
    /// Absent and already-processed rows are indistinguishable by design: pending-only
    /// lookups hide both the same way.
    #[error("no matching pending listing")]
    NotFoundOrProcessed,
    #[error("no delivery identity registered for {0}")]
    RecipientUnresolved(String),
    /// Customer view gate: the row is absent, still pending, or was skipped.
    #[error("listing is not visible")]
    NotVisible,
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Directory(#[from] DirectoryError),
    #[error(transparent)]
    Dispatch(#[from] DispatchError),
}

/// The approval state machine. Stateless between requests: every operation re-reads the
/// table through the injected store, so two racing requests can both observe a row as
/// pending (the double-send window is accepted, see DESIGN.md).
pub struct ApprovalService<S, D, T> {
    store: Arc<S>,
    directory: Arc<D>,
    transport: Arc<T>,
    pacer: Arc<dyn DispatchPacer>,
    view_base_url: String,
}

fn now_stamp() -> String {
    Local::now().format("%Y-%m-%d %H:%M:%S").to_string()
}

impl<S, D, T> ApprovalService<S, D, T>
where
    S: PendingStore + 'static,
    D: RecipientDirectory + 'static,
    T: MessageTransport + 'static,
{
    pub fn new(
        store: Arc<S>,
        directory: Arc<D>,
        transport: Arc<T>,
        pacer: Arc<dyn DispatchPacer>,
        view_base_url: &str,
    ) -> Self {
        Self {
            store,
            directory,
            transport,
            pacer,
            view_base_url: view_base_url
                .trim_end_matches(|c| c == '?' || c == '&')
                .to_string(),
        }
    }

    /// Read-only single-listing preview. Mutates nothing.
    pub fn preview(&self, customer: &str, room_id: &str) -> Result<ApprovalPreview, ApprovalError> {
        let row = self.require_pending(customer, room_id)?;
        let listing = row_to_listing(&row);
        Ok(ApprovalPreview {
            images: image_choices(&listing),
            listing,
        })
    }

    /// Read-only batch preview: one card per pending listing, in storage order.
    pub fn preview_all(&self, customer: &str) -> Result<Vec<BatchCard>, ApprovalError> {
        let rows = self.store.find_all_pending(customer)?;
        if rows.is_empty() {
            return Err(ApprovalError::NotFoundOrProcessed);
        }
        Ok(rows
            .iter()
            .map(|row| BatchCard {
                listing: row_to_listing(row),
                include_images: true,
            })
            .collect())
    }

    /// Approve one listing: resolve the recipient, resolve and persist the image subset,
    /// dispatch the card, then mark `sent` and append the notified log. A dispatch
    /// failure propagates and leaves the row pending (marking is at-most-once).
    pub async fn confirm(
        &self,
        customer: &str,
        room_id: &str,
        include_image: bool,
        selected_csv: &str,
    ) -> Result<SendOutcome, ApprovalError> {
        let row = self.require_pending(customer, room_id)?;
        let listing = row_to_listing(&row);
        let recipient = self.require_recipient(customer)?;

        let selected = resolve_single(&listing, include_image, selected_csv);
        self.send_one(&row, &listing, &recipient, &selected).await?;

        Ok(SendOutcome {
            room_id: listing.room_id,
            recipient,
            image_count: selected.len(),
        })
    }

    /// Approve every pending listing for the customer, in storage order. Image inclusion
    /// is all-or-nothing per room id. Failures partway neither roll back prior sends nor
    /// halt the rest; the outcome reports both sides.
    pub async fn confirm_all(
        &self,
        customer: &str,
        images_csv: &str,
    ) -> Result<BatchOutcome, ApprovalError> {
        let rows = self.store.find_all_pending(customer)?;
        if rows.is_empty() {
            return Err(ApprovalError::NotFoundOrProcessed);
        }
        let recipient = self.require_recipient(customer)?;
        let with_images = parse_room_id_csv(images_csv);

        let mut outcome = BatchOutcome::default();
        for (index, row) in rows.iter().enumerate() {
            if index > 0 {
                self.pacer.pause().await;
            }

            let listing = row_to_listing(row);
            let include = with_images.iter().any(|id| id == &listing.room_id);
            let selected = resolve_batch(&listing, include);

            match self.send_one(row, &listing, &recipient, &selected).await {
                Ok(()) => outcome.sent.push(listing.room_id.clone()),
                Err(err) => {
                    warn!(
                        customer,
                        room_id = %listing.room_id,
                        error = %err,
                        "batch send failed; continuing with remaining listings"
                    );
                    outcome.failed.push(listing.room_id.clone());
                }
            }
        }

        Ok(outcome)
    }

    /// Skip a pending listing. Terminal, no message.
    pub fn skip(&self, customer: &str, room_id: &str) -> Result<String, ApprovalError> {
        let row = self.require_pending(customer, room_id)?;
        self.store
            .update_status(&row.row_ref, ListingStatus::Skipped, &now_stamp())?;
        info!(customer, room_id, "listing skipped");
        Ok(row.room_id)
    }

    /// Customer-facing read path, gated on status exactly `sent`. Pending, skipped, and
    /// absent rows all resolve to the same outcome so guessed identifiers reveal
    /// nothing.
    pub fn customer_view(
        &self,
        customer: &str,
        room_id: &str,
    ) -> Result<CustomerListingView, ApprovalError> {
        let row = self
            .store
            .find_sent(customer, room_id)?
            .ok_or(ApprovalError::NotVisible)?;
        Ok(CustomerListingView::from_listing(&row_to_listing(&row)))
    }

    fn require_pending(&self, customer: &str, room_id: &str) -> Result<PendingRow, ApprovalError> {
        self.store
            .find_pending(customer, room_id)?
            .ok_or(ApprovalError::NotFoundOrProcessed)
    }

    fn require_recipient(&self, customer: &str) -> Result<RecipientId, ApprovalError> {
        self.directory
            .resolve(customer)?
            .ok_or_else(|| ApprovalError::RecipientUnresolved(customer.to_string()))
    }

    fn view_url(&self, customer: &str, room_id: &str) -> String {
        // A base that already carries a query gets appended to, not re-queried.
        let separator = if self.view_base_url.contains('?') { '&' } else { '?' };
        format!(
            "{}{}action=view&customer={}&room_id={}",
            self.view_base_url,
            separator,
            urlencoding::encode(customer),
            urlencoding::encode(room_id)
        )
    }

    /// Shared send path for both flows: persist the curated subset (only when there is
    /// one), dispatch, then mark `sent` and log. Ordering is deliberate — see the
    /// mark-sent decision in DESIGN.md.
    async fn send_one(
        &self,
        row: &PendingRow,
        listing: &Listing,
        recipient: &RecipientId,
        selected: &[String],
    ) -> Result<(), ApprovalError> {
        if !selected.is_empty() {
            self.store.save_selected_images(&row.row_ref, selected)?;
        }

        let hero = selected.first().cloned();
        let message = build_message(
            listing,
            &MessageOptions {
                include_image: hero.is_some(),
                hero_image_url: hero,
                view_url: self.view_url(&listing.customer_name, &listing.room_id),
            },
        );

        self.transport.push(recipient, &message).await?;

        let stamp = now_stamp();
        self.store
            .update_status(&row.row_ref, ListingStatus::Sent, &stamp)?;
        self.store.append_seen(&SeenEntry {
            customer_name: listing.customer_name.clone(),
            building_id: listing.building_id.clone(),
            room_id: listing.room_id.clone(),
            building_name: listing.building_name.clone(),
            rent: listing.rent,
            notified_at: stamp,
        })?;

        info!(
            customer = %listing.customer_name,
            room_id = %listing.room_id,
            images = selected.len(),
            "listing approved and dispatched"
        );
        Ok(())
    }
}
