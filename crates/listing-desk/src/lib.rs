//! Listing Desk: a single-reviewer approval workflow for sourced rental listings.
//!
//! Candidate listings land in a row-addressable table (an external collaborator behind
//! the [`workflows::approval::RowTable`] seam). A reviewer previews pending candidates,
//! curates which photos accompany each one, then approves or skips them. Approval pushes
//! a card-style message to the customer through an injected transport; a read-only
//! customer view renders the listing afterwards, gated on the `sent` status.

pub mod config;
pub mod error;
pub mod telemetry;
pub mod workflows;
