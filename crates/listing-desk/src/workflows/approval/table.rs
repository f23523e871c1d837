use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use serde_json::{Map, Value};

use super::domain::{ListingStatus, PendingRow, RecipientId, RowRef, SeenEntry};
use super::store::{PendingStore, StoreError};
use super::transport::{DirectoryError, RecipientDirectory};

/// Minimal surface the backing spreadsheet-like store must provide. The real table is an
/// external collaborator; tests and the demo run on [`InMemoryRowTable`].
pub trait RowTable: Send + Sync {
    /// All rows of a tab, in storage order. Rows may be ragged (shorter than the
    /// nominal column count).
    fn rows(&self, tab: &str) -> Result<Vec<Vec<String>>, StoreError>;

    /// Overwrite one row in place.
    fn write_row(&self, tab: &str, index: usize, row: Vec<String>) -> Result<(), StoreError>;

    /// Append a row at the end of a tab.
    fn append_row(&self, tab: &str, row: Vec<String>) -> Result<(), StoreError>;
}

/// Positional layout of the pending tab. Nothing outside this module addresses columns
/// by index.
mod columns {
    pub const CUSTOMER_NAME: usize = 0;
    pub const BUILDING_ID: usize = 1;
    pub const ROOM_ID: usize = 2;
    pub const BUILDING_NAME: usize = 3;
    pub const RENT: usize = 4;
    pub const MANAGEMENT_FEE: usize = 5;
    pub const LAYOUT: usize = 6;
    pub const AREA: usize = 7;
    pub const STATION_INFO: usize = 8;
    pub const EXTRA_JSON: usize = 9;
    pub const STATUS: usize = 10;
    // index 11 is reserved
    pub const UPDATED_AT: usize = 12;
    pub const WIDTH: usize = 13;
}

pub const PENDING_TAB: &str = "pending_listings";
pub const SEEN_TAB: &str = "notified_listings";
pub const RECIPIENTS_TAB: &str = "recipients";

/// [`PendingStore`] adapter over any [`RowTable`]. Owns the row (de)serialization so the
/// rest of the workflow only ever sees named-field records.
pub struct TableStore<T> {
    table: Arc<T>,
    pending_tab: String,
    seen_tab: String,
}

impl<T: RowTable> TableStore<T> {
    pub fn new(table: Arc<T>) -> Self {
        Self {
            table,
            pending_tab: PENDING_TAB.to_string(),
            seen_tab: SEEN_TAB.to_string(),
        }
    }

    pub fn with_tabs(table: Arc<T>, pending_tab: &str, seen_tab: &str) -> Self {
        Self {
            table,
            pending_tab: pending_tab.to_string(),
            seen_tab: seen_tab.to_string(),
        }
    }

    fn scan(&self) -> Result<Vec<PendingRow>, StoreError> {
        let rows = self.table.rows(&self.pending_tab)?;
        Ok(rows
            .iter()
            .enumerate()
            .map(|(index, row)| decode_row(index, row))
            .collect())
    }

    fn first_matching(
        &self,
        customer: &str,
        room_id: &str,
        status: ListingStatus,
    ) -> Result<Option<PendingRow>, StoreError> {
        Ok(self.scan()?.into_iter().find(|row| {
            row.status == Some(status) && row.customer_name == customer && row.room_id == room_id
        }))
    }
}

fn cell(row: &[String], index: usize) -> String {
    row.get(index).cloned().unwrap_or_default()
}

fn decode_row(index: usize, row: &[String]) -> PendingRow {
    PendingRow {
        row_ref: RowRef(index),
        customer_name: cell(row, columns::CUSTOMER_NAME),
        building_id: cell(row, columns::BUILDING_ID),
        room_id: cell(row, columns::ROOM_ID),
        building_name: cell(row, columns::BUILDING_NAME),
        rent_text: cell(row, columns::RENT),
        management_fee_text: cell(row, columns::MANAGEMENT_FEE),
        layout: cell(row, columns::LAYOUT),
        area_text: cell(row, columns::AREA),
        station_info: cell(row, columns::STATION_INFO),
        extra_json: cell(row, columns::EXTRA_JSON),
        status: ListingStatus::parse(&cell(row, columns::STATUS)),
        updated_at: cell(row, columns::UPDATED_AT),
    }
}

/// Build the positional row for a fresh pending candidate. The intake pipeline is the
/// usual writer; the demo and tests seed through this.
pub fn encode_pending_row(
    customer_name: &str,
    building_id: &str,
    room_id: &str,
    building_name: &str,
    rent: i64,
    management_fee: i64,
    layout: &str,
    area: f64,
    station_info: &str,
    extra_json: &str,
) -> Vec<String> {
    let mut row = vec![String::new(); columns::WIDTH];
    row[columns::CUSTOMER_NAME] = customer_name.to_string();
    row[columns::BUILDING_ID] = building_id.to_string();
    row[columns::ROOM_ID] = room_id.to_string();
    row[columns::BUILDING_NAME] = building_name.to_string();
    row[columns::RENT] = rent.to_string();
    row[columns::MANAGEMENT_FEE] = management_fee.to_string();
    row[columns::LAYOUT] = layout.to_string();
    row[columns::AREA] = area.to_string();
    row[columns::STATION_INFO] = station_info.to_string();
    row[columns::EXTRA_JSON] = extra_json.to_string();
    row[columns::STATUS] = ListingStatus::Pending.label().to_string();
    row
}

impl<T: RowTable> PendingStore for TableStore<T> {
    fn find_pending(&self, customer: &str, room_id: &str) -> Result<Option<PendingRow>, StoreError> {
        self.first_matching(customer, room_id, ListingStatus::Pending)
    }

    fn find_all_pending(&self, customer: &str) -> Result<Vec<PendingRow>, StoreError> {
        Ok(self
            .scan()?
            .into_iter()
            .filter(|row| {
                row.status == Some(ListingStatus::Pending) && row.customer_name == customer
            })
            .collect())
    }

    fn find_sent(&self, customer: &str, room_id: &str) -> Result<Option<PendingRow>, StoreError> {
        self.first_matching(customer, room_id, ListingStatus::Sent)
    }

    fn update_status(
        &self,
        row: &RowRef,
        status: ListingStatus,
        stamp: &str,
    ) -> Result<(), StoreError> {
        let rows = self.table.rows(&self.pending_tab)?;
        let mut cells = rows.get(row.0).cloned().ok_or(StoreError::StaleRowRef)?;
        cells.resize(columns::WIDTH.max(cells.len()), String::new());
        cells[columns::STATUS] = status.label().to_string();
        cells[columns::UPDATED_AT] = stamp.to_string();
        self.table.write_row(&self.pending_tab, row.0, cells)
    }

    fn append_seen(&self, entry: &SeenEntry) -> Result<(), StoreError> {
        self.table.append_row(
            &self.seen_tab,
            vec![
                entry.customer_name.clone(),
                entry.building_id.clone(),
                entry.room_id.clone(),
                entry.building_name.clone(),
                entry.rent.to_string(),
                entry.notified_at.clone(),
            ],
        )
    }

    fn save_selected_images(&self, row: &RowRef, urls: &[String]) -> Result<(), StoreError> {
        let rows = self.table.rows(&self.pending_tab)?;
        let mut cells = rows.get(row.0).cloned().ok_or(StoreError::StaleRowRef)?;
        cells.resize(columns::WIDTH.max(cells.len()), String::new());

        // Merge, not replace: other keys in the blob must survive. A blob that does not
        // parse as an object starts over as one.
        let mut blob = match serde_json::from_str::<Value>(&cells[columns::EXTRA_JSON]) {
            Ok(Value::Object(map)) => map,
            _ => Map::new(),
        };
        blob.insert(
            "selected_image_urls".to_string(),
            Value::Array(urls.iter().cloned().map(Value::String).collect()),
        );
        cells[columns::EXTRA_JSON] = Value::Object(blob).to_string();

        self.table.write_row(&self.pending_tab, row.0, cells)
    }
}

/// Table-backed in-memory fake, also used as the demo backend.
#[derive(Default)]
pub struct InMemoryRowTable {
    tabs: Mutex<HashMap<String, Vec<Vec<String>>>>,
}

impl RowTable for InMemoryRowTable {
    fn rows(&self, tab: &str) -> Result<Vec<Vec<String>>, StoreError> {
        let tabs = self.tabs.lock().expect("row table mutex poisoned");
        Ok(tabs.get(tab).cloned().unwrap_or_default())
    }

    fn write_row(&self, tab: &str, index: usize, row: Vec<String>) -> Result<(), StoreError> {
        let mut tabs = self.tabs.lock().expect("row table mutex poisoned");
        let rows = tabs.get_mut(tab).ok_or(StoreError::StaleRowRef)?;
        let slot = rows.get_mut(index).ok_or(StoreError::StaleRowRef)?;
        *slot = row;
        Ok(())
    }

    fn append_row(&self, tab: &str, row: Vec<String>) -> Result<(), StoreError> {
        let mut tabs = self.tabs.lock().expect("row table mutex poisoned");
        tabs.entry(tab.to_string()).or_default().push(row);
        Ok(())
    }
}

/// Recipient lookup backed by a two-column tab: `[customer_name, recipient_id]`.
pub struct TableRecipientDirectory<T> {
    table: Arc<T>,
    tab: String,
}

impl<T: RowTable> TableRecipientDirectory<T> {
    pub fn new(table: Arc<T>) -> Self {
        Self {
            table,
            tab: RECIPIENTS_TAB.to_string(),
        }
    }
}

impl<T: RowTable> RecipientDirectory for TableRecipientDirectory<T> {
    fn resolve(&self, customer: &str) -> Result<Option<RecipientId>, DirectoryError> {
        let rows = self
            .table
            .rows(&self.tab)
            .map_err(|err| DirectoryError::Unavailable(err.to_string()))?;
        Ok(rows.iter().find_map(|row| {
            let name = row.first().map(String::as_str).unwrap_or_default();
            let id = row.get(1).map(String::as_str).unwrap_or_default();
            (name.trim() == customer && !id.trim().is_empty())
                .then(|| RecipientId(id.trim().to_string()))
        }))
    }
}
