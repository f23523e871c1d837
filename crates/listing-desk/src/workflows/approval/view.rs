use serde::Serialize;

use super::domain::Listing;

/// Customer-visible projection of an approved listing. Serializes to the `view_api`
/// JSON document; identity fields stay out so a shared link leaks nothing beyond what
/// the reviewer approved.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerListingView {
    pub building_name: String,
    pub room_number: String,
    pub rent: i64,
    pub management_fee: i64,
    pub layout: String,
    pub area: f64,
    pub building_age: String,
    pub floor: i64,
    pub station_info: String,
    pub address: String,
    pub deposit: String,
    pub key_money: String,
    pub images: Vec<String>,
}

impl CustomerListingView {
    pub fn from_listing(listing: &Listing) -> Self {
        Self {
            building_name: listing.building_name.clone(),
            room_number: listing.room_number.clone(),
            rent: listing.rent,
            management_fee: listing.management_fee,
            layout: listing.layout.clone(),
            area: listing.area,
            building_age: listing.building_age.clone(),
            floor: listing.floor,
            station_info: listing.station_info.clone(),
            address: listing.address.clone(),
            deposit: listing.deposit.clone(),
            key_money: listing.key_money.clone(),
            images: resolve_images(listing),
        }
    }

    /// First carousel slide, if any.
    pub fn hero_image(&self) -> Option<&str> {
        self.images.first().map(String::as_str)
    }
}

/// Image fallback chain for the customer view: the reviewer-curated subset when one was
/// persisted and non-empty, then the full list, then the legacy singular URL.
pub fn resolve_images(listing: &Listing) -> Vec<String> {
    if let Some(selected) = &listing.selected_image_urls {
        if !selected.is_empty() {
            return selected.clone();
        }
    }
    if !listing.image_urls.is_empty() {
        return listing.image_urls.clone();
    }
    listing.image_url.iter().cloned().collect()
}
