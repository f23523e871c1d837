use crate::workflows::approval::domain::{PendingRow, RowRef};
use crate::workflows::approval::mapper::{parse_extra, row_to_listing, ListingExtra};

use super::common::sample_extra;

fn raw_row(extra_json: &str) -> PendingRow {
    PendingRow {
        row_ref: RowRef(0),
        customer_name: "山田太郎".to_string(),
        building_id: "b-100".to_string(),
        room_id: "9001".to_string(),
        building_name: "グランメゾン新宿".to_string(),
        rent_text: "85,000円".to_string(),
        management_fee_text: "5000".to_string(),
        layout: "1LDK".to_string(),
        area_text: "35.2m²".to_string(),
        station_info: "新宿駅 徒歩5分".to_string(),
        extra_json: extra_json.to_string(),
        status: None,
        updated_at: String::new(),
    }
}

#[test]
fn numeric_columns_coerce_past_units_and_separators() {
    let listing = row_to_listing(&raw_row(&sample_extra("301", &["https://img/1.jpg"])));

    assert_eq!(listing.rent, 85000);
    assert_eq!(listing.management_fee, 5000);
    assert_eq!(listing.area, 35.2);
    assert_eq!(listing.floor, 3);
    assert_eq!(listing.room_number, "301");
    assert_eq!(listing.image_urls, vec!["https://img/1.jpg"]);
}

#[test]
fn malformed_extra_blob_falls_back_to_defaults() {
    for raw in ["", "not json", "{\"image_urls\": 7}", "[1, 2]"] {
        let listing = row_to_listing(&raw_row(raw));
        assert_eq!(listing.floor, 0, "blob {raw:?}");
        assert!(listing.room_number.is_empty(), "blob {raw:?}");
        assert!(listing.image_urls.is_empty(), "blob {raw:?}");
        assert_eq!(listing.selected_image_urls, None, "blob {raw:?}");
    }
}

#[test]
fn mapping_is_deterministic() {
    let row = raw_row(&sample_extra("301", &["https://img/1.jpg", "https://img/2.jpg"]));
    assert_eq!(row_to_listing(&row), row_to_listing(&row));
}

#[test]
fn unparsable_numeric_columns_collapse_to_zero() {
    let mut row = raw_row("{}");
    row.rent_text = "応相談".to_string();
    row.area_text = String::new();

    let listing = row_to_listing(&row);
    assert_eq!(listing.rent, 0);
    assert_eq!(listing.area, 0.0);
}

#[test]
fn floor_accepts_number_or_numeric_string() {
    assert_eq!(parse_extra(r#"{"floor": 5}"#).floor, 5);
    assert_eq!(parse_extra(r#"{"floor": "5"}"#).floor, 5);
    assert_eq!(parse_extra(r#"{"floor": "5階"}"#).floor, 5);
    assert_eq!(parse_extra(r#"{"floor": null}"#).floor, 0);
}

#[test]
fn extra_blob_with_unknown_keys_still_decodes() {
    let extra = parse_extra(r#"{"room_number": "204", "intake_batch": "2024-12-01"}"#);
    assert_eq!(
        extra,
        ListingExtra {
            room_number: "204".to_string(),
            ..ListingExtra::default()
        }
    );
}
