use serde::{Deserialize, Deserializer};
use serde_json::Value;

use super::domain::{Listing, PendingRow};

/// Wire shape of the row's auxiliary JSON blob. Every field defaults, so a blob with
/// missing keys (or no blob at all) still decodes.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ListingExtra {
    #[serde(default)]
    pub building_age: String,
    #[serde(default, deserialize_with = "lenient_i64")]
    pub floor: i64,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub room_number: String,
    #[serde(default)]
    pub deposit: String,
    #[serde(default)]
    pub key_money: String,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub image_urls: Vec<String>,
    #[serde(default)]
    pub selected_image_urls: Option<Vec<String>>,
}

/// The tolerance contract for the auxiliary blob: malformed JSON is not an error, it is
/// an empty blob. Intake writes this column from an upstream pipeline we do not control,
/// so the reviewer flow must keep working when it is blank, truncated, or hand-edited.
pub fn parse_extra(raw: &str) -> ListingExtra {
    serde_json::from_str(raw).unwrap_or_default()
}

/// Convert a raw table row into a normalized [`Listing`]. Pure and infallible: numeric
/// columns coerce best-effort with 0 as the "absent or invalid" sentinel, and the extra
/// blob goes through [`parse_extra`].
pub fn row_to_listing(row: &PendingRow) -> Listing {
    let extra = parse_extra(&row.extra_json);

    Listing {
        customer_name: row.customer_name.clone(),
        building_id: row.building_id.clone(),
        room_id: row.room_id.clone(),
        building_name: row.building_name.clone(),
        rent: coerce_i64(&row.rent_text),
        management_fee: coerce_i64(&row.management_fee_text),
        layout: row.layout.clone(),
        area: coerce_f64(&row.area_text),
        building_age: extra.building_age,
        floor: extra.floor,
        station_info: row.station_info.clone(),
        address: extra.address,
        room_number: extra.room_number,
        deposit: extra.deposit,
        key_money: extra.key_money,
        image_urls: extra.image_urls,
        image_url: extra.image_url,
        selected_image_urls: extra.selected_image_urls,
    }
}

/// Best-effort integer coercion: keep digits and a sign, drop everything else
/// (currency marks, thousands separators, stray units).
pub(crate) fn coerce_i64(text: &str) -> i64 {
    let cleaned: String = text
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '-')
        .collect();
    cleaned.parse().unwrap_or(0)
}

pub(crate) fn coerce_f64(text: &str) -> f64 {
    let cleaned: String = text
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '-' || *c == '.')
        .collect();
    cleaned.parse().unwrap_or(0.0)
}

/// Accepts a JSON number or a numeric string; anything else collapses to 0.
fn lenient_i64<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::Number(number) => number
            .as_i64()
            .or_else(|| number.as_f64().map(|f| f as i64))
            .unwrap_or(0),
        Value::String(text) => coerce_i64(&text),
        _ => 0,
    })
}
