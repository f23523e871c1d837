use serde::{Deserialize, Serialize};

use super::domain::Listing;

/// Card-style payload handed to the push transport. Shape is ours; the transport wraps
/// it into whatever envelope the messaging provider wants.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessagePayload {
    pub alt_text: String,
    pub card: MessageCard,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageCard {
    pub title: String,
    pub price_line: String,
    pub details: Vec<DetailRow>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hero_image_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub action: Option<MessageAction>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DetailRow {
    pub label: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageAction {
    pub label: String,
    pub url: String,
}

/// Inputs the state machine resolves before rendering: whether an image was approved,
/// which one leads, and where the customer view lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageOptions {
    pub include_image: bool,
    pub hero_image_url: Option<String>,
    pub view_url: String,
}

/// Yen to a one-decimal 万円 string, with a bare integer when the decimal is zero:
/// 85000 -> "8.5", 80000 -> "8", 0 -> "0".
pub fn format_man_yen(yen: i64) -> String {
    let formatted = format!("{:.1}", yen as f64 / 10000.0);
    match formatted.strip_suffix(".0") {
        Some(trimmed) => trimmed.to_string(),
        None => formatted,
    }
}

fn detail(label: &str, value: String) -> DetailRow {
    DetailRow {
        label: label.to_string(),
        value,
    }
}

fn or_none(value: &str) -> &str {
    if value.is_empty() {
        "なし"
    } else {
        value
    }
}

/// Render a listing into the outbound card. Deterministic and pure: same listing and
/// options, same payload. Detail rows keep a fixed order and only appear when the
/// underlying field is non-empty/non-zero.
pub fn build_message(listing: &Listing, options: &MessageOptions) -> MessagePayload {
    let building_name = if listing.building_name.is_empty() {
        "物件情報"
    } else {
        &listing.building_name
    };
    let title = if listing.room_number.is_empty() {
        building_name.to_string()
    } else {
        format!("{} {}", building_name, listing.room_number)
    };

    let mut price_line = format!("{}万円", format_man_yen(listing.rent));
    if listing.management_fee != 0 {
        price_line.push_str(&format!(
            " (管理費: {}万円)",
            format_man_yen(listing.management_fee)
        ));
    }

    let mut details = Vec::new();
    if !listing.layout.is_empty() {
        details.push(detail("間取り", listing.layout.clone()));
    }
    if listing.area != 0.0 {
        details.push(detail("面積", format!("{}m²", listing.area)));
    }
    if !listing.building_age.is_empty() {
        details.push(detail("築年数", listing.building_age.clone()));
    }
    if listing.floor != 0 {
        details.push(detail("階数", format!("{}階", listing.floor)));
    }
    if !listing.address.is_empty() {
        details.push(detail("所在地", listing.address.clone()));
    }
    if !listing.station_info.is_empty() {
        details.push(detail("最寄り駅", listing.station_info.clone()));
    }
    if !listing.deposit.is_empty() || !listing.key_money.is_empty() {
        details.push(detail(
            "敷金/礼金",
            format!(
                "{} / {}",
                or_none(&listing.deposit),
                or_none(&listing.key_money)
            ),
        ));
    }

    let hero_image_url = match (&options.hero_image_url, options.include_image) {
        (Some(url), true) if !url.is_empty() => Some(url.clone()),
        _ => None,
    };

    let action = if options.view_url.is_empty() {
        None
    } else {
        Some(MessageAction {
            label: "物件を見る".to_string(),
            url: options.view_url.clone(),
        })
    };

    MessagePayload {
        alt_text: format!("新着物件: {title}"),
        card: MessageCard {
            title,
            price_line,
            details,
            hero_image_url,
            action,
        },
    }
}
