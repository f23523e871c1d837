use std::fmt::Write as _;

use super::message::format_man_yen;
use super::service::{ApprovalPreview, BatchCard};
use super::view::CustomerListingView;

/// Outcome severity for the fixed-shape notice document. Not-found and
/// already-processed share one severity on purpose.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Success,
    NotFound,
    Error,
}

impl Severity {
    pub const fn heading(self) -> &'static str {
        match self {
            Severity::Success => "完了",
            Severity::NotFound => "対象の物件が見つかりません（処理済みの可能性があります）",
            Severity::Error => "エラー",
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Severity::Success => "success",
            Severity::NotFound => "not_found_or_processed",
            Severity::Error => "error",
        }
    }
}

fn esc(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

fn document(title: &str, body: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html lang=\"ja\"><head><meta charset=\"utf-8\">\
         <title>{}</title></head><body>\n{}\n</body></html>\n",
        esc(title),
        body
    )
}

fn action_url(action: &str, customer: &str, room_id: Option<&str>, rest: &str) -> String {
    let mut url = format!(
        "?action={}&customer={}",
        action,
        urlencoding::encode(customer)
    );
    if let Some(room_id) = room_id {
        let _ = write!(url, "&room_id={}", urlencoding::encode(room_id));
    }
    url.push_str(rest);
    url
}

/// Fixed-shape notice for every terminal outcome of an action.
pub fn notice_page(severity: Severity, message: &str) -> String {
    let body = format!(
        "<main data-severity=\"{}\"><h1>{}</h1><p>{}</p></main>",
        severity.label(),
        severity.heading(),
        esc(message)
    );
    document(severity.heading(), &body)
}

fn listing_summary(out: &mut String, preview: &ApprovalPreview) {
    let listing = &preview.listing;
    let _ = write!(
        out,
        "<h2>{} {}</h2><p>{}万円",
        esc(&listing.building_name),
        esc(&listing.room_number),
        format_man_yen(listing.rent)
    );
    if listing.management_fee != 0 {
        let _ = write!(out, " (管理費: {}万円)", format_man_yen(listing.management_fee));
    }
    out.push_str("</p><ul>");
    if !listing.layout.is_empty() {
        let _ = write!(out, "<li>間取り: {}</li>", esc(&listing.layout));
    }
    if listing.area != 0.0 {
        let _ = write!(out, "<li>面積: {}m²</li>", listing.area);
    }
    if !listing.address.is_empty() {
        let _ = write!(out, "<li>所在地: {}</li>", esc(&listing.address));
    }
    if !listing.station_info.is_empty() {
        let _ = write!(out, "<li>最寄り駅: {}</li>", esc(&listing.station_info));
    }
    out.push_str("</ul>");
}

/// Single-listing preview document: the candidate's summary, its image options tagged
/// with their indices (all selected by default), and the confirm/skip links. The
/// reviewer narrows `selected_images` by editing the confirm link's index list.
pub fn single_preview_page(preview: &ApprovalPreview) -> String {
    let listing = &preview.listing;
    let mut body = String::from("<main><h1>承認プレビュー</h1>");
    listing_summary(&mut body, preview);

    if preview.images.is_empty() {
        body.push_str("<p>画像はありません。</p>");
    } else {
        body.push_str("<ol start=\"0\">");
        for choice in &preview.images {
            let _ = write!(
                body,
                "<li data-index=\"{}\" data-selected=\"{}\"><img src=\"{}\" alt=\"\"></li>",
                choice.index,
                choice.selected,
                esc(&choice.url)
            );
        }
        body.push_str("</ol>");
    }

    let all_indices: Vec<String> = (0..preview.images.len()).map(|i| i.to_string()).collect();
    let confirm_with_images = action_url(
        "confirm_approve",
        &listing.customer_name,
        Some(&listing.room_id),
        &format!("&include_image=true&selected_images={}", all_indices.join(",")),
    );
    let confirm_without_image = action_url(
        "confirm_approve",
        &listing.customer_name,
        Some(&listing.room_id),
        "&include_image=false&selected_images=",
    );
    let skip = action_url("skip", &listing.customer_name, Some(&listing.room_id), "");

    let _ = write!(
        body,
        "<p><a href=\"{}\">画像つきで承認して送信</a></p>\
         <p><a href=\"{}\">画像なしで承認して送信</a></p>\
         <p><a href=\"{}\">スキップ</a></p></main>",
        esc(&confirm_with_images),
        esc(&confirm_without_image),
        esc(&skip)
    );

    document("承認プレビュー", &body)
}

/// Batch preview document: one card per pending listing, every card defaulting to
/// "include images". The confirm link carries the room ids whose images stay included.
pub fn batch_preview_page(customer: &str, cards: &[BatchCard]) -> String {
    let mut body = format!(
        "<main><h1>一括承認プレビュー ({}件)</h1>",
        cards.len()
    );

    let mut included: Vec<&str> = Vec::new();
    for card in cards {
        let listing = &card.listing;
        if card.include_images {
            included.push(&listing.room_id);
        }
        let _ = write!(
            body,
            "<section data-room-id=\"{}\" data-include-images=\"{}\">\
             <h2>{} {}</h2><p>{}万円 / 画像{}枚</p></section>",
            esc(&listing.room_id),
            card.include_images,
            esc(&listing.building_name),
            esc(&listing.room_number),
            format_man_yen(listing.rent),
            listing.image_urls.len().max(usize::from(listing.image_url.is_some()))
        );
    }

    let confirm_all = action_url(
        "confirm_approve_all",
        customer,
        None,
        &format!("&images={}", included.join(",")),
    );
    let confirm_all_plain = action_url("confirm_approve_all", customer, None, "&images=");

    let _ = write!(
        body,
        "<p><a href=\"{}\">全件を画像つきで送信</a></p>\
         <p><a href=\"{}\">全件を画像なしで送信</a></p></main>",
        esc(&confirm_all),
        esc(&confirm_all_plain)
    );

    document("一括承認プレビュー", &body)
}

/// Customer-facing listing document. Styling is out of scope; this is the bare
/// structure the chrome wraps.
pub fn customer_page(view: &CustomerListingView) -> String {
    let mut body = format!(
        "<main><h1>{} {}</h1>",
        esc(&view.building_name),
        esc(&view.room_number)
    );

    if !view.images.is_empty() {
        body.push_str("<div class=\"carousel\">");
        for url in &view.images {
            let _ = write!(body, "<img src=\"{}\" alt=\"\">", esc(url));
        }
        body.push_str("</div>");
    }

    let _ = write!(body, "<p>{}万円", format_man_yen(view.rent));
    if view.management_fee != 0 {
        let _ = write!(body, " (管理費: {}万円)", format_man_yen(view.management_fee));
    }
    body.push_str("</p><ul>");
    if !view.layout.is_empty() {
        let _ = write!(body, "<li>間取り: {}</li>", esc(&view.layout));
    }
    if view.area != 0.0 {
        let _ = write!(body, "<li>面積: {}m²</li>", view.area);
    }
    if !view.building_age.is_empty() {
        let _ = write!(body, "<li>築年数: {}</li>", esc(&view.building_age));
    }
    if view.floor != 0 {
        let _ = write!(body, "<li>階数: {}階</li>", view.floor);
    }
    if !view.address.is_empty() {
        let _ = write!(body, "<li>所在地: {}</li>", esc(&view.address));
    }
    if !view.station_info.is_empty() {
        let _ = write!(body, "<li>最寄り駅: {}</li>", esc(&view.station_info));
    }
    if !view.deposit.is_empty() || !view.key_money.is_empty() {
        let deposit = if view.deposit.is_empty() { "なし" } else { &view.deposit };
        let key_money = if view.key_money.is_empty() { "なし" } else { &view.key_money };
        let _ = write!(body, "<li>敷金/礼金: {} / {}</li>", esc(deposit), esc(key_money));
    }
    body.push_str("</ul></main>");

    document("物件のご紹介", &body)
}
