use super::domain::Listing;

/// One image option on the single-listing preview. Everything starts selected; the
/// reviewer unchecks what should not reach the customer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageChoice {
    pub index: usize,
    pub url: String,
    pub selected: bool,
}

/// The ordered image candidates for a listing: the full plural list, or the legacy
/// singular URL as a one-element fallback.
pub fn image_choices(listing: &Listing) -> Vec<ImageChoice> {
    let urls: Vec<String> = if listing.image_urls.is_empty() {
        listing.image_url.iter().cloned().collect()
    } else {
        listing.image_urls.clone()
    };

    urls.into_iter()
        .enumerate()
        .map(|(index, url)| ImageChoice {
            index,
            url,
            selected: true,
        })
        .collect()
}

/// Parse the confirmation step's comma-joined indices. Entries that are negative,
/// non-numeric, or past the end are silently dropped; order is preserved as given.
pub fn parse_selected_indices(csv: &str, len: usize) -> Vec<usize> {
    csv.split(',')
        .filter_map(|part| part.trim().parse::<usize>().ok())
        .filter(|index| *index < len)
        .collect()
}

/// Resolve the single-listing flow into the persisted subset. Empty means "no image
/// accompanies the message and nothing is persisted".
pub fn resolve_single(listing: &Listing, include_image: bool, selected_csv: &str) -> Vec<String> {
    if !include_image {
        return Vec::new();
    }

    if listing.image_urls.is_empty() {
        // Legacy rows carry one URL and no index selection step.
        return listing.image_url.iter().cloned().collect();
    }

    parse_selected_indices(selected_csv, listing.image_urls.len())
        .into_iter()
        .map(|index| listing.image_urls[index].clone())
        .collect()
}

/// Resolve the batch flow for one listing: all-or-nothing. Included means the entire
/// ordered list (or the legacy fallback), never a sub-selection.
pub fn resolve_batch(listing: &Listing, include_images: bool) -> Vec<String> {
    if !include_images {
        return Vec::new();
    }

    if listing.image_urls.is_empty() {
        listing.image_url.iter().cloned().collect()
    } else {
        listing.image_urls.clone()
    }
}

/// Split the batch confirmation's comma-joined room ids. Checkbox forms save with
/// ", " or ";" separators depending on the client, so both are accepted.
pub fn parse_room_id_csv(csv: &str) -> Vec<String> {
    csv.replace(';', ",")
        .split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(str::to_string)
        .collect()
}
