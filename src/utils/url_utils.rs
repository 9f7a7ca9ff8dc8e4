//! URL helpers for the photo viewer.

use url::Url;

use super::constants::PHOTO_ID_PARAM;

/// Extract the photo identifier (`fbid` query parameter) from a viewer URL.
///
/// Returns `None` when the URL does not parse, has no `fbid`, or the value
/// is empty.
#[must_use]
pub fn photo_id_from_url(url: &str) -> Option<String> {
    let parsed = Url::parse(url).ok()?;
    parsed
        .query_pairs()
        .find(|(key, _)| key == PHOTO_ID_PARAM)
        .map(|(_, value)| value.into_owned())
        .filter(|value| !value.is_empty())
}

/// Check if a URL is a crawlable http(s) URL
#[must_use]
pub fn is_valid_url(url: &str) -> bool {
    if url.is_empty() {
        return false;
    }

    match Url::parse(url) {
        Ok(parsed) => matches!(parsed.scheme(), "http" | "https"),
        Err(_) => false,
    }
}

/// Prefix `https://` when a non-empty URL carries no scheme.
#[must_use]
pub fn normalize_url(url: &str) -> String {
    let url = url.trim();
    if url.is_empty() || url.contains("://") {
        url.to_string()
    } else {
        format!("https://{url}")
    }
}
