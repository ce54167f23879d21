use crate::models::{Capacity, UNKNOWN};
use regex::Regex;

/// First "two-to-four digits followed by GB/TB" figure in a title.
pub fn extract_capacity(title: &str) -> Capacity {
    let re = match Regex::new(r"(?i)(\d{2,4})\s*([gt]b)") {
        Ok(re) => re,
        Err(_) => return Capacity::NotSpecified,
    };

    match re.captures(title) {
        Some(captures) => {
            let amount = captures.get(1).map(|m| m.as_str()).unwrap_or_default();
            let unit = captures
                .get(2)
                .map(|m| m.as_str().to_uppercase())
                .unwrap_or_default();
            Capacity::Specified(format!("{} {}", amount, unit))
        }
        None => Capacity::NotSpecified,
    }
}

/// Listing id embedded in an OLX detail-page URL: `/d/oferta/<slug>-ID<id>.html`.
pub fn extract_id_from_url(url: &str) -> Option<String> {
    let re = Regex::new(r"-ID([A-Za-z0-9]+)\.html").ok()?;
    let captures = re.captures(url)?;
    captures.get(1).map(|m| m.as_str().to_string())
}

/// Splits OLX's combined "Warszawa, Mokotów - Dzisiaj o 12:30" text.
///
/// Only the first two segments are used; each one defaults to [`UNKNOWN`].
pub fn split_location_date(text: &str) -> (String, String) {
    let mut parts = text.split(" - ").map(str::trim);

    let location = parts
        .next()
        .filter(|s| !s.is_empty())
        .unwrap_or(UNKNOWN)
        .to_string();
    let date_added = parts
        .next()
        .filter(|s| !s.is_empty())
        .unwrap_or(UNKNOWN)
        .to_string();

    (location, date_added)
}

/// Rewrites a relative href against the marketplace origin. Absolute URLs pass through.
pub fn absolutize(href: &str, origin: &str) -> String {
    let href = href.trim();
    if href.starts_with("http://") || href.starts_with("https://") {
        return href.to_string();
    }
    if let Some(rest) = href.strip_prefix("//") {
        return format!("https://{}", rest);
    }

    let origin = origin.trim_end_matches('/');
    if href.starts_with('/') {
        format!("{}{}", origin, href)
    } else {
        format!("{}/{}", origin, href)
    }
}

/// Collapses runs of whitespace (including newlines from nested markup) to single spaces.
pub fn clean_text(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
