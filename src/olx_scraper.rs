use crate::models::{ListingRecord, PLACEHOLDER_IMAGE_URL, UNKNOWN};
use crate::parser;
use anyhow::Result;
use scraper::{ElementRef, Html, Selector};
use tracing::{debug, info};

const CARD_SELECTOR: &str = r#"div[data-cy="l-card"]"#;
const TITLE_SELECTORS: [&str; 4] = [
    r#"[data-cy="ad-card-title"] h4"#,
    r#"[data-cy="ad-card-title"] h6"#,
    "h6",
    "h4",
];
const PRICE_SELECTOR: &str = r#"p[data-testid="ad-price"]"#;
const LINK_SELECTOR: &str = "a[href]";
const LOCATION_DATE_SELECTOR: &str = r#"p[data-testid="location-date"]"#;
const IMAGE_SELECTOR: &str = "img";

/// Turns OLX search-result markup into listing records.
///
/// Every assumption about the card markup lives here. Fields other than the
/// id fall back to sentinels; a card whose id cannot be resolved is dropped.
pub struct ListingExtractor {
    origin: String,
    card: Selector,
    titles: Vec<Selector>,
    price: Selector,
    link: Selector,
    location_date: Selector,
    image: Selector,
}

impl ListingExtractor {
    pub fn new(origin: &str) -> Result<Self> {
        let titles = TITLE_SELECTORS
            .iter()
            .map(|s| parse_selector(s))
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            origin: origin.trim_end_matches('/').to_string(),
            card: parse_selector(CARD_SELECTOR)?,
            titles,
            price: parse_selector(PRICE_SELECTOR)?,
            link: parse_selector(LINK_SELECTOR)?,
            location_date: parse_selector(LOCATION_DATE_SELECTOR)?,
            image: parse_selector(IMAGE_SELECTOR)?,
        })
    }

    /// Extracts every usable listing from one page, in page order.
    ///
    /// `page_url` is used as the link of a card that has no anchor of its own.
    pub fn extract(&self, html: &str, page_url: &str) -> Vec<ListingRecord> {
        let document = Html::parse_document(html);
        let cards: Vec<ElementRef> = document.select(&self.card).collect();

        if cards.is_empty() {
            info!("No listing cards found on page (zero results or changed markup)");
            return Vec::new();
        }

        let card_count = cards.len();
        let mut listings = Vec::with_capacity(card_count);
        for card in cards {
            match self.extract_card(card, page_url) {
                Some(listing) => listings.push(listing),
                None => debug!("Dropping listing card without a resolvable id"),
            }
        }

        debug!("Extracted {} listings from {} cards", listings.len(), card_count);
        listings
    }

    fn extract_card(&self, card: ElementRef, page_url: &str) -> Option<ListingRecord> {
        let href = card
            .select(&self.link)
            .next()
            .and_then(|a| a.value().attr("href"))
            .map(str::trim)
            .filter(|href| !href.is_empty());

        let id = resolve_id(card, href)?;

        let link = match href {
            Some(href) => parser::absolutize(href, &self.origin),
            None => page_url.to_string(),
        };

        let title = self
            .titles
            .iter()
            .find_map(|selector| first_text(card, selector))
            .unwrap_or_else(|| UNKNOWN.to_string());
        let price = first_text(card, &self.price).unwrap_or_else(|| UNKNOWN.to_string());

        let (location, date_added) = match first_text(card, &self.location_date) {
            Some(text) => parser::split_location_date(&text),
            None => (UNKNOWN.to_string(), UNKNOWN.to_string()),
        };

        let image_url = card
            .select(&self.image)
            .filter_map(|img| img.value().attr("src"))
            .map(str::trim)
            .find(|src| !src.is_empty() && !src.starts_with("data:"))
            .map(|src| parser::absolutize(src, &self.origin))
            .unwrap_or_else(|| PLACEHOLDER_IMAGE_URL.to_string());

        let capacity = parser::extract_capacity(&title);

        Some(ListingRecord {
            id,
            title,
            price,
            link,
            location,
            date_added,
            image_url,
            capacity,
        })
    }
}

/// Prefers the card's own `id` attribute, then the id embedded in its detail URL.
fn resolve_id(card: ElementRef, href: Option<&str>) -> Option<String> {
    if let Some(id) = card.value().attr("id").map(str::trim) {
        if !id.is_empty() {
            return Some(id.to_string());
        }
    }
    href.and_then(parser::extract_id_from_url)
}

fn first_text(card: ElementRef, selector: &Selector) -> Option<String> {
    card.select(selector)
        .next()
        .map(|el| parser::clean_text(&el.text().collect::<Vec<_>>().join(" ")))
        .filter(|text| !text.is_empty())
}

fn parse_selector(selector: &str) -> Result<Selector> {
    Selector::parse(selector)
        .map_err(|e| anyhow::anyhow!("Failed to parse selector {}: {:?}", selector, e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Capacity;
    use pretty_assertions::assert_eq;

    const ORIGIN: &str = "https://www.olx.pl";
    const PAGE: &str = "https://www.olx.pl/warszawa/q-iphone-12/";

    fn extractor() -> ListingExtractor {
        ListingExtractor::new(ORIGIN).unwrap()
    }

    #[test]
    fn full_card_is_extracted() {
        let html = r#"
            <div data-cy="l-card" id="901234567">
              <a href="/d/oferta/iphone-12-128gb-CID99-IDabc12.html">
                <img src="https://ireland.apollo.olxcdn.com/v1/files/x/image;s=216x152" alt="">
              </a>
              <div data-cy="ad-card-title"><h6>iPhone 12 128GB jak nowy</h6></div>
              <p data-testid="ad-price">1 450 zł<span>do negocjacji</span></p>
              <p data-testid="location-date">Warszawa, Mokotów - Dzisiaj o 10:15</p>
            </div>
        "#;

        let listings = extractor().extract(html, PAGE);
        assert_eq!(listings.len(), 1);
        assert_eq!(
            listings[0],
            ListingRecord {
                id: "901234567".to_string(),
                title: "iPhone 12 128GB jak nowy".to_string(),
                price: "1 450 zł do negocjacji".to_string(),
                link: "https://www.olx.pl/d/oferta/iphone-12-128gb-CID99-IDabc12.html".to_string(),
                location: "Warszawa, Mokotów".to_string(),
                date_added: "Dzisiaj o 10:15".to_string(),
                image_url: "https://ireland.apollo.olxcdn.com/v1/files/x/image;s=216x152".to_string(),
                capacity: Capacity::Specified("128 GB".to_string()),
            }
        );
    }

    #[test]
    fn id_falls_back_to_detail_url() {
        let html = r#"
            <div data-cy="l-card">
              <a href="/d/oferta/abc-IDxyz.html"><h6>iPhone 12 mini</h6></a>
            </div>
        "#;

        let listings = extractor().extract(html, PAGE);
        assert_eq!(listings.len(), 1);
        assert_eq!(listings[0].id, "xyz");
        assert_eq!(listings[0].link, "https://www.olx.pl/d/oferta/abc-IDxyz.html");
    }

    #[test]
    fn card_without_id_is_dropped() {
        let html = r#"
            <div data-cy="l-card"><a href="/d/oferta/no-id.html"><h6>Etui</h6></a></div>
            <div data-cy="l-card" id="42"><a href="/d/oferta/kept-ID42.html"><h6>Kept</h6></a></div>
        "#;

        let listings = extractor().extract(html, PAGE);
        assert_eq!(listings.len(), 1);
        assert_eq!(listings[0].id, "42");
    }

    #[test]
    fn missing_fields_use_sentinels() {
        let html = r#"<div data-cy="l-card" id="7"></div>"#;

        let listings = extractor().extract(html, PAGE);
        assert_eq!(listings.len(), 1);
        let listing = &listings[0];
        assert_eq!(listing.title, UNKNOWN);
        assert_eq!(listing.price, UNKNOWN);
        assert_eq!(listing.location, UNKNOWN);
        assert_eq!(listing.date_added, UNKNOWN);
        assert_eq!(listing.link, PAGE);
        assert_eq!(listing.image_url, PLACEHOLDER_IMAGE_URL);
        assert_eq!(listing.capacity, Capacity::NotSpecified);
    }

    #[test]
    fn page_without_cards_is_empty() {
        let html = "<html><body><h1>Nie znaleziono ogłoszeń</h1></body></html>";
        assert!(extractor().extract(html, PAGE).is_empty());
        assert!(extractor().extract("<<<not html", PAGE).is_empty());
    }
}
