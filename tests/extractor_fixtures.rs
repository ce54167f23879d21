use pretty_assertions::assert_eq;

use olx_watcher::models::{Capacity, ListingRecord, PLACEHOLDER_IMAGE_URL, UNKNOWN};
use olx_watcher::olx_scraper::ListingExtractor;

const PAGE_URL: &str = "https://www.olx.pl/warszawa/q-iphone-12/";

fn extract_fixture() -> Vec<ListingRecord> {
    let extractor = ListingExtractor::new("https://www.olx.pl").unwrap();
    extractor.extract(include_str!("fixtures/olx_search.html"), PAGE_URL)
}

#[test]
fn search_page_yields_identifiable_listings_in_page_order() {
    let ids: Vec<String> = extract_fixture().into_iter().map(|l| l.id).collect();
    assert_eq!(ids, vec!["912345678", "Yh2rT", "912345690"]);
}

#[test]
fn complete_card_matches_expected_record() {
    let listings = extract_fixture();
    assert_eq!(
        listings[0],
        ListingRecord {
            id: "912345678".to_string(),
            title: "iPhone 12 128GB jak nowy".to_string(),
            price: "550 zł do negocjacji".to_string(),
            link: "https://www.olx.pl/d/oferta/iphone-12-128gb-jak-nowy-CID99-IDZk3pQ.html".to_string(),
            location: "Warszawa, Mokotów".to_string(),
            date_added: "Dzisiaj o 09:41".to_string(),
            image_url: "https://ireland.apollo.olxcdn.com:443/v1/files/abc123-PL/image;s=216x152".to_string(),
            capacity: Capacity::Specified("128 GB".to_string()),
        }
    );
}

#[test]
fn sparse_card_degrades_to_defaults() {
    let listing = &extract_fixture()[1];
    assert_eq!(listing.title, "iPhone 12 mini 64 GB bateria 91%");
    assert_eq!(listing.capacity, Capacity::Specified("64 GB".to_string()));
    assert_eq!(listing.location, UNKNOWN);
    assert_eq!(listing.date_added, UNKNOWN);
    assert_eq!(listing.image_url, PLACEHOLDER_IMAGE_URL);
}

#[test]
fn absolute_and_relative_urls_are_normalized() {
    let listing = &extract_fixture()[2];
    assert_eq!(listing.link, "https://www.olx.pl/d/oferta/iphone-12-pro-CID99-IDXp9aa.html");
    assert_eq!(listing.image_url, "https://www.olx.pl/app/static/media/no_thumbnail.png");
    assert_eq!(listing.location, "Piaseczno");
    assert_eq!(listing.date_added, "12 maja 2024");
    assert_eq!(listing.capacity, Capacity::NotSpecified);
}
