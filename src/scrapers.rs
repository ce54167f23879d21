use crate::models::{ListingRecord, SearchTarget};
use crate::olx_scraper::ListingExtractor;
use crate::scraper::PageFetcher;
use anyhow::Result;

/// Produces the listings currently shown by one saved search.
pub trait ListingSource {
    fn name(&self) -> &str;
    fn fetch_listings(&self, target: &SearchTarget) -> Result<Vec<ListingRecord>>;
}

pub struct OlxScraper {
    fetcher: PageFetcher,
    extractor: ListingExtractor,
}

impl OlxScraper {
    pub fn new(fetcher: PageFetcher, extractor: ListingExtractor) -> Self {
        Self { fetcher, extractor }
    }
}

impl ListingSource for OlxScraper {
    fn name(&self) -> &str {
        "OLX"
    }

    fn fetch_listings(&self, target: &SearchTarget) -> Result<Vec<ListingRecord>> {
        let html = self.fetcher.fetch(&target.url)?;
        Ok(self.extractor.extract(&html, &target.url))
    }
}
