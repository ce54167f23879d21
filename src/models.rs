use serde::{Serialize, Serializer};

/// Stand-in for free-text fields that were missing from a listing card.
pub const UNKNOWN: &str = "unknown";

/// Rendered when no capacity figure could be read from a title.
pub const NOT_SPECIFIED: &str = "not specified";

/// Thumbnail used when a card carries no image.
pub const PLACEHOLDER_IMAGE_URL: &str = "https://i.imgur.com/2s4b6ns.png";

/// Storage capacity read from a listing title, e.g. "128 GB".
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Capacity {
    Specified(String),
    NotSpecified,
}

impl Capacity {
    pub fn as_str(&self) -> &str {
        match self {
            Capacity::Specified(value) => value,
            Capacity::NotSpecified => NOT_SPECIFIED,
        }
    }
}

// Always serialized as its display text so "not specified" never turns into null
impl Serialize for Capacity {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

/// One marketplace listing observed on a search-result page.
///
/// Two records with the same `id` describe the same listing, whatever the
/// other fields say.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ListingRecord {
    pub id: String,
    pub title: String,
    pub price: String,
    pub link: String,
    pub location: String,
    pub date_added: String,
    pub image_url: String,
    pub capacity: Capacity,
}

/// A configured saved-search URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchTarget {
    pub url: String,
}

impl SearchTarget {
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }

    /// Shortened URL for log lines.
    pub fn short_url(&self) -> String {
        if self.url.chars().count() <= 50 {
            return self.url.clone();
        }
        let head: String = self.url.chars().take(50).collect();
        format!("{}...", head)
    }
}
