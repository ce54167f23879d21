use crate::models::SearchTarget;
use crate::runner::RunOptions;
use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

pub const DEFAULT_ORIGIN: &str = "https://www.olx.pl";
pub const DEFAULT_STATE_FILE: &str = "processed_ids.json";
pub const DEFAULT_BOT_NAME: &str = "🤖 OLX Deals Bot";
pub const DEFAULT_SEARCH_URL: &str = "https://www.olx.pl/warszawa/q-iphone-12/?search%5Bdist%5D=75&search%5Bfilter_enum_phonemodel%5D%5B0%5D=iphone-12&search%5Bfilter_enum_phonemodel%5D%5B1%5D=iphone-12-mini&search%5Bfilter_enum_phonemodel%5D%5B2%5D=iphone-12-pro-max&search%5Bfilter_enum_phonemodel%5D%5B3%5D=iphone-12-pro&search%5Bfilter_enum_state%5D%5B0%5D=used&search%5Bfilter_float_price%3Afrom%5D=300&search%5Bfilter_float_price%3Ato%5D=600";

/// Everything one run needs, assembled once at startup.
#[derive(Debug, Clone)]
pub struct WatchConfig {
    pub targets: Vec<SearchTarget>,
    pub webhook_url: Option<String>,
    pub state_file: PathBuf,
    pub origin: String,
    pub bot_name: String,
    pub run: RunOptions,
}

/// Reads a JSON array of saved-search URLs.
pub fn load_targets_file(path: &Path) -> Result<Vec<String>> {
    let data = fs::read_to_string(path)
        .context(format!("Failed to read targets file: {}", path.display()))?;
    let urls: Vec<String> = serde_json::from_str(&data)
        .context(format!("Targets file is not a JSON array of URLs: {}", path.display()))?;
    Ok(urls)
}

/// Trims, drops blanks and duplicates (first occurrence wins), falling back to the default search.
pub fn collect_targets<I>(urls: I) -> Vec<SearchTarget>
where
    I: IntoIterator<Item = String>,
{
    let mut targets: Vec<SearchTarget> = Vec::new();
    for url in urls {
        let url = url.trim();
        if url.is_empty() || targets.iter().any(|t| t.url == url) {
            continue;
        }
        targets.push(SearchTarget::new(url));
    }

    if targets.is_empty() {
        targets.push(SearchTarget::new(DEFAULT_SEARCH_URL));
    }
    targets
}
