pub mod config;
pub mod logging;
pub mod models;
pub mod notifier;
pub mod olx_scraper;
pub mod parser;
pub mod runner;
pub mod scraper;
pub mod scrapers;
pub mod store;
pub mod tui;

#[cfg(test)]
mod test_support;
