use anyhow::Result;
use clap::Parser;
use olx_watcher::config::{self, WatchConfig};
use olx_watcher::logging;
use olx_watcher::notifier::{DiscordNotifier, Notifier};
use olx_watcher::olx_scraper::ListingExtractor;
use olx_watcher::runner::{RunOptions, Watcher};
use olx_watcher::scraper::PageFetcher;
use olx_watcher::scrapers::OlxScraper;
use olx_watcher::store::JsonFileStore;
use olx_watcher::tui::Reporter;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{error, info, warn};

/// Exit status when new listings could not be announced for lack of a webhook.
const EXIT_MISSING_DESTINATION: i32 = 2;

#[derive(Parser, Debug)]
#[clap(author, version, about = "OLX Watcher - alerts for new listings in saved searches")]
struct Args {
    /// Saved-search URL to monitor (repeatable)
    #[clap(short, long = "url")]
    urls: Vec<String>,

    /// JSON file with an array of saved-search URLs
    #[clap(short, long, env = "TARGETS_FILE")]
    targets_file: Option<PathBuf>,

    /// File holding the ids of listings already seen
    #[clap(short, long, env = "STATE_FILE", default_value = config::DEFAULT_STATE_FILE)]
    state_file: PathBuf,

    /// Discord-style webhook receiving the alerts
    #[clap(short, long, env = "WEBHOOK_URL")]
    webhook_url: Option<String>,

    /// Marketplace origin used to absolutize relative links
    #[clap(long, env = "OLX_ORIGIN", default_value = config::DEFAULT_ORIGIN)]
    origin: String,

    /// Username shown on alerts
    #[clap(long, env = "BOT_NAME", default_value = config::DEFAULT_BOT_NAME)]
    bot_name: String,

    /// Seconds to wait between two saved searches
    #[clap(long, default_value = "3")]
    target_delay_secs: u64,

    /// Seconds to wait between two alerts
    #[clap(long, default_value = "2")]
    notify_delay_secs: u64,

    /// Keep listings whose alert failed unseen so the next run retries them
    #[clap(long)]
    retry_failed: bool,

    /// Print new listings as JSON instead of alerting, and leave state untouched
    #[clap(short, long)]
    dry_run: bool,

    /// Log level when RUST_LOG is not set
    #[clap(long, default_value = "info")]
    log_level: String,
}

impl Args {
    fn into_config(self) -> Result<WatchConfig> {
        let mut urls = self.urls;
        if let Some(path) = &self.targets_file {
            urls.extend(config::load_targets_file(path)?);
        }

        Ok(WatchConfig {
            targets: config::collect_targets(urls),
            webhook_url: self.webhook_url,
            state_file: self.state_file,
            origin: self.origin,
            bot_name: self.bot_name,
            run: RunOptions {
                target_delay: Duration::from_secs(self.target_delay_secs),
                notify_delay: Duration::from_secs(self.notify_delay_secs),
                mark_seen_on_failure: !self.retry_failed,
                dry_run: self.dry_run,
            },
        })
    }
}

fn main() -> Result<()> {
    dotenv::dotenv().ok();
    let args = Args::parse();
    logging::init_logging(&args.log_level);

    let config = args.into_config()?;
    let mut reporter = Reporter::for_run(config.run.dry_run);
    if let Err(e) = reporter.show_banner(config.targets.len(), &config.state_file.display().to_string()) {
        warn!("Failed to print banner: {}", e);
    }
    info!("Run started at {}", chrono::Local::now().format("%H:%M:%S"));

    let source = OlxScraper::new(PageFetcher::new()?, ListingExtractor::new(&config.origin)?);
    let store = JsonFileStore::new(&config.state_file);
    let notifier = DiscordNotifier::new(config.webhook_url.clone(), &config.bot_name)?;
    if !notifier.is_configured() && !config.run.dry_run {
        warn!("WEBHOOK_URL is not set, alerts cannot be delivered");
    }

    let watcher = Watcher::new(config.targets, config.run, source, store, notifier);
    let summary = watcher.run()?;

    if let Err(e) = reporter.show_summary(&summary) {
        warn!("Failed to print run summary: {}", e);
    }
    info!("Run finished at {}", chrono::Local::now().format("%H:%M:%S"));

    if summary.missing_destination {
        error!("New listings were found but no alert destination is configured");
        std::process::exit(EXIT_MISSING_DESTINATION);
    }

    Ok(())
}
