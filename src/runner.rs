use crate::models::{ListingRecord, SearchTarget};
use crate::notifier::{DeliveryError, Notifier};
use crate::scrapers::ListingSource;
use crate::store::{SeenSet, SeenStore};
use anyhow::{Context, Result};
use std::collections::HashSet;
use std::time::Duration;
use tracing::{debug, error, info, warn};

#[derive(Debug, Clone)]
pub struct RunOptions {
    /// Pause between two search targets.
    pub target_delay: Duration,
    /// Pause between two delivery attempts.
    pub notify_delay: Duration,
    /// Whether a listing whose alert failed is still recorded as seen.
    pub mark_seen_on_failure: bool,
    /// Print new listings instead of delivering them, and persist nothing.
    pub dry_run: bool,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            target_delay: Duration::from_secs(3),
            notify_delay: Duration::from_secs(2),
            mark_seen_on_failure: true,
            dry_run: false,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub targets: usize,
    pub failed_targets: usize,
    pub listings_found: usize,
    pub already_seen: usize,
    pub new_listings: usize,
    pub notified: usize,
    pub failed_deliveries: usize,
    pub cold_start: bool,
    /// New listings existed but no alert destination was configured.
    pub missing_destination: bool,
    pub persisted: bool,
}

/// Drives one fetch → classify → notify → persist cycle.
pub struct Watcher<S, St, N> {
    targets: Vec<SearchTarget>,
    options: RunOptions,
    source: S,
    store: St,
    notifier: N,
}

impl<S, St, N> Watcher<S, St, N>
where
    S: ListingSource,
    St: SeenStore,
    N: Notifier,
{
    pub fn new(targets: Vec<SearchTarget>, options: RunOptions, source: S, store: St, notifier: N) -> Self {
        Self {
            targets,
            options,
            source,
            store,
            notifier,
        }
    }

    pub fn store(&self) -> &St {
        &self.store
    }

    pub fn notifier(&self) -> &N {
        &self.notifier
    }

    /// Runs a single cycle. Only a failure to persist state is returned as an error.
    pub fn run(&self) -> Result<RunSummary> {
        let mut seen = self.store.load();
        let mut summary = RunSummary {
            targets: self.targets.len(),
            cold_start: seen.is_cold_start(),
            ..RunSummary::default()
        };

        if summary.cold_start {
            info!("📢 First run: recording current listings without sending alerts");
        }

        let listings = self.fetch_all(&mut summary);
        summary.listings_found = listings.len();

        let (already_seen, candidates): (Vec<ListingRecord>, Vec<ListingRecord>) =
            listings.into_iter().partition(|l| seen.contains(&l.id));
        summary.already_seen = already_seen.len();
        debug!(
            "{} listings already seen, {} candidates",
            summary.already_seen,
            candidates.len()
        );

        let added = if summary.cold_start {
            self.record_baseline(&mut seen, &candidates, &mut summary)
        } else if self.options.dry_run {
            self.print_candidates(&candidates, &mut summary)?
        } else {
            self.dispatch(&mut seen, &candidates, &mut summary)
        };

        if self.options.dry_run {
            info!("Dry run: state left untouched");
        } else if added > 0 {
            self.store.save(&seen).context("Failed to persist seen listings")?;
            summary.persisted = true;
            info!("💾 Recorded {} new ids ({} total)", added, seen.len());
        } else {
            debug!("No new ids, skipping state write");
        }

        Ok(summary)
    }

    fn fetch_all(&self, summary: &mut RunSummary) -> Vec<ListingRecord> {
        let mut listings = Vec::new();

        for (index, target) in self.targets.iter().enumerate() {
            if index > 0 {
                pause(self.options.target_delay);
            }

            info!("Checking {} search: {}", self.source.name(), target.short_url());
            match self.source.fetch_listings(target) {
                Ok(found) => {
                    info!("Found {} listings", found.len());
                    listings.extend(found);
                }
                Err(e) => {
                    warn!("❌ Failed to check {}: {:#}", target.short_url(), e);
                    summary.failed_targets += 1;
                }
            }
        }

        listings
    }

    fn record_baseline(&self, seen: &mut SeenSet, candidates: &[ListingRecord], summary: &mut RunSummary) -> usize {
        let added = candidates.iter().filter(|l| seen.insert(&l.id)).count();
        summary.new_listings = added;
        info!("Baseline established with {} listings", added);
        added
    }

    fn print_candidates(&self, candidates: &[ListingRecord], summary: &mut RunSummary) -> Result<usize> {
        let mut handled = HashSet::new();
        for listing in candidates {
            if !handled.insert(listing.id.as_str()) {
                continue;
            }
            println!("{}", serde_json::to_string_pretty(listing)?);
        }
        summary.new_listings = handled.len();
        Ok(0)
    }

    fn dispatch(&self, seen: &mut SeenSet, candidates: &[ListingRecord], summary: &mut RunSummary) -> usize {
        let mut handled = HashSet::new();
        let mut added = 0;
        let mut attempted = false;

        for listing in candidates {
            // Two saved searches can return the same listing in one run
            if !handled.insert(listing.id.as_str()) {
                continue;
            }
            summary.new_listings += 1;

            if attempted {
                pause(self.options.notify_delay);
            }

            let mark_seen = match self.notifier.notify(listing) {
                Ok(delivered) => {
                    attempted = true;
                    debug!("Alert for {} accepted with HTTP {}", listing.id, delivered.status);
                    summary.notified += 1;
                    true
                }
                Err(DeliveryError::NotConfigured) => {
                    summary.missing_destination = true;
                    self.options.mark_seen_on_failure
                }
                Err(e) => {
                    attempted = true;
                    warn!("Failed to deliver alert for {}: {}", listing.id, e);
                    summary.failed_deliveries += 1;
                    self.options.mark_seen_on_failure
                }
            };

            if mark_seen && seen.insert(&listing.id) {
                added += 1;
            }
        }

        if summary.missing_destination {
            error!(
                "No alert destination configured: {} new listings were not announced",
                summary.new_listings
            );
        }

        if summary.notified > 0 {
            info!("🎉 Sent {} alerts for new listings", summary.notified);
        } else if summary.new_listings == 0 {
            info!("😴 No new listings this cycle");
        }

        added
    }
}

fn pause(delay: Duration) {
    if !delay.is_zero() {
        debug!("Pacing: sleeping for {}ms", delay.as_millis());
        std::thread::sleep(delay);
    }
}
