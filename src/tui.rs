use crate::runner::RunSummary;
use crossterm::{
    execute,
    style::{Color, Print, ResetColor, SetForegroundColor},
    tty::IsTty,
};
use std::io::{self, Write};

/// Human-facing run report. Colour escapes are only emitted when `colored` is set.
pub struct Reporter<W: Write> {
    out: W,
    colored: bool,
}

impl<W: Write> Reporter<W> {
    pub fn new(out: W, colored: bool) -> Self {
        Self { out, colored }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn line(&mut self, color: Color, text: &str) -> io::Result<()> {
        if self.colored {
            execute!(self.out, SetForegroundColor(color), Print(text), Print("\n"), ResetColor)
        } else {
            self.out.write_all(text.as_bytes())?;
            self.out.write_all(b"\n")?;
            self.out.flush()
        }
    }

    pub fn show_banner(&mut self, targets: usize, state_file: &str) -> io::Result<()> {
        self.line(Color::White, "🚀 OLX Watcher")?;
        self.line(
            Color::DarkGrey,
            &format!("📁 {} saved searches, state in {}", targets, state_file),
        )
    }

    /// End-of-run report: green for good news, yellow/red for anything needing attention.
    pub fn show_summary(&mut self, summary: &RunSummary) -> io::Result<()> {
        self.line(
            Color::Blue,
            &format!(
                "🔎 Checked {}/{} searches, {} listings ({} already seen)",
                summary.targets - summary.failed_targets,
                summary.targets,
                summary.listings_found,
                summary.already_seen
            ),
        )?;

        if summary.cold_start {
            self.line(
                Color::DarkGrey,
                &format!("📢 First run: stored {} listings as baseline, no alerts sent", summary.new_listings),
            )?;
        } else if summary.new_listings == 0 {
            self.line(Color::DarkGrey, "😴 No new listings")?;
        } else {
            self.line(
                Color::Green,
                &format!("🎉 {} new listings, {} alerts sent", summary.new_listings, summary.notified),
            )?;
        }

        if summary.failed_targets > 0 || summary.failed_deliveries > 0 {
            self.line(
                Color::Yellow,
                &format!(
                    "⚠️  {} searches failed, {} alerts failed",
                    summary.failed_targets, summary.failed_deliveries
                ),
            )?;
        }

        if summary.missing_destination {
            self.line(Color::Red, "❌ No webhook configured: new listings were not announced")?;
        }

        let state_line = if summary.persisted { "💾 State saved" } else { "💾 State unchanged" };
        self.line(Color::DarkGrey, state_line)
    }
}

impl Reporter<Box<dyn Write>> {
    /// Dry runs keep stdout for the JSON listing dump, so the report goes to stderr.
    pub fn for_run(dry_run: bool) -> Self {
        if dry_run {
            let err = io::stderr();
            let colored = err.is_tty();
            Self::new(Box::new(err), colored)
        } else {
            let out = io::stdout();
            let colored = out.is_tty();
            Self::new(Box::new(out), colored)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn summary() -> RunSummary {
        RunSummary {
            targets: 2,
            failed_targets: 1,
            listings_found: 5,
            already_seen: 3,
            new_listings: 2,
            notified: 1,
            failed_deliveries: 1,
            persisted: true,
            ..RunSummary::default()
        }
    }

    #[test]
    fn plain_report_has_no_escape_codes() {
        let mut reporter = Reporter::new(Vec::new(), false);
        reporter.show_banner(2, "processed_ids.json").unwrap();
        reporter.show_summary(&summary()).unwrap();

        let text = String::from_utf8(reporter.into_inner()).unwrap();
        assert!(!text.contains('\x1b'));
        assert!(text.contains("2 saved searches, state in processed_ids.json"));
        assert!(text.contains("Checked 1/2 searches, 5 listings (3 already seen)"));
        assert!(text.contains("2 new listings, 1 alerts sent"));
        assert!(text.contains("1 searches failed, 1 alerts failed"));
        assert!(text.contains("State saved"));
    }

    #[test]
    fn colored_report_uses_escape_codes() {
        let mut reporter = Reporter::new(Vec::new(), true);
        reporter.show_summary(&summary()).unwrap();

        let text = String::from_utf8(reporter.into_inner()).unwrap();
        assert!(text.contains("\x1b["));
        assert!(text.contains("2 new listings, 1 alerts sent"));
    }

    #[test]
    fn missing_destination_is_reported() {
        let mut reporter = Reporter::new(Vec::new(), false);
        reporter
            .show_summary(&RunSummary {
                targets: 1,
                new_listings: 1,
                missing_destination: true,
                ..RunSummary::default()
            })
            .unwrap();

        let text = String::from_utf8(reporter.into_inner()).unwrap();
        assert!(text.contains("No webhook configured"));
        assert!(text.contains("State unchanged"));
    }
}
