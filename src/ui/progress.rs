//! Progress reporting

use crate::diff::DiffSummary;
use crate::sort::{SortEvent, SortStats};
use indicatif::{HumanCount, ProgressBar, ProgressStyle};
use std::path::Path;
use std::time::{Duration, Instant};

/// Refresh the compare spinner every this many events
const COMPARE_TICK_EVERY: u64 = 1024;

/// Spinner for sort and compare phases, drawn on stderr
pub struct ProgressReporter {
    bar: ProgressBar,
    started_at: Instant,
}

impl ProgressReporter {
    /// Create a new progress reporter; a disabled reporter draws nothing
    pub fn new(enabled: bool) -> Self {
        let bar = if enabled {
            let bar = ProgressBar::new_spinner();
            bar.enable_steady_tick(Duration::from_millis(120));
            bar
        } else {
            ProgressBar::hidden()
        };
        if let Ok(style) = ProgressStyle::with_template("{spinner} {msg}") {
            bar.set_style(style.tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏ "));
        }

        Self {
            bar,
            started_at: Instant::now(),
        }
    }

    /// Mark start of a sort.
    pub fn start_sort(&mut self, source: &Path) {
        self.started_at = Instant::now();
        self.bar.reset();
        self.bar
            .set_message(format!("Sorting {}...", source.display()));
    }

    /// Reflect one sort event in the spinner message.
    pub fn sort_event(&self, event: &SortEvent) {
        match event {
            SortEvent::RunWritten { run, rows } => {
                self.bar.inc(*rows as u64);
                self.bar.set_message(format!(
                    "Partitioning... {} rows | {} | {} rows/s",
                    HumanCount(self.bar.position()),
                    run,
                    HumanCount(self.rows_per_second(self.bar.position()))
                ));
            }
            SortEvent::MergeStarted { left, right, into } => {
                self.bar
                    .set_message(format!("Merging {} + {} -> {}", left, right, into));
            }
            SortEvent::MergeFinished { .. } | SortEvent::Finished { .. } => {}
        }
    }

    /// Finalize a sort.
    pub fn finish_sort(&self, destination: &Path, stats: &SortStats) {
        self.bar.finish_with_message(format!(
            "Sorted {} rows into {} | {} runs, {} merges | {:.2?}",
            HumanCount(stats.rows),
            destination.display(),
            stats.runs,
            stats.merges,
            self.started_at.elapsed()
        ));
    }

    /// Mark start of a compare; resets the spinner after a sort phase.
    pub fn start_compare(&mut self, primary: &Path, secondary: &Path) {
        self.started_at = Instant::now();
        self.bar.reset();
        self.bar.set_message(format!(
            "Comparing {} against {}...",
            primary.display(),
            secondary.display()
        ));
    }

    /// Update compare counters, throttled to every few thousand events.
    pub fn update_compare(&self, summary: &DiffSummary) {
        let events = summary.total_changes();
        if events % COMPARE_TICK_EVERY != 0 {
            return;
        }
        let rows = summary.primary_rows + summary.secondary_rows;
        self.bar.set_message(format!(
            "Comparing... {} rows | +{} ~{} -{} | {} rows/s",
            HumanCount(rows),
            summary.creates,
            summary.updates,
            summary.deletes,
            HumanCount(self.rows_per_second(rows))
        ));
    }

    /// Finalize a compare.
    pub fn finish_compare(&self, summary: &DiffSummary) {
        self.bar.finish_with_message(format!(
            "Compared {} / {} rows: {} creates, {} updates, {} deletes, {} unchanged | {:.2?}",
            HumanCount(summary.primary_rows),
            HumanCount(summary.secondary_rows),
            summary.creates,
            summary.updates,
            summary.deletes,
            summary.unchanged,
            self.started_at.elapsed()
        ));
    }

    fn rows_per_second(&self, rows: u64) -> u64 {
        let secs = self.started_at.elapsed().as_secs_f64();
        if secs > 0.0 {
            (rows as f64 / secs) as u64
        } else {
            0
        }
    }
}

impl Default for ProgressReporter {
    fn default() -> Self {
        Self::new(true)
    }
}
