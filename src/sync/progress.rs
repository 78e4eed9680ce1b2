// file: src/sync/progress.rs
// description: progress tracking and summary statistics for a sync run
// reference: uses indicatif for progress bars and tracks per-outcome counters

use crate::sync::outcome::SyncOutcome;
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Instant;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncStats {
    pub cloned: usize,
    pub updated: usize,
    pub mismatched: usize,
    pub clone_failures: usize,
    pub update_failures: usize,
    pub duration_secs: u64,
}

impl SyncStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn total(&self) -> usize {
        self.cloned + self.updated + self.mismatched + self.clone_failures + self.update_failures
    }

    pub fn succeeded(&self) -> usize {
        self.cloned + self.updated
    }

    pub fn failed(&self) -> usize {
        self.mismatched + self.clone_failures + self.update_failures
    }

    pub fn success_rate(&self) -> f64 {
        if self.total() == 0 {
            return 0.0;
        }
        (self.succeeded() as f64 / self.total() as f64) * 100.0
    }
}

pub struct ProgressTracker {
    main_bar: ProgressBar,
    detail_bar: ProgressBar,
    cloned: Arc<AtomicUsize>,
    updated: Arc<AtomicUsize>,
    mismatched: Arc<AtomicUsize>,
    clone_failures: Arc<AtomicUsize>,
    update_failures: Arc<AtomicUsize>,
    start_time: Instant,
}

impl ProgressTracker {
    pub fn new(total_repos: usize) -> Self {
        Self::with_color(total_repos, true)
    }

    pub fn with_color(total_repos: usize, colored: bool) -> Self {
        let multi_progress = MultiProgress::new();

        let main_bar = create_progress_bar(&multi_progress, total_repos as u64, colored);
        let detail_bar = create_detail_bar(&multi_progress);

        Self {
            main_bar,
            detail_bar,
            cloned: Arc::new(AtomicUsize::new(0)),
            updated: Arc::new(AtomicUsize::new(0)),
            mismatched: Arc::new(AtomicUsize::new(0)),
            clone_failures: Arc::new(AtomicUsize::new(0)),
            update_failures: Arc::new(AtomicUsize::new(0)),
            start_time: Instant::now(),
        }
    }

    pub fn record(&self, outcome: &SyncOutcome) {
        let counter = match outcome {
            SyncOutcome::Cloned => &self.cloned,
            SyncOutcome::Updated => &self.updated,
            SyncOutcome::RemoteMismatch { .. } => &self.mismatched,
            SyncOutcome::CloneFailed(_) => &self.clone_failures,
            SyncOutcome::UpdateFailed(_) => &self.update_failures,
        };
        counter.fetch_add(1, Ordering::SeqCst);
        self.main_bar.inc(1);
        self.update_detail_bar();
    }

    /// Print one status block without tearing the progress bars. Each call
    /// is a single atomic write.
    pub fn println(&self, block: &str) {
        self.main_bar.println(block);
    }

    pub fn finish(&self) {
        self.main_bar.finish_with_message("Sync complete");
        self.detail_bar.finish_and_clear();
    }

    pub fn get_stats(&self) -> SyncStats {
        SyncStats {
            cloned: self.cloned.load(Ordering::SeqCst),
            updated: self.updated.load(Ordering::SeqCst),
            mismatched: self.mismatched.load(Ordering::SeqCst),
            clone_failures: self.clone_failures.load(Ordering::SeqCst),
            update_failures: self.update_failures.load(Ordering::SeqCst),
            duration_secs: self.start_time.elapsed().as_secs(),
        }
    }

    fn update_detail_bar(&self) {
        let message = format!(
            "Cloned: {} | Updated: {} | Mismatched: {} | Failed: {}",
            self.cloned.load(Ordering::SeqCst),
            self.updated.load(Ordering::SeqCst),
            self.mismatched.load(Ordering::SeqCst),
            self.clone_failures.load(Ordering::SeqCst)
                + self.update_failures.load(Ordering::SeqCst),
        );

        self.detail_bar.set_message(message);
    }
}

impl Drop for ProgressTracker {
    fn drop(&mut self) {
        self.finish();
    }
}

fn create_progress_bar(multi_progress: &MultiProgress, total: u64, colored: bool) -> ProgressBar {
    let bar = multi_progress.add(ProgressBar::new(total));
    if colored {
        bar.set_style(
            ProgressStyle::default_bar()
                .template(
                    "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}",
                )
                .expect("Failed to create progress bar template")
                .progress_chars("█▓▒░"),
        );
    } else {
        bar.set_style(
            ProgressStyle::default_bar()
                .template("{spinner} [{elapsed_precise}] [{bar:40}] {pos}/{len} {msg}")
                .expect("Failed to create progress bar template")
                .progress_chars("=>-"),
        );
    }
    bar
}

fn create_detail_bar(multi_progress: &MultiProgress) -> ProgressBar {
    let bar = multi_progress.add(ProgressBar::new(0));
    let style = ProgressStyle::default_bar()
        .template("{msg}")
        .expect("Failed to create detail bar template");
    bar.set_style(style);
    bar
}
