//! Progress reporter implementation
//!
//! Uses indicatif for a single bar counting files handled (copied or
//! skipped). Counters are atomics so any worker thread can report.

use crate::core::CopyResult;
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

/// Progress reporter for flatten operations
pub struct ProgressReporter {
    /// File count progress bar
    files_bar: ProgressBar,
    /// Start time
    start_time: Instant,
    /// Files copied so far
    files_copied: AtomicU64,
    /// Files skipped so far
    files_skipped: AtomicU64,
    /// Bytes copied so far
    bytes_copied: AtomicU64,
    /// Is progress drawn
    enabled: bool,
}

impl ProgressReporter {
    /// Create a new progress reporter drawing to stderr
    pub fn new() -> Self {
        let files_bar = ProgressBar::with_draw_target(Some(0), ProgressDrawTarget::stderr());
        let style = ProgressStyle::default_bar()
            .template("{spinner:.cyan} [{bar:40.cyan/blue}] {pos}/{len} files ({per_sec}, ETA {eta}) {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("=> ");
        files_bar.set_style(style);
        files_bar.enable_steady_tick(Duration::from_millis(120));

        Self::with_bar(files_bar, true)
    }

    /// Create a disabled progress reporter (for quiet mode)
    pub fn disabled() -> Self {
        Self::with_bar(ProgressBar::hidden(), false)
    }

    fn with_bar(files_bar: ProgressBar, enabled: bool) -> Self {
        Self {
            files_bar,
            start_time: Instant::now(),
            files_copied: AtomicU64::new(0),
            files_skipped: AtomicU64::new(0),
            bytes_copied: AtomicU64::new(0),
            enabled,
        }
    }

    /// Set total files to handle
    pub fn set_total_files(&self, total: u64) {
        self.files_bar.set_length(total);
    }

    /// Account for one finished file
    pub fn record(&self, result: &CopyResult) {
        if result.copied {
            self.files_copied.fetch_add(1, Ordering::Relaxed);
            self.bytes_copied.fetch_add(result.bytes, Ordering::Relaxed);
        } else {
            self.files_skipped.fetch_add(1, Ordering::Relaxed);
        }
        self.files_bar.inc(1);
    }

    /// Finish progress with success message
    pub fn finish_success(&self, message: &str) {
        self.files_bar.finish_with_message(format!("✓ {}", message));
    }

    /// Finish progress with error message
    pub fn finish_error(&self, message: &str) {
        self.files_bar.abandon_with_message(format!("✗ {}", message));
    }

    /// Check if progress is drawn
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Get progress summary
    pub fn summary(&self) -> ProgressSummary {
        ProgressSummary {
            total_files: self.files_bar.length().unwrap_or(0),
            files_copied: self.files_copied.load(Ordering::Relaxed),
            files_skipped: self.files_skipped.load(Ordering::Relaxed),
            bytes_copied: self.bytes_copied.load(Ordering::Relaxed),
            elapsed: self.start_time.elapsed(),
        }
    }
}

impl Default for ProgressReporter {
    fn default() -> Self {
        Self::new()
    }
}

/// Snapshot of progress counters
#[derive(Debug, Clone)]
pub struct ProgressSummary {
    /// Total files to handle
    pub total_files: u64,
    /// Files copied so far
    pub files_copied: u64,
    /// Files skipped so far
    pub files_skipped: u64,
    /// Bytes copied so far
    pub bytes_copied: u64,
    /// Elapsed time
    pub elapsed: Duration,
}

impl ProgressSummary {
    /// Files handled so far
    pub fn files_done(&self) -> u64 {
        self.files_copied + self.files_skipped
    }

    /// Get completion percentage
    pub fn percentage(&self) -> f64 {
        if self.total_files == 0 {
            0.0
        } else {
            (self.files_done() as f64 / self.total_files as f64) * 100.0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn result(copied: bool, bytes: u64) -> CopyResult {
        CopyResult {
            source_path: PathBuf::from("src/f"),
            destination_path: PathBuf::from("dst/f"),
            copied,
            bytes,
        }
    }

    #[test]
    fn test_counts_copied_and_skipped() {
        let progress = ProgressReporter::disabled();
        progress.set_total_files(4);

        progress.record(&result(true, 100));
        progress.record(&result(false, 0));

        let summary = progress.summary();
        assert_eq!(summary.total_files, 4);
        assert_eq!(summary.files_copied, 1);
        assert_eq!(summary.files_skipped, 1);
        assert_eq!(summary.bytes_copied, 100);
        assert_eq!(summary.percentage(), 50.0);
        assert!(!progress.is_enabled());
    }

    #[test]
    fn test_empty_percentage() {
        let summary = ProgressReporter::disabled().summary();
        assert_eq!(summary.percentage(), 0.0);
    }
}
