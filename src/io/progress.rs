//! Multi-file progress tracking with automatic batching for large sets

use crate::io::configuration::MAX_INDIVIDUAL_PROGRESS_BARS;
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use std::path::Path;
use std::sync::LazyLock;

/// Coordinates progress display for batch simulation
///
/// Shows one iteration bar per file while the batch is small, and a single
/// file-count bar plus a bar for the file in progress once it grows larger.
pub struct ProgressManager {
    multi_progress: MultiProgress,
    batch_bar: Option<ProgressBar>,
    file_bars: Vec<ProgressBar>,
    file_count: usize,
}

impl Default for ProgressManager {
    fn default() -> Self {
        Self::new()
    }
}

static ITERATION_STYLE: LazyLock<ProgressStyle> = LazyLock::new(|| {
    ProgressStyle::default_bar()
        .template("{prefix} [{bar:30.cyan/blue}] {pos}/{len} iterations")
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▉▊▋▌▍▎▏ ")
});

static BATCH_STYLE: LazyLock<ProgressStyle> = LazyLock::new(|| {
    ProgressStyle::default_bar()
        .template("[{elapsed_precise}] Files: [{bar:40.cyan/blue}] {pos}/{len}")
        .unwrap_or_else(|_| ProgressStyle::default_bar())
});

impl ProgressManager {
    /// Create a new progress manager
    pub fn new() -> Self {
        Self {
            multi_progress: MultiProgress::new(),
            batch_bar: None,
            file_bars: Vec::new(),
            file_count: 0,
        }
    }

    /// Whether the batch is large enough to use a single file-count bar
    pub const fn is_batched(&self) -> bool {
        self.file_count > MAX_INDIVIDUAL_PROGRESS_BARS
    }

    /// Number of files in the batch
    pub const fn file_count(&self) -> usize {
        self.file_count
    }

    /// Prepare the display for the given number of files
    pub fn initialize(&mut self, file_count: usize) {
        self.file_count = file_count;

        // Avoid terminal spam for large file sets
        if self.is_batched() {
            let batch_bar = ProgressBar::new(file_count as u64);
            batch_bar.set_style(BATCH_STYLE.clone());
            self.batch_bar = Some(self.multi_progress.add(batch_bar));
        }
    }

    /// Configure an iteration bar for a new file
    pub fn start_file(&mut self, path: &Path, iterations: usize) {
        let display_name = path
            .file_name()
            .unwrap_or_default()
            .to_string_lossy()
            .to_string();

        // In batch mode only the file in progress keeps a bar
        if self.is_batched() {
            for bar in self.file_bars.drain(..) {
                bar.finish_and_clear();
            }
        }

        let bar = self
            .multi_progress
            .add(ProgressBar::new(iterations as u64));
        bar.set_style(ITERATION_STYLE.clone());
        bar.set_prefix(display_name);

        self.file_bars.push(bar);
    }

    /// Report the number of completed iterations for the file in progress
    pub fn update_iteration(&self, iteration: usize) {
        if let Some(bar) = self.file_bars.last() {
            bar.set_position(iteration as u64);
        }
    }

    /// Mark the file in progress as completed
    pub fn complete_file(&self) {
        if let Some(ref batch_bar) = self.batch_bar {
            batch_bar.inc(1);
        }

        if let Some(bar) = self.file_bars.last() {
            let name = bar.prefix();
            bar.set_prefix(format!("✓ {name}"));
            bar.finish();
        }
    }

    /// Clean up all progress displays
    pub fn finish(&self) {
        if let Some(ref batch_bar) = self.batch_bar {
            batch_bar.finish_with_message("All files processed");
        }
        let _ = self.multi_progress.clear();
    }
}
