//! Run reporting: live progress and the end-of-run summary
//!
//! Traversal never talks to a rendering library directly. It emits events
//! through the [`ProgressObserver`] trait, and the indicatif-backed
//! [`RunReporter`] is just one implementation; tests use [`NullObserver`].
//! Styling comes from an explicit [`ProgressConfig`](crate::core::config::ProgressConfig)
//! passed to the constructor, not from process-global state.

use crate::core::config::ProgressConfig;
use crate::core::error::{MirrorError, Result};
use crate::core::mirror::RunStats;
use crate::core::record::NodeKind;
use indicatif::{ProgressBar, ProgressStyle};
use log::warn;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Observer notified as the mirror makes forward progress
///
/// Rendering must not stall traversal; implementations are expected to be
/// cheap per call (indicatif throttles its own redraws).
pub trait ProgressObserver {
    /// The read-only pre-scan has started
    fn on_scan_started(&self) {}

    /// Pre-scan counters changed
    fn on_scan_progress(&self, _dirs: u64, _files: u64) {}

    /// Pre-scan finished with final totals
    fn on_scan_complete(&self, _dirs: u64, _files: u64) {}

    /// An artifact was written (or a node was seen and skipped)
    fn on_progress(&self, kind: NodeKind, completed: u64, total: u64);

    /// A node failed and was skipped; the run continues
    fn on_node_error(&self, path: &Path, message: &str);
}

/// Observer that ignores every event; used by unit tests
pub struct NullObserver;

impl ProgressObserver for NullObserver {
    fn on_progress(&self, _kind: NodeKind, _completed: u64, _total: u64) {}
    fn on_node_error(&self, _path: &Path, _message: &str) {}
}

// ============================================================================
// Terminal reporter
// ============================================================================

/// Terminal progress reporter backed by indicatif
pub struct RunReporter {
    scan: ProgressBar,
    bar: ProgressBar,
}

impl RunReporter {
    /// Build a reporter from explicit styling configuration
    ///
    /// With `enabled = false` both indicators are hidden and every event
    /// becomes a no-op draw.
    pub fn new(config: &ProgressConfig) -> Self {
        let (scan, bar) = if config.enabled {
            (ProgressBar::new_spinner(), ProgressBar::new(0))
        } else {
            (ProgressBar::hidden(), ProgressBar::hidden())
        };

        let spinner_style = ProgressStyle::default_spinner()
            .template("{spinner:.cyan} {msg}")
            .expect("static spinner template is valid")
            .tick_chars(&config.tick_chars);
        scan.set_style(spinner_style);

        let bar_style = match ProgressStyle::default_bar().template(&config.bar_template) {
            Ok(style) => style.progress_chars(&config.progress_chars),
            Err(e) => {
                warn!("Invalid progress template in config ({}), using default", e);
                ProgressStyle::default_bar()
            }
        };
        bar.set_style(bar_style);

        Self { scan, bar }
    }

    /// Stop the live indicators with a closing message
    pub fn finish(&self, interrupted: bool) {
        if interrupted {
            self.bar.finish_with_message("Mirror interrupted!");
        } else {
            self.bar.finish_with_message("Mirror complete");
        }
    }

    /// Write the persisted summary artifact
    pub fn finalize(&self, summary: &RunSummary) -> Result<()> {
        fs::write(&summary.summary_path, summary.render()).map_err(|e| {
            MirrorError::OutputWrite {
                path: summary.summary_path.clone(),
                message: e.to_string(),
            }
        })
    }
}

impl ProgressObserver for RunReporter {
    fn on_scan_started(&self) {
        self.scan.enable_steady_tick(Duration::from_millis(100));
        self.scan.set_message("Scanning input tree...");
    }

    fn on_scan_progress(&self, dirs: u64, files: u64) {
        self.scan
            .set_message(format!("Scanning... {} folders, {} files", dirs, files));
    }

    fn on_scan_complete(&self, dirs: u64, files: u64) {
        self.scan.finish_with_message(format!(
            "Scan complete: {} folders, {} files",
            dirs, files
        ));
        self.bar.set_length(dirs + files);
    }

    fn on_progress(&self, _kind: NodeKind, completed: u64, total: u64) {
        self.bar.set_length(total);
        self.bar.set_position(completed);
    }

    fn on_node_error(&self, path: &Path, message: &str) {
        self.bar.suspend(|| {
            eprintln!("  skipped '{}': {}", path.display(), message);
        });
        warn!("Skipped '{}': {}", path.display(), message);
    }
}

// ============================================================================
// Run summary
// ============================================================================

/// Timestamp format shared by the summary and the run log
const TIME_FORMAT: &str = "%Y-%m-%d-%Z %H:%M:%S";

/// Immutable end-of-run report, persisted once per invocation
#[derive(Debug, Clone)]
pub struct RunSummary {
    /// Input root that was mirrored
    pub input: PathBuf,
    /// Output root holding the artifact tree
    pub output: PathBuf,
    /// Where the rendered summary itself is written
    pub summary_path: PathBuf,
    /// Literal configuration the run was invoked with (TOML text)
    pub config_literal: String,
    /// Final counters and timing
    pub stats: RunStats,
}

impl RunSummary {
    pub fn new(
        input: &Path,
        output: &Path,
        summary_path: &Path,
        config_literal: String,
        stats: RunStats,
    ) -> Self {
        Self {
            input: input.to_path_buf(),
            output: output.to_path_buf(),
            summary_path: summary_path.to_path_buf(),
            config_literal,
            stats,
        }
    }

    /// Render the human-readable summary text
    pub fn render(&self) -> String {
        let stats = &self.stats;
        let started = stats.started_at.with_timezone(&chrono::Local);
        let ended = stats.ended_at.with_timezone(&chrono::Local);
        let elapsed_hours = stats.elapsed.as_secs_f64() / 3600.0;

        let mut text = String::new();
        text.push_str("metatree run summary\n");
        text.push_str("====================\n\n");
        text.push_str(&format!("date:               {}\n", ended.format(TIME_FORMAT)));
        text.push_str(&format!("input directory:    {}\n", self.input.display()));
        text.push_str(&format!("output directory:   {}\n", self.output.display()));
        text.push_str(&format!("summary file:       {}\n\n", self.summary_path.display()));
        text.push_str(&format!("folders discovered: {}\n", stats.dirs_total));
        text.push_str(&format!("folders mirrored:   {}\n", stats.dirs_processed));
        text.push_str(&format!("files discovered:   {}\n", stats.files_total));
        text.push_str(&format!("files mirrored:     {}\n", stats.files_processed));
        text.push_str(&format!("collection errors:  {}\n", stats.collection_errors));
        text.push_str(&format!("write errors:       {}\n", stats.write_errors));
        text.push_str(&format!(
            "run interrupted:    {}\n\n",
            if stats.interrupted { "yes" } else { "no" }
        ));
        text.push_str("configuration:\n");
        for line in self.config_literal.lines() {
            text.push_str(&format!("  {}\n", line));
        }
        text.push_str("\ntiming:\n");
        text.push_str(&format!("  started (human):  {}\n", started.format(TIME_FORMAT)));
        text.push_str(&format!("  started (epoch):  {}\n", stats.started_at.timestamp()));
        text.push_str(&format!("  ended (human):    {}\n", ended.format(TIME_FORMAT)));
        text.push_str(&format!("  ended (epoch):    {}\n", stats.ended_at.timestamp()));
        text.push_str(&format!("  elapsed hours:    {:.6}\n", elapsed_hours));
        text
    }
}
