//! Run history sidecar
//!
//! Keeps a hidden JSON file in the output root recording one entry per
//! mirror run: timestamps, counts, and whether the run completed or was
//! interrupted. The file is append-only from the tool's point of view and
//! exists for post-run auditing; a missing or corrupt file is never fatal.

use crate::core::mirror::RunStats;
use chrono::{DateTime, Utc};
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};

/// Hidden history file kept in the output root
pub const HISTORY_FILE_NAME: &str = ".metatree_history.json";

/// Version of the history file format
const HISTORY_VERSION: u32 = 1;

/// Record of a single mirror run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunEntry {
    /// Run start time
    pub started_at: DateTime<Utc>,

    /// Run end time
    pub ended_at: DateTime<Utc>,

    /// Input root that was mirrored
    pub input: PathBuf,

    /// Folders discovered by the pre-scan
    pub folders_total: u64,

    /// Files discovered by the pre-scan
    pub files_total: u64,

    /// Folders visited
    pub folders_mirrored: u64,

    /// Files visited
    pub files_mirrored: u64,

    /// Nodes whose metadata collection failed
    pub collection_errors: u64,

    /// Artifacts that could not be written
    pub write_errors: u64,

    /// Whether the run reached the end of the tree
    pub completed: bool,

    /// Whether the run was interrupted by a shutdown request
    pub interrupted: bool,
}

impl RunEntry {
    /// Build an entry from a finished run's counters
    pub fn from_stats(input: &Path, stats: &RunStats) -> Self {
        Self {
            started_at: stats.started_at,
            ended_at: stats.ended_at,
            input: input.to_path_buf(),
            folders_total: stats.dirs_total,
            files_total: stats.files_total,
            folders_mirrored: stats.dirs_processed,
            files_mirrored: stats.files_processed,
            collection_errors: stats.collection_errors,
            write_errors: stats.write_errors,
            completed: !stats.interrupted,
            interrupted: stats.interrupted,
        }
    }
}

/// All runs recorded against one output root
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunHistory {
    /// Version of the history file format
    pub version: u32,

    /// Runs, oldest first
    #[serde(default)]
    pub runs: Vec<RunEntry>,
}

impl Default for RunHistory {
    fn default() -> Self {
        Self {
            version: HISTORY_VERSION,
            runs: Vec::new(),
        }
    }
}

impl RunHistory {
    /// Path of the history file under `output_root`
    pub fn history_path(output_root: &Path) -> PathBuf {
        output_root.join(HISTORY_FILE_NAME)
    }

    /// Load the history from the output root, or start a fresh one
    ///
    /// A corrupt or unreadable file is logged and replaced rather than
    /// failing the run.
    pub fn load_or_create(output_root: &Path) -> Self {
        let path = Self::history_path(output_root);
        if !path.exists() {
            debug!("No run history at {:?}, starting fresh", path);
            return Self::default();
        }

        let file = match File::open(&path) {
            Ok(file) => file,
            Err(e) => {
                warn!("Failed to open run history {:?}: {}", path, e);
                return Self::default();
            }
        };

        match serde_json::from_reader(BufReader::new(file)) {
            Ok(history) => history,
            Err(e) => {
                warn!("Corrupt run history {:?} ({}), starting fresh", path, e);
                Self::default()
            }
        }
    }

    /// Append one run
    pub fn record(&mut self, entry: RunEntry) {
        self.runs.push(entry);
    }

    /// Persist the history into the output root
    pub fn save(&self, output_root: &Path) -> std::io::Result<()> {
        let path = Self::history_path(output_root);
        let file = File::create(&path)?;
        serde_json::to_writer_pretty(BufWriter::new(file), self)
            .map_err(std::io::Error::other)?;
        debug!("Run history saved to {:?} ({} runs)", path, self.runs.len());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn sample_entry(files: u64) -> RunEntry {
        let mut stats = RunStats::new(2, files);
        stats.dirs_processed = 2;
        stats.files_processed = files;
        stats.finish(false);
        RunEntry::from_stats(Path::new("/in"), &stats)
    }

    #[test]
    fn test_history_round_trip() {
        let dir = TempDir::new().unwrap();

        let mut history = RunHistory::load_or_create(dir.path());
        assert!(history.runs.is_empty());
        history.record(sample_entry(5));
        history.save(dir.path()).unwrap();

        let mut reloaded = RunHistory::load_or_create(dir.path());
        assert_eq!(reloaded.runs.len(), 1);
        assert_eq!(reloaded.runs[0].files_mirrored, 5);
        assert!(reloaded.runs[0].completed);

        reloaded.record(sample_entry(8));
        reloaded.save(dir.path()).unwrap();

        let reloaded = RunHistory::load_or_create(dir.path());
        assert_eq!(reloaded.runs.len(), 2);
        assert_eq!(reloaded.runs[1].files_mirrored, 8);
    }

    #[test]
    fn test_corrupt_history_starts_fresh() {
        let dir = TempDir::new().unwrap();
        std::fs::write(RunHistory::history_path(dir.path()), b"{not json").unwrap();

        let history = RunHistory::load_or_create(dir.path());
        assert!(history.runs.is_empty());
        assert_eq!(history.version, 1);
    }

    #[test]
    fn test_interrupted_entry() {
        let mut stats = RunStats::new(4, 4);
        stats.dirs_processed = 1;
        stats.finish(true);

        let entry = RunEntry::from_stats(Path::new("/in"), &stats);
        assert!(entry.interrupted);
        assert!(!entry.completed);
        assert_eq!(entry.folders_mirrored, 1);
    }
}
