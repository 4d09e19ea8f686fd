//! Tree mirroring engine
//!
//! Walks the input tree and recreates its directory structure under the
//! output root, writing one metadata artifact per folder and per file in
//! place of file contents. The walk is single-threaded and synchronous;
//! per-node cost is dominated by external tool invocation, not CPU.
//!
//! Error tolerance: a single node failing metadata collection is counted,
//! surfaced through the observer, and skipped. Output-write failures are
//! tolerated the same way, except that a run of consecutive failures is
//! treated as systematic (output root gone read-only, disk full) and
//! aborts the mirror instead of failing every remaining node identically.

use crate::core::collector::MetadataCollector;
use crate::core::error::{MirrorError, Result};
use crate::core::record::{MetadataRecord, NodeKind};
use crate::core::reporter::ProgressObserver;
use chrono::{DateTime, Utc};
use log::{debug, info, warn};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use walkdir::WalkDir;

/// Prefix for the artifact describing a directory itself
const PARENT_PREFIX: &str = "PARENT_";

/// Abort after this many write failures in a row
const MAX_CONSECUTIVE_WRITE_FAILURES: u32 = 5;

// ============================================================================
// Run statistics
// ============================================================================

/// Live counters and timing for one mirror run
///
/// Owned exclusively by the mirror while the run is in flight; the final
/// value is handed to the reporter and the history sidecar afterwards.
#[derive(Debug, Clone)]
pub struct RunStats {
    /// Directories discovered by the pre-scan (the root included)
    pub dirs_total: u64,
    /// Files discovered by the pre-scan
    pub files_total: u64,
    /// Directories visited so far (failed ones included)
    pub dirs_processed: u64,
    /// Files visited so far (failed ones included)
    pub files_processed: u64,
    /// Nodes whose system metadata collection failed
    pub collection_errors: u64,
    /// Artifacts or directories that could not be written
    pub write_errors: u64,
    /// Whether the run was cut short by a shutdown request
    pub interrupted: bool,
    /// Wall-clock start
    pub started_at: DateTime<Utc>,
    /// Wall-clock end (equals start until the run finishes)
    pub ended_at: DateTime<Utc>,
    /// Monotonic elapsed time of the traversal
    pub elapsed: Duration,
    started_instant: Instant,
}

impl RunStats {
    pub fn new(dirs_total: u64, files_total: u64) -> Self {
        let now = Utc::now();
        Self {
            dirs_total,
            files_total,
            dirs_processed: 0,
            files_processed: 0,
            collection_errors: 0,
            write_errors: 0,
            interrupted: false,
            started_at: now,
            ended_at: now,
            elapsed: Duration::ZERO,
            started_instant: Instant::now(),
        }
    }

    /// Nodes visited so far
    pub fn completed(&self) -> u64 {
        self.dirs_processed + self.files_processed
    }

    /// Nodes discovered by the pre-scan
    pub fn total(&self) -> u64 {
        self.dirs_total + self.files_total
    }

    /// Seal the run: record end time and elapsed duration
    pub fn finish(&mut self, interrupted: bool) {
        self.ended_at = Utc::now();
        self.elapsed = self.started_instant.elapsed();
        self.interrupted = interrupted;
    }
}

impl std::fmt::Display for RunStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Folders: {}/{}, Files: {}/{}, Collection errors: {}, Write errors: {}, Elapsed: {:.1}s",
            self.dirs_processed,
            self.dirs_total,
            self.files_processed,
            self.files_total,
            self.collection_errors,
            self.write_errors,
            self.elapsed.as_secs_f64()
        )
    }
}

// ============================================================================
// Options
// ============================================================================

/// Configuration for one mirror run
#[derive(Debug, Clone)]
pub struct MirrorOptions {
    /// Attempt media extraction for files
    pub include_media: bool,
    /// Extension of the written artifacts (without the dot)
    pub artifact_extension: String,
}

impl Default for MirrorOptions {
    fn default() -> Self {
        Self {
            include_media: true,
            artifact_extension: "yml".to_string(),
        }
    }
}

// ============================================================================
// Artifact naming
// ============================================================================

/// Artifact name for a directory's own record
pub fn parent_artifact_name(dir_name: &str, extension: &str) -> String {
    format!("{}{}.{}", PARENT_PREFIX, dir_name, extension)
}

/// Artifact name for a file, escaped against the one constructible collision
///
/// Appending the fixed suffix is injective across file names, so two files
/// can never collide with each other. The only clash left is a file
/// literally named `PARENT_<dirname>`, whose artifact would equal its
/// directory's parent artifact; that file gets a `FILE_` prefix.
pub fn file_artifact_name(file_name: &str, dir_name: &str, extension: &str) -> String {
    let name = format!("{}.{}", file_name, extension);
    if name == parent_artifact_name(dir_name, extension) {
        format!("FILE_{}", name)
    } else {
        name
    }
}

/// Last path component as a displayable string
fn node_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.to_string_lossy().into_owned())
}

// ============================================================================
// Mirror engine
// ============================================================================

/// Outcome of mirroring a single node
enum NodeOutcome {
    /// Artifact written
    Written,
    /// System metadata collection failed; no artifact
    CollectionFailed(String),
    /// Directory creation, serialization, or artifact write failed
    WriteFailed(String),
}

/// Walks the input tree and writes the artifact tree
pub struct TreeMirror<'a> {
    collector: MetadataCollector<'a>,
    observer: &'a dyn ProgressObserver,
    options: MirrorOptions,
    shutdown: Arc<AtomicBool>,
}

impl<'a> TreeMirror<'a> {
    pub fn new(
        collector: MetadataCollector<'a>,
        observer: &'a dyn ProgressObserver,
        options: MirrorOptions,
        shutdown: Arc<AtomicBool>,
    ) -> Self {
        Self {
            collector,
            observer,
            options,
            shutdown,
        }
    }

    /// Mirror `input_root` into `output_root`, returning the run counters
    ///
    /// The input root must exist; the output root is created if absent.
    /// An interrupted run returns its partial counters with the
    /// `interrupted` flag set rather than an error, so a summary can still
    /// be written.
    pub fn mirror(&self, input_root: &Path, output_root: &Path) -> Result<RunStats> {
        if !input_root.is_dir() {
            return Err(MirrorError::InputNotFound(input_root.to_path_buf()));
        }

        fs::create_dir_all(output_root).map_err(|e| MirrorError::OutputWrite {
            path: output_root.to_path_buf(),
            message: e.to_string(),
        })?;

        self.observer.on_scan_started();
        let (dirs_total, files_total) = self.scan_totals(input_root);
        self.observer.on_scan_complete(dirs_total, files_total);
        info!(
            "Found {} folders and {} files to mirror",
            dirs_total, files_total
        );

        let mut stats = RunStats::new(dirs_total, files_total);
        let mut consecutive_write_failures = 0u32;

        for entry in WalkDir::new(input_root) {
            // Cancellation is cooperative and only checked between nodes,
            // so a partial output tree is always node-consistent.
            if self.shutdown.load(Ordering::SeqCst) {
                warn!("Shutdown requested, stopping mirror...");
                stats.finish(true);
                return Ok(stats);
            }

            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    let path = e
                        .path()
                        .map(Path::to_path_buf)
                        .unwrap_or_else(|| input_root.to_path_buf());
                    stats.collection_errors += 1;
                    self.observer.on_node_error(&path, &e.to_string());
                    continue;
                }
            };

            let path = entry.path();
            let kind = if entry.file_type().is_dir() {
                NodeKind::Directory
            } else {
                NodeKind::File
            };

            let outcome = match kind {
                NodeKind::Directory => self.mirror_directory(input_root, output_root, path),
                NodeKind::File => self.mirror_file(input_root, output_root, path),
            };

            match kind {
                NodeKind::Directory => stats.dirs_processed += 1,
                NodeKind::File => stats.files_processed += 1,
            }

            match outcome {
                NodeOutcome::Written => {
                    consecutive_write_failures = 0;
                    debug!("Mirrored {}: {}", kind, path.display());
                }
                NodeOutcome::CollectionFailed(message) => {
                    stats.collection_errors += 1;
                    self.observer.on_node_error(path, &message);
                }
                NodeOutcome::WriteFailed(message) => {
                    stats.write_errors += 1;
                    consecutive_write_failures += 1;
                    self.observer.on_node_error(path, &message);

                    if consecutive_write_failures >= MAX_CONSECUTIVE_WRITE_FAILURES {
                        return Err(MirrorError::OutputWrite {
                            path: output_root.to_path_buf(),
                            message: format!(
                                "{} consecutive write failures, aborting (last: {})",
                                consecutive_write_failures, message
                            ),
                        });
                    }
                }
            }

            self.observer
                .on_progress(kind, stats.completed(), stats.total());
        }

        stats.finish(false);
        Ok(stats)
    }

    /// Read-only pre-scan sizing the progress indicator
    fn scan_totals(&self, input_root: &Path) -> (u64, u64) {
        let mut dirs = 0u64;
        let mut files = 0u64;

        for entry in WalkDir::new(input_root) {
            match entry {
                Ok(entry) => {
                    if entry.file_type().is_dir() {
                        dirs += 1;
                    } else {
                        files += 1;
                    }
                    if (dirs + files) % 64 == 0 {
                        self.observer.on_scan_progress(dirs, files);
                    }
                }
                Err(e) => warn!("Pre-scan could not read an entry: {}", e),
            }
        }

        (dirs, files)
    }

    /// Mirror one directory: create its output folder and parent artifact
    fn mirror_directory(
        &self,
        input_root: &Path,
        output_root: &Path,
        dir: &Path,
    ) -> NodeOutcome {
        let mirror_dir = self.mirrored_path(input_root, output_root, dir);
        if let Err(e) = fs::create_dir_all(&mirror_dir) {
            return NodeOutcome::WriteFailed(format!(
                "cannot create '{}': {}",
                mirror_dir.display(),
                e
            ));
        }

        // Directories never carry media metadata.
        let record = match self.collector.collect(dir, false) {
            Ok(record) => record,
            Err(e) => return NodeOutcome::CollectionFailed(e.to_string()),
        };

        let artifact = mirror_dir.join(parent_artifact_name(
            &node_name(dir),
            &self.options.artifact_extension,
        ));
        self.write_artifact(&artifact, &record)
    }

    /// Mirror one file: write its artifact next to its directory's
    fn mirror_file(&self, input_root: &Path, output_root: &Path, file: &Path) -> NodeOutcome {
        let parent = file.parent().unwrap_or(input_root);
        let mirror_dir = self.mirrored_path(input_root, output_root, parent);

        let record = match self.collector.collect(file, self.options.include_media) {
            Ok(record) => record,
            Err(e) => return NodeOutcome::CollectionFailed(e.to_string()),
        };

        let artifact = mirror_dir.join(file_artifact_name(
            &node_name(file),
            &node_name(parent),
            &self.options.artifact_extension,
        ));
        self.write_artifact(&artifact, &record)
    }

    /// Replace the input-root prefix with the output-root prefix
    fn mirrored_path(&self, input_root: &Path, output_root: &Path, path: &Path) -> PathBuf {
        match path.strip_prefix(input_root) {
            Ok(relative) => output_root.join(relative),
            // Walk entries always live under the root.
            Err(_) => output_root.to_path_buf(),
        }
    }

    /// Serialize and write one artifact
    fn write_artifact(&self, artifact: &Path, record: &MetadataRecord) -> NodeOutcome {
        let yaml = match record.to_yaml() {
            Ok(yaml) => yaml,
            Err(e) => {
                return NodeOutcome::WriteFailed(format!(
                    "cannot serialize '{}': {}",
                    artifact.display(),
                    e
                ))
            }
        };

        match fs::write(artifact, yaml) {
            Ok(()) => NodeOutcome::Written,
            Err(e) => {
                NodeOutcome::WriteFailed(format!("cannot write '{}': {}", artifact.display(), e))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::reporter::NullObserver;
    use crate::source::mock::{FailingSource, MockSource};
    use crate::source::traits::MetadataSource;
    use std::collections::BTreeSet;
    use tempfile::TempDir;

    fn run_mirror(
        system: &dyn MetadataSource,
        media: Option<&dyn MetadataSource>,
        input: &Path,
        output: &Path,
    ) -> Result<RunStats> {
        let collector = MetadataCollector::new(system, media);
        let mirror = TreeMirror::new(
            collector,
            &NullObserver,
            MirrorOptions::default(),
            Arc::new(AtomicBool::new(false)),
        );
        mirror.mirror(input, output)
    }

    /// Build a small tree: root/{a.txt, sub/b.txt}
    fn sample_tree() -> (TempDir, PathBuf) {
        let dir = TempDir::new().unwrap();
        let root = dir.path().join("root");
        fs::create_dir(&root).unwrap();
        fs::write(root.join("a.txt"), b"alpha").unwrap();
        fs::create_dir(root.join("sub")).unwrap();
        fs::write(root.join("sub").join("b.txt"), b"beta").unwrap();
        (dir, root)
    }

    fn artifact_paths(output: &Path) -> BTreeSet<String> {
        WalkDir::new(output)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
            .map(|e| {
                e.path()
                    .strip_prefix(output)
                    .unwrap()
                    .to_string_lossy()
                    .into_owned()
            })
            .collect()
    }

    #[test]
    fn test_scenario_tree_produces_expected_artifacts() {
        let (_guard, root) = sample_tree();
        let out = _guard.path().join("out");
        let system = MockSource::system();
        let media = MockSource::media();

        let stats = run_mirror(&system, Some(&media), &root, &out).unwrap();

        assert_eq!(stats.dirs_total, 2);
        assert_eq!(stats.files_total, 2);
        assert_eq!(stats.dirs_processed, 2);
        assert_eq!(stats.files_processed, 2);
        assert_eq!(stats.collection_errors, 0);
        assert_eq!(stats.write_errors, 0);
        assert!(!stats.interrupted);

        let expected: BTreeSet<String> = [
            "PARENT_root.yml",
            "a.txt.yml",
            "sub/PARENT_sub.yml",
            "sub/b.txt.yml",
        ]
        .iter()
        .map(|s| s.to_string())
        .collect();
        assert_eq!(artifact_paths(&out), expected);
    }

    #[test]
    fn test_output_structure_isomorphic_to_input() {
        let (_guard, root) = sample_tree();
        fs::create_dir_all(root.join("sub/deep/deeper")).unwrap();
        let out = _guard.path().join("out");
        let system = MockSource::system();

        run_mirror(&system, None, &root, &out).unwrap();

        let input_dirs: BTreeSet<String> = WalkDir::new(&root)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_dir())
            .map(|e| {
                e.path()
                    .strip_prefix(&root)
                    .unwrap()
                    .to_string_lossy()
                    .into_owned()
            })
            .collect();
        let output_dirs: BTreeSet<String> = WalkDir::new(&out)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_dir())
            .map(|e| {
                e.path()
                    .strip_prefix(&out)
                    .unwrap()
                    .to_string_lossy()
                    .into_owned()
            })
            .collect();

        assert_eq!(input_dirs, output_dirs);
    }

    #[test]
    fn test_stats_match_independent_count() {
        let (_guard, root) = sample_tree();
        fs::write(root.join("sub").join("c.txt"), b"gamma").unwrap();
        let out = _guard.path().join("out");
        let system = MockSource::system();

        let stats = run_mirror(&system, None, &root, &out).unwrap();

        let mut dirs = 0;
        let mut files = 0;
        for entry in WalkDir::new(&root) {
            let entry = entry.unwrap();
            if entry.file_type().is_dir() {
                dirs += 1;
            } else {
                files += 1;
            }
        }
        assert_eq!(stats.dirs_processed, dirs);
        assert_eq!(stats.files_processed, files);
    }

    #[test]
    fn test_collection_failure_skips_node_but_completes_run() {
        let (_guard, root) = sample_tree();
        let out = _guard.path().join("out");
        let system = FailingSource::new("mock-stat", "vanished");

        let stats = run_mirror(&system, None, &root, &out).unwrap();

        // Every node is seen; no artifact is written for any of them.
        assert_eq!(stats.dirs_processed, 2);
        assert_eq!(stats.files_processed, 2);
        assert_eq!(stats.collection_errors, 4);
        assert!(artifact_paths(&out).is_empty());
        // The directory structure itself is still mirrored.
        assert!(out.join("sub").is_dir());
    }

    #[test]
    fn test_media_failure_yields_empty_media_section() {
        let (_guard, root) = sample_tree();
        let out = _guard.path().join("out");
        let system = MockSource::system();
        let media = FailingSource::new("mock-exiftool", "not installed");

        let stats = run_mirror(&system, Some(&media), &root, &out).unwrap();
        assert_eq!(stats.collection_errors, 0);

        let yaml = fs::read_to_string(out.join("a.txt.yml")).unwrap();
        assert!(yaml.contains("media: {}"));
        assert!(yaml.contains("permission bits in octal"));
    }

    #[test]
    fn test_parent_collision_escaped_with_file_prefix() {
        let dir = TempDir::new().unwrap();
        let root = dir.path().join("sub");
        fs::create_dir(&root).unwrap();
        fs::write(root.join("PARENT_sub"), b"impostor").unwrap();
        let out = dir.path().join("out");
        let system = MockSource::system();

        run_mirror(&system, None, &root, &out).unwrap();

        let artifacts = artifact_paths(&out);
        assert!(artifacts.contains("PARENT_sub.yml"));
        assert!(artifacts.contains("FILE_PARENT_sub.yml"));
        assert_eq!(artifacts.len(), 2);
    }

    #[test]
    fn test_input_not_found_is_fatal() {
        let dir = TempDir::new().unwrap();
        let system = MockSource::system();

        let err = run_mirror(
            &system,
            None,
            &dir.path().join("missing"),
            &dir.path().join("out"),
        )
        .unwrap_err();
        assert!(matches!(err, MirrorError::InputNotFound(_)));
    }

    #[test]
    fn test_idempotent_artifact_set_across_runs() {
        let (_guard, root) = sample_tree();
        let out_one = _guard.path().join("out1");
        let out_two = _guard.path().join("out2");
        let system = MockSource::system();

        run_mirror(&system, None, &root, &out_one).unwrap();
        run_mirror(&system, None, &root, &out_two).unwrap();

        assert_eq!(artifact_paths(&out_one), artifact_paths(&out_two));
    }

    #[test]
    fn test_shutdown_before_first_node_interrupts_cleanly() {
        let (_guard, root) = sample_tree();
        let out = _guard.path().join("out");
        let system = MockSource::system();
        let collector = MetadataCollector::new(&system, None);
        let mirror = TreeMirror::new(
            collector,
            &NullObserver,
            MirrorOptions::default(),
            Arc::new(AtomicBool::new(true)),
        );

        let stats = mirror.mirror(&root, &out).unwrap();
        assert!(stats.interrupted);
        assert_eq!(stats.completed(), 0);
        // Totals are still sized from the pre-scan.
        assert_eq!(stats.total(), 4);
    }

    #[test]
    fn test_systematic_write_failures_abort_the_run() {
        let (_guard, root) = sample_tree();
        for i in 0..6 {
            fs::write(root.join(format!("f{}.txt", i)), b"x").unwrap();
        }
        let out = _guard.path().join("out");
        let system = MockSource::system();
        let collector = MetadataCollector::new(&system, None);
        // An extension with a separator makes every artifact path invalid,
        // simulating a systematically unwritable output tree.
        let options = MirrorOptions {
            include_media: false,
            artifact_extension: "yml/x".to_string(),
        };
        let mirror = TreeMirror::new(
            collector,
            &NullObserver,
            options,
            Arc::new(AtomicBool::new(false)),
        );

        let err = mirror.mirror(&root, &out).unwrap_err();
        match err {
            MirrorError::OutputWrite { message, .. } => {
                assert!(message.contains("consecutive write failures"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_artifact_naming() {
        assert_eq!(parent_artifact_name("sub", "yml"), "PARENT_sub.yml");
        assert_eq!(file_artifact_name("a.txt", "sub", "yml"), "a.txt.yml");
        // Suffixing is injective: a file already carrying the extension
        // still maps to a distinct artifact name.
        assert_eq!(file_artifact_name("a.yml", "sub", "yml"), "a.yml.yml");
        assert_eq!(
            file_artifact_name("PARENT_sub", "sub", "yml"),
            "FILE_PARENT_sub.yml"
        );
        // Same name in a different directory needs no escaping.
        assert_eq!(
            file_artifact_name("PARENT_sub", "other", "yml"),
            "PARENT_sub.yml"
        );
    }
}
