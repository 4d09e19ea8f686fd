//! Command handler implementations
//!
//! Wires the configured sources, the mirror engine, and the reporter
//! together for one invocation, then writes the summary and history.

use crate::cli::progress::{print_header, print_info, print_success, print_warning};
use crate::cli::Args;
use crate::core::collector::MetadataCollector;
use crate::core::config::{init_config, Config};
use crate::core::history::{RunEntry, RunHistory};
use crate::core::mirror::{MirrorOptions, TreeMirror};
use crate::core::reporter::{RunReporter, RunSummary};
use crate::source::{ExifToolSource, MetadataSource, StatSource};
use anyhow::{bail, Result};
use log::{info, warn};
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

/// Run one mirror invocation
pub fn run_command(args: &Args, config: &Config, shutdown_flag: Arc<AtomicBool>) -> Result<()> {
    if args.generate_config {
        let path = init_config()?;
        print_success(&format!(
            "Default configuration written to {}",
            path.display()
        ));
        return Ok(());
    }

    let (Some(input), Some(output)) = (args.input.as_ref(), args.output.as_ref()) else {
        bail!("input and output directories are required");
    };

    if !input.is_dir() {
        bail!("Input directory not found: {}", input.display());
    }

    print_header("metatree");
    info!(
        "Mirroring '{}' into '{}'",
        input.display(),
        output.display()
    );

    let system = StatSource::new(&config.collection.stat_tool);
    if !system.available() {
        print_warning(&format!(
            "'{}' does not appear to be invocable; every node will fail collection",
            config.collection.stat_tool
        ));
        warn!(
            "System metadata tool '{}' unavailable",
            config.collection.stat_tool
        );
    }

    let media = if config.collection.include_media {
        let source = ExifToolSource::new(&config.collection.media_tool);
        if !source.available() {
            warn!(
                "Media tool '{}' unavailable; media sections will be empty",
                config.collection.media_tool
            );
        }
        Some(source)
    } else {
        None
    };

    let collector = MetadataCollector::new(
        &system,
        media.as_ref().map(|s| s as &dyn MetadataSource),
    );
    let reporter = RunReporter::new(&config.progress);
    let options = MirrorOptions {
        include_media: config.collection.include_media,
        artifact_extension: config.output.artifact_extension.clone(),
    };
    let mirror = TreeMirror::new(collector, &reporter, options, shutdown_flag);

    let stats = mirror.mirror(input, output)?;
    reporter.finish(stats.interrupted);

    let summary_path = output.join(&config.output.summary_filename);
    let summary = RunSummary::new(
        input,
        output,
        &summary_path,
        config.to_literal(),
        stats.clone(),
    );
    reporter.finalize(&summary)?;

    if config.output.write_history {
        let mut history = RunHistory::load_or_create(output);
        history.record(RunEntry::from_stats(input, &stats));
        if let Err(e) = history.save(output) {
            warn!("Failed to save run history: {}", e);
        }
    }

    if stats.interrupted {
        print_warning(&format!("Run interrupted: {}", stats));
    } else {
        print_success(&stats.to_string());
    }
    if stats.collection_errors + stats.write_errors > 0 {
        print_warning(&format!(
            "{} node(s) were skipped; see '{}' and the log for details",
            stats.collection_errors + stats.write_errors,
            summary_path.display()
        ));
    }
    print_info(&format!("Summary written to {}", summary_path.display()));

    Ok(())
}
