//! Command-line argument definitions
//!
//! This module defines all CLI arguments using clap.

use clap::Parser;
use std::path::PathBuf;

/// Mirror a directory tree into metadata artifacts
///
/// Walks the input tree and recreates its directory structure under the
/// output tree, writing one YAML metadata record per folder and per file
/// instead of copying any content.
#[derive(Parser, Debug)]
#[command(name = "metatree")]
#[command(version)]
#[command(about = "Mirror a directory tree into metadata artifacts instead of copying content", long_about = None)]
pub struct Args {
    /// Input directory to mirror
    #[arg(required_unless_present = "generate_config")]
    pub input: Option<PathBuf>,

    /// Output directory for the artifact tree (created if absent)
    #[arg(required_unless_present = "generate_config")]
    pub output: Option<PathBuf>,

    /// Path to configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Binary to invoke for system attributes (overrides config)
    #[arg(long, value_name = "BIN")]
    pub stat_tool: Option<String>,

    /// Binary to invoke for media tags (overrides config)
    #[arg(long, value_name = "BIN")]
    pub media_tool: Option<String>,

    /// Skip media extraction entirely
    #[arg(long)]
    pub no_media: bool,

    /// Disable progress rendering (useful for non-interactive runs)
    #[arg(long)]
    pub no_progress: bool,

    /// Log level: error, warn, info, debug, trace (overrides config)
    #[arg(short, long)]
    pub log_level: Option<String>,

    /// Write the default config file to the standard location and exit
    #[arg(long)]
    pub generate_config: bool,
}
