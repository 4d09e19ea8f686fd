//! External metadata sources
//!
//! This module wraps the external tools the mirror aggregates metadata
//! from. Both are ordinary command-line programs invoked per node:
//!
//! - `stat` - file-system attributes (per-file and per-filesystem views)
//! - `exiftool` - embedded media tags
//!
//! # Architecture
//!
//! The module uses a trait-based abstraction so the aggregation pipeline
//! never parses tool output directly:
//!
//! - `MetadataSource` - capability trait returning ordered field pairs
//! - `StatSource` - system attributes via two typed stat invocations
//! - `ExifToolSource` - media tags via exiftool's line-oriented output
//! - `MockSource` / `FailingSource` - in-memory sources for tests
//!
//! Real and mock sources implement the same trait, so the collector and
//! mirror can be exercised without any external tool installed.

pub mod exif;
pub mod mock;
pub mod stat;
pub mod traits;

// Re-export commonly used types for convenience
pub use exif::ExifToolSource;
pub use mock::{FailingSource, MockSource};
pub use stat::StatSource;
pub use traits::MetadataSource;
