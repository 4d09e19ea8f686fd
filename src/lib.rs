//! metatree library
//!
//! Mirrors the directory structure of an input tree into an output tree,
//! producing one metadata artifact per folder and per file instead of
//! copying content. Each artifact aggregates file-system attributes from a
//! stat-compatible tool and, for files, embedded media tags from an
//! exiftool-compatible tool.
//!
//! # Architecture
//!
//! The library is organized into the following modules:
//!
//! - [`core`] - Configuration, error handling, metadata collection, the
//!   tree-mirroring engine, run reporting, and the run history
//! - [`source`] - External tool sources behind the `MetadataSource` trait,
//!   including in-memory mocks for testing
//! - [`cli`] - Command-line interface (only used by the binary)
//!
//! # Example Usage
//!
//! ```rust,no_run
//! use metatree::core::collector::MetadataCollector;
//! use metatree::core::mirror::{MirrorOptions, TreeMirror};
//! use metatree::core::reporter::NullObserver;
//! use metatree::source::{ExifToolSource, MetadataSource, StatSource};
//! use std::path::Path;
//! use std::sync::atomic::AtomicBool;
//! use std::sync::Arc;
//!
//! fn main() -> anyhow::Result<()> {
//!     let system = StatSource::new("stat");
//!     let media = ExifToolSource::new("exiftool");
//!     let collector = MetadataCollector::new(&system, Some(&media));
//!
//!     let mirror = TreeMirror::new(
//!         collector,
//!         &NullObserver,
//!         MirrorOptions::default(),
//!         Arc::new(AtomicBool::new(false)),
//!     );
//!     let stats = mirror.mirror(Path::new("/data/photos"), Path::new("/data/mirror"))?;
//!     println!("{}", stats);
//!
//!     Ok(())
//! }
//! ```
//!
//! # Testing Without External Tools
//!
//! The [`source::mock`] module ships in-memory sources implementing the
//! same trait as the real ones, so the whole pipeline can be exercised
//! with canned responses:
//!
//! ```rust
//! use metatree::core::collector::MetadataCollector;
//! use metatree::source::MockSource;
//! use std::path::Path;
//!
//! let system = MockSource::system();
//! let collector = MetadataCollector::new(&system, None);
//! let record = collector.collect(Path::new("/any"), false).unwrap();
//! assert!(record.media_is_empty());
//! ```

pub mod cli;
pub mod core;
pub mod source;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");
