//! Metadata aggregation for a single path
//!
//! The collector assembles one [`MetadataRecord`] per node out of the
//! injected sources: the system source always runs and its failure fails
//! the collection; the media source runs only for files when requested,
//! and its failure is absorbed into an empty `media` section.
//!
//! No filesystem writes happen at this layer.

use crate::core::error::{MirrorError, Result};
use crate::core::record::MetadataRecord;
use crate::source::traits::MetadataSource;
use log::debug;
use std::collections::BTreeMap;
use std::path::Path;

/// Aggregates system and media metadata for one path at a time
pub struct MetadataCollector<'a> {
    system: &'a dyn MetadataSource,
    media: Option<&'a dyn MetadataSource>,
}

impl<'a> MetadataCollector<'a> {
    /// Create a collector over a system source and an optional media source
    pub fn new(system: &'a dyn MetadataSource, media: Option<&'a dyn MetadataSource>) -> Self {
        Self { system, media }
    }

    /// Collect an aggregated record for `path`
    ///
    /// Fails only when the system source fails. With `include_media` false
    /// (always the case for directories) the media source is never invoked.
    pub fn collect(&self, path: &Path, include_media: bool) -> Result<MetadataRecord> {
        let system = self
            .system
            .collect(path)
            .map_err(|e| MirrorError::Collection {
                path: path.to_path_buf(),
                message: e.to_string(),
            })?;

        let media = if include_media {
            self.collect_media(path)
        } else {
            BTreeMap::new()
        };

        Ok(MetadataRecord::new(system, media))
    }

    /// Run the media source, absorbing any failure into an empty map
    fn collect_media(&self, path: &Path) -> BTreeMap<String, String> {
        let Some(source) = self.media else {
            return BTreeMap::new();
        };

        match source.collect(path) {
            Ok(pairs) => pairs.into_iter().collect(),
            Err(e) => {
                debug!(
                    "Media extraction failed for '{}' via {}: {}",
                    path.display(),
                    source.describe(),
                    e
                );
                BTreeMap::new()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::mock::{FailingSource, MockSource};

    #[test]
    fn test_collect_with_media() {
        let system = MockSource::system();
        let media = MockSource::media();
        let collector = MetadataCollector::new(&system, Some(&media));

        let record = collector.collect(Path::new("/any/photo.jpg"), true).unwrap();
        assert_eq!(record.system().len(), 4);
        assert_eq!(record.media().get("Image Width").unwrap(), "4032");
    }

    #[test]
    fn test_collect_without_media_skips_media_source() {
        let system = MockSource::system();
        // A failing media source must never be consulted when media is off
        let media = FailingSource::new("mock-exiftool", "should not run");
        let collector = MetadataCollector::new(&system, Some(&media));

        let record = collector.collect(Path::new("/any/dir"), false).unwrap();
        assert!(record.media_is_empty());
    }

    #[test]
    fn test_media_failure_absorbed() {
        let system = MockSource::system();
        let media = FailingSource::new("mock-exiftool", "tool not installed");
        let collector = MetadataCollector::new(&system, Some(&media));

        let record = collector.collect(Path::new("/any/photo.jpg"), true).unwrap();
        assert!(record.media_is_empty());
        assert_eq!(record.system().len(), 4);
    }

    #[test]
    fn test_system_failure_propagates() {
        let system = FailingSource::new("mock-stat", "no such file or directory");
        let media = MockSource::media();
        let collector = MetadataCollector::new(&system, Some(&media));

        let err = collector
            .collect(Path::new("/vanished"), true)
            .unwrap_err();
        match err {
            MirrorError::Collection { path, message } => {
                assert_eq!(path, Path::new("/vanished"));
                assert!(message.contains("no such file"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_no_media_source_configured() {
        let system = MockSource::system();
        let collector = MetadataCollector::new(&system, None);

        let record = collector.collect(Path::new("/any/photo.jpg"), true).unwrap();
        assert!(record.media_is_empty());
    }
}
