//! Metadata record types
//!
//! A [`MetadataRecord`] is the persisted projection of a single tree node:
//! an ordered `system` section built from the stat-equivalent tool, a
//! `media` section built from the EXIF-equivalent tool (empty for folders
//! and whenever extraction is skipped or fails), and a `timing` section
//! with the moment the record was produced.
//!
//! The `system` section must serialize in exactly the order the field table
//! declared, so it is kept as a vector of pairs and serialized through a
//! custom map serializer rather than a sorted map type.

use chrono::{DateTime, Utc};
use serde::ser::{Serialize, SerializeMap, Serializer};
use std::collections::BTreeMap;

/// Kind of a node discovered during traversal
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    /// A directory, mirrored as an output folder with a parent artifact
    Directory,
    /// A regular file, mirrored as a single artifact
    File,
}

impl std::fmt::Display for NodeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NodeKind::Directory => write!(f, "folder"),
            NodeKind::File => write!(f, "file"),
        }
    }
}

/// Timing section of a record
#[derive(Debug, Clone, serde::Serialize)]
pub struct RecordTiming {
    /// When the record was produced (RFC 3339)
    pub collected: DateTime<Utc>,
    /// Same instant as seconds since the Epoch
    pub collected_epoch: i64,
}

impl RecordTiming {
    pub fn now() -> Self {
        let now = Utc::now();
        Self {
            collected: now,
            collected_epoch: now.timestamp(),
        }
    }
}

/// Aggregated metadata for one directory or file
///
/// Created synchronously when a node is visited, serialized immediately
/// into the mirrored output tree, then discarded.
#[derive(Debug, Clone)]
pub struct MetadataRecord {
    system: Vec<(String, String)>,
    media: BTreeMap<String, String>,
    timing: RecordTiming,
}

impl MetadataRecord {
    /// Create a record with both sections
    pub fn new(system: Vec<(String, String)>, media: BTreeMap<String, String>) -> Self {
        Self {
            system,
            media,
            timing: RecordTiming::now(),
        }
    }

    /// Create a record with an empty media section (folders, media disabled)
    pub fn without_media(system: Vec<(String, String)>) -> Self {
        Self::new(system, BTreeMap::new())
    }

    /// Ordered system fields as (description, value) pairs
    pub fn system(&self) -> &[(String, String)] {
        &self.system
    }

    /// Media tags keyed by tag name
    pub fn media(&self) -> &BTreeMap<String, String> {
        &self.media
    }

    /// Whether the media section is empty
    pub fn media_is_empty(&self) -> bool {
        self.media.is_empty()
    }

    /// Serialize the record as a YAML document
    pub fn to_yaml(&self) -> std::result::Result<String, serde_yaml::Error> {
        serde_yaml::to_string(self)
    }
}

/// Wrapper serializing ordered pairs as a map, preserving insertion order
struct OrderedSection<'a>(&'a [(String, String)]);

impl Serialize for OrderedSection<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (key, value) in self.0 {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

impl Serialize for MetadataRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(3))?;
        map.serialize_entry("system", &OrderedSection(&self.system))?;
        map.serialize_entry("media", &self.media)?;
        map.serialize_entry("timing", &self.timing)?;
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_system() -> Vec<(String, String)> {
        vec![
            ("permission bits in octal".to_string(), "644".to_string()),
            ("total size, in bytes".to_string(), "1024".to_string()),
            ("inode number".to_string(), "42".to_string()),
        ]
    }

    #[test]
    fn test_without_media_is_empty() {
        let record = MetadataRecord::without_media(sample_system());
        assert!(record.media_is_empty());
        assert_eq!(record.system().len(), 3);
    }

    #[test]
    fn test_system_order_preserved_in_yaml() {
        let record = MetadataRecord::without_media(sample_system());
        let yaml = record.to_yaml().unwrap();

        let perm = yaml.find("permission bits in octal").unwrap();
        let size = yaml.find("total size, in bytes").unwrap();
        let inode = yaml.find("inode number").unwrap();
        assert!(perm < size);
        assert!(size < inode);
    }

    #[test]
    fn test_yaml_has_all_sections() {
        let mut media = BTreeMap::new();
        media.insert("Image Width".to_string(), "4032".to_string());
        let record = MetadataRecord::new(sample_system(), media);

        let yaml = record.to_yaml().unwrap();
        assert!(yaml.contains("system:"));
        assert!(yaml.contains("media:"));
        assert!(yaml.contains("timing:"));
        assert!(yaml.contains("Image Width"));
        assert!(yaml.contains("collected_epoch"));
    }

    #[test]
    fn test_empty_media_serializes_as_empty_map() {
        let record = MetadataRecord::without_media(sample_system());
        let yaml = record.to_yaml().unwrap();
        assert!(yaml.contains("media: {}"));
    }

    #[test]
    fn test_node_kind_display() {
        assert_eq!(NodeKind::Directory.to_string(), "folder");
        assert_eq!(NodeKind::File.to_string(), "file");
    }
}
