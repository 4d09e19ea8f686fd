//! Mock metadata sources for testing without external tools
//!
//! These implement the same [`MetadataSource`] trait as the real tool-backed
//! sources, so the collector and mirror can be exercised end to end with
//! canned responses or injected failures.

use crate::core::error::SourceError;
use crate::source::traits::MetadataSource;
use std::path::Path;

/// A source returning the same canned pairs for every path
#[derive(Debug, Clone)]
pub struct MockSource {
    name: String,
    pairs: Vec<(String, String)>,
}

impl MockSource {
    pub fn new(name: &str, pairs: Vec<(&str, &str)>) -> Self {
        Self {
            name: name.to_string(),
            pairs: pairs
                .into_iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        }
    }

    /// A small system-like source with stable field ordering
    pub fn system() -> Self {
        Self::new(
            "mock-stat",
            vec![
                ("permission bits in octal", "644"),
                ("total size, in bytes", "1024"),
                ("inode number", "42"),
                ("file system type in human readable form", "ext4"),
            ],
        )
    }

    /// A small media-like source
    pub fn media() -> Self {
        Self::new(
            "mock-exiftool",
            vec![
                ("Image Width", "4032"),
                ("Image Height", "3024"),
                ("Create Date", "2023:06:14 09:21:44"),
            ],
        )
    }
}

impl MetadataSource for MockSource {
    fn collect(&self, _path: &Path) -> Result<Vec<(String, String)>, SourceError> {
        Ok(self.pairs.clone())
    }

    fn describe(&self) -> &str {
        &self.name
    }
}

/// A source failing every collection with a canned error
#[derive(Debug, Clone)]
pub struct FailingSource {
    name: String,
    message: String,
}

impl FailingSource {
    pub fn new(name: &str, message: &str) -> Self {
        Self {
            name: name.to_string(),
            message: message.to_string(),
        }
    }
}

impl MetadataSource for FailingSource {
    fn collect(&self, _path: &Path) -> Result<Vec<(String, String)>, SourceError> {
        Err(SourceError::Failed {
            tool: self.name.clone(),
            message: self.message.clone(),
        })
    }

    fn describe(&self) -> &str {
        &self.name
    }

    fn available(&self) -> bool {
        false
    }
}
