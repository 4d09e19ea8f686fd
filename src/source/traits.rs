//! Metadata source abstraction for testability
//!
//! A [`MetadataSource`] produces an ordered list of `(description, value)`
//! pairs for a single path. The order of the pairs is part of the contract:
//! the collector writes them into the record exactly as returned, so an
//! artifact reads in the same field order on every run.
//!
//! Both the real tool-backed sources and the in-memory mocks implement this
//! trait, allowing the collection pipeline to run without external tools.

use crate::core::error::SourceError;
use std::path::Path;

/// A collaborator producing metadata fields for one path
pub trait MetadataSource {
    /// Collect ordered `(description, value)` pairs for `path`
    fn collect(&self, path: &Path) -> Result<Vec<(String, String)>, SourceError>;

    /// Identity of the underlying tool, for logs and error messages
    fn describe(&self) -> &str;

    /// Probe whether the underlying tool can be invoked at all
    ///
    /// Used to warn once up front instead of failing on every node.
    fn available(&self) -> bool {
        true
    }
}
