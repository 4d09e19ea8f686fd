//! Error types for the metadata mirror
//!
//! This module defines the error types used throughout the application.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for the metadata mirror
#[derive(Error, Debug)]
pub enum MirrorError {
    /// The input root does not exist or is not a directory
    #[error("Input directory not found: {0}")]
    InputNotFound(PathBuf),

    /// System metadata could not be collected for a node
    #[error("Metadata collection failed for '{path}': {message}")]
    Collection { path: PathBuf, message: String },

    /// A mirrored directory or artifact could not be written
    #[error("Failed to write '{path}': {message}")]
    OutputWrite { path: PathBuf, message: String },

    /// General I/O error
    #[error("IO error: {0}")]
    Io(String),
}

/// Result type alias for convenience
pub type Result<T> = std::result::Result<T, MirrorError>;

impl From<std::io::Error> for MirrorError {
    fn from(err: std::io::Error) -> Self {
        MirrorError::Io(err.to_string())
    }
}

/// Error type for the external metadata sources
#[derive(Error, Debug)]
pub enum SourceError {
    /// The external tool could not be spawned
    #[error("Failed to invoke '{tool}': {message}")]
    Spawn { tool: String, message: String },

    /// The external tool exited with a failure status
    #[error("'{tool}' exited with an error: {message}")]
    Failed { tool: String, message: String },

    /// The response did not match the requested field table
    #[error("'{tool}' returned {got} fields, expected {expected}")]
    FieldCount {
        tool: String,
        expected: usize,
        got: usize,
    },
}
