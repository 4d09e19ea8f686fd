//! System attribute source backed by stat(1)
//!
//! The source makes two typed invocations per path: one for the per-file
//! view (permissions, size, ownership, timestamps, inode, links, device)
//! and one for the per-filesystem view (`-f`: block counts, free space,
//! filesystem type and ID). The views are never combined into a single
//! invocation; each format string is zipped against its own field table.
//!
//! Each invocation builds a `--printf` format string by joining the view's
//! directives with a separator token unlikely to appear in real output.
//! The response is split on that token and zipped positionally against the
//! ordered field descriptions. The descriptions carry the stat man page
//! wording, so artifacts stay self-describing without a lookup table.

use crate::core::error::SourceError;
use crate::source::traits::MetadataSource;
use log::trace;
use std::path::Path;
use std::process::Command;

/// Token joining format directives; must never contain `%`
const FIELD_SEPARATOR: &str = "@#@";

/// One requested field: a stat format directive and its description
#[derive(Debug, Clone, Copy)]
pub struct StatField {
    pub directive: &'static str,
    pub description: &'static str,
}

/// Per-file attribute table, in artifact order
pub const FILE_FIELDS: &[StatField] = &[
    StatField { directive: "%a", description: "permission bits in octal" },
    StatField { directive: "%A", description: "permission bits and file type in human readable form" },
    StatField { directive: "%F", description: "file type" },
    StatField { directive: "%s", description: "total size, in bytes" },
    StatField { directive: "%b", description: "number of blocks allocated" },
    StatField { directive: "%B", description: "the size in bytes of each block" },
    StatField { directive: "%u", description: "user ID of owner" },
    StatField { directive: "%U", description: "user name of owner" },
    StatField { directive: "%g", description: "group ID of owner" },
    StatField { directive: "%G", description: "group name of owner" },
    StatField { directive: "%i", description: "inode number" },
    StatField { directive: "%h", description: "number of hard links" },
    StatField { directive: "%d", description: "device number in decimal" },
    StatField { directive: "%D", description: "device number in hex" },
    StatField { directive: "%w", description: "time of file birth, human-readable" },
    StatField { directive: "%W", description: "time of file birth, seconds since Epoch" },
    StatField { directive: "%x", description: "time of last access, human-readable" },
    StatField { directive: "%X", description: "time of last access, seconds since Epoch" },
    StatField { directive: "%y", description: "time of last data modification, human-readable" },
    StatField { directive: "%Y", description: "time of last data modification, seconds since Epoch" },
    StatField { directive: "%z", description: "time of last status change, human-readable" },
    StatField { directive: "%Z", description: "time of last status change, seconds since Epoch" },
];

/// Per-filesystem attribute table (`stat -f`), in artifact order
pub const FILESYSTEM_FIELDS: &[StatField] = &[
    StatField { directive: "%b", description: "total data blocks in file system" },
    StatField { directive: "%f", description: "free blocks in file system" },
    StatField { directive: "%a", description: "free blocks available to non-superuser" },
    StatField { directive: "%s", description: "block size (for faster transfers)" },
    StatField { directive: "%S", description: "fundamental block size (for block counts)" },
    StatField { directive: "%c", description: "total file nodes in file system" },
    StatField { directive: "%d", description: "free file nodes in file system" },
    StatField { directive: "%i", description: "file system ID in hex" },
    StatField { directive: "%l", description: "maximum length of filenames" },
    StatField { directive: "%T", description: "file system type in human readable form" },
    StatField { directive: "%t", description: "file system type in hex" },
];

/// System attribute source shelling out to a stat-compatible binary
#[derive(Debug, Clone)]
pub struct StatSource {
    tool: String,
}

impl StatSource {
    /// Create a source invoking the given stat binary
    pub fn new(tool: impl Into<String>) -> Self {
        Self { tool: tool.into() }
    }

    /// Invoke one view of the tool and zip the response against `fields`
    fn invoke(
        &self,
        path: &Path,
        filesystem_view: bool,
        fields: &[StatField],
    ) -> Result<Vec<(String, String)>, SourceError> {
        let format = fields
            .iter()
            .map(|f| f.directive)
            .collect::<Vec<_>>()
            .join(FIELD_SEPARATOR);

        let mut command = Command::new(&self.tool);
        if filesystem_view {
            command.arg("-f");
        }
        command.arg(format!("--printf={}", format)).arg(path);

        trace!("Invoking {:?}", command);

        let output = command.output().map_err(|e| SourceError::Spawn {
            tool: self.tool.clone(),
            message: e.to_string(),
        })?;

        if !output.status.success() {
            return Err(SourceError::Failed {
                tool: self.tool.clone(),
                message: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        let response = String::from_utf8_lossy(&output.stdout).into_owned();
        zip_response(&self.tool, &response, fields)
    }
}

impl MetadataSource for StatSource {
    /// Collect both views: per-file fields first, per-filesystem fields after
    fn collect(&self, path: &Path) -> Result<Vec<(String, String)>, SourceError> {
        let mut pairs = self.invoke(path, false, FILE_FIELDS)?;
        pairs.extend(self.invoke(path, true, FILESYSTEM_FIELDS)?);
        Ok(pairs)
    }

    fn describe(&self) -> &str {
        &self.tool
    }

    fn available(&self) -> bool {
        Command::new(&self.tool)
            .arg("--version")
            .output()
            .map(|o| o.status.success())
            .unwrap_or(false)
    }
}

/// Split a separator-joined response and zip it against the field table
///
/// The zip is positional, so a count mismatch is an error rather than a
/// silently misaligned mapping.
fn zip_response(
    tool: &str,
    response: &str,
    fields: &[StatField],
) -> Result<Vec<(String, String)>, SourceError> {
    let values: Vec<&str> = response.split(FIELD_SEPARATOR).collect();
    if values.len() != fields.len() {
        return Err(SourceError::FieldCount {
            tool: tool.to_string(),
            expected: fields.len(),
            got: values.len(),
        });
    }

    Ok(fields
        .iter()
        .zip(values)
        .map(|(field, value)| (field.description.to_string(), value.to_string()))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fabricated_response(fields: &[StatField]) -> String {
        (0..fields.len())
            .map(|i| format!("v{}", i))
            .collect::<Vec<_>>()
            .join(FIELD_SEPARATOR)
    }

    #[test]
    fn test_zip_response_preserves_declared_order() {
        let response = fabricated_response(FILE_FIELDS);
        let pairs = zip_response("stat", &response, FILE_FIELDS).unwrap();

        assert_eq!(pairs.len(), FILE_FIELDS.len());
        for (i, (description, value)) in pairs.iter().enumerate() {
            assert_eq!(description, FILE_FIELDS[i].description);
            assert_eq!(value, &format!("v{}", i));
        }
    }

    #[test]
    fn test_zip_response_field_count_mismatch() {
        let short = format!("only{}two", FIELD_SEPARATOR);
        let err = zip_response("stat", &short, FILE_FIELDS).unwrap_err();
        match err {
            SourceError::FieldCount { expected, got, .. } => {
                assert_eq!(expected, FILE_FIELDS.len());
                assert_eq!(got, 2);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_zip_response_value_containing_separator_is_detected() {
        // A value containing the separator shifts the count; better an
        // explicit error than a misaligned mapping.
        let mut values: Vec<String> = (0..FILESYSTEM_FIELDS.len())
            .map(|i| format!("v{}", i))
            .collect();
        values[0] = format!("odd{}value", FIELD_SEPARATOR);
        let response = values.join(FIELD_SEPARATOR);

        assert!(zip_response("stat", &response, FILESYSTEM_FIELDS).is_err());
    }

    #[test]
    fn test_separator_contains_no_format_directive() {
        assert!(!FIELD_SEPARATOR.contains('%'));
    }

    #[test]
    fn test_spawn_error_for_missing_tool() {
        let source = StatSource::new("definitely-not-a-real-stat-binary");
        let err = source.collect(Path::new("/")).unwrap_err();
        assert!(matches!(err, SourceError::Spawn { .. }));
        assert!(!source.available());
    }

    #[test]
    #[cfg(target_os = "linux")]
    fn test_collect_against_real_stat() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("sample.txt");
        std::fs::write(&file, b"hello").unwrap();

        let source = StatSource::new("stat");
        let pairs = source.collect(&file).unwrap();

        assert_eq!(pairs.len(), FILE_FIELDS.len() + FILESYSTEM_FIELDS.len());
        let size = pairs
            .iter()
            .find(|(d, _)| d == "total size, in bytes")
            .map(|(_, v)| v.as_str());
        assert_eq!(size, Some("5"));
    }
}
