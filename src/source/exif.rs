//! Media tag source backed by exiftool(1)
//!
//! exiftool's default output is line-oriented `Key : Value` text. The
//! parser splits each line on the FIRST colon only, since values routinely
//! contain further colons (timestamps, ratios, GPS positions). Blank lines
//! are skipped. Lines without a colon are ignored rather than treated as
//! errors; exiftool occasionally emits free-form notes.

use crate::core::error::SourceError;
use crate::source::traits::MetadataSource;
use log::trace;
use std::path::Path;
use std::process::Command;

/// Media tag source shelling out to an exiftool-compatible binary
#[derive(Debug, Clone)]
pub struct ExifToolSource {
    tool: String,
}

impl ExifToolSource {
    /// Create a source invoking the given exiftool binary
    pub fn new(tool: impl Into<String>) -> Self {
        Self { tool: tool.into() }
    }
}

impl MetadataSource for ExifToolSource {
    fn collect(&self, path: &Path) -> Result<Vec<(String, String)>, SourceError> {
        let mut command = Command::new(&self.tool);
        command.arg(path);

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

        let response = String::from_utf8_lossy(&output.stdout);
        Ok(parse_tag_lines(&response))
    }

    fn describe(&self) -> &str {
        &self.tool
    }

    fn available(&self) -> bool {
        Command::new(&self.tool)
            .arg("-ver")
            .output()
            .map(|o| o.status.success())
            .unwrap_or(false)
    }
}

/// Parse line-oriented `Key : Value` output into ordered pairs
fn parse_tag_lines(response: &str) -> Vec<(String, String)> {
    response
        .lines()
        .filter(|line| !line.trim().is_empty())
        .filter_map(|line| {
            line.split_once(':')
                .map(|(key, value)| (key.trim().to_string(), value.trim().to_string()))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_basic_tags() {
        let output = "File Name                       : photo.jpg\n\
                      Image Width                     : 4032\n";
        let tags = parse_tag_lines(output);
        assert_eq!(tags.len(), 2);
        assert_eq!(tags[0], ("File Name".to_string(), "photo.jpg".to_string()));
        assert_eq!(tags[1], ("Image Width".to_string(), "4032".to_string()));
    }

    #[test]
    fn test_parse_value_with_colons() {
        let output = "Create Date                     : 2023:06:14 09:21:44\n";
        let tags = parse_tag_lines(output);
        assert_eq!(tags.len(), 1);
        assert_eq!(tags[0].0, "Create Date");
        assert_eq!(tags[0].1, "2023:06:14 09:21:44");
    }

    #[test]
    fn test_parse_skips_blank_and_colonless_lines() {
        let output = "\nWarning without colon\nFile Size : 2.1 MB\n\n";
        let tags = parse_tag_lines(output);
        assert_eq!(tags.len(), 1);
        assert_eq!(tags[0], ("File Size".to_string(), "2.1 MB".to_string()));
    }

    #[test]
    fn test_parse_empty_output() {
        assert!(parse_tag_lines("").is_empty());
    }

    #[test]
    fn test_spawn_error_for_missing_tool() {
        let source = ExifToolSource::new("definitely-not-a-real-exiftool");
        let err = source.collect(Path::new("/tmp")).unwrap_err();
        assert!(matches!(err, SourceError::Spawn { .. }));
        assert!(!source.available());
    }
}
