//! Configuration module for the metadata mirror
//!
//! Supports loading configuration from a TOML file.
//! Configuration is stored in a standard location:
//! - Windows: %APPDATA%\metatree\config.toml
//! - Linux/macOS: ~/.config/metatree/config.toml

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Application name used for config directory
const APP_NAME: &str = "metatree";

/// Default config file name
const CONFIG_FILE_NAME: &str = "config.toml";

/// Get the standard configuration directory for the application.
///
/// Returns:
/// - Windows: %APPDATA%\metatree
/// - Linux/macOS: ~/.config/metatree
pub fn get_config_dir() -> Option<PathBuf> {
    #[cfg(target_os = "windows")]
    {
        std::env::var("APPDATA")
            .ok()
            .map(|appdata| PathBuf::from(appdata).join(APP_NAME))
    }

    #[cfg(not(target_os = "windows"))]
    {
        std::env::var("HOME")
            .ok()
            .map(|home| PathBuf::from(home).join(".config").join(APP_NAME))
    }
}

/// Get the standard configuration file path.
pub fn get_config_path() -> Option<PathBuf> {
    get_config_dir().map(|dir| dir.join(CONFIG_FILE_NAME))
}

/// Ensure the configuration directory exists.
pub fn ensure_config_dir() -> Result<PathBuf, ConfigError> {
    let config_dir = get_config_dir().ok_or(ConfigError::ConfigDirNotFound)?;

    if !config_dir.exists() {
        fs::create_dir_all(&config_dir)
            .map_err(|e| ConfigError::WriteError(config_dir.clone(), e.to_string()))?;
    }

    Ok(config_dir)
}

/// Initialize the configuration file if it doesn't exist.
///
/// Creates the config directory and writes the default config template.
/// Returns the path to the config file.
pub fn init_config() -> Result<PathBuf, ConfigError> {
    let config_dir = ensure_config_dir()?;
    let config_path = config_dir.join(CONFIG_FILE_NAME);

    if !config_path.exists() {
        let default_config = Config::generate_default_config();
        fs::write(&config_path, default_config)
            .map_err(|e| ConfigError::WriteError(config_path.clone(), e.to_string()))?;
    }

    Ok(config_path)
}

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Metadata collection settings
    pub collection: CollectionConfig,

    /// Output settings
    pub output: OutputConfig,

    /// Logging settings
    pub logging: LoggingConfig,

    /// Progress rendering settings
    pub progress: ProgressConfig,
}

/// Metadata collection configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CollectionConfig {
    /// Binary invoked for system attributes (stat-compatible)
    pub stat_tool: String,

    /// Binary invoked for embedded media tags (exiftool-compatible)
    pub media_tool: String,

    /// Attempt media extraction for files
    pub include_media: bool,
}

impl Default for CollectionConfig {
    fn default() -> Self {
        Self {
            stat_tool: "stat".to_string(),
            media_tool: "exiftool".to_string(),
            include_media: true,
        }
    }
}

/// Output configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Extension of the written artifacts (without the dot)
    pub artifact_extension: String,

    /// File name of the run summary, written into the output root
    pub summary_filename: String,

    /// Keep a JSON run history in the output root
    pub write_history: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            artifact_extension: "yml".to_string(),
            summary_filename: "metatree_run.log".to_string(),
            write_history: true,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level: error, warn, info, debug, trace
    pub level: String,

    /// Log to file
    pub log_to_file: bool,

    /// Log file path
    pub log_file: PathBuf,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            log_to_file: false,
            log_file: PathBuf::from("metatree.log"),
        }
    }
}

/// Progress rendering configuration
///
/// Passed into the reporter's constructor; there is no process-global
/// styling state.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProgressConfig {
    /// Render progress indicators at all
    pub enabled: bool,

    /// indicatif template for the mirror bar
    pub bar_template: String,

    /// Characters drawing the bar
    pub progress_chars: String,

    /// Characters drawing the scan spinner
    pub tick_chars: String,
}

impl Default for ProgressConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            bar_template:
                "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({percent}%) {msg}"
                    .to_string(),
            progress_chars: "#>-".to_string(),
            tick_chars: "⠁⠂⠄⡀⢀⠠⠐⠈ ".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(ConfigError::FileNotFound(path.to_path_buf()));
        }

        let content = fs::read_to_string(path)
            .map_err(|e| ConfigError::ReadError(path.to_path_buf(), e.to_string()))?;

        let config: Config = toml::from_str(&content)
            .map_err(|e| ConfigError::ParseError(path.to_path_buf(), e.to_string()))?;

        Ok(config)
    }

    /// Load configuration from default locations
    ///
    /// Search order:
    /// 1. ./config.toml (current directory - for development/override)
    /// 2. ./metatree.toml (current directory - alternative name)
    /// 3. Standard config location
    ///
    /// If no config file is found, returns default configuration.
    pub fn load_default() -> Result<Self, ConfigError> {
        let local_paths = [
            PathBuf::from("./config.toml"),
            PathBuf::from("./metatree.toml"),
        ];

        for path in &local_paths {
            if path.exists() {
                return Self::load(path);
            }
        }

        if let Some(config_path) = get_config_path() {
            if config_path.exists() {
                return Self::load(&config_path);
            }
        }

        Ok(Self::default())
    }

    /// Save configuration to a TOML file
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let content =
            toml::to_string_pretty(self).map_err(|e| ConfigError::SerializeError(e.to_string()))?;

        fs::write(path.as_ref(), content)
            .map_err(|e| ConfigError::WriteError(path.as_ref().to_path_buf(), e.to_string()))?;

        Ok(())
    }

    /// The literal configuration text recorded in the run summary
    pub fn to_literal(&self) -> String {
        toml::to_string_pretty(self).unwrap_or_else(|_| String::from("<unserializable config>"))
    }

    /// Generate a default config file with comments
    /// This uses the example config file to ensure it stays up to date
    pub fn generate_default_config() -> String {
        include_str!("../../config.example.toml").to_string()
    }
}

/// Configuration error types
#[derive(Debug)]
pub enum ConfigError {
    /// Configuration file was not found at the specified path
    FileNotFound(PathBuf),
    /// Failed to read the configuration file
    ReadError(PathBuf, String),
    /// Failed to parse the configuration file (invalid TOML)
    ParseError(PathBuf, String),
    /// Failed to serialize configuration to TOML
    SerializeError(String),
    /// Failed to write configuration file
    WriteError(PathBuf, String),
    /// Could not determine config directory
    ConfigDirNotFound,
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::FileNotFound(path) => {
                write!(f, "Configuration file not found: {}", path.display())
            }
            ConfigError::ReadError(path, err) => {
                write!(
                    f,
                    "Failed to read config file '{}': {}",
                    path.display(),
                    err
                )
            }
            ConfigError::ParseError(path, err) => {
                write!(
                    f,
                    "Failed to parse config file '{}': {}",
                    path.display(),
                    err
                )
            }
            ConfigError::SerializeError(err) => {
                write!(f, "Failed to serialize configuration: {}", err)
            }
            ConfigError::WriteError(path, err) => {
                write!(
                    f,
                    "Failed to write config file '{}': {}",
                    path.display(),
                    err
                )
            }
            ConfigError::ConfigDirNotFound => {
                write!(f, "Could not determine configuration directory")
            }
        }
    }
}

impl std::error::Error for ConfigError {}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.collection.stat_tool, "stat");
        assert_eq!(config.collection.media_tool, "exiftool");
        assert!(config.collection.include_media);
        assert_eq!(config.output.artifact_extension, "yml");
        assert_eq!(config.output.summary_filename, "metatree_run.log");
        assert!(config.output.write_history);
        assert_eq!(config.logging.level, "info");
        assert!(config.progress.enabled);
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");

        let mut config = Config::default();
        config.collection.include_media = false;
        config.output.artifact_extension = "yaml".to_string();
        config.save(&path).unwrap();

        let loaded = Config::load(&path).unwrap();
        assert!(!loaded.collection.include_media);
        assert_eq!(loaded.output.artifact_extension, "yaml");
        assert_eq!(loaded.collection.stat_tool, "stat");
    }

    #[test]
    fn test_load_missing_file() {
        let err = Config::load("/nonexistent/config.toml").unwrap_err();
        assert!(matches!(err, ConfigError::FileNotFound(_)));
    }

    #[test]
    fn test_partial_toml_fills_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[collection]\ninclude_media = false\n").unwrap();

        let loaded = Config::load(&path).unwrap();
        assert!(!loaded.collection.include_media);
        assert_eq!(loaded.output.artifact_extension, "yml");
    }

    #[test]
    fn test_generate_default_config_parses() {
        let template = Config::generate_default_config();
        let parsed: Config = toml::from_str(&template).unwrap();
        assert_eq!(parsed.collection.stat_tool, "stat");
    }

    #[test]
    fn test_to_literal_contains_sections() {
        let literal = Config::default().to_literal();
        assert!(literal.contains("[collection]"));
        assert!(literal.contains("[output]"));
        assert!(literal.contains("[logging]"));
        assert!(literal.contains("[progress]"));
    }
}
