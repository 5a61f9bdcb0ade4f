// Flag configuration file loaders

use crate::{ConfigError, FlagConfig, Result};
use std::fs;
use std::path::Path;
use tracing::debug;

/// Supported configuration file formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileFormat {
    Json,
    Toml,
}

impl FileFormat {
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "json" => Some(FileFormat::Json),
            "toml" => Some(FileFormat::Toml),
            _ => None,
        }
    }
}

/// Reads a [`FlagConfig`] from JSON or TOML.
///
/// Both formats share one layout:
///
/// ```toml
/// environment = "dev"
///
/// [schema.devTools]
/// options = [false, true]
///
/// [schema.migrateDatabase]
/// readonly = true
/// options = [false, true]
///
/// [defaults.dev]
/// devTools = true
/// ```
pub struct ConfigLoader {
    format: FileFormat,
}

impl ConfigLoader {
    pub fn new(format: FileFormat) -> Self {
        Self { format }
    }

    /// Auto-detect format from file extension
    pub fn auto(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let ext = path
            .extension()
            .and_then(|s| s.to_str())
            .ok_or_else(|| ConfigError::LoadError("No file extension found".to_string()))?;

        let format = FileFormat::from_extension(ext)
            .ok_or_else(|| ConfigError::UnsupportedFormat(ext.to_string()))?;

        Ok(Self::new(format))
    }

    pub fn format(&self) -> FileFormat {
        self.format
    }

    /// Load flag configuration from file
    pub fn load_file(&self, path: impl AsRef<Path>) -> Result<FlagConfig> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            ConfigError::LoadError(format!("Failed to read {}: {}", path.display(), e))
        })?;

        debug!(path = %path.display(), format = ?self.format, "Loading flag configuration");
        self.parse(&content)
    }

    /// Parse flag configuration from string.
    ///
    /// The parsed schema is validated; a flag with no options is an error.
    pub fn parse(&self, content: &str) -> Result<FlagConfig> {
        let config: FlagConfig = match self.format {
            FileFormat::Json => serde_json::from_str(content)
                .map_err(|e| ConfigError::ParseError(format!("JSON parse error: {}", e)))?,
            FileFormat::Toml => toml::from_str(content)
                .map_err(|e| ConfigError::ParseError(format!("TOML parse error: {}", e)))?,
        };

        config.schema.validate()?;
        Ok(config)
    }
}
