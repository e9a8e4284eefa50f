//! Configuration schema types
//!
//! This module defines the configuration structure for flyerpress. Every
//! section has defaults, so an empty file is a valid configuration.

use crate::core::capture::{
    Color, DEFAULT_JPEG_QUALITY, DEFAULT_TARGET_HEIGHT, DEFAULT_TARGET_WIDTH,
};
use crate::domain::job::{Orientation, PageFormat, PdfPlacement, DEFAULT_BASE_FILENAME};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Main flyerpress configuration
///
/// This is the root configuration structure that maps to the TOML file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FlyerConfig {
    /// Application-level settings
    #[serde(default)]
    pub application: ApplicationConfig,

    /// Raster capture settings
    #[serde(default)]
    pub render: RenderConfig,

    /// PDF assembly settings
    #[serde(default)]
    pub pdf: PdfConfig,

    /// Export settings
    #[serde(default)]
    pub export: ExportConfig,

    /// Export font settings
    #[serde(default)]
    pub fonts: FontsConfig,

    /// Where artifacts are delivered
    #[serde(default)]
    pub destination: DestinationConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl FlyerConfig {
    /// Validates the configuration
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration values are invalid
    pub fn validate(&self) -> Result<(), String> {
        self.application.validate()?;
        self.render.validate()?;
        self.export.validate()?;
        self.fonts.validate()?;
        self.destination.validate()?;
        self.logging.validate()?;
        Ok(())
    }
}

/// Application-level configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplicationConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for ApplicationConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

impl ApplicationConfig {
    fn validate(&self) -> Result<(), String> {
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.log_level.as_str()) {
            return Err(format!(
                "Invalid log_level '{}'. Must be one of: {}",
                self.log_level,
                valid_levels.join(", ")
            ));
        }
        Ok(())
    }
}

/// Raster capture configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderConfig {
    /// Raster width in pixels
    #[serde(default = "default_target_width")]
    pub target_width: u32,

    /// Raster height in pixels
    #[serde(default = "default_target_height")]
    pub target_height: u32,

    /// JPEG quality (1-100)
    #[serde(default = "default_jpeg_quality")]
    pub jpeg_quality: u8,

    /// Opaque background, `#rrggbb`
    #[serde(default)]
    pub background: Color,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            target_width: default_target_width(),
            target_height: default_target_height(),
            jpeg_quality: default_jpeg_quality(),
            background: Color::WHITE,
        }
    }
}

impl RenderConfig {
    fn validate(&self) -> Result<(), String> {
        if self.target_width == 0 || self.target_height == 0 {
            return Err("render.target_width and render.target_height must be > 0".to_string());
        }

        if self.target_width > 20_000 || self.target_height > 20_000 {
            return Err(
                "render.target_width and render.target_height must be <= 20000".to_string(),
            );
        }

        if !(1..=100).contains(&self.jpeg_quality) {
            return Err(format!(
                "render.jpeg_quality must be between 1 and 100, got {}",
                self.jpeg_quality
            ));
        }

        Ok(())
    }
}

/// PDF assembly configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PdfConfig {
    /// Physical page format (a4, letter)
    #[serde(default)]
    pub page_size: PageFormat,

    /// Page orientation (portrait, landscape)
    #[serde(default)]
    pub orientation: Orientation,

    /// Raster placement (stretch, contain)
    #[serde(default)]
    pub placement: PdfPlacement,
}

/// Export configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportConfig {
    /// Base filename of artifacts when none is given on the command line
    #[serde(default = "default_base_filename")]
    pub base_filename: String,

    /// Pause between font readiness and the first capture
    #[serde(default = "default_settle_delay_ms")]
    pub settle_delay_ms: u64,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            base_filename: default_base_filename(),
            settle_delay_ms: default_settle_delay_ms(),
        }
    }
}

impl ExportConfig {
    fn validate(&self) -> Result<(), String> {
        if self.base_filename.trim().is_empty() {
            return Err("export.base_filename cannot be empty".to_string());
        }

        if self
            .base_filename
            .chars()
            .any(|c| matches!(c, '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|'))
        {
            return Err(format!(
                "export.base_filename '{}' contains characters not allowed in file names",
                self.base_filename
            ));
        }

        if self.settle_delay_ms > 60_000 {
            return Err("export.settle_delay_ms must be <= 60000".to_string());
        }

        Ok(())
    }
}

/// Export font configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FontsConfig {
    /// Font family forced onto all exported text
    #[serde(default)]
    pub family: Option<String>,

    /// Font files loaded before the first capture
    #[serde(default)]
    pub files: Vec<PathBuf>,

    /// Also make installed system fonts available to the rasterizer
    #[serde(default = "default_true")]
    pub load_system_fonts: bool,
}

impl Default for FontsConfig {
    fn default() -> Self {
        Self {
            family: None,
            files: Vec::new(),
            load_system_fonts: true,
        }
    }
}

impl FontsConfig {
    fn validate(&self) -> Result<(), String> {
        if let Some(family) = &self.family {
            if family.trim().is_empty() {
                return Err("fonts.family cannot be empty when set".to_string());
            }
            if family.contains(|c: char| matches!(c, '"' | ';' | '{' | '}')) {
                return Err(format!("Invalid fonts.family '{family}'"));
            }
        }
        Ok(())
    }
}

/// How the batch destination directory is chosen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DirectoryMode {
    /// Ask on the terminal; an empty answer cancels
    #[default]
    Prompt,
    /// Always write into `destination.directory`
    Fixed,
    /// No directory selection; batches are archived
    Disabled,
}

/// Artifact destination configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DestinationConfig {
    /// How batch exports pick a directory
    #[serde(default)]
    pub directory_mode: DirectoryMode,

    /// Directory used when `directory_mode = "fixed"`
    #[serde(default)]
    pub directory: Option<PathBuf>,

    /// Where downloads (single files and archives) are written
    #[serde(default = "default_downloads_dir")]
    pub downloads_dir: PathBuf,
}

impl Default for DestinationConfig {
    fn default() -> Self {
        Self {
            directory_mode: DirectoryMode::default(),
            directory: None,
            downloads_dir: default_downloads_dir(),
        }
    }
}

impl DestinationConfig {
    fn validate(&self) -> Result<(), String> {
        if self.directory_mode == DirectoryMode::Fixed && self.directory.is_none() {
            return Err(
                "destination.directory is required when directory_mode = 'fixed'".to_string(),
            );
        }

        if self.downloads_dir.as_os_str().is_empty() {
            return Err("destination.downloads_dir cannot be empty".to_string());
        }

        Ok(())
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Enable local file logging
    #[serde(default = "default_true")]
    pub local_enabled: bool,

    /// Local log directory
    #[serde(default = "default_local_path")]
    pub local_path: PathBuf,

    /// Log rotation strategy (daily, hourly, never)
    #[serde(default = "default_local_rotation")]
    pub local_rotation: String,
}

impl LoggingConfig {
    fn validate(&self) -> Result<(), String> {
        let valid_rotations = ["daily", "hourly", "never"];
        if !valid_rotations.contains(&self.local_rotation.as_str()) {
            return Err(format!(
                "Invalid logging.local_rotation '{}'. Must be one of: {}",
                self.local_rotation,
                valid_rotations.join(", ")
            ));
        }

        if self.local_enabled && self.local_path.as_os_str().is_empty() {
            return Err("logging.local_path cannot be empty".to_string());
        }

        Ok(())
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            local_enabled: true,
            local_path: default_local_path(),
            local_rotation: default_local_rotation(),
        }
    }
}

// Default value functions
fn default_log_level() -> String {
    "info".to_string()
}

fn default_true() -> bool {
    true
}

fn default_target_width() -> u32 {
    DEFAULT_TARGET_WIDTH
}

fn default_target_height() -> u32 {
    DEFAULT_TARGET_HEIGHT
}

fn default_jpeg_quality() -> u8 {
    DEFAULT_JPEG_QUALITY
}

fn default_base_filename() -> String {
    DEFAULT_BASE_FILENAME.to_string()
}

fn default_settle_delay_ms() -> u64 {
    1000
}

fn default_downloads_dir() -> PathBuf {
    PathBuf::from("./downloads")
}

fn default_local_path() -> PathBuf {
    PathBuf::from("./logs")
}

fn default_local_rotation() -> String {
    "daily".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config: FlyerConfig = toml::from_str("").unwrap();
        assert!(config.validate().is_ok());
        assert_eq!(config.render.target_width, 2480);
        assert_eq!(config.render.target_height, 3508);
        assert_eq!(config.render.jpeg_quality, 95);
        assert_eq!(config.render.background, Color::WHITE);
        assert_eq!(config.pdf.page_size, PageFormat::A4);
        assert_eq!(config.pdf.placement, PdfPlacement::Stretch);
        assert_eq!(config.export.base_filename, "encarte");
        assert_eq!(config.export.settle_delay_ms, 1000);
        assert_eq!(config.destination.directory_mode, DirectoryMode::Prompt);
        assert!(config.fonts.family.is_none());
    }

    #[test]
    fn test_application_config_validation() {
        let mut config = ApplicationConfig {
            log_level: "info".to_string(),
        };

        assert!(config.validate().is_ok());

        config.log_level = "invalid".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_render_config_validation() {
        let mut config = RenderConfig::default();
        assert!(config.validate().is_ok());

        config.jpeg_quality = 0;
        assert!(config.validate().is_err());

        config.jpeg_quality = 101;
        assert!(config.validate().is_err());

        config.jpeg_quality = 80;
        config.target_width = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_parse_sections() {
        let config: FlyerConfig = toml::from_str(
            r##"
[render]
background = "#f0f0f0"

[pdf]
page_size = "letter"
orientation = "landscape"
placement = "contain"

[fonts]
family = "Anton"
files = ["fonts/Anton-Regular.ttf"]

[destination]
directory_mode = "fixed"
directory = "./out"
"##,
        )
        .unwrap();

        assert!(config.validate().is_ok());
        assert_eq!(config.render.background.to_string(), "#f0f0f0");
        assert_eq!(config.pdf.page_size, PageFormat::Letter);
        assert_eq!(config.pdf.orientation, Orientation::Landscape);
        assert_eq!(config.pdf.placement, PdfPlacement::Contain);
        assert_eq!(config.fonts.files.len(), 1);
        assert_eq!(config.destination.directory, Some(PathBuf::from("./out")));
    }

    #[test]
    fn test_invalid_background_is_rejected() {
        let result: Result<FlyerConfig, _> = toml::from_str("[render]\nbackground = \"white\"\n");
        assert!(result.is_err());
    }

    #[test]
    fn test_fixed_mode_requires_directory() {
        let config = DestinationConfig {
            directory_mode: DirectoryMode::Fixed,
            directory: None,
            downloads_dir: default_downloads_dir(),
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_export_config_validation() {
        let mut config = ExportConfig::default();
        assert!(config.validate().is_ok());

        config.base_filename = "ofertas/semana".to_string();
        assert!(config.validate().is_err());

        config.base_filename = "   ".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_logging_config_validation() {
        let mut config = LoggingConfig::default();
        assert!(config.validate().is_ok());

        config.local_rotation = "size".to_string();
        assert!(config.validate().is_err());

        config.local_rotation = "hourly".to_string();
        assert!(config.validate().is_ok());
    }
}
