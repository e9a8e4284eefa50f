//! Configuration management for flyerpress.
//!
//! This module provides TOML-based configuration loading, parsing, and validation.
//!
//! # Overview
//!
//! flyerpress uses TOML configuration files with support for:
//! - Environment variable substitution (`${VAR_NAME}`)
//! - `FLYERPRESS_<SECTION>_<KEY>` environment overrides
//! - Default values for every setting
//! - Validation of every section
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use flyerpress::config::load_config;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = load_config("flyerpress.toml")?;
//!
//! println!("Target: {}x{}", config.render.target_width, config.render.target_height);
//! println!("Downloads: {}", config.destination.downloads_dir.display());
//! # Ok(())
//! # }
//! ```
//!
//! # Configuration Structure
//!
//! - [`ApplicationConfig`] - Log level
//! - [`RenderConfig`] - Raster target, JPEG quality, background
//! - [`PdfConfig`] - Page size, orientation, placement
//! - [`ExportConfig`] - Base filename and settle delay
//! - [`FontsConfig`] - Export font family and files
//! - [`DestinationConfig`] - Directory selection and downloads
//! - [`LoggingConfig`] - Logging configuration
//!
//! # Example Configuration
//!
//! ```toml
//! [application]
//! log_level = "info"
//!
//! [render]
//! target_width = 2480
//! target_height = 3508
//! jpeg_quality = 95
//!
//! [pdf]
//! page_size = "a4"
//! placement = "stretch"
//!
//! [fonts]
//! family = "Anton"
//! files = ["${FLYER_FONT_DIR}/Anton-Regular.ttf"]
//!
//! [destination]
//! directory_mode = "prompt"
//! downloads_dir = "./downloads"
//! ```

pub mod loader;
pub mod schema;

// Re-export commonly used types
pub use loader::{load_config, load_config_or_default};
pub use schema::{
    ApplicationConfig, DestinationConfig, DirectoryMode, ExportConfig, FlyerConfig, FontsConfig,
    LoggingConfig, PdfConfig, RenderConfig,
};
