//! Init command implementation
//!
//! This module implements the `init` command for generating a sample
//! configuration file.

use clap::Args;
use std::fs;
use std::path::Path;

/// Arguments for the init command
#[derive(Args, Debug)]
pub struct InitArgs {
    /// Path where to create the configuration file
    #[arg(short, long, default_value = "flyerpress.toml")]
    pub output: String,

    /// Include example values and comments
    #[arg(long)]
    pub with_examples: bool,

    /// Overwrite existing file
    #[arg(long)]
    pub force: bool,
}

impl InitArgs {
    /// Execute the init command
    pub async fn execute(&self) -> anyhow::Result<i32> {
        tracing::info!(output = %self.output, "Initializing configuration file");

        println!("📝 Initializing flyerpress configuration");
        println!();

        if Path::new(&self.output).exists() && !self.force {
            println!("❌ Configuration file already exists: {}", self.output);
            println!("   Use --force to overwrite");
            return Ok(2); // Configuration error exit code
        }

        let config_content = if self.with_examples {
            Self::generate_config_with_examples()
        } else {
            Self::generate_minimal_config()
        };

        match fs::write(&self.output, config_content) {
            Ok(_) => {
                println!("✅ Configuration file created: {}", self.output);
                println!();
                println!("Next steps:");
                println!("  1. Edit {} with your settings", self.output);
                println!("  2. Point [fonts] files at the export font, if any");
                println!("  3. Validate configuration: flyerpress validate-config");
                println!("  4. Run export: flyerpress export flyer.svg --batch");
                println!();
                Ok(0)
            }
            Err(e) => {
                println!("❌ Failed to write configuration file");
                println!("   Error: {}", e);
                Ok(5)
            }
        }
    }

    /// Generate minimal configuration
    fn generate_minimal_config() -> String {
        r#"# flyerpress Configuration File

[application]
log_level = "info"

[render]
target_width = 2480
target_height = 3508
jpeg_quality = 95

[pdf]
page_size = "a4"
orientation = "portrait"
placement = "stretch"

[export]
base_filename = "encarte"

[destination]
directory_mode = "prompt"
downloads_dir = "./downloads"

[logging]
local_enabled = true
local_path = "./logs"
"#
        .to_string()
    }

    /// Generate configuration with examples and comments
    fn generate_config_with_examples() -> String {
        r##"# flyerpress Configuration File
# Print-ready export of flyer documents
#
# Values of the form ${VAR} are replaced with environment variables.
# Any key can also be overridden with FLYERPRESS_<SECTION>_<KEY>,
# e.g. FLYERPRESS_RENDER_JPEG_QUALITY=90

# ============================================================================
# Application Configuration
# ============================================================================
[application]
# Log level: trace, debug, info, warn, error
log_level = "info"

# ============================================================================
# Raster Capture Configuration
# ============================================================================
[render]
# Fixed raster size in pixels (A4 at 300 dpi)
target_width = 2480
target_height = 3508

# JPEG quality (1-100)
jpeg_quality = 95

# Opaque background behind transparent content
background = "#ffffff"

# ============================================================================
# PDF Configuration
# ============================================================================
[pdf]
# Physical page format: a4 | letter
page_size = "a4"

# Orientation: portrait | landscape
orientation = "portrait"

# Raster placement: stretch (fill the page) | contain (fit, centered)
placement = "stretch"

# ============================================================================
# Export Configuration
# ============================================================================
[export]
# Base filename when --base is not given
base_filename = "encarte"

# Pause between font readiness and the first capture, in milliseconds
settle_delay_ms = 1000

# ============================================================================
# Font Configuration
# ============================================================================
[fonts]
# Font family forced onto all exported text
# family = "Anton"

# Font files loaded before the first capture
# files = ["${FLYER_FONT_DIR}/Anton-Regular.ttf"]

# Also make installed system fonts available
load_system_fonts = true

# ============================================================================
# Destination Configuration
# ============================================================================
[destination]
# Batch directory selection: prompt | fixed | disabled
# With "disabled", multi-page batches are saved as one archive
directory_mode = "prompt"

# Directory used with directory_mode = "fixed"
# directory = "./out"

# Where single files and archives are saved
downloads_dir = "./downloads"

# ============================================================================
# Logging Configuration
# ============================================================================
[logging]
# Enable local JSON file logging
local_enabled = true

# Log directory
local_path = "./logs"

# Log rotation: daily | hourly | never
local_rotation = "daily"
"##
        .to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FlyerConfig;

    #[test]
    fn test_init_args_defaults() {
        let args = InitArgs {
            output: "flyerpress.toml".to_string(),
            with_examples: false,
            force: false,
        };

        assert_eq!(args.output, "flyerpress.toml");
        assert!(!args.with_examples);
        assert!(!args.force);
    }

    #[test]
    fn test_generate_minimal_config() {
        let content = InitArgs::generate_minimal_config();
        assert!(content.contains("[render]"));

        let config: FlyerConfig = toml::from_str(&content).unwrap();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_generate_config_with_examples() {
        let content = InitArgs::generate_config_with_examples();
        assert!(content.contains("# flyerpress Configuration File"));

        let config: FlyerConfig = toml::from_str(&content).unwrap();
        assert!(config.validate().is_ok());
        assert_eq!(config.export.settle_delay_ms, 1000);
    }

    #[tokio::test]
    async fn test_init_refuses_to_overwrite() {
        let temp = tempfile::TempDir::new().unwrap();
        let output = temp.path().join("flyerpress.toml");
        std::fs::write(&output, "").unwrap();

        let args = InitArgs {
            output: output.to_string_lossy().into_owned(),
            with_examples: false,
            force: false,
        };
        assert_eq!(args.execute().await.unwrap(), 2);

        let forced = InitArgs { force: true, ..args };
        assert_eq!(forced.execute().await.unwrap(), 0);
        assert!(std::fs::read_to_string(&output).unwrap().contains("[render]"));
    }
}
