//! Validate config command implementation
//!
//! This module implements the `validate-config` command for validating
//! the flyerpress configuration file.

use crate::config::load_config;
use clap::Args;

/// Arguments for the validate-config command
#[derive(Args, Debug)]
pub struct ValidateArgs {}

impl ValidateArgs {
    /// Execute the validate-config command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        tracing::info!(config_path = %config_path, "Validating configuration");

        println!("🔍 Validating configuration file: {config_path}");
        println!();

        // Loading validates every section
        let config = match load_config(config_path) {
            Ok(c) => c,
            Err(e) => {
                println!("❌ Configuration is invalid");
                println!("   Error: {e}");
                return Ok(2); // Configuration error exit code
            }
        };

        println!("✅ Configuration is valid");
        println!();
        println!("Configuration Summary:");
        println!("  Log Level: {}", config.application.log_level);
        println!(
            "  Raster Target: {}x{} px, JPEG quality {}, background {}",
            config.render.target_width,
            config.render.target_height,
            config.render.jpeg_quality,
            config.render.background
        );
        println!(
            "  PDF Page: {:?} {:?}, placement {:?}",
            config.pdf.page_size, config.pdf.orientation, config.pdf.placement
        );
        println!("  Base Filename: {}", config.export.base_filename);
        println!("  Settle Delay: {} ms", config.export.settle_delay_ms);
        println!(
            "  Export Font: {}",
            config.fonts.family.as_deref().unwrap_or("(document fonts)")
        );
        println!("  Font Files: {}", config.fonts.files.len());
        println!(
            "  Directory Mode: {:?}",
            config.destination.directory_mode
        );
        if let Some(directory) = &config.destination.directory {
            println!("  Directory: {}", directory.display());
        }
        println!(
            "  Downloads: {}",
            config.destination.downloads_dir.display()
        );
        println!();
        Ok(0)
    }
}
