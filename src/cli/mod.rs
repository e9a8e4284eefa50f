//! CLI interface and argument parsing
//!
//! This module provides the command-line interface for flyerpress using clap.

pub mod commands;

use crate::config::{load_config, load_config_or_default, FlyerConfig};
use crate::domain::Result;
use clap::{Parser, Subcommand};
use std::path::Path;

/// Configuration file used when `--config` is not given
pub const DEFAULT_CONFIG_FILE: &str = "flyerpress.toml";

/// flyerpress - print-ready flyer export
#[derive(Parser, Debug)]
#[command(name = "flyerpress")]
#[command(version, about, long_about = None)]
#[command(author = "Flyerpress Contributors")]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = DEFAULT_CONFIG_FILE, env = "FLYERPRESS_CONFIG")]
    pub config: String,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, env = "FLYERPRESS_LOG_LEVEL")]
    pub log_level: Option<String>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Export a flyer document to JPEG images or PDF
    Export(commands::export::ExportArgs),

    /// List the logical pages of a flyer document
    Pages(commands::pages::PagesArgs),

    /// Validate configuration file
    ValidateConfig(commands::validate::ValidateArgs),

    /// Initialize a new configuration file
    Init(commands::init::InitArgs),
}

/// Loads the CLI configuration
///
/// A missing default configuration file means built-in defaults; any other
/// missing file is an error.
///
/// # Errors
///
/// Returns an error if the configuration cannot be loaded or is invalid
pub fn load_cli_config(config_path: &str) -> Result<FlyerConfig> {
    let path = Path::new(config_path);
    if config_path == DEFAULT_CONFIG_FILE && !path.exists() {
        tracing::debug!("No configuration file found, using defaults");
        return load_config_or_default(None);
    }
    load_config(path)
}
