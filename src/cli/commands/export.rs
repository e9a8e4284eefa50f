//! Export command implementation
//!
//! This module implements the `export` command for turning a flyer document
//! into print-ready JPEG images or PDF.

use crate::adapters::host::create_host;
use crate::cli::load_cli_config;
use crate::config::DirectoryMode;
use crate::core::export::{ExportSettings, ExportSummary, FlyerExporter};
use crate::domain::errors::FlyerError;
use crate::domain::ids::PageNumber;
use crate::domain::job::{derive_base_filename, ExportFormat};
use crate::domain::LiveDocument;
use clap::Args;
use std::path::PathBuf;

/// Arguments for the export command
#[derive(Args, Debug)]
pub struct ExportArgs {
    /// Flyer document (SVG)
    pub input: PathBuf,

    /// Output format (image or pdf)
    #[arg(short, long, default_value = "image")]
    pub format: ExportFormat,

    /// Save one file per page into a directory, or an archive
    #[arg(long, conflicts_with = "page")]
    pub batch: bool,

    /// Export only this page (1-based)
    #[arg(long)]
    pub page: Option<PageNumber>,

    /// Export the subtree with this element id instead of the whole document
    #[arg(long, value_name = "ID")]
    pub root: Option<String>,

    /// Base filename of the artifacts
    #[arg(long)]
    pub base: Option<String>,

    /// Write batch pages into this directory without prompting
    #[arg(long, value_name = "DIR", conflicts_with = "archive")]
    pub output_dir: Option<PathBuf>,

    /// Always save batches as a single archive
    #[arg(long)]
    pub archive: bool,

    /// Directory receiving downloads
    #[arg(long, value_name = "DIR")]
    pub downloads_dir: Option<PathBuf>,

    /// Override the settle delay in milliseconds
    #[arg(long, value_name = "MS")]
    pub settle_delay_ms: Option<u64>,

    /// Write the export summary as JSON to this file
    #[arg(long, value_name = "FILE")]
    pub summary_json: Option<PathBuf>,
}

impl ExportArgs {
    /// Execute the export command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        tracing::info!(input = %self.input.display(), "Starting export command");

        let mut config = match load_cli_config(config_path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("Configuration error: {e}");
                return Ok(2); // Configuration error exit code
            }
        };

        // Apply CLI overrides
        if let Some(dir) = &self.output_dir {
            tracing::info!(directory = %dir.display(), "Writing batch pages to fixed directory");
            config.destination.directory_mode = DirectoryMode::Fixed;
            config.destination.directory = Some(dir.clone());
        }
        if self.archive {
            tracing::info!("Directory selection disabled from CLI");
            config.destination.directory_mode = DirectoryMode::Disabled;
        }
        if let Some(dir) = &self.downloads_dir {
            config.destination.downloads_dir = dir.clone();
        }
        if let Some(delay) = self.settle_delay_ms {
            config.export.settle_delay_ms = delay;
        }

        if let Err(e) = config.validate() {
            tracing::error!(error = %e, "Configuration validation failed");
            eprintln!("Configuration validation failed: {e}");
            return Ok(2);
        }

        let base = self
            .base
            .as_deref()
            .map(derive_base_filename)
            .unwrap_or_else(|| config.export.base_filename.clone());

        let document = match LiveDocument::from_file(&self.input).await {
            Ok(document) => document,
            Err(e) => {
                tracing::error!(error = %e, "Failed to load document");
                eprintln!("Failed to load document: {e}");
                return Ok(4); // Document error exit code
            }
        };
        let root = match &self.root {
            Some(id) => match document.select(id) {
                Ok(root) => root,
                Err(e) => {
                    eprintln!("{e}");
                    return Ok(4);
                }
            },
            None => document.root(),
        };

        let host = match create_host(&config) {
            Ok(host) => host,
            Err(e) => {
                eprintln!("Configuration error: {e}");
                return Ok(2);
            }
        };
        let exporter = FlyerExporter::new(ExportSettings::from_config(&config), host);

        println!("🚀 Exporting {} as {}...", self.input.display(), self.format);

        let result = match (self.page, self.batch, self.format) {
            (Some(page), _, format) => exporter.export_page(root, page, format, &base).await,
            (None, false, ExportFormat::Image) => exporter.export_as_image(root, &base).await,
            (None, false, ExportFormat::Pdf) => exporter.export_as_pdf(root, &base).await,
            (None, true, ExportFormat::Image) => exporter.export_images_batch(root, &base).await,
            (None, true, ExportFormat::Pdf) => exporter.export_pdfs_batch(root, &base).await,
        };

        let summary = match result {
            Ok(summary) => summary,
            Err(e @ FlyerError::Document(_)) => {
                eprintln!("Export failed: {e}");
                return Ok(4);
            }
            Err(e @ FlyerError::Configuration(_)) => {
                eprintln!("Export failed: {e}");
                return Ok(2);
            }
            Err(e) => {
                eprintln!("Export failed: {e}");
                return Ok(5); // Export failure exit code
            }
        };

        print_summary(&summary, config.destination.downloads_dir.display());

        if let Some(path) = &self.summary_json {
            let json = serde_json::to_string_pretty(&summary)?;
            tokio::fs::write(path, json).await?;
            tracing::info!(path = %path.display(), "Export summary written");
        }

        Ok(0)
    }
}

fn print_summary(summary: &ExportSummary, downloads: impl std::fmt::Display) {
    println!();
    if summary.is_cancelled() {
        println!("⏹️  Export cancelled, nothing was saved.");
        return;
    }

    println!("📊 Export Summary:");
    println!("  Kind: {}", summary.kind);
    println!("  Pages: {}", summary.pages);
    if let Some(strategy) = summary.strategy {
        println!("  Destination: {strategy}");
    }
    println!("  Downloads: {downloads}");
    println!("  Duration: {:.2}s", summary.duration.as_secs_f64());
    for artifact in &summary.artifacts {
        println!(
            "  - {} ({} bytes) -> {}",
            artifact.name, artifact.size_bytes, artifact.location
        );
    }
    println!();
    println!("✅ Export completed successfully!");
}
