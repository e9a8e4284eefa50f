//! Core business logic for flyerpress.
//!
//! # Modules
//!
//! - [`discovery`] - Logical page discovery
//! - [`capture`] - Side-effect-free raster capture of one page
//! - [`assembly`] - PDF assembly from captured rasters
//! - [`persistence`] - Batch persistence into a directory or an archive
//! - [`export`] - Export orchestration and reporting
//!
//! # Export Workflow
//!
//! 1. **Readiness**: Wait for export fonts, then the settle delay
//! 2. **Discover**: Find the logical pages under the render root
//! 3. **Capture**: Rasterize each page in order, one at a time
//! 4. **Assemble** (PDF only): Wrap rasters onto physical pages
//! 5. **Persist**: Download, write to a directory, or archive
//! 6. **Report**: Produce an export summary
//!
//! # Example
//!
//! ```rust,no_run
//! use flyerpress::adapters::host::create_host;
//! use flyerpress::config::load_config;
//! use flyerpress::core::export::{ExportSettings, FlyerExporter};
//! use flyerpress::domain::LiveDocument;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = load_config("flyerpress.toml")?;
//! let document = LiveDocument::from_file("flyer.svg").await?;
//!
//! let exporter = FlyerExporter::new(ExportSettings::from_config(&config), create_host(&config)?);
//! let summary = exporter.export_images_batch(document.root(), "encarte").await?;
//!
//! println!("Artifacts: {:?}", summary.artifact_names());
//! # Ok(())
//! # }
//! ```

pub mod assembly;
pub mod capture;
pub mod discovery;
pub mod export;
pub mod persistence;
