// Flyerpress - Print-ready flyer export
// Copyright (c) 2025 Flyerpress Contributors
// Licensed under the MIT License

//! # flyerpress - print-ready flyer export
//!
//! flyerpress turns a mounted flyer document (an SVG tree of product cards,
//! prices and images) into print-ready artifacts: fixed-resolution JPEG
//! rasters, or PDFs with one physical page per logical page.
//!
//! ## Overview
//!
//! This library provides the core functionality for:
//! - **Discovering** logical pages under a render root
//! - **Capturing** each page without side effects on the live document
//! - **Assembling** captured rasters into PDF
//! - **Persisting** multi-page exports into a chosen directory, or one archive
//!
//! ## Architecture
//!
//! flyerpress follows a layered architecture:
//!
//! - [`cli`] - Command-line interface and argument parsing
//! - [`core`] - Business logic (discovery, capture, assembly, persistence, export)
//! - [`adapters`] - Host capabilities (filesystem, `resvg` rasterizer)
//! - [`domain`] - Core domain types and models
//! - [`config`] - Configuration management
//! - [`logging`] - Structured logging and observability
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use flyerpress::adapters::host::create_host;
//! use flyerpress::config::FlyerConfig;
//! use flyerpress::core::export::{ExportSettings, FlyerExporter};
//! use flyerpress::domain::LiveDocument;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = FlyerConfig::default();
//!     let document = LiveDocument::from_file("flyer.svg").await?;
//!
//!     let exporter = FlyerExporter::new(ExportSettings::from_config(&config), create_host(&config)?);
//!     let summary = exporter.export_as_pdf(document.root(), "encarte").await?;
//!
//!     println!("Saved {:?}", summary.artifact_names());
//!     Ok(())
//! }
//! ```
//!
//! ## Batch Exports
//!
//! Batch exports write one file per page. When the host offers directory
//! selection the user picks a directory and pages are written one after
//! another; otherwise all pages are stored in one `<base>-pages.zip`
//! download. Dismissing the directory prompt is not an error:
//!
//! ```rust,no_run
//! # use flyerpress::core::export::FlyerExporter;
//! # use flyerpress::domain::LiveDocument;
//! # async fn example(exporter: &FlyerExporter, document: &LiveDocument) -> flyerpress::domain::Result<()> {
//! let summary = exporter.export_images_batch(document.root(), "encarte").await?;
//! if summary.is_cancelled() {
//!     println!("Nothing saved");
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Error Handling
//!
//! flyerpress uses the [`domain::FlyerError`] type for all errors. Capture
//! failures carry the page number they happened on.
//!
//! ## Logging
//!
//! flyerpress uses structured logging with the `tracing` crate; see
//! [`logging::init_logging`].

pub mod adapters;
pub mod cli;
pub mod config;
pub mod core;
pub mod domain;
pub mod logging;
