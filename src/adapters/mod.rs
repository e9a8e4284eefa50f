//! Host environment integrations for flyerpress.
//!
//! - [`host`] - Capability traits consumed by the export pipeline, and the
//!   factory that wires them
//! - [`filesystem`] - Directory selection, file sinks and downloads on the
//!   local filesystem
//! - [`rasterizer`] - SVG rasterization with `resvg`
//!
//! # Design Pattern
//!
//! Adapters follow the **Adapter Pattern** to isolate the host environment
//! and enable testing with mock implementations: the exporter only sees
//! `Arc<dyn Trait>` capabilities.
//!
//! ```rust,no_run
//! use flyerpress::adapters::filesystem::{FsDownloader, UnsupportedDirectoryPicker};
//! use flyerpress::adapters::host::HostCapabilities;
//! use flyerpress::adapters::rasterizer::ResvgRasterizer;
//! use flyerpress::core::capture::FontLibrary;
//! use std::sync::Arc;
//!
//! let host = HostCapabilities::new(
//!     Arc::new(UnsupportedDirectoryPicker),
//!     Arc::new(FsDownloader::new("./downloads")),
//!     Arc::new(FontLibrary::empty()),
//!     Arc::new(ResvgRasterizer::new(true)),
//! );
//! ```

pub mod filesystem;
pub mod host;
pub mod rasterizer;
