//! Host capability abstraction
//!
//! The export pipeline talks to its environment only through the traits in
//! [`traits`]. [`HostCapabilities`] bundles one implementation of each, and
//! [`factory::create_host`] builds the local filesystem host from
//! configuration.

pub mod factory;
pub mod traits;

pub use factory::create_host;
pub use traits::{
    DirectoryHandle, DirectoryPicker, DirectorySelection, Downloader, FileSink, FontReadiness,
    Rasterizer,
};

use std::fmt;
use std::sync::Arc;

/// Capabilities injected into the exporter by its caller
#[derive(Clone)]
pub struct HostCapabilities {
    /// Directory selection
    pub picker: Arc<dyn DirectoryPicker>,
    /// Single-file download trigger
    pub downloader: Arc<dyn Downloader>,
    /// Export font readiness
    pub fonts: Arc<dyn FontReadiness>,
    /// Snapshot rasterization
    pub rasterizer: Arc<dyn Rasterizer>,
}

impl HostCapabilities {
    pub fn new(
        picker: Arc<dyn DirectoryPicker>,
        downloader: Arc<dyn Downloader>,
        fonts: Arc<dyn FontReadiness>,
        rasterizer: Arc<dyn Rasterizer>,
    ) -> Self {
        Self {
            picker,
            downloader,
            fonts,
            rasterizer,
        }
    }
}

impl fmt::Debug for HostCapabilities {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HostCapabilities")
            .field("directory_supported", &self.picker.is_supported())
            .finish_non_exhaustive()
    }
}
