//! Host capability traits
//!
//! This module defines the capabilities the export pipeline consumes from
//! its host environment. Every capability is injected by the caller, so the
//! pipeline never probes ambient state on its own.

use crate::core::capture::fonts::FontAsset;
use crate::core::capture::{PageSnapshot, Raster, RenderPlan};
use crate::domain::errors::CaptureError;
use crate::domain::Result;
use async_trait::async_trait;
use std::sync::Arc;

/// Outcome of a directory prompt
pub enum DirectorySelection {
    /// The user picked a directory
    Chosen(Box<dyn DirectoryHandle>),
    /// The user dismissed the prompt
    Cancelled,
}

impl std::fmt::Debug for DirectorySelection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DirectorySelection::Chosen(handle) => {
                f.debug_tuple("Chosen").field(&handle.describe()).finish()
            }
            DirectorySelection::Cancelled => f.write_str("Cancelled"),
        }
    }
}

/// Directory-selection capability
///
/// Absent on some hosts; callers probe [`DirectoryPicker::is_supported`]
/// before prompting.
#[async_trait]
pub trait DirectoryPicker: Send + Sync {
    /// Whether the host can let the user choose a directory
    fn is_supported(&self) -> bool;

    /// Asks the user for a destination directory
    ///
    /// # Errors
    ///
    /// Returns an error when the prompt itself fails. Dismissing the prompt
    /// is [`DirectorySelection::Cancelled`], not an error.
    async fn pick_directory(&self) -> Result<DirectorySelection>;
}

/// A writable directory chosen by the user
#[async_trait]
pub trait DirectoryHandle: Send + Sync {
    /// Human-readable location, for logs
    fn describe(&self) -> String;

    /// Creates (or truncates) a file in the directory
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be created.
    async fn create_file(&self, name: &str) -> Result<Box<dyn FileSink>>;
}

/// Incremental writer for one file
#[async_trait]
pub trait FileSink: Send {
    /// Appends bytes to the file
    async fn write(&mut self, bytes: &[u8]) -> Result<()>;

    /// Flushes and closes the file
    ///
    /// A file is only complete once `close` has returned successfully.
    async fn close(self: Box<Self>) -> Result<()>;
}

/// Single-file download trigger
#[async_trait]
pub trait Downloader: Send + Sync {
    /// Hands a finished artifact to the user
    async fn deliver(&self, filename: &str, bytes: Vec<u8>) -> Result<()>;
}

/// Font-readiness signal
#[async_trait]
pub trait FontReadiness: Send + Sync {
    /// Resolves once export fonts are loaded, yielding their assets
    ///
    /// # Errors
    ///
    /// Returns an error if a configured font cannot be loaded.
    async fn ready(&self) -> Result<Arc<[FontAsset]>>;
}

/// Snapshot-to-pixels capability
#[async_trait]
pub trait Rasterizer: Send + Sync {
    /// Renders a snapshot into an RGBA raster of exactly `plan.width` ×
    /// `plan.height` pixels, scaled by `plan.scale` from the top-left corner
    /// over `plan.background`.
    async fn rasterize(
        &self,
        snapshot: Arc<PageSnapshot>,
        plan: RenderPlan,
    ) -> std::result::Result<Raster, CaptureError>;
}
