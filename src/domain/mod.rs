//! Domain models and types for flyerpress.
//!
//! This module contains the core domain models and types of the export
//! pipeline.
//!
//! # Overview
//!
//! The domain layer provides:
//! - **The document tree** ([`LiveDocument`], [`Node`], [`RenderRoot`])
//! - **Export job types** ([`ExportJob`], [`ExportKind`], [`DestinationStrategy`])
//! - **Strongly-typed identifiers** ([`PageNumber`], [`JobId`])
//! - **Error types** ([`FlyerError`], [`CaptureError`], [`PersistenceError`])
//! - **Result type alias** ([`Result`])
//!
//! # Documents
//!
//! A flyer is SVG markup whose pages carry the `flyer-page` marker:
//!
//! ```rust
//! use flyerpress::domain::LiveDocument;
//!
//! # fn example() -> flyerpress::domain::Result<()> {
//! let document = LiveDocument::parse(
//!     r#"<svg width="794" height="1123"><svg class="flyer-page" width="794" height="1123"/></svg>"#,
//! )?;
//! assert!(document.root().is_document_root());
//! # Ok(())
//! # }
//! ```
//!
//! # Export kinds
//!
//! Format and scope are crossed into one tagged value and dispatched by
//! exhaustive matching:
//!
//! ```rust
//! use flyerpress::domain::{ExportFormat, ExportKind, ExportScope};
//!
//! let kind = ExportKind::new(ExportFormat::Pdf, ExportScope::Batch);
//! let label = match (kind.format, kind.scope) {
//!     (ExportFormat::Image, ExportScope::Single) => "images",
//!     (ExportFormat::Image, ExportScope::Batch) => "image batch",
//!     (ExportFormat::Pdf, ExportScope::Single) => "pdf",
//!     (ExportFormat::Pdf, ExportScope::Batch) => "pdf batch",
//! };
//! assert_eq!(label, "pdf batch");
//! ```

pub mod document;
pub mod errors;
pub mod ids;
pub mod job;
pub mod result;

// Re-export commonly used types for convenience
pub use document::{LiveDocument, Node, RenderRoot, ScrollPosition};
pub use errors::{CaptureError, FlyerError, PersistenceError};
pub use ids::{JobId, PageNumber};
pub use job::{
    derive_base_filename, DestinationStrategy, ExportFormat, ExportJob, ExportKind, ExportScope,
    Orientation, PageFormat, PageSize, PdfPlacement,
};
pub use result::Result;
