//! Export orchestration and reporting
//!
//! This module provides the public export operations of flyerpress:
//! - Single-file image and PDF exports
//! - Batch exports into a directory or an archive
//! - Summary and reporting

pub mod coordinator;
pub mod summary;

pub use coordinator::{ExportSettings, FlyerExporter, DEFAULT_SETTLE_DELAY};
pub use summary::{ExportOutcome, ExportSummary};
