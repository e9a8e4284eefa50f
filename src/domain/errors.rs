//! Domain error types
//!
//! This module defines the error hierarchy for flyerpress.
//! All errors are domain-specific and don't expose third-party types.
//!
//! A user cancelling the directory prompt is not represented here: it is an
//! [`ExportOutcome::Cancelled`](crate::core::export::ExportOutcome) result.

use crate::domain::ids::PageNumber;
use thiserror::Error;

/// Main flyerpress error type
///
/// This is the primary error type used throughout the application.
/// It wraps specific error types and provides context for error handling.
#[derive(Debug, Error)]
pub enum FlyerError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// The input document could not be parsed or addressed
    #[error("Document error: {0}")]
    Document(String),

    /// A page could not be rasterized
    #[error("Capture of page {page} failed: {source}")]
    Capture {
        /// Page whose capture failed
        page: PageNumber,
        /// Underlying capture failure
        #[source]
        source: CaptureError,
    },

    /// PDF assembly errors
    #[error("PDF assembly error: {0}")]
    Assembly(String),

    /// Write, flush, archive or delivery errors
    #[error("Persistence error: {0}")]
    Persistence(#[from] PersistenceError),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(String),

    /// Generic errors with context
    #[error("{0}")]
    Other(String),
}

impl FlyerError {
    /// Wraps a capture failure with the page it originated from
    pub fn capture(page: PageNumber, source: CaptureError) -> Self {
        FlyerError::Capture { page, source }
    }

    /// Page number attached to the error, if any
    pub fn page(&self) -> Option<PageNumber> {
        match self {
            FlyerError::Capture { page, .. } => Some(*page),
            _ => None,
        }
    }
}

/// Capture-specific errors
///
/// Errors raised while snapshotting or rasterizing a single page.
#[derive(Debug, Error)]
pub enum CaptureError {
    /// The page has no usable natural size
    #[error("Layout not ready: {0}")]
    LayoutNotReady(String),

    /// The page could not be turned into a renderable snapshot
    #[error("Snapshot failed: {0}")]
    Snapshot(String),

    /// An embedded image could not be loaded or decoded
    #[error("Failed to decode image '{href}': {reason}")]
    ImageDecode { href: String, reason: String },

    /// The renderer rejected the snapshot
    #[error("Rasterization failed: {0}")]
    Rasterize(String),

    /// The raster could not be encoded
    #[error("Image encoding failed: {0}")]
    Encode(String),
}

/// Persistence-specific errors
///
/// Errors raised while writing artifacts to a directory, building the
/// fallback archive or handing bytes to the host download sink.
#[derive(Debug, Error)]
pub enum PersistenceError {
    /// Failed to create, write or close a file in the chosen directory
    #[error("Failed to write '{file}': {reason}")]
    DirectoryWrite { file: String, reason: String },

    /// Failed to build the batch archive
    #[error("Failed to generate archive: {0}")]
    ArchiveGeneration(String),

    /// Failed to deliver a finished artifact
    #[error("Failed to deliver '{file}': {reason}")]
    Delivery { file: String, reason: String },

    /// The directory picker failed for a reason other than cancellation
    #[error("Directory selection failed: {0}")]
    Picker(String),
}

// Conversion from std::io::Error
impl From<std::io::Error> for FlyerError {
    fn from(err: std::io::Error) -> Self {
        FlyerError::Io(err.to_string())
    }
}

// Conversion from serde_json::Error
impl From<serde_json::Error> for FlyerError {
    fn from(err: serde_json::Error) -> Self {
        FlyerError::Serialization(err.to_string())
    }
}

// Conversion from toml parse errors
impl From<toml::de::Error> for FlyerError {
    fn from(err: toml::de::Error) -> Self {
        FlyerError::Configuration(format!("TOML parse error: {err}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flyer_error_display() {
        let err = FlyerError::Configuration("Invalid config".to_string());
        assert_eq!(err.to_string(), "Configuration error: Invalid config");
    }

    #[test]
    fn test_capture_error_carries_page_number() {
        let page = PageNumber::new(3).unwrap();
        let err = FlyerError::capture(page, CaptureError::Rasterize("bad node".to_string()));

        assert_eq!(err.page(), Some(page));
        assert_eq!(
            err.to_string(),
            "Capture of page 3 failed: Rasterization failed: bad node"
        );
    }

    #[test]
    fn test_persistence_error_conversion() {
        let err: FlyerError = PersistenceError::DirectoryWrite {
            file: "flyer-2.jpg".to_string(),
            reason: "disk full".to_string(),
        }
        .into();

        assert!(matches!(err, FlyerError::Persistence(_)));
        assert!(err.to_string().contains("flyer-2.jpg"));
        assert!(err.page().is_none());
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "File not found");
        let err: FlyerError = io_err.into();
        assert!(matches!(err, FlyerError::Io(_)));
    }

    #[test]
    fn test_serde_json_error_conversion() {
        let json_err = serde_json::from_str::<serde_json::Value>("invalid json").unwrap_err();
        let err: FlyerError = json_err.into();
        assert!(matches!(err, FlyerError::Serialization(_)));
    }

    #[test]
    fn test_toml_error_conversion() {
        let toml_err = toml::from_str::<toml::Value>("invalid = toml = syntax").unwrap_err();
        let err: FlyerError = toml_err.into();
        assert!(matches!(err, FlyerError::Configuration(_)));
        assert!(err.to_string().contains("TOML parse error"));
    }

    #[test]
    fn test_errors_implement_std_error() {
        let _: &dyn std::error::Error = &FlyerError::Other("x".to_string());
        let _: &dyn std::error::Error = &CaptureError::Encode("x".to_string());
        let _: &dyn std::error::Error = &PersistenceError::Picker("x".to_string());
    }
}
