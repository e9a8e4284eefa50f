//! Logging and observability
//!
//! This module provides structured logging with support for:
//! - Human-readable console output
//! - Configurable log levels
//! - JSON-formatted local file logging with rotation
//!
//! # Example
//!
//! ```no_run
//! use flyerpress::logging::init_logging;
//! use flyerpress::config::LoggingConfig;
//!
//! let config = LoggingConfig::default();
//! let _guard = init_logging("info", &config).expect("Failed to initialize logging");
//!
//! // Use tracing macros for logging
//! tracing::info!("Application started");
//! tracing::error!(error = "Something went wrong", "Error occurred");
//! ```

pub mod structured;

// Re-export commonly used items
pub use structured::{init_logging, parse_log_level, LoggingGuard};

/// Log the start of an export job
///
/// # Example
///
/// ```no_run
/// use flyerpress::log_export_start;
/// use flyerpress::domain::{ExportFormat, ExportKind, ExportScope, JobId};
///
/// let job_id = JobId::generate();
/// let kind = ExportKind::new(ExportFormat::Image, ExportScope::Batch);
/// log_export_start!(&job_id, &kind, 3);
/// ```
#[macro_export]
macro_rules! log_export_start {
    ($job_id:expr, $kind:expr, $pages:expr) => {
        tracing::info!(
            job_id = %$job_id,
            kind = %$kind,
            pages = $pages,
            "Starting export"
        );
    };
}

/// Log the completion of an export job
///
/// # Example
///
/// ```no_run
/// use flyerpress::log_export_complete;
/// use std::time::Duration;
///
/// let artifacts = 3;
/// let duration = Duration::from_secs(10);
/// log_export_complete!(artifacts, duration);
/// ```
#[macro_export]
macro_rules! log_export_complete {
    ($count:expr, $duration:expr) => {
        tracing::info!(
            artifacts = $count,
            duration_ms = $duration.as_millis(),
            "Export completed"
        );
    };
}

/// Log an error with context
///
/// # Example
///
/// ```no_run
/// use flyerpress::log_error_with_context;
/// use flyerpress::domain::FlyerError;
///
/// let error = FlyerError::Configuration("Invalid config".to_string());
/// log_error_with_context!(&error, "Failed to load configuration");
/// ```
#[macro_export]
macro_rules! log_error_with_context {
    ($error:expr, $context:expr) => {
        tracing::error!(
            error = %$error,
            context = $context,
            "Error occurred"
        );
    };
}

/// Log progress through the pages of a job
///
/// # Example
///
/// ```no_run
/// use flyerpress::log_page_progress;
///
/// log_page_progress!(2, 5, "flyer-2.jpg");
/// ```
#[macro_export]
macro_rules! log_page_progress {
    ($current:expr, $total:expr, $artifact:expr) => {
        tracing::debug!(
            current = $current,
            total = $total,
            progress_pct = ($current as f64 / $total as f64 * 100.0),
            artifact = %$artifact,
            "Page written"
        );
    };
}

#[cfg(test)]
mod tests {
    use crate::domain::{ExportFormat, ExportKind, ExportScope, FlyerError, JobId};
    use std::time::Duration;

    #[test]
    fn test_macros_expand() {
        let job_id = JobId::generate();
        let kind = ExportKind::new(ExportFormat::Pdf, ExportScope::Single);
        log_export_start!(&job_id, &kind, 1);
        log_export_complete!(1, Duration::from_millis(5));
        log_page_progress!(1, 2, "flyer-1.pdf");
        log_error_with_context!(&FlyerError::Other("x".to_string()), "test");
    }
}
