//! Export summary and reporting
//!
//! This module defines structures for tracking and reporting export results.

use crate::core::persistence::ArtifactRecord;
use crate::domain::ids::JobId;
use crate::domain::job::{DestinationStrategy, ExportJob, ExportKind};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;
use std::time::Duration;

/// How an export job ended, when it did not fail
///
/// A dismissed directory prompt is a distinct outcome rather than an error,
/// so callers can skip failure reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportOutcome {
    /// All artifacts were delivered
    Saved,
    /// The user cancelled directory selection; nothing was written
    Cancelled,
}

impl fmt::Display for ExportOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExportOutcome::Saved => write!(f, "saved"),
            ExportOutcome::Cancelled => write!(f, "cancelled"),
        }
    }
}

/// Summary of an export job
#[derive(Debug, Clone, Serialize)]
pub struct ExportSummary {
    /// Job identifier
    pub job_id: JobId,

    /// Format and scope
    pub kind: ExportKind,

    /// Where the artifacts went; `None` when cancelled before any write
    pub strategy: Option<DestinationStrategy>,

    /// Terminal outcome
    pub outcome: ExportOutcome,

    /// Number of logical pages discovered
    pub pages: usize,

    /// Delivered artifacts, in delivery order
    pub artifacts: Vec<ArtifactRecord>,

    /// When the job started
    pub started_at: DateTime<Utc>,

    /// Duration of the job
    #[serde(serialize_with = "serialize_duration_ms", rename = "duration_ms")]
    pub duration: Duration,
}

fn serialize_duration_ms<S: serde::Serializer>(
    duration: &Duration,
    serializer: S,
) -> std::result::Result<S::Ok, S::Error> {
    serializer.serialize_u64(duration.as_millis() as u64)
}

impl ExportSummary {
    /// Create a summary for a job that saved its artifacts
    pub fn saved(
        job: &ExportJob,
        pages: usize,
        strategy: DestinationStrategy,
        artifacts: Vec<ArtifactRecord>,
    ) -> Self {
        Self {
            job_id: job.id,
            kind: job.kind,
            strategy: Some(strategy),
            outcome: ExportOutcome::Saved,
            pages,
            artifacts,
            started_at: Utc::now(),
            duration: Duration::from_secs(0),
        }
    }

    /// Create a summary for a job the user cancelled
    pub fn cancelled(job: &ExportJob, pages: usize) -> Self {
        Self {
            job_id: job.id,
            kind: job.kind,
            strategy: None,
            outcome: ExportOutcome::Cancelled,
            pages,
            artifacts: Vec::new(),
            started_at: Utc::now(),
            duration: Duration::from_secs(0),
        }
    }

    /// Set the start time
    pub fn with_started_at(mut self, started_at: DateTime<Utc>) -> Self {
        self.started_at = started_at;
        self
    }

    /// Set the duration
    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.duration = duration;
        self
    }

    /// Whether the user cancelled the job
    pub fn is_cancelled(&self) -> bool {
        self.outcome == ExportOutcome::Cancelled
    }

    /// Names of the delivered artifacts
    pub fn artifact_names(&self) -> Vec<&str> {
        self.artifacts.iter().map(|a| a.name.as_str()).collect()
    }

    /// Total size of the delivered artifacts
    pub fn total_bytes(&self) -> usize {
        self.artifacts.iter().map(|a| a.size_bytes).sum()
    }

    /// Log the summary
    pub fn log_summary(&self) {
        tracing::info!(
            job_id = %self.job_id,
            kind = %self.kind,
            outcome = %self.outcome,
            strategy = ?self.strategy,
            pages = self.pages,
            artifacts = self.artifacts.len(),
            total_bytes = self.total_bytes(),
            duration_ms = self.duration.as_millis() as u64,
            "Export finished"
        );

        for artifact in &self.artifacts {
            tracing::debug!(
                name = %artifact.name,
                location = %artifact.location,
                size_bytes = artifact.size_bytes,
                sha256 = %artifact.sha256,
                "Artifact"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::job::{ExportFormat, ExportScope, PageSize};

    fn job() -> ExportJob {
        ExportJob::new(
            ExportKind::new(ExportFormat::Image, ExportScope::Batch),
            "flyer",
            PageSize::A4_PORTRAIT,
        )
    }

    #[test]
    fn test_saved_summary() {
        let job = job();
        let summary = ExportSummary::saved(
            &job,
            2,
            DestinationStrategy::DirectDirectoryWrite,
            vec![
                ArtifactRecord::new("flyer-1.jpg", "/out", b"12345"),
                ArtifactRecord::new("flyer-2.jpg", "/out", b"678"),
            ],
        )
        .with_duration(Duration::from_millis(1500));

        assert_eq!(summary.job_id, job.id);
        assert!(!summary.is_cancelled());
        assert_eq!(summary.artifact_names(), vec!["flyer-1.jpg", "flyer-2.jpg"]);
        assert_eq!(summary.total_bytes(), 8);
        assert_eq!(summary.duration, Duration::from_millis(1500));
    }

    #[test]
    fn test_cancelled_summary() {
        let summary = ExportSummary::cancelled(&job(), 3);
        assert!(summary.is_cancelled());
        assert!(summary.strategy.is_none());
        assert!(summary.artifacts.is_empty());
        assert_eq!(summary.pages, 3);
    }

    #[test]
    fn test_summary_serializes_to_json() {
        let summary = ExportSummary::cancelled(&job(), 3).with_duration(Duration::from_millis(42));
        let json = serde_json::to_value(&summary).unwrap();

        assert_eq!(json["outcome"], "cancelled");
        assert_eq!(json["duration_ms"], 42);
        assert_eq!(json["kind"]["format"], "image");
        assert_eq!(json["kind"]["scope"], "batch");
        assert!(json["strategy"].is_null());
    }
}
