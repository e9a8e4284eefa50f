//! Batch persistence
//!
//! Multi-page jobs persist one artifact per page through an explicit state
//! machine:
//!
//! ```text
//! Start ──(picker unsupported or erroring)──▶ ArchiveFallback ──▶ Saved
//!   │                                               │
//!   ├──(directory chosen)──▶ DirectDirectoryWrite ──┼──▶ Saved
//!   │                                               └──▶ Failed
//!   └──(prompt dismissed)──▶ Cancelled
//! ```
//!
//! Pages are rendered on demand by an [`ArtifactSource`], so capture and
//! persistence interleave page by page and never run concurrently.

pub mod archive;
pub mod directory;

use crate::adapters::host::{DirectoryPicker, DirectorySelection, Downloader};
use crate::domain::errors::{FlyerError, PersistenceError};
use crate::domain::ids::PageNumber;
use crate::domain::job::{DestinationStrategy, ExportJob};
use crate::domain::Result;
use crate::log_page_progress;
use archive::ArchiveEntry;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;
use std::sync::Arc;

/// Produces the bytes of one page artifact on demand
#[async_trait]
pub trait ArtifactSource: Send {
    /// Number of pages in the batch
    fn page_count(&self) -> usize;

    /// Renders the artifact of `page`
    async fn render(&mut self, page: PageNumber) -> Result<Vec<u8>>;
}

/// States of one batch persistence run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchState {
    Start,
    DirectDirectoryWrite,
    ArchiveFallback,
    Saved,
    Cancelled,
    Failed,
}

impl fmt::Display for BatchState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            BatchState::Start => "start",
            BatchState::DirectDirectoryWrite => "direct-directory-write",
            BatchState::ArchiveFallback => "archive-fallback",
            BatchState::Saved => "saved",
            BatchState::Cancelled => "cancelled",
            BatchState::Failed => "failed",
        };
        f.write_str(label)
    }
}

/// A persisted artifact
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtifactRecord {
    /// File name
    pub name: String,
    /// Directory it was written to, or the delivery target
    pub location: String,
    /// Size in bytes
    pub size_bytes: usize,
    /// Hex-encoded SHA-256 of the contents
    pub sha256: String,
}

impl ArtifactRecord {
    /// Records an artifact and checksums its contents
    pub fn new(name: impl Into<String>, location: impl Into<String>, bytes: &[u8]) -> Self {
        Self {
            name: name.into(),
            location: location.into(),
            size_bytes: bytes.len(),
            sha256: sha256_hex(bytes),
        }
    }
}

fn sha256_hex(bytes: &[u8]) -> String {
    Sha256::digest(bytes)
        .iter()
        .map(|byte| format!("{byte:02x}"))
        .collect()
}

/// Terminal result of a batch that did not fail
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BatchOutcome {
    /// Every page was written or archived
    Saved {
        strategy: DestinationStrategy,
        artifacts: Vec<ArtifactRecord>,
    },
    /// The user dismissed the directory prompt; nothing was written
    Cancelled,
}

/// Runs the batch persistence state machine
#[derive(Clone)]
pub struct BatchPersister {
    picker: Arc<dyn DirectoryPicker>,
    downloader: Arc<dyn Downloader>,
}

impl fmt::Debug for BatchPersister {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BatchPersister")
            .field("directory_supported", &self.picker.is_supported())
            .finish_non_exhaustive()
    }
}

impl BatchPersister {
    /// Creates a persister over the host's picker and download trigger
    pub fn new(picker: Arc<dyn DirectoryPicker>, downloader: Arc<dyn Downloader>) -> Self {
        Self { picker, downloader }
    }

    /// Persists every page of `source` under the naming of `job`
    ///
    /// # Errors
    ///
    /// Returns the first capture or persistence failure. Pages after the
    /// failing one are not rendered; files already written stay in place.
    pub async fn persist(
        &self,
        source: &mut dyn ArtifactSource,
        job: &ExportJob,
    ) -> Result<BatchOutcome> {
        let mut state = BatchState::Start;

        let selection = if self.picker.is_supported() {
            match self.picker.pick_directory().await {
                Ok(selection) => Some(selection),
                Err(err) => {
                    tracing::warn!(
                        job_id = %job.id,
                        error = %err,
                        "Directory selection failed, falling back to archive"
                    );
                    None
                }
            }
        } else {
            tracing::info!(job_id = %job.id, "Directory selection unsupported, using archive");
            None
        };

        let result = match selection {
            Some(DirectorySelection::Cancelled) => {
                transition(&mut state, BatchState::Cancelled, job);
                return Ok(BatchOutcome::Cancelled);
            }
            Some(DirectorySelection::Chosen(handle)) => {
                transition(&mut state, BatchState::DirectDirectoryWrite, job);
                tracing::info!(job_id = %job.id, directory = %handle.describe(), "Writing pages to directory");
                directory::write_pages(handle.as_ref(), source, job)
                    .await
                    .map(|artifacts| (DestinationStrategy::DirectDirectoryWrite, artifacts))
            }
            None => {
                transition(&mut state, BatchState::ArchiveFallback, job);
                self.archive_pages(source, job)
                    .await
                    .map(|artifacts| (DestinationStrategy::ArchiveDownload, artifacts))
            }
        };

        match result {
            Ok((strategy, artifacts)) => {
                transition(&mut state, BatchState::Saved, job);
                Ok(BatchOutcome::Saved {
                    strategy,
                    artifacts,
                })
            }
            Err(err) => {
                transition(&mut state, BatchState::Failed, job);
                Err(err)
            }
        }
    }

    async fn archive_pages(
        &self,
        source: &mut dyn ArtifactSource,
        job: &ExportJob,
    ) -> Result<Vec<ArtifactRecord>> {
        let total = source.page_count();
        let mut entries = Vec::with_capacity(total);
        for index in 0..total {
            let page = PageNumber::from_index(index);
            let name = job.page_artifact_name(page);
            let bytes = source.render(page).await?;
            log_page_progress!(page.get(), total, name);
            entries.push(ArchiveEntry { name, bytes });
        }

        let archive = archive::build_archive_async(entries).await?;
        let archive_name = job.archive_name();
        let record = ArtifactRecord::new(archive_name.as_str(), "download", &archive);

        self.downloader
            .deliver(&archive_name, archive)
            .await
            .map_err(|err| delivery_error(&archive_name, err))?;

        Ok(vec![record])
    }
}

fn transition(state: &mut BatchState, next: BatchState, job: &ExportJob) {
    tracing::debug!(job_id = %job.id, from = %state, to = %next, "Batch state transition");
    *state = next;
}

/// Maps a download failure to [`PersistenceError::Delivery`]
pub(crate) fn delivery_error(file: &str, err: FlyerError) -> FlyerError {
    match err {
        FlyerError::Persistence(inner) => FlyerError::Persistence(inner),
        other => PersistenceError::Delivery {
            file: file.to_string(),
            reason: other.to_string(),
        }
        .into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_artifact_record_checksum() {
        let record = ArtifactRecord::new("flyer-1.jpg", "/tmp/out", b"abc");
        assert_eq!(record.size_bytes, 3);
        assert_eq!(
            record.sha256,
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn test_batch_state_display() {
        assert_eq!(BatchState::ArchiveFallback.to_string(), "archive-fallback");
        assert_eq!(BatchState::Cancelled.to_string(), "cancelled");
    }

    #[test]
    fn test_delivery_error_mapping() {
        let err = delivery_error("flyer-pages.zip", FlyerError::Io("broken pipe".to_string()));
        assert!(err.to_string().contains("flyer-pages.zip"));

        let passthrough = delivery_error(
            "x",
            PersistenceError::ArchiveGeneration("y".to_string()).into(),
        );
        assert!(matches!(
            passthrough,
            FlyerError::Persistence(PersistenceError::ArchiveGeneration(_))
        ));
    }
}
