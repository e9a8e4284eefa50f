//! Direct directory writes
//!
//! Writes one file per page into a user-chosen directory, strictly one
//! after another: each file is created, written and closed before the next
//! page is rendered.

use super::{ArtifactRecord, ArtifactSource};
use crate::adapters::host::{DirectoryHandle, FileSink};
use crate::domain::errors::{FlyerError, PersistenceError};
use crate::domain::ids::PageNumber;
use crate::domain::job::ExportJob;
use crate::domain::Result;
use crate::log_page_progress;

/// Renders and writes every page of `source` into `directory`
///
/// The first failure aborts the remaining pages; files already written are
/// left in place.
pub async fn write_pages(
    directory: &dyn DirectoryHandle,
    source: &mut dyn ArtifactSource,
    job: &ExportJob,
) -> Result<Vec<ArtifactRecord>> {
    let total = source.page_count();
    let mut written = Vec::with_capacity(total);

    for index in 0..total {
        let page = PageNumber::from_index(index);
        let name = job.page_artifact_name(page);
        let bytes = source.render(page).await?;

        write_file(directory, &name, &bytes).await?;

        log_page_progress!(page.get(), total, name);
        written.push(ArtifactRecord::new(name, directory.describe(), &bytes));
    }

    Ok(written)
}

async fn write_file(directory: &dyn DirectoryHandle, name: &str, bytes: &[u8]) -> Result<()> {
    let write_error = |err: FlyerError| -> FlyerError {
        match err {
            FlyerError::Persistence(inner) => FlyerError::Persistence(inner),
            other => PersistenceError::DirectoryWrite {
                file: name.to_string(),
                reason: other.to_string(),
            }
            .into(),
        }
    };

    let mut sink: Box<dyn FileSink> = directory.create_file(name).await.map_err(write_error)?;
    sink.write(bytes).await.map_err(write_error)?;
    sink.close().await.map_err(write_error)
}
