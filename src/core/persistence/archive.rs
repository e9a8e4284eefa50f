//! Archive fallback
//!
//! Packages every page artifact into one zip archive for a single download.
//! Entries are stored uncompressed; JPEG and PDF payloads are already
//! compressed.

use crate::domain::errors::PersistenceError;
use std::io::{Cursor, Write};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

/// One named archive entry
#[derive(Debug, Clone)]
pub struct ArchiveEntry {
    /// Entry file name
    pub name: String,
    /// Entry contents
    pub bytes: Vec<u8>,
}

/// Builds an in-memory zip archive, entries in the given order
pub fn build_archive(entries: &[ArchiveEntry]) -> Result<Vec<u8>, PersistenceError> {
    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    let stored = SimpleFileOptions::default().compression_method(CompressionMethod::Stored);

    for entry in entries {
        zip.start_file(entry.name.as_str(), stored)
            .map_err(archive_error)?;
        zip.write_all(&entry.bytes).map_err(archive_error)?;
    }

    let cursor = zip.finish().map_err(archive_error)?;
    Ok(cursor.into_inner())
}

fn archive_error(err: impl std::fmt::Display) -> PersistenceError {
    PersistenceError::ArchiveGeneration(err.to_string())
}

/// Builds the archive on the blocking thread pool
pub async fn build_archive_async(entries: Vec<ArchiveEntry>) -> Result<Vec<u8>, PersistenceError> {
    tokio::task::spawn_blocking(move || build_archive(&entries))
        .await
        .map_err(|e| PersistenceError::ArchiveGeneration(format!("Task join error: {e}")))?
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;
    use zip::ZipArchive;

    fn entry(name: &str, bytes: &[u8]) -> ArchiveEntry {
        ArchiveEntry {
            name: name.to_string(),
            bytes: bytes.to_vec(),
        }
    }

    #[test]
    fn test_archive_preserves_names_order_and_contents() {
        let bytes = build_archive(&[
            entry("flyer-1.jpg", b"one"),
            entry("flyer-2.jpg", b"two"),
            entry("flyer-3.jpg", b"three"),
        ])
        .unwrap();

        let mut archive = ZipArchive::new(Cursor::new(bytes)).unwrap();
        assert_eq!(archive.len(), 3);

        for (index, (name, contents)) in [
            ("flyer-1.jpg", "one"),
            ("flyer-2.jpg", "two"),
            ("flyer-3.jpg", "three"),
        ]
        .into_iter()
        .enumerate()
        {
            let mut file = archive.by_index(index).unwrap();
            assert_eq!(file.name(), name);
            assert_eq!(file.compression(), CompressionMethod::Stored);
            let mut read = String::new();
            file.read_to_string(&mut read).unwrap();
            assert_eq!(read, contents);
        }
    }

    #[tokio::test]
    async fn test_empty_archive_is_valid() {
        let bytes = build_archive_async(Vec::new()).await.unwrap();
        let archive = ZipArchive::new(Cursor::new(bytes)).unwrap();
        assert_eq!(archive.len(), 0);
    }
}
