//! Local filesystem host capabilities
//!
//! Directory selection, file sinks and the download trigger, backed by
//! `tokio::fs`.

use crate::adapters::host::{
    DirectoryHandle, DirectoryPicker, DirectorySelection, Downloader, FileSink,
};
use crate::domain::errors::{FlyerError, PersistenceError};
use crate::domain::Result;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::fs::{self, File};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};

fn write_error(file: &Path, err: std::io::Error) -> FlyerError {
    PersistenceError::DirectoryWrite {
        file: file.display().to_string(),
        reason: err.to_string(),
    }
    .into()
}

async fn ensure_directory(path: &Path) -> Result<()> {
    fs::create_dir_all(path).await.map_err(|e| {
        PersistenceError::Picker(format!(
            "Cannot use directory {}: {}",
            path.display(),
            e
        ))
        .into()
    })
}

/// Picker that always selects one configured directory
#[derive(Debug, Clone)]
pub struct FixedDirectoryPicker {
    directory: PathBuf,
}

impl FixedDirectoryPicker {
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
        }
    }
}

#[async_trait]
impl DirectoryPicker for FixedDirectoryPicker {
    fn is_supported(&self) -> bool {
        true
    }

    async fn pick_directory(&self) -> Result<DirectorySelection> {
        ensure_directory(&self.directory).await?;
        Ok(DirectorySelection::Chosen(Box::new(FsDirectoryHandle::new(
            self.directory.clone(),
        ))))
    }
}

/// Picker that asks for a directory on the terminal
///
/// An empty answer, or end of input, dismisses the prompt.
#[derive(Debug, Clone, Default)]
pub struct PromptDirectoryPicker {
    suggestion: Option<PathBuf>,
}

impl PromptDirectoryPicker {
    pub fn new(suggestion: Option<PathBuf>) -> Self {
        Self { suggestion }
    }
}

#[async_trait]
impl DirectoryPicker for PromptDirectoryPicker {
    fn is_supported(&self) -> bool {
        true
    }

    async fn pick_directory(&self) -> Result<DirectorySelection> {
        let prompt = match &self.suggestion {
            Some(path) => format!(
                "Save pages to directory (e.g. {}, empty to cancel): ",
                path.display()
            ),
            None => "Save pages to directory (empty to cancel): ".to_string(),
        };

        let prompt_error =
            |e: std::io::Error| PersistenceError::Picker(format!("Failed to show prompt: {e}"));
        let mut stderr = tokio::io::stderr();
        stderr
            .write_all(prompt.as_bytes())
            .await
            .map_err(prompt_error)?;
        stderr.flush().await.map_err(prompt_error)?;

        let mut answer = String::new();
        BufReader::new(tokio::io::stdin())
            .read_line(&mut answer)
            .await
            .map_err(|e| PersistenceError::Picker(format!("Failed to read answer: {e}")))?;

        let answer = answer.trim();
        if answer.is_empty() {
            return Ok(DirectorySelection::Cancelled);
        }

        let directory = PathBuf::from(answer);
        ensure_directory(&directory).await?;
        Ok(DirectorySelection::Chosen(Box::new(FsDirectoryHandle::new(
            directory,
        ))))
    }
}

/// Picker for hosts without directory selection
#[derive(Debug, Clone, Copy, Default)]
pub struct UnsupportedDirectoryPicker;

#[async_trait]
impl DirectoryPicker for UnsupportedDirectoryPicker {
    fn is_supported(&self) -> bool {
        false
    }

    async fn pick_directory(&self) -> Result<DirectorySelection> {
        Err(PersistenceError::Picker("Directory selection is not available".to_string()).into())
    }
}

/// A directory on the local filesystem
#[derive(Debug, Clone)]
pub struct FsDirectoryHandle {
    path: PathBuf,
}

impl FsDirectoryHandle {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl DirectoryHandle for FsDirectoryHandle {
    fn describe(&self) -> String {
        self.path.display().to_string()
    }

    async fn create_file(&self, name: &str) -> Result<Box<dyn FileSink>> {
        let path = self.path.join(name);
        let file = File::create(&path)
            .await
            .map_err(|e| write_error(&path, e))?;
        Ok(Box::new(FsFileSink { path, file }))
    }
}

/// File being written through `tokio::fs`
#[derive(Debug)]
pub struct FsFileSink {
    path: PathBuf,
    file: File,
}

#[async_trait]
impl FileSink for FsFileSink {
    async fn write(&mut self, bytes: &[u8]) -> Result<()> {
        self.file
            .write_all(bytes)
            .await
            .map_err(|e| write_error(&self.path, e))
    }

    async fn close(self: Box<Self>) -> Result<()> {
        let FsFileSink { path, mut file } = *self;
        file.flush().await.map_err(|e| write_error(&path, e))?;
        file.sync_all().await.map_err(|e| write_error(&path, e))
    }
}

/// Download trigger that saves deliveries into a downloads directory
#[derive(Debug, Clone)]
pub struct FsDownloader {
    downloads_dir: PathBuf,
}

impl FsDownloader {
    pub fn new(downloads_dir: impl Into<PathBuf>) -> Self {
        Self {
            downloads_dir: downloads_dir.into(),
        }
    }

    pub fn downloads_dir(&self) -> &Path {
        &self.downloads_dir
    }
}

#[async_trait]
impl Downloader for FsDownloader {
    async fn deliver(&self, filename: &str, bytes: Vec<u8>) -> Result<()> {
        let delivery_error = |reason: String| -> FlyerError {
            PersistenceError::Delivery {
                file: filename.to_string(),
                reason,
            }
            .into()
        };

        fs::create_dir_all(&self.downloads_dir)
            .await
            .map_err(|e| delivery_error(e.to_string()))?;

        let path = self.downloads_dir.join(filename);
        fs::write(&path, &bytes)
            .await
            .map_err(|e| delivery_error(e.to_string()))?;

        tracing::info!(file = %path.display(), bytes = bytes.len(), "Download saved");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_fixed_picker_creates_directory() {
        let temp = TempDir::new().unwrap();
        let target = temp.path().join("out/pages");
        let picker = FixedDirectoryPicker::new(&target);

        assert!(picker.is_supported());
        let selection = picker.pick_directory().await.unwrap();
        assert!(matches!(selection, DirectorySelection::Chosen(_)));
        assert!(target.is_dir());
    }

    #[tokio::test]
    async fn test_unsupported_picker() {
        let picker = UnsupportedDirectoryPicker;
        assert!(!picker.is_supported());
        assert!(picker.pick_directory().await.is_err());
    }

    #[tokio::test]
    async fn test_file_sink_writes_and_closes() {
        let temp = TempDir::new().unwrap();
        let handle = FsDirectoryHandle::new(temp.path());

        let mut sink = handle.create_file("flyer-1.jpg").await.unwrap();
        sink.write(b"abc").await.unwrap();
        sink.write(b"def").await.unwrap();
        sink.close().await.unwrap();

        let written = std::fs::read(temp.path().join("flyer-1.jpg")).unwrap();
        assert_eq!(written, b"abcdef");
    }

    #[tokio::test]
    async fn test_create_file_in_missing_directory_fails() {
        let temp = TempDir::new().unwrap();
        let handle = FsDirectoryHandle::new(temp.path().join("missing"));

        let err = handle.create_file("flyer-1.jpg").await.err().unwrap();
        assert!(matches!(
            err,
            FlyerError::Persistence(PersistenceError::DirectoryWrite { .. })
        ));
    }

    #[tokio::test]
    async fn test_downloader_saves_into_downloads_dir() {
        let temp = TempDir::new().unwrap();
        let downloader = FsDownloader::new(temp.path().join("downloads"));

        downloader
            .deliver("flyer-pages.zip", vec![1, 2, 3])
            .await
            .unwrap();

        let saved = std::fs::read(temp.path().join("downloads/flyer-pages.zip")).unwrap();
        assert_eq!(saved, vec![1, 2, 3]);
    }
}
