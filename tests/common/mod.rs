//! Shared test hosts for export scenario tests
//!
//! In-memory implementations of every host capability, so the whole
//! pipeline runs without touching the filesystem or a real rasterizer.

#![allow(dead_code)]

use async_trait::async_trait;
use flyerpress::adapters::host::{
    DirectoryHandle, DirectoryPicker, DirectorySelection, Downloader, FileSink, HostCapabilities,
    Rasterizer,
};
use flyerpress::core::capture::{FontLibrary, PageSnapshot, Raster, RasterTarget, RenderPlan};
use flyerpress::core::export::ExportSettings;
use flyerpress::domain::errors::{CaptureError, PersistenceError};
use flyerpress::domain::Result;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Three A4-proportioned pages, each with a distinct fill
pub const THREE_PAGE_FLYER: &str = r##"<svg xmlns="http://www.w3.org/2000/svg" width="210" height="891">
  <style>.price { font-weight: bold; }</style>
  <svg class="flyer-page" width="210" height="297">
    <rect width="210" height="297" fill="#ff0000"/>
    <text class="price" x="20" y="40">R$ 9,99</text>
  </svg>
  <svg class="flyer-page" y="297" width="210" height="297">
    <rect width="210" height="297" fill="#00ff00"/>
  </svg>
  <svg class="flyer-page" y="594" width="210" height="297">
    <rect width="210" height="297" fill="#0000ff"/>
  </svg>
</svg>"##;

/// A single unmarked page
pub const SINGLE_PAGE_FLYER: &str = r##"<svg xmlns="http://www.w3.org/2000/svg" width="210" height="297">
  <rect width="210" height="297" fill="#ffcc00"/>
</svg>"##;

/// Small and fast capture settings
pub fn test_settings() -> ExportSettings {
    ExportSettings {
        target: RasterTarget {
            width: 40,
            height: 56,
            ..RasterTarget::default()
        },
        settle_delay: Duration::ZERO,
        ..ExportSettings::default()
    }
}

/// Files written into an in-memory directory, in completion order
#[derive(Clone, Default)]
pub struct MemoryDirectory {
    files: Arc<Mutex<Vec<(String, Vec<u8>)>>>,
    creates: Arc<AtomicUsize>,
    fail_on_create: Option<usize>,
}

impl MemoryDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fails the `n`-th (1-based) file creation
    pub fn failing_on_create(n: usize) -> Self {
        Self {
            fail_on_create: Some(n),
            ..Self::default()
        }
    }

    pub fn file_names(&self) -> Vec<String> {
        self.files
            .lock()
            .unwrap()
            .iter()
            .map(|(name, _)| name.clone())
            .collect()
    }

    pub fn file(&self, name: &str) -> Option<Vec<u8>> {
        self.files
            .lock()
            .unwrap()
            .iter()
            .find(|(file, _)| file == name)
            .map(|(_, bytes)| bytes.clone())
    }
}

#[async_trait]
impl DirectoryHandle for MemoryDirectory {
    fn describe(&self) -> String {
        "memory".to_string()
    }

    async fn create_file(&self, name: &str) -> Result<Box<dyn FileSink>> {
        let count = self.creates.fetch_add(1, Ordering::SeqCst) + 1;
        if self.fail_on_create == Some(count) {
            return Err(PersistenceError::DirectoryWrite {
                file: name.to_string(),
                reason: "disk full".to_string(),
            }
            .into());
        }
        Ok(Box::new(MemorySink {
            name: name.to_string(),
            buffer: Vec::new(),
            files: Arc::clone(&self.files),
        }))
    }
}

struct MemorySink {
    name: String,
    buffer: Vec<u8>,
    files: Arc<Mutex<Vec<(String, Vec<u8>)>>>,
}

#[async_trait]
impl FileSink for MemorySink {
    async fn write(&mut self, bytes: &[u8]) -> Result<()> {
        self.buffer.extend_from_slice(bytes);
        Ok(())
    }

    async fn close(self: Box<Self>) -> Result<()> {
        let MemorySink {
            name,
            buffer,
            files,
        } = *self;
        files.lock().unwrap().push((name, buffer));
        Ok(())
    }
}

/// What a scripted picker answers
#[derive(Clone)]
pub enum PickerScript {
    Unsupported,
    Cancel,
    Fail,
    Choose(MemoryDirectory),
}

/// Directory picker replaying a fixed answer and counting prompts
pub struct ScriptedPicker {
    script: PickerScript,
    prompts: AtomicUsize,
}

impl ScriptedPicker {
    pub fn new(script: PickerScript) -> Self {
        Self {
            script,
            prompts: AtomicUsize::new(0),
        }
    }

    pub fn prompts(&self) -> usize {
        self.prompts.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl DirectoryPicker for ScriptedPicker {
    fn is_supported(&self) -> bool {
        !matches!(self.script, PickerScript::Unsupported)
    }

    async fn pick_directory(&self) -> Result<DirectorySelection> {
        self.prompts.fetch_add(1, Ordering::SeqCst);
        match &self.script {
            PickerScript::Unsupported | PickerScript::Fail => {
                Err(PersistenceError::Picker("permission denied".to_string()).into())
            }
            PickerScript::Cancel => Ok(DirectorySelection::Cancelled),
            PickerScript::Choose(directory) => {
                Ok(DirectorySelection::Chosen(Box::new(directory.clone())))
            }
        }
    }
}

/// Download trigger recording every delivery
#[derive(Default)]
pub struct RecordingDownloader {
    deliveries: Mutex<Vec<(String, Vec<u8>)>>,
}

impl RecordingDownloader {
    pub fn names(&self) -> Vec<String> {
        self.deliveries
            .lock()
            .unwrap()
            .iter()
            .map(|(name, _)| name.clone())
            .collect()
    }

    pub fn bytes(&self, name: &str) -> Option<Vec<u8>> {
        self.deliveries
            .lock()
            .unwrap()
            .iter()
            .find(|(file, _)| file == name)
            .map(|(_, bytes)| bytes.clone())
    }
}

#[async_trait]
impl Downloader for RecordingDownloader {
    async fn deliver(&self, filename: &str, bytes: Vec<u8>) -> Result<()> {
        self.deliveries
            .lock()
            .unwrap()
            .push((filename.to_string(), bytes));
        Ok(())
    }
}

/// Rasterizer producing a plan-sized background fill
#[derive(Default)]
pub struct StubRasterizer {
    calls: AtomicUsize,
    fail_on: Option<usize>,
    snapshots: Mutex<Vec<String>>,
}

impl StubRasterizer {
    /// Fails the `n`-th (1-based) rasterization
    pub fn failing_on(n: usize) -> Self {
        Self {
            fail_on: Some(n),
            ..Self::default()
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Markup of every snapshot received
    pub fn snapshots(&self) -> Vec<String> {
        self.snapshots.lock().unwrap().clone()
    }
}

#[async_trait]
impl Rasterizer for StubRasterizer {
    async fn rasterize(
        &self,
        snapshot: Arc<PageSnapshot>,
        plan: RenderPlan,
    ) -> std::result::Result<Raster, CaptureError> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        self.snapshots.lock().unwrap().push(snapshot.markup.clone());
        if self.fail_on == Some(call) {
            return Err(CaptureError::Rasterize("renderer crashed".to_string()));
        }

        let background = plan.background;
        let pixel = [background.r, background.g, background.b, 255];
        Ok(Raster {
            width: plan.width,
            height: plan.height,
            pixels: pixel.repeat((plan.width * plan.height) as usize),
        })
    }
}

/// Handles on the mocks behind a [`HostCapabilities`]
pub struct TestHost {
    pub picker: Arc<ScriptedPicker>,
    pub downloader: Arc<RecordingDownloader>,
    pub rasterizer: Arc<StubRasterizer>,
}

impl TestHost {
    pub fn new(script: PickerScript) -> Self {
        Self::with_rasterizer(script, StubRasterizer::default())
    }

    pub fn with_rasterizer(script: PickerScript, rasterizer: StubRasterizer) -> Self {
        Self {
            picker: Arc::new(ScriptedPicker::new(script)),
            downloader: Arc::new(RecordingDownloader::default()),
            rasterizer: Arc::new(rasterizer),
        }
    }

    pub fn capabilities(&self) -> HostCapabilities {
        self.capabilities_with(self.rasterizer.clone())
    }

    /// Same picker and downloader, rendering through `rasterizer`
    pub fn capabilities_with(&self, rasterizer: Arc<dyn Rasterizer>) -> HostCapabilities {
        HostCapabilities::new(
            self.picker.clone(),
            self.downloader.clone(),
            Arc::new(FontLibrary::empty()),
            rasterizer,
        )
    }
}
