//! Export orchestrator
//!
//! [`FlyerExporter`] is the public entry point of the pipeline. Every
//! operation awaits font readiness and the settle delay, discovers pages,
//! then dispatches on the job's [`ExportKind`] to direct downloads, PDF
//! assembly or batch persistence.

use crate::adapters::host::HostCapabilities;
use crate::config::FlyerConfig;
use crate::core::assembly::PdfAssembler;
use crate::core::capture::{CaptureEngine, FontAsset, RasterTarget};
use crate::core::discovery::{discover_pages, LogicalPage};
use crate::core::export::summary::ExportSummary;
use crate::core::persistence::{
    delivery_error, ArtifactRecord, ArtifactSource, BatchOutcome, BatchPersister,
};
use crate::domain::document::{LiveDocument, RenderRoot};
use crate::domain::errors::FlyerError;
use crate::domain::ids::PageNumber;
use crate::domain::job::{
    DestinationStrategy, ExportFormat, ExportJob, ExportKind, ExportScope, PageSize, PdfPlacement,
};
use crate::domain::Result;
use crate::{log_error_with_context, log_export_complete, log_export_start};
use async_trait::async_trait;
use chrono::Utc;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Default pause between font readiness and the first capture
pub const DEFAULT_SETTLE_DELAY: Duration = Duration::from_millis(1000);

/// Location recorded for artifacts handed to the download trigger
const DOWNLOAD_LOCATION: &str = "download";

/// Explicit export configuration passed in at construction
#[derive(Debug, Clone, PartialEq)]
pub struct ExportSettings {
    /// Fixed raster output
    pub target: RasterTarget,
    /// Physical page size of PDF output
    pub page_size: PageSize,
    /// Raster placement on PDF pages
    pub placement: PdfPlacement,
    /// Pause after font readiness, before the first capture
    pub settle_delay: Duration,
    /// Font family forced onto all exported text
    pub font_family: Option<String>,
}

impl Default for ExportSettings {
    fn default() -> Self {
        Self {
            target: RasterTarget::default(),
            page_size: PageSize::A4_PORTRAIT,
            placement: PdfPlacement::Stretch,
            settle_delay: DEFAULT_SETTLE_DELAY,
            font_family: None,
        }
    }
}

impl ExportSettings {
    /// Builds settings from a validated configuration
    pub fn from_config(config: &FlyerConfig) -> Self {
        Self {
            target: RasterTarget {
                width: config.render.target_width,
                height: config.render.target_height,
                background: config.render.background,
                jpeg_quality: config.render.jpeg_quality,
            },
            page_size: PageSize {
                format: config.pdf.page_size,
                orientation: config.pdf.orientation,
            },
            placement: config.pdf.placement,
            settle_delay: Duration::from_millis(config.export.settle_delay_ms),
            font_family: config.fonts.family.clone(),
        }
    }
}

/// Export orchestrator
pub struct FlyerExporter {
    settings: ExportSettings,
    host: HostCapabilities,
    capture: CaptureEngine,
    persister: BatchPersister,
}

impl std::fmt::Debug for FlyerExporter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FlyerExporter")
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}

impl FlyerExporter {
    /// Create an exporter over injected host capabilities
    pub fn new(settings: ExportSettings, host: HostCapabilities) -> Self {
        let capture = CaptureEngine::new(
            Arc::clone(&host.rasterizer),
            settings.target,
            settings.font_family.clone(),
        );
        let persister = BatchPersister::new(Arc::clone(&host.picker), Arc::clone(&host.downloader));
        Self {
            settings,
            host,
            capture,
            persister,
        }
    }

    /// Settings the exporter was built with
    pub fn settings(&self) -> &ExportSettings {
        &self.settings
    }

    /// Exports JPEG images
    ///
    /// One page: a single `<base>.jpg` download. Several pages: one
    /// `<base>-<N>.jpg` download per page, without batching.
    pub async fn export_as_image(&self, root: RenderRoot<'_>, base: &str) -> Result<ExportSummary> {
        self.execute(&self.job(ExportFormat::Image, ExportScope::Single, base), root)
            .await
    }

    /// Exports one PDF with a physical page per logical page
    pub async fn export_as_pdf(&self, root: RenderRoot<'_>, base: &str) -> Result<ExportSummary> {
        self.execute(&self.job(ExportFormat::Pdf, ExportScope::Single, base), root)
            .await
    }

    /// Exports one JPEG per page into a chosen directory or an archive
    pub async fn export_images_batch(
        &self,
        root: RenderRoot<'_>,
        base: &str,
    ) -> Result<ExportSummary> {
        self.execute(&self.job(ExportFormat::Image, ExportScope::Batch, base), root)
            .await
    }

    /// Exports one single-page PDF per page into a chosen directory or an
    /// archive
    pub async fn export_pdfs_batch(
        &self,
        root: RenderRoot<'_>,
        base: &str,
    ) -> Result<ExportSummary> {
        self.execute(&self.job(ExportFormat::Pdf, ExportScope::Batch, base), root)
            .await
    }

    /// Runs one export job against `root`
    ///
    /// # Errors
    ///
    /// Returns the first capture, assembly or persistence failure. A
    /// cancelled directory prompt is not an error; see
    /// [`ExportSummary::is_cancelled`].
    pub async fn execute(&self, job: &ExportJob, root: RenderRoot<'_>) -> Result<ExportSummary> {
        let started_at = Utc::now();
        let started = Instant::now();

        let result = async {
            let fonts = self.await_readiness().await?;
            let pages = discover_pages(root);
            log_export_start!(job.id, job.kind, pages.len());
            self.dispatch(job, root.document, &pages, fonts).await
        }
        .await;

        self.finish(result, started_at, started)
    }

    /// Exports one chosen page of a document as `<base>-page-<N>.<ext>`
    ///
    /// # Errors
    ///
    /// Returns [`FlyerError::Document`] when the document has no such page.
    pub async fn export_page(
        &self,
        root: RenderRoot<'_>,
        page: PageNumber,
        format: ExportFormat,
        base: &str,
    ) -> Result<ExportSummary> {
        let job = self.job(format, ExportScope::Single, base);
        let started_at = Utc::now();
        let started = Instant::now();

        let result = async {
            let fonts = self.await_readiness().await?;
            let pages = discover_pages(root);
            let logical = pages.get(page.index()).copied().ok_or_else(|| {
                FlyerError::Document(format!(
                    "Page {page} does not exist; the document has {} page(s)",
                    pages.len()
                ))
            })?;
            log_export_start!(job.id, job.kind, 1);

            let name = job.chosen_page_artifact_name(page);
            let bytes = self
                .render_artifact(root.document, &logical, format, fonts, &job.base_filename)
                .await?;
            let record = self.deliver(name, bytes).await?;
            Ok(ExportSummary::saved(
                &job,
                pages.len(),
                DestinationStrategy::SingleFileDownload,
                vec![record],
            ))
        }
        .await;

        self.finish(result, started_at, started)
    }

    fn job(&self, format: ExportFormat, scope: ExportScope, base: &str) -> ExportJob {
        ExportJob::new(ExportKind::new(format, scope), base, self.settings.page_size)
    }

    async fn await_readiness(&self) -> Result<Arc<[FontAsset]>> {
        let fonts = self.host.fonts.ready().await?;
        if !self.settings.settle_delay.is_zero() {
            tokio::time::sleep(self.settings.settle_delay).await;
        }
        Ok(fonts)
    }

    async fn dispatch(
        &self,
        job: &ExportJob,
        document: &LiveDocument,
        pages: &[LogicalPage<'_>],
        fonts: Arc<[FontAsset]>,
    ) -> Result<ExportSummary> {
        let count = pages.len();
        match (job.kind.format, job.kind.scope, pages) {
            (_, _, [only]) => {
                let bytes = self
                    .render_artifact(document, only, job.kind.format, fonts, &job.base_filename)
                    .await?;
                let record = self.deliver(job.single_artifact_name(), bytes).await?;
                Ok(ExportSummary::saved(
                    job,
                    count,
                    DestinationStrategy::SingleFileDownload,
                    vec![record],
                ))
            }
            (ExportFormat::Image, ExportScope::Single, pages) => {
                let mut records = Vec::with_capacity(count);
                for page in pages {
                    let bytes = self
                        .render_artifact(
                            document,
                            page,
                            ExportFormat::Image,
                            Arc::clone(&fonts),
                            &job.base_filename,
                        )
                        .await?;
                    records.push(self.deliver(job.page_artifact_name(page.number), bytes).await?);
                }
                Ok(ExportSummary::saved(
                    job,
                    count,
                    DestinationStrategy::SingleFileDownload,
                    records,
                ))
            }
            (ExportFormat::Pdf, ExportScope::Single, pages) => {
                let mut captures = Vec::with_capacity(count);
                for page in pages {
                    captures.push(self.capture.capture(document, page, Arc::clone(&fonts)).await?);
                }
                let pdf = self.assembler(&job.base_filename).assemble(&captures)?;
                let record = self.deliver(job.single_artifact_name(), pdf).await?;
                Ok(ExportSummary::saved(
                    job,
                    count,
                    DestinationStrategy::SingleFileDownload,
                    vec![record],
                ))
            }
            (format, ExportScope::Batch, pages) => {
                let mut source = PageArtifacts {
                    exporter: self,
                    document,
                    pages,
                    format,
                    fonts,
                    title: &job.base_filename,
                };
                match self.persister.persist(&mut source, job).await? {
                    BatchOutcome::Saved {
                        strategy,
                        artifacts,
                    } => Ok(ExportSummary::saved(job, count, strategy, artifacts)),
                    BatchOutcome::Cancelled => {
                        tracing::info!(job_id = %job.id, "Directory selection cancelled by user");
                        Ok(ExportSummary::cancelled(job, count))
                    }
                }
            }
        }
    }

    async fn render_artifact(
        &self,
        document: &LiveDocument,
        page: &LogicalPage<'_>,
        format: ExportFormat,
        fonts: Arc<[FontAsset]>,
        title: &str,
    ) -> Result<Vec<u8>> {
        let capture = self.capture.capture(document, page, fonts).await?;
        match format {
            ExportFormat::Image => Ok(capture.jpeg),
            ExportFormat::Pdf => self
                .assembler(title)
                .assemble(std::slice::from_ref(&capture)),
        }
    }

    fn assembler(&self, title: &str) -> PdfAssembler {
        PdfAssembler::new(self.settings.page_size)
            .with_placement(self.settings.placement)
            .with_title(title)
    }

    async fn deliver(&self, name: String, bytes: Vec<u8>) -> Result<ArtifactRecord> {
        let record = ArtifactRecord::new(name.as_str(), DOWNLOAD_LOCATION, &bytes);
        self.host
            .downloader
            .deliver(&name, bytes)
            .await
            .map_err(|err| delivery_error(&name, err))?;
        Ok(record)
    }

    fn finish(
        &self,
        result: Result<ExportSummary>,
        started_at: chrono::DateTime<Utc>,
        started: Instant,
    ) -> Result<ExportSummary> {
        match result {
            Ok(summary) => {
                let summary = summary
                    .with_started_at(started_at)
                    .with_duration(started.elapsed());
                log_export_complete!(summary.artifacts.len(), summary.duration);
                summary.log_summary();
                Ok(summary)
            }
            Err(err) => {
                log_error_with_context!(&err, "Export failed");
                Err(err)
            }
        }
    }
}

/// Renders batch artifacts page by page for the persister
struct PageArtifacts<'e, 'd, 'p> {
    exporter: &'e FlyerExporter,
    document: &'d LiveDocument,
    pages: &'p [LogicalPage<'d>],
    format: ExportFormat,
    fonts: Arc<[FontAsset]>,
    title: &'p str,
}

#[async_trait]
impl<'e, 'd, 'p> ArtifactSource for PageArtifacts<'e, 'd, 'p> {
    fn page_count(&self) -> usize {
        self.pages.len()
    }

    async fn render(&mut self, page: PageNumber) -> Result<Vec<u8>> {
        let logical = self.pages.get(page.index()).copied().ok_or_else(|| {
            FlyerError::Other(format!("Batch requested unknown page {page}"))
        })?;
        self.exporter
            .render_artifact(
                self.document,
                &logical,
                self.format,
                Arc::clone(&self.fonts),
                self.title,
            )
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings() {
        let settings = ExportSettings::default();
        assert_eq!(settings.target.width, 2480);
        assert_eq!(settings.target.height, 3508);
        assert_eq!(settings.target.jpeg_quality, 95);
        assert_eq!(settings.page_size, PageSize::A4_PORTRAIT);
        assert_eq!(settings.placement, PdfPlacement::Stretch);
        assert_eq!(settings.settle_delay, Duration::from_secs(1));
    }

    #[test]
    fn test_settings_from_config() {
        let mut config = FlyerConfig::default();
        config.render.target_width = 1240;
        config.export.settle_delay_ms = 0;
        config.fonts.family = Some("Anton".to_string());

        let settings = ExportSettings::from_config(&config);
        assert_eq!(settings.target.width, 1240);
        assert!(settings.settle_delay.is_zero());
        assert_eq!(settings.font_family.as_deref(), Some("Anton"));
    }
}
