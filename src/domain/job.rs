//! Export job model
//!
//! An [`ExportJob`] is the immutable description of one export request. Its
//! [`ExportKind`] crosses the output format with the export scope and is
//! dispatched by exhaustive matching.

use crate::domain::ids::{JobId, PageNumber};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Base filename used when none can be derived
pub const DEFAULT_BASE_FILENAME: &str = "encarte";

/// Output artifact format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    /// JPEG raster at print resolution
    Image,
    /// PDF with one raster per physical page
    Pdf,
}

impl ExportFormat {
    /// File extension of artifacts in this format
    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Image => "jpg",
            ExportFormat::Pdf => "pdf",
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExportFormat::Image => write!(f, "image"),
            ExportFormat::Pdf => write!(f, "pdf"),
        }
    }
}

impl FromStr for ExportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "image" | "jpg" | "jpeg" => Ok(ExportFormat::Image),
            "pdf" => Ok(ExportFormat::Pdf),
            _ => Err(format!(
                "Invalid export format '{s}'. Must be one of: image, pdf"
            )),
        }
    }
}

/// Whether a multi-page export goes through batch persistence
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportScope {
    /// Direct downloads (one image per page, or one combined PDF)
    Single,
    /// One artifact per page into a chosen directory or an archive
    Batch,
}

/// Format crossed with scope
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ExportKind {
    /// Output format
    pub format: ExportFormat,
    /// Export scope
    pub scope: ExportScope,
}

impl ExportKind {
    /// Creates an export kind
    pub fn new(format: ExportFormat, scope: ExportScope) -> Self {
        Self { format, scope }
    }
}

impl fmt::Display for ExportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.scope {
            ExportScope::Single => write!(f, "{}", self.format),
            ExportScope::Batch => write!(f, "{} batch", self.format),
        }
    }
}

/// Physical page format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PageFormat {
    /// ISO A4, 210 × 297 mm
    #[default]
    A4,
    /// US Letter, 215.9 × 279.4 mm
    Letter,
}

/// Page orientation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    /// Taller than wide
    #[default]
    Portrait,
    /// Wider than tall
    Landscape,
}

/// Physical page size of PDF output
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PageSize {
    /// Page format
    pub format: PageFormat,
    /// Page orientation
    pub orientation: Orientation,
}

impl PageSize {
    /// A4 portrait
    pub const A4_PORTRAIT: PageSize = PageSize {
        format: PageFormat::A4,
        orientation: Orientation::Portrait,
    };

    /// Width and height in millimetres
    pub fn millimetres(&self) -> (f32, f32) {
        let (short, long) = match self.format {
            PageFormat::A4 => (210.0, 297.0),
            PageFormat::Letter => (215.9, 279.4),
        };
        match self.orientation {
            Orientation::Portrait => (short, long),
            Orientation::Landscape => (long, short),
        }
    }

    /// Width and height in PDF points (1/72 inch)
    pub fn points(&self) -> (f32, f32) {
        let (width, height) = self.millimetres();
        (mm_to_pt(width), mm_to_pt(height))
    }
}

fn mm_to_pt(mm: f32) -> f32 {
    mm * 72.0 / 25.4
}

/// How a raster is placed on a physical PDF page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PdfPlacement {
    /// Fill the whole page, no margins
    #[default]
    Stretch,
    /// Preserve aspect ratio, centered on the page
    Contain,
}

/// Where the artifacts of a job end up
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DestinationStrategy {
    /// Individual files written into a user-chosen directory
    DirectDirectoryWrite,
    /// All pages bundled into one downloaded archive
    ArchiveDownload,
    /// Each artifact delivered as its own download
    SingleFileDownload,
}

impl fmt::Display for DestinationStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            DestinationStrategy::DirectDirectoryWrite => "directory",
            DestinationStrategy::ArchiveDownload => "archive",
            DestinationStrategy::SingleFileDownload => "download",
        };
        write!(f, "{label}")
    }
}

/// Immutable description of one export request
#[derive(Debug, Clone, PartialEq)]
pub struct ExportJob {
    /// Job identifier for logs and summaries
    pub id: JobId,
    /// Format and scope
    pub kind: ExportKind,
    /// Base artifact name without extension
    pub base_filename: String,
    /// Physical size of PDF pages
    pub page_size: PageSize,
}

impl ExportJob {
    /// Creates a job with a fresh id
    pub fn new(kind: ExportKind, base_filename: impl Into<String>, page_size: PageSize) -> Self {
        Self {
            id: JobId::generate(),
            kind,
            base_filename: base_filename.into(),
            page_size,
        }
    }

    /// `<base>.<ext>`
    pub fn single_artifact_name(&self) -> String {
        artifact_name(&self.base_filename, None, self.kind.format)
    }

    /// `<base>-<N>.<ext>`
    pub fn page_artifact_name(&self, page: PageNumber) -> String {
        artifact_name(&self.base_filename, Some(page), self.kind.format)
    }

    /// `<base>-page-<N>.<ext>`, for a page exported on its own
    pub fn chosen_page_artifact_name(&self, page: PageNumber) -> String {
        format!(
            "{}-page-{page}.{}",
            self.base_filename,
            self.kind.format.extension()
        )
    }

    /// `<base>-pages.zip`
    pub fn archive_name(&self) -> String {
        format!("{}-pages.zip", self.base_filename)
    }
}

/// Builds `<base>.<ext>` or `<base>-<N>.<ext>`
pub fn artifact_name(base: &str, page: Option<PageNumber>, format: ExportFormat) -> String {
    match page {
        Some(page) => format!("{base}-{page}.{}", format.extension()),
        None => format!("{base}.{}", format.extension()),
    }
}

/// Derives a base filename from a flyer title
///
/// Whitespace runs become `_`; path separators and characters that are not
/// valid in filenames are dropped. Falls back to [`DEFAULT_BASE_FILENAME`].
///
/// # Examples
///
/// ```
/// use flyerpress::domain::job::derive_base_filename;
///
/// assert_eq!(derive_base_filename("Ofertas da Semana"), "Ofertas_da_Semana");
/// assert_eq!(derive_base_filename("  "), "encarte");
/// ```
pub fn derive_base_filename(title: &str) -> String {
    let cleaned: String = title
        .trim()
        .chars()
        .filter(|c| !matches!(c, '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|'))
        .filter(|c| c.is_whitespace() || !c.is_control())
        .collect();
    let cleaned = cleaned.split_whitespace().collect::<Vec<_>>().join("_");
    let cleaned = cleaned.trim_matches('.');

    if cleaned.is_empty() {
        DEFAULT_BASE_FILENAME.to_string()
    } else {
        cleaned.to_string()
    }
}
