//! PDF assembly
//!
//! Wraps captured rasters into a PDF with one physical page per capture, in
//! capture order. JPEG bytes are embedded as-is through `DCTDecode`.
//!
//! Assembly returns bytes; it never decides how they are delivered.

use crate::core::capture::CaptureResult;
use crate::domain::errors::FlyerError;
use crate::domain::job::{PageSize, PdfPlacement};
use crate::domain::Result;
use chrono::Utc;
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, ObjectId, Stream};

const PRODUCER: &str = concat!("flyerpress ", env!("CARGO_PKG_VERSION"));

/// Assembles captures onto fixed-size physical pages
#[derive(Debug, Clone)]
pub struct PdfAssembler {
    page_size: PageSize,
    placement: PdfPlacement,
    title: Option<String>,
}

impl PdfAssembler {
    /// Creates an assembler that stretches each raster over the whole page
    pub fn new(page_size: PageSize) -> Self {
        Self {
            page_size,
            placement: PdfPlacement::Stretch,
            title: None,
        }
    }

    /// Sets how rasters are placed on the page
    pub fn with_placement(mut self, placement: PdfPlacement) -> Self {
        self.placement = placement;
        self
    }

    /// Sets the document title
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Builds the PDF
    ///
    /// # Errors
    ///
    /// Returns [`FlyerError::Assembly`] for an empty capture list or when the
    /// document cannot be serialized.
    pub fn assemble(&self, captures: &[CaptureResult]) -> Result<Vec<u8>> {
        if captures.is_empty() {
            return Err(FlyerError::Assembly(
                "Cannot assemble a PDF without pages".to_string(),
            ));
        }

        let (page_width, page_height) = self.page_size.points();
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();

        let mut kids: Vec<Object> = Vec::with_capacity(captures.len());
        for capture in captures {
            let page_id = self.add_page(&mut doc, pages_id, capture, page_width, page_height)?;
            kids.push(page_id.into());
        }

        let count = kids.len() as i64;
        doc.set_object(
            pages_id,
            dictionary! {
                "Type" => "Pages",
                "Kids" => kids,
                "Count" => count,
            },
        );

        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);

        let created = Utc::now().format("D:%Y%m%d%H%M%SZ").to_string();
        let info_id = doc.add_object(dictionary! {
            "Title" => Object::string_literal(self.title.clone().unwrap_or_default()),
            "Creator" => Object::string_literal(PRODUCER),
            "Producer" => Object::string_literal(PRODUCER),
            "CreationDate" => Object::string_literal(created),
        });
        doc.trailer.set("Info", info_id);

        let mut buffer = Vec::new();
        doc.save_to(&mut buffer)
            .map_err(|e| FlyerError::Assembly(format!("Failed to serialize PDF: {e}")))?;

        tracing::debug!(
            pages = captures.len(),
            bytes = buffer.len(),
            placement = ?self.placement,
            "Assembled PDF"
        );
        Ok(buffer)
    }

    fn add_page(
        &self,
        doc: &mut Document,
        pages_id: ObjectId,
        capture: &CaptureResult,
        page_width: f32,
        page_height: f32,
    ) -> Result<ObjectId> {
        let image = Stream::new(
            dictionary! {
                "Type" => "XObject",
                "Subtype" => "Image",
                "Width" => capture.width as i64,
                "Height" => capture.height as i64,
                "ColorSpace" => "DeviceRGB",
                "BitsPerComponent" => 8,
                "Filter" => "DCTDecode",
            },
            capture.jpeg.clone(),
        )
        .with_compression(false);
        let image_id = doc.add_object(image);

        let (x, y, width, height) = self.placement_box(capture, page_width, page_height);
        let content = Content {
            operations: vec![
                Operation::new("q", vec![]),
                Operation::new(
                    "cm",
                    vec![
                        width.into(),
                        0.0f32.into(),
                        0.0f32.into(),
                        height.into(),
                        x.into(),
                        y.into(),
                    ],
                ),
                Operation::new("Do", vec![Object::Name(b"Im0".to_vec())]),
                Operation::new("Q", vec![]),
            ],
        };
        let encoded = content.encode().map_err(|e| {
            FlyerError::Assembly(format!(
                "Failed to encode content of page {}: {e}",
                capture.page
            ))
        })?;
        let content_id = doc.add_object(Stream::new(dictionary! {}, encoded));

        Ok(doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "MediaBox" => vec![0.0f32.into(), 0.0f32.into(), page_width.into(), page_height.into()],
            "Contents" => content_id,
            "Resources" => dictionary! {
                "XObject" => dictionary! {
                    "Im0" => image_id,
                },
            },
        }))
    }

    /// Image rectangle `(x, y, width, height)` in points, origin bottom-left
    fn placement_box(
        &self,
        capture: &CaptureResult,
        page_width: f32,
        page_height: f32,
    ) -> (f32, f32, f32, f32) {
        match self.placement {
            PdfPlacement::Stretch => (0.0, 0.0, page_width, page_height),
            PdfPlacement::Contain => {
                let scale = (page_width / capture.width as f32)
                    .min(page_height / capture.height as f32);
                let width = capture.width as f32 * scale;
                let height = capture.height as f32 * scale;
                (
                    (page_width - width) / 2.0,
                    (page_height - height) / 2.0,
                    width,
                    height,
                )
            }
        }
    }
}

/// Assembles captures onto `page_size` pages, each raster filling its page
pub fn assemble(captures: &[CaptureResult], page_size: PageSize) -> Result<Vec<u8>> {
    PdfAssembler::new(page_size).assemble(captures)
}
