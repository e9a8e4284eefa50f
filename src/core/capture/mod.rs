//! Raster capture engine
//!
//! Turns one logical page into a fixed-size JPEG raster without observable
//! side effects on the live document:
//!
//! 1. attach an off-screen [`Sandbox`](sandbox::Sandbox) sized to the page
//! 2. clone the page and neutralize its positioning
//! 3. tag export-marked elements, select the clean content, inject fonts
//! 4. inline external images and compose a standalone [`PageSnapshot`]
//! 5. rasterize with cover scaling over an opaque background, encode JPEG
//! 6. drop the sandbox, restoring the scroll position
//!
//! Captures run one at a time; the rasterizer and encoder run on the
//! blocking thread pool.

pub mod fonts;
pub mod images;
pub mod sandbox;
pub mod snapshot;

pub use fonts::{FontAsset, FontLibrary};
pub use snapshot::PageSnapshot;

use crate::adapters::host::Rasterizer;
use crate::core::discovery::{clean_content, LogicalPage};
use crate::domain::document::{LiveDocument, Node};
use crate::domain::errors::{CaptureError, FlyerError};
use crate::domain::ids::PageNumber;
use crate::domain::Result;
use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, RgbaImage};
use sandbox::{neutralized_clone, Sandbox};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

/// Default raster width, A4 at 300 dpi
pub const DEFAULT_TARGET_WIDTH: u32 = 2480;

/// Default raster height, A4 at 300 dpi
pub const DEFAULT_TARGET_HEIGHT: u32 = 3508;

/// Default JPEG quality
pub const DEFAULT_JPEG_QUALITY: u8 = 95;

/// Opaque RGB color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const WHITE: Color = Color {
        r: 255,
        g: 255,
        b: 255,
    };
}

impl Default for Color {
    fn default() -> Self {
        Color::WHITE
    }
}

impl FromStr for Color {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let hex = s.trim().strip_prefix('#').unwrap_or(s.trim());
        let channel = |range: std::ops::Range<usize>| {
            hex.get(range)
                .and_then(|digits| u8::from_str_radix(digits, 16).ok())
        };
        match (hex.len(), channel(0..2), channel(2..4), channel(4..6)) {
            (6, Some(r), Some(g), Some(b)) => Ok(Color { r, g, b }),
            _ => Err(format!("Invalid color '{s}'. Expected #rrggbb")),
        }
    }
}

impl TryFrom<String> for Color {
    type Error = String;

    fn try_from(value: String) -> std::result::Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Color> for String {
    fn from(color: Color) -> Self {
        color.to_string()
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

/// Fixed output of every capture
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RasterTarget {
    /// Raster width in pixels
    pub width: u32,
    /// Raster height in pixels
    pub height: u32,
    /// Opaque background
    pub background: Color,
    /// JPEG quality, 1-100
    pub jpeg_quality: u8,
}

impl Default for RasterTarget {
    fn default() -> Self {
        Self {
            width: DEFAULT_TARGET_WIDTH,
            height: DEFAULT_TARGET_HEIGHT,
            background: Color::WHITE,
            jpeg_quality: DEFAULT_JPEG_QUALITY,
        }
    }
}

/// How one snapshot is drawn onto the target canvas
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderPlan {
    /// Canvas width in pixels
    pub width: u32,
    /// Canvas height in pixels
    pub height: u32,
    /// Uniform scale applied from the top-left corner
    pub scale: f32,
    /// Canvas fill
    pub background: Color,
}

impl RenderPlan {
    /// Aspect-preserving cover scale of `natural` onto `target`
    ///
    /// `scale = max(target_w / natural_w, target_h / natural_h)`, so the
    /// content always fills the canvas; overflow is cropped at the right or
    /// bottom edge.
    pub fn cover(natural: (f32, f32), target: &RasterTarget) -> Self {
        let (natural_width, natural_height) = natural;
        let scale_x = target.width as f32 / natural_width;
        let scale_y = target.height as f32 / natural_height;
        Self {
            width: target.width,
            height: target.height,
            scale: scale_x.max(scale_y),
            background: target.background,
        }
    }
}

/// RGBA8 pixels produced by a rasterizer
#[derive(Debug, Clone)]
pub struct Raster {
    pub width: u32,
    pub height: u32,
    /// Row-major, non-premultiplied RGBA
    pub pixels: Vec<u8>,
}

/// Encoded raster of one logical page
#[derive(Debug, Clone)]
pub struct CaptureResult {
    /// Page the raster was captured from
    pub page: PageNumber,
    /// Raster width in pixels
    pub width: u32,
    /// Raster height in pixels
    pub height: u32,
    /// JPEG bytes
    pub jpeg: Vec<u8>,
}

/// Captures pages through an injected [`Rasterizer`]
#[derive(Clone)]
pub struct CaptureEngine {
    rasterizer: Arc<dyn Rasterizer>,
    target: RasterTarget,
    font_family: Option<String>,
}

impl fmt::Debug for CaptureEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CaptureEngine")
            .field("target", &self.target)
            .field("font_family", &self.font_family)
            .finish_non_exhaustive()
    }
}

impl CaptureEngine {
    /// Creates a capture engine
    ///
    /// `font_family`, when set, is forced onto all text of every capture.
    pub fn new(
        rasterizer: Arc<dyn Rasterizer>,
        target: RasterTarget,
        font_family: Option<String>,
    ) -> Self {
        Self {
            rasterizer,
            target,
            font_family,
        }
    }

    /// Fixed output of every capture
    pub fn target(&self) -> &RasterTarget {
        &self.target
    }

    /// Captures one page
    ///
    /// The live document is only read. Any sandbox attached for the capture
    /// is gone, and the scroll position restored, when this returns.
    ///
    /// # Errors
    ///
    /// Returns [`FlyerError::Capture`] carrying the page number.
    pub async fn capture(
        &self,
        document: &LiveDocument,
        page: &LogicalPage<'_>,
        fonts: Arc<[FontAsset]>,
    ) -> Result<CaptureResult> {
        self.capture_page(document, page, fonts)
            .await
            .map_err(|source| FlyerError::capture(page.number, source))
    }

    async fn capture_page(
        &self,
        document: &LiveDocument,
        page: &LogicalPage<'_>,
        fonts: Arc<[FontAsset]>,
    ) -> std::result::Result<CaptureResult, CaptureError> {
        let (width, height) = page.node.natural_size().ok_or_else(|| {
            CaptureError::LayoutNotReady(format!(
                "<{}> has no positive width and height",
                page.node.name()
            ))
        })?;

        let _sandbox = Sandbox::attach(document, width, height);

        let snapshot = self
            .snapshot(document, page, (width, height), fonts)
            .await?;
        let plan = RenderPlan::cover((snapshot.width, snapshot.height), &self.target);
        tracing::debug!(
            page = %page.number,
            natural_width = snapshot.width,
            natural_height = snapshot.height,
            scale = plan.scale,
            "Rasterizing page"
        );

        let raster = self.rasterizer.rasterize(Arc::new(snapshot), plan).await?;
        if (raster.width, raster.height) != (plan.width, plan.height) {
            return Err(CaptureError::Rasterize(format!(
                "expected {}x{} raster, got {}x{}",
                plan.width, plan.height, raster.width, raster.height
            )));
        }

        let quality = self.target.jpeg_quality;
        let (raster_width, raster_height) = (raster.width, raster.height);
        let jpeg = tokio::task::spawn_blocking(move || encode_jpeg(raster, quality))
            .await
            .map_err(|e| CaptureError::Encode(format!("Task join error: {e}")))??;

        Ok(CaptureResult {
            page: page.number,
            width: raster_width,
            height: raster_height,
            jpeg,
        })
    }

    async fn snapshot(
        &self,
        document: &LiveDocument,
        page: &LogicalPage<'_>,
        natural: (f32, f32),
        fonts: Arc<[FontAsset]>,
    ) -> std::result::Result<PageSnapshot, CaptureError> {
        let mut clone = neutralized_clone(page.node, natural.0, natural.1);
        snapshot::apply_print_optimizations(&mut clone);

        let selected = clean_content(&clone);
        let (width, height) = selected.natural_size().unwrap_or(natural);
        let mut content = neutralized_clone(selected, width, height);

        if let Some(family) = &self.font_family {
            fonts::inject_export_fonts(&mut content, family);
        }
        images::inline_images(&mut content, document.base_dir()).await?;

        let mut shared: Vec<Node> = document.shared_resources().cloned().collect();
        for resource in &mut shared {
            images::inline_images(resource, document.base_dir()).await?;
        }

        let markup = snapshot::compose_document(content, &shared, width, height);
        Ok(PageSnapshot {
            page: page.number,
            markup,
            width,
            height,
            fonts,
        })
    }
}

/// Flattens an RGBA raster and encodes it as JPEG
pub fn encode_jpeg(raster: Raster, quality: u8) -> std::result::Result<Vec<u8>, CaptureError> {
    let rgba = RgbaImage::from_raw(raster.width, raster.height, raster.pixels).ok_or_else(|| {
        CaptureError::Encode("pixel buffer does not match raster dimensions".to_string())
    })?;
    let rgb = DynamicImage::ImageRgba8(rgba).to_rgb8();

    let mut jpeg = Vec::new();
    JpegEncoder::new_with_quality(&mut jpeg, quality.clamp(1, 100))
        .encode_image(&rgb)
        .map_err(|e| CaptureError::Encode(e.to_string()))?;
    Ok(jpeg)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_color_parse_and_display() {
        assert_eq!("#ffffff".parse::<Color>().unwrap(), Color::WHITE);
        assert_eq!(
            "1a2B3c".parse::<Color>().unwrap(),
            Color {
                r: 0x1a,
                g: 0x2b,
                b: 0x3c
            }
        );
        assert!("#fff".parse::<Color>().is_err());
        assert!("#gggggg".parse::<Color>().is_err());
        assert_eq!(Color::WHITE.to_string(), "#ffffff");
    }

    #[test]
    fn test_cover_scale_fills_target() {
        let target = RasterTarget::default();

        // A4-proportioned page at 96 dpi: both axes scale alike
        let plan = RenderPlan::cover((794.0, 1123.0), &target);
        assert!((plan.scale - 3.1234).abs() < 0.01);
        assert_eq!((plan.width, plan.height), (2480, 3508));

        // Wide page: height decides, width overflows
        let wide = RenderPlan::cover((1000.0, 1000.0), &target);
        assert!((wide.scale - 3.508).abs() < 1e-4);
        assert!(1000.0 * wide.scale >= 2480.0);
    }

    #[test]
    fn test_encode_jpeg() {
        let raster = Raster {
            width: 4,
            height: 3,
            pixels: [255u8, 255, 255, 255].repeat(12),
        };
        let jpeg = encode_jpeg(raster, 95).unwrap();
        assert_eq!(&jpeg[..2], &[0xFF, 0xD8]);

        let decoded = image::load_from_memory(&jpeg).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (4, 3));
    }

    #[test]
    fn test_encode_jpeg_rejects_short_buffer() {
        let raster = Raster {
            width: 4,
            height: 3,
            pixels: vec![0; 8],
        };
        assert!(matches!(
            encode_jpeg(raster, 95),
            Err(CaptureError::Encode(_))
        ));
    }
}
