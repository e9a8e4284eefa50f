//! SVG rasterizer backed by `resvg`
//!
//! Each snapshot is parsed with `usvg` against a font database holding the
//! snapshot's export fonts, then drawn into a `tiny-skia` pixmap pre-filled
//! with the plan's background.

use crate::adapters::host::Rasterizer;
use crate::core::capture::{PageSnapshot, Raster, RenderPlan};
use crate::domain::errors::CaptureError;
use async_trait::async_trait;
use resvg::tiny_skia::{self, Pixmap, Transform};
use resvg::usvg::{self, fontdb};
use std::sync::Arc;

/// Rasterizes page snapshots on the blocking thread pool
#[derive(Debug, Clone, Copy)]
pub struct ResvgRasterizer {
    load_system_fonts: bool,
}

impl ResvgRasterizer {
    /// Creates a rasterizer
    ///
    /// With `load_system_fonts` off, only the snapshot's own fonts are
    /// available, so output does not vary with the installed fonts.
    pub fn new(load_system_fonts: bool) -> Self {
        Self { load_system_fonts }
    }

    /// Font database for one snapshot, plus the family of its first own font
    ///
    /// Snapshot fonts are loaded before system fonts, so the default family
    /// never depends on what the host has installed.
    fn font_database(&self, snapshot: &PageSnapshot) -> (fontdb::Database, Option<String>) {
        let mut db = fontdb::Database::new();
        for font in snapshot.fonts.iter() {
            db.load_font_data(font.data.as_ref().clone());
        }
        let family = db
            .faces()
            .next()
            .and_then(|face| face.families.first())
            .map(|(family, _)| family.clone());
        if self.load_system_fonts {
            db.load_system_fonts();
        }
        (db, family)
    }

    fn render(&self, snapshot: &PageSnapshot, plan: RenderPlan) -> Result<Raster, CaptureError> {
        let (db, family) = self.font_database(snapshot);
        let mut options = usvg::Options::default();
        options.fontdb = Arc::new(db);
        if let Some(family) = family {
            options.font_family = family;
        }

        let tree = usvg::Tree::from_data(snapshot.markup.as_bytes(), &options).map_err(|e| {
            CaptureError::Snapshot(format!("Failed to parse page {}: {e}", snapshot.page))
        })?;

        let mut pixmap = Pixmap::new(plan.width, plan.height).ok_or_else(|| {
            CaptureError::Rasterize(format!(
                "Cannot allocate a {}x{} canvas",
                plan.width, plan.height
            ))
        })?;
        let background = plan.background;
        pixmap.fill(tiny_skia::Color::from_rgba8(
            background.r,
            background.g,
            background.b,
            255,
        ));

        resvg::render(
            &tree,
            Transform::from_scale(plan.scale, plan.scale),
            &mut pixmap.as_mut(),
        );

        let pixels = pixmap
            .pixels()
            .iter()
            .flat_map(|pixel| {
                let color = pixel.demultiply();
                [color.red(), color.green(), color.blue(), color.alpha()]
            })
            .collect();

        Ok(Raster {
            width: plan.width,
            height: plan.height,
            pixels,
        })
    }
}

impl Default for ResvgRasterizer {
    fn default() -> Self {
        Self::new(true)
    }
}

#[async_trait]
impl Rasterizer for ResvgRasterizer {
    async fn rasterize(
        &self,
        snapshot: Arc<PageSnapshot>,
        plan: RenderPlan,
    ) -> Result<Raster, CaptureError> {
        let rasterizer = *self;
        tokio::task::spawn_blocking(move || rasterizer.render(&snapshot, plan))
            .await
            .map_err(|e| CaptureError::Rasterize(format!("Task join error: {e}")))?
    }
}
