//! Export font embedding
//!
//! Export fonts are loaded once from configured files and travel with every
//! page snapshot, so rasterization never depends on host-installed fonts.

use crate::adapters::host::FontReadiness;
use crate::domain::document::Node;
use crate::domain::errors::FlyerError;
use crate::domain::Result;
use async_trait::async_trait;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::OnceCell;

/// Class added to the root of a clone whose text uses the export font
pub const FONT_TARGET_CLASS: &str = "font-injection-target";

/// Attribute tagging the injected font style element
pub const EXPORT_FONT_ATTRIBUTE: &str = "data-export-font";

/// Raw font file loaded for export
#[derive(Debug, Clone)]
pub struct FontAsset {
    /// File name the font was loaded from
    pub name: String,
    /// Font file contents (TTF/OTF)
    pub data: Arc<Vec<u8>>,
}

/// Lazily loaded set of export fonts
///
/// Files are read on the first [`FontReadiness::ready`] call; later calls
/// reuse the loaded assets.
#[derive(Debug)]
pub struct FontLibrary {
    files: Vec<PathBuf>,
    loaded: OnceCell<Arc<[FontAsset]>>,
}

impl FontLibrary {
    /// Creates a library over the given font files
    pub fn new(files: Vec<PathBuf>) -> Self {
        Self {
            files,
            loaded: OnceCell::new(),
        }
    }

    /// A library with no fonts; always ready
    pub fn empty() -> Self {
        Self::new(Vec::new())
    }

    /// Whether the fonts have already been loaded
    pub fn is_loaded(&self) -> bool {
        self.loaded.initialized()
    }

    async fn load(&self) -> Result<Arc<[FontAsset]>> {
        let mut assets = Vec::with_capacity(self.files.len());
        for path in &self.files {
            let data = tokio::fs::read(path).await.map_err(|e| {
                FlyerError::Configuration(format!(
                    "Failed to load export font {}: {e}",
                    path.display()
                ))
            })?;
            let name = path
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_else(|| path.display().to_string());
            tracing::debug!(font = %name, bytes = data.len(), "Loaded export font");
            assets.push(FontAsset {
                name,
                data: Arc::new(data),
            });
        }
        Ok(assets.into())
    }
}

#[async_trait]
impl FontReadiness for FontLibrary {
    async fn ready(&self) -> Result<Arc<[FontAsset]>> {
        let assets = self.loaded.get_or_try_init(|| self.load()).await?;
        Ok(Arc::clone(assets))
    }
}

/// Forces the export font family onto a cloned page
///
/// The clone root is tagged and receives a scoped style rule; text-bearing
/// elements also get an explicit `font-family` attribute.
pub fn inject_export_fonts(clone: &mut Node, family: &str) {
    clone.add_class(FONT_TARGET_CLASS);

    let rule = format!(".{FONT_TARGET_CLASS} * {{ font-family: '{family}', sans-serif; }}");
    let style = Node::new("style")
        .with_attr(EXPORT_FONT_ATTRIBUTE, family)
        .with_text(rule);
    clone.prepend_child(style);

    let stack = format!("'{family}', sans-serif");
    clone.walk_mut(&mut |node| {
        if node.is_text_content() {
            node.set_attr("font-family", stack.as_str());
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_empty_library_is_ready() {
        let library = FontLibrary::empty();
        let assets = library.ready().await.unwrap();
        assert!(assets.is_empty());
        assert!(library.is_loaded());
    }

    #[tokio::test]
    async fn test_fonts_are_loaded_once() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("Anton-Regular.ttf");
        std::fs::write(&path, b"not really a font").unwrap();

        let library = FontLibrary::new(vec![path.clone()]);
        let first = library.ready().await.unwrap();
        assert_eq!(first.len(), 1);
        assert_eq!(first[0].name, "Anton-Regular.ttf");

        std::fs::remove_file(&path).unwrap();
        let second = library.ready().await.unwrap();
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[tokio::test]
    async fn test_missing_font_file_is_an_error() {
        let library = FontLibrary::new(vec![PathBuf::from("/nonexistent/font.ttf")]);
        let err = library.ready().await.unwrap_err();
        assert!(matches!(err, FlyerError::Configuration(_)));
        assert!(err.to_string().contains("font.ttf"));
        assert!(!library.is_loaded());
    }

    #[test]
    fn test_inject_export_fonts() {
        let mut clone = Node::new("svg").with_child(
            Node::new("g").with_child(Node::new("text").with_child(Node::new("tspan"))),
        );
        inject_export_fonts(&mut clone, "Anton");

        assert!(clone.has_class(FONT_TARGET_CLASS));
        let style = clone.elements().next().unwrap();
        assert_eq!(style.name(), "style");
        assert_eq!(style.attr(EXPORT_FONT_ATTRIBUTE), Some("Anton"));
        assert!(style.text().contains("font-family: 'Anton'"));

        let tspan = clone.find_descendant(|n| n.name() == "tspan").unwrap();
        assert_eq!(tspan.attr("font-family"), Some("'Anton', sans-serif"));
        let group = clone.find_descendant(|n| n.name() == "g").unwrap();
        assert!(!group.has_attr("font-family"));
    }
}
