//! Off-screen capture sandbox
//!
//! A [`Sandbox`] is attached to the live document for the duration of one
//! capture. Dropping it detaches the container and restores the scroll
//! position recorded at attach time, on every exit path.

use crate::domain::document::{LiveDocument, Node, ScrollPosition, SandboxId};

/// Offset placing the sandbox outside the visible viewport
pub const OFFSCREEN_OFFSET: f32 = -9999.0;

/// Class added to every clone rendered for export
pub const EXPORTING_CLASS: &str = "exporting";

/// Positioning attributes removed from a clone
const POSITIONING_ATTRIBUTES: &[&str] = &["transform", "x", "y"];

/// Positioning properties removed from a clone's inline `style`
const POSITIONING_PROPERTIES: &[&str] = &[
    "transform",
    "translate",
    "position",
    "left",
    "top",
    "right",
    "bottom",
    "inset",
];

/// RAII guard over an attached off-screen container
#[derive(Debug)]
pub struct Sandbox<'a> {
    document: &'a LiveDocument,
    id: SandboxId,
    scroll: ScrollPosition,
}

impl<'a> Sandbox<'a> {
    /// Attaches a container sized to `(width, height)` off-screen
    pub fn attach(document: &'a LiveDocument, width: f32, height: f32) -> Self {
        let scroll = document.scroll_position();
        let id = document.attach_sandbox(width, height, OFFSCREEN_OFFSET);
        tracing::trace!(?id, width, height, "Attached capture sandbox");
        Self {
            document,
            id,
            scroll,
        }
    }

    /// Identifier of the attached container
    pub fn id(&self) -> SandboxId {
        self.id
    }
}

impl Drop for Sandbox<'_> {
    fn drop(&mut self) {
        self.document.detach_sandbox(self.id);
        self.document.scroll_to(self.scroll);
        tracing::trace!(id = ?self.id, "Detached capture sandbox");
    }
}

/// Deep-clones a page and pins it to its natural size
///
/// Transforms and offsets are removed, as attributes and as inline style
/// declarations, so the clone renders at `(width, height)` from the origin.
/// Presentation declarations in `style` are kept.
pub fn neutralized_clone(page: &Node, width: f32, height: f32) -> Node {
    let mut clone = page.clone();
    for attribute in POSITIONING_ATTRIBUTES {
        clone.remove_attr(attribute);
    }
    if let Some(style) = clone.remove_attr("style") {
        let kept = strip_positioning(&style);
        if !kept.is_empty() {
            clone.set_attr("style", kept);
        }
    }
    clone.set_attr("width", width.to_string());
    clone.set_attr("height", height.to_string());
    clone.add_class(EXPORTING_CLASS);
    clone
}

fn strip_positioning(style: &str) -> String {
    style
        .split(';')
        .map(str::trim)
        .filter(|declaration| !declaration.is_empty())
        .filter(|declaration| {
            let property = declaration
                .split_once(':')
                .map_or(*declaration, |(property, _)| property)
                .trim()
                .to_ascii_lowercase();
            !POSITIONING_PROPERTIES.contains(&property.as_str())
        })
        .collect::<Vec<_>>()
        .join("; ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn document() -> LiveDocument {
        LiveDocument::parse(r#"<svg class="flyer-page" width="100" height="200"/>"#).unwrap()
    }

    #[test]
    fn test_sandbox_detaches_on_drop() {
        let document = document();
        {
            let sandbox = Sandbox::attach(&document, 100.0, 200.0);
            assert_eq!(document.attached_sandboxes(), 1);
            let record = document.sandbox(sandbox.id()).unwrap();
            assert_eq!(record.left, OFFSCREEN_OFFSET);
            assert_eq!(record.top, OFFSCREEN_OFFSET);
            assert_eq!((record.width, record.height), (100.0, 200.0));
        }
        assert_eq!(document.attached_sandboxes(), 0);
    }

    #[test]
    fn test_sandbox_restores_scroll_position() {
        let document = document();
        let before = ScrollPosition { x: 3.0, y: 420.0 };
        document.scroll_to(before);
        {
            let _sandbox = Sandbox::attach(&document, 100.0, 200.0);
            document.scroll_to(ScrollPosition { x: 0.0, y: 0.0 });
        }
        assert_eq!(document.scroll_position(), before);
    }

    #[test]
    fn test_sandbox_cleans_up_on_early_return() {
        fn failing(document: &LiveDocument) -> Result<(), String> {
            let _sandbox = Sandbox::attach(document, 1.0, 1.0);
            Err("rasterizer exploded".to_string())
        }
        let document = document();
        assert!(failing(&document).is_err());
        assert_eq!(document.attached_sandboxes(), 0);
    }

    #[test]
    fn test_neutralized_clone() {
        let page = Node::new("svg")
            .with_attr("class", "flyer-page")
            .with_attr("transform", "scale(0.4)")
            .with_attr("x", "12")
            .with_attr("y", "1200")
            .with_attr("style", "position: absolute; fill:#ff0000;LEFT: 3px; transform: scale(2);")
            .with_attr("width", "40%");
        let clone = neutralized_clone(&page, 794.0, 1122.5);

        assert!(!clone.has_attr("transform"));
        assert!(!clone.has_attr("x"));
        assert!(!clone.has_attr("y"));
        assert_eq!(clone.attr("style"), Some("fill:#ff0000"));
        assert_eq!(clone.attr("width"), Some("794"));
        assert_eq!(clone.attr("height"), Some("1122.5"));
        assert!(clone.has_class(EXPORTING_CLASS));
        assert!(page.has_attr("transform"));
    }

    #[test]
    fn test_neutralized_clone_drops_positioning_only_style() {
        let page = Node::new("svg").with_attr("style", "position:fixed; top: 0");
        let clone = neutralized_clone(&page, 10.0, 10.0);
        assert!(!clone.has_attr("style"));
    }
}
