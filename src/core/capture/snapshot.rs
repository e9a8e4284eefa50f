//! Self-contained page snapshots
//!
//! A [`PageSnapshot`] is the immutable, renderer-agnostic form of one page:
//! standalone SVG markup plus the font assets it needs.

use crate::core::capture::fonts::FontAsset;
use crate::domain::document::{Node, PRINT_ELEMENT_ATTRIBUTE};
use crate::domain::ids::PageNumber;
use std::sync::Arc;

const SVG_NAMESPACE: &str = "http://www.w3.org/2000/svg";
const XLINK_NAMESPACE: &str = "http://www.w3.org/1999/xlink";

/// Export-marker values and the class each one receives
const PRINT_OVERRIDES: &[(&str, &str)] = &[
    ("product-card-price", "export-price"),
    ("product-card-multiple-price", "export-multiple-price"),
];

/// Immutable snapshot of a renderable page
#[derive(Debug, Clone)]
pub struct PageSnapshot {
    /// Page the snapshot was taken from
    pub page: PageNumber,
    /// Standalone SVG document
    pub markup: String,
    /// Natural width of the exported content
    pub width: f32,
    /// Natural height of the exported content
    pub height: f32,
    /// Fonts the markup refers to
    pub fonts: Arc<[FontAsset]>,
}

/// Tags elements carrying a known export marker with their export class
///
/// Returns the number of elements tagged.
pub fn apply_print_optimizations(root: &mut Node) -> usize {
    let mut tagged = 0;
    root.walk_mut(&mut |node| {
        let class = node.attr(PRINT_ELEMENT_ATTRIBUTE).and_then(|marker| {
            PRINT_OVERRIDES
                .iter()
                .find(|(value, _)| *value == marker)
                .map(|(_, class)| *class)
        });
        if let Some(class) = class {
            node.add_class(class);
            tagged += 1;
        }
    });
    tagged
}

/// Wraps exported content into a standalone SVG document
///
/// Document-scoped resources (top-level styles and definitions) come first
/// so the content's class-based styling still applies.
pub fn compose_document<'a>(
    content: Node,
    shared: impl IntoIterator<Item = &'a Node>,
    width: f32,
    height: f32,
) -> String {
    let mut root = Node::new("svg")
        .with_attr("xmlns", SVG_NAMESPACE)
        .with_attr("xmlns:xlink", XLINK_NAMESPACE)
        .with_attr("width", width.to_string())
        .with_attr("height", height.to_string())
        .with_attr("viewBox", format!("0 0 {width} {height}"));
    for resource in shared {
        root = root.with_child(resource.clone());
    }
    root.with_child(content).to_markup()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::document::parse_markup;

    #[test]
    fn test_print_optimizations_tag_known_markers() {
        let mut root = Node::new("svg")
            .with_child(Node::new("text").with_attr(PRINT_ELEMENT_ATTRIBUTE, "product-card-price"))
            .with_child(
                Node::new("g")
                    .with_attr("class", "card")
                    .with_attr(PRINT_ELEMENT_ATTRIBUTE, "product-card-multiple-price"),
            )
            .with_child(Node::new("text").with_attr(PRINT_ELEMENT_ATTRIBUTE, "product-card-name"));

        assert_eq!(apply_print_optimizations(&mut root), 2);

        let classes: Vec<Option<&str>> = root.elements().map(|n| n.attr("class")).collect();
        assert_eq!(
            classes,
            vec![Some("export-price"), Some("card export-multiple-price"), None]
        );
    }

    #[test]
    fn test_compose_document_is_standalone() {
        let style = Node::new("style").with_text(".export-price{fill:red}");
        let content = Node::new("g").with_child(Node::new("rect"));
        let markup = compose_document(content, [&style], 794.0, 1123.0);

        let parsed = parse_markup(&markup).unwrap();
        assert_eq!(parsed.attr("xmlns"), Some(SVG_NAMESPACE));
        assert_eq!(parsed.attr("viewBox"), Some("0 0 794 1123"));
        assert_eq!(parsed.natural_size(), Some((794.0, 1123.0)));
        let names: Vec<&str> = parsed.elements().map(Node::name).collect();
        assert_eq!(names, vec!["style", "g"]);
    }
}
