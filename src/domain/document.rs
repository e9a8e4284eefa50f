//! Flyer document tree
//!
//! A flyer document is SVG markup parsed into an owned, immutable element
//! tree. Pages are nested `<svg>` elements carrying a page marker; the
//! exportable area of a page carries the clean-content marker.
//!
//! The [`LiveDocument`] also tracks the host-visible state an export must
//! leave untouched: attached off-screen sandboxes and the scroll position.

use crate::domain::errors::FlyerError;
use crate::domain::result::Result;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard};

/// Class marking an element as a logical flyer page
pub const PAGE_CLASS: &str = "flyer-page";

/// Attribute marking an element as a logical flyer page
pub const PAGE_ATTRIBUTE: &str = "data-flyer-page";

/// Class marking the exportable region of a page
pub const CONTENT_CLASS: &str = "flyer-content";

/// Attribute naming elements that receive export-only styling
pub const PRINT_ELEMENT_ATTRIBUTE: &str = "data-print-element";

/// Elements whose text runs, including whitespace, are rendered
pub const TEXT_CONTENT_ELEMENTS: &[&str] = &["text", "tspan", "textPath"];

/// A child of an element: another element or a text run
#[derive(Debug, Clone, PartialEq)]
pub enum Child {
    /// Nested element
    Element(Node),
    /// Character data
    Text(String),
}

/// An element of the document tree
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    name: String,
    attributes: Vec<(String, String)>,
    children: Vec<Child>,
}

impl Node {
    /// Creates an element with no attributes or children
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Builder-style attribute setter
    pub fn with_attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.set_attr(name, value);
        self
    }

    /// Builder-style child element append
    pub fn with_child(mut self, child: Node) -> Self {
        self.children.push(Child::Element(child));
        self
    }

    /// Builder-style text append
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.children.push(Child::Text(text.into()));
        self
    }

    /// Element name, including any namespace prefix
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Attributes in document order
    pub fn attributes(&self) -> &[(String, String)] {
        &self.attributes
    }

    /// Value of an attribute
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// Whether an attribute is present
    pub fn has_attr(&self, name: &str) -> bool {
        self.attr(name).is_some()
    }

    /// Sets an attribute, replacing any existing value
    pub fn set_attr(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.attributes.iter_mut().find(|(key, _)| *key == name) {
            Some(slot) => slot.1 = value,
            None => self.attributes.push((name, value)),
        }
    }

    /// Removes an attribute, returning its previous value
    pub fn remove_attr(&mut self, name: &str) -> Option<String> {
        let position = self.attributes.iter().position(|(key, _)| key == name)?;
        Some(self.attributes.remove(position).1)
    }

    /// Whitespace-separated entries of the `class` attribute
    pub fn classes(&self) -> impl Iterator<Item = &str> {
        self.attr("class").unwrap_or_default().split_whitespace()
    }

    /// Whether the `class` attribute contains `class`
    pub fn has_class(&self, class: &str) -> bool {
        self.classes().any(|c| c == class)
    }

    /// Appends a class if not already present
    pub fn add_class(&mut self, class: &str) {
        if self.has_class(class) {
            return;
        }
        let joined = match self.attr("class") {
            Some(existing) if !existing.trim().is_empty() => format!("{} {class}", existing.trim()),
            _ => class.to_string(),
        };
        self.set_attr("class", joined);
    }

    /// Children in document order
    pub fn children(&self) -> &[Child] {
        &self.children
    }

    /// Inserts an element before all existing children
    pub fn prepend_child(&mut self, child: Node) {
        self.children.insert(0, Child::Element(child));
    }

    /// Element children in document order
    pub fn elements(&self) -> impl Iterator<Item = &Node> {
        self.children.iter().filter_map(|child| match child {
            Child::Element(node) => Some(node),
            Child::Text(_) => None,
        })
    }

    /// Concatenated text of direct text children
    pub fn text(&self) -> String {
        self.children
            .iter()
            .filter_map(|child| match child {
                Child::Text(text) => Some(text.as_str()),
                Child::Element(_) => None,
            })
            .collect()
    }

    /// All descendant elements in document (pre-)order, excluding `self`
    pub fn descendants(&self) -> Vec<&Node> {
        let mut out = Vec::new();
        collect_descendants(self, &mut out);
        out
    }

    /// First descendant matching the predicate, in document order
    pub fn find_descendant(&self, predicate: impl Fn(&Node) -> bool + Copy) -> Option<&Node> {
        for child in self.elements() {
            if predicate(child) {
                return Some(child);
            }
            if let Some(found) = child.find_descendant(predicate) {
                return Some(found);
            }
        }
        None
    }

    /// Mutable variant of [`Node::find_descendant`], also testing `self`
    pub fn find_mut(&mut self, predicate: impl Fn(&Node) -> bool + Copy) -> Option<&mut Node> {
        if predicate(self) {
            return Some(self);
        }
        for child in self.children.iter_mut() {
            if let Child::Element(node) = child {
                if let Some(found) = node.find_mut(predicate) {
                    return Some(found);
                }
            }
        }
        None
    }

    /// Applies `visit` to `self` and every descendant element
    pub fn walk_mut(&mut self, visit: &mut impl FnMut(&mut Node)) {
        visit(self);
        for child in self.children.iter_mut() {
            if let Child::Element(node) = child {
                node.walk_mut(visit);
            }
        }
    }

    /// Whether the element carries the page marker
    pub fn is_page(&self) -> bool {
        self.has_class(PAGE_CLASS) || self.has_attr(PAGE_ATTRIBUTE)
    }

    /// Whether the element renders its text runs
    pub fn is_text_content(&self) -> bool {
        TEXT_CONTENT_ELEMENTS.contains(&self.name.as_str())
    }

    /// Whether the element carries the clean-content marker
    pub fn is_clean_content(&self) -> bool {
        self.has_class(CONTENT_CLASS)
    }

    /// Natural (un-scaled) size in CSS pixels
    ///
    /// Taken from `width`/`height`, falling back to the `viewBox` extent.
    /// Returns `None` unless both dimensions are positive.
    pub fn natural_size(&self) -> Option<(f32, f32)> {
        let from_view_box = self.attr("viewBox").and_then(parse_view_box);
        let width = self
            .attr("width")
            .and_then(parse_length)
            .or(from_view_box.map(|(w, _)| w))?;
        let height = self
            .attr("height")
            .and_then(parse_length)
            .or(from_view_box.map(|(_, h)| h))?;
        (width > 0.0 && height > 0.0).then_some((width, height))
    }

    /// Serializes the element and its subtree as XML markup
    pub fn to_markup(&self) -> String {
        let mut out = String::new();
        write_node(self, &mut out);
        out
    }
}

fn collect_descendants<'a>(node: &'a Node, out: &mut Vec<&'a Node>) {
    for child in node.elements() {
        out.push(child);
        collect_descendants(child, out);
    }
}

fn write_node(node: &Node, out: &mut String) {
    out.push('<');
    out.push_str(&node.name);
    for (key, value) in &node.attributes {
        out.push(' ');
        out.push_str(key);
        out.push_str("=\"");
        out.push_str(&quick_xml::escape::escape(value.as_str()));
        out.push('"');
    }
    if node.children.is_empty() {
        out.push_str("/>");
        return;
    }
    out.push('>');
    for child in &node.children {
        match child {
            Child::Element(element) => write_node(element, out),
            Child::Text(text) => out.push_str(&quick_xml::escape::escape(text.as_str())),
        }
    }
    out.push_str("</");
    out.push_str(&node.name);
    out.push('>');
}

/// Parses a length attribute expressed in user units or `px`
fn parse_length(raw: &str) -> Option<f32> {
    let raw = raw.trim();
    let number = raw.strip_suffix("px").unwrap_or(raw).trim();
    number.parse::<f32>().ok().filter(|value| value.is_finite())
}

fn parse_view_box(raw: &str) -> Option<(f32, f32)> {
    let parts: Vec<f32> = raw
        .split(|c: char| c.is_whitespace() || c == ',')
        .filter(|part| !part.is_empty())
        .map(str::parse)
        .collect::<std::result::Result<_, _>>()
        .ok()?;
    match parts.as_slice() {
        [_, _, width, height] => Some((*width, *height)),
        _ => None,
    }
}

/// Parses SVG markup into an element tree
///
/// Comments, processing instructions and the XML declaration are dropped;
/// whitespace-only text runs are discarded.
///
/// # Errors
///
/// Returns [`FlyerError::Document`] for malformed markup, multiple root
/// elements or a document without a root element.
pub fn parse_markup(markup: &str) -> Result<Node> {
    let mut reader = Reader::from_str(markup);
    let mut stack: Vec<Node> = Vec::new();
    let mut root: Option<Node> = None;

    loop {
        let event = reader.read_event().map_err(|e| {
            FlyerError::Document(format!(
                "Malformed markup near byte {}: {e}",
                reader.buffer_position()
            ))
        })?;

        match event {
            Event::Start(start) => stack.push(element_from(&start)?),
            Event::Empty(start) => {
                let node = element_from(&start)?;
                attach(&mut stack, &mut root, node)?;
            }
            Event::End(_) => {
                let node = stack
                    .pop()
                    .ok_or_else(|| FlyerError::Document("Unexpected closing tag".to_string()))?;
                attach(&mut stack, &mut root, node)?;
            }
            Event::Text(text) => {
                let text = text
                    .unescape()
                    .map_err(|e| FlyerError::Document(format!("Invalid text content: {e}")))?;
                push_text(&mut stack, &text);
            }
            Event::CData(data) => {
                let bytes = data.into_inner();
                push_text(&mut stack, &String::from_utf8_lossy(&bytes));
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if let Some(open) = stack.last() {
        return Err(FlyerError::Document(format!(
            "Unclosed element <{}>",
            open.name()
        )));
    }

    root.ok_or_else(|| FlyerError::Document("Document has no root element".to_string()))
}

fn element_from(start: &BytesStart<'_>) -> Result<Node> {
    let mut node = Node::new(String::from_utf8_lossy(start.name().as_ref()).into_owned());
    for attribute in start.attributes() {
        let attribute =
            attribute.map_err(|e| FlyerError::Document(format!("Invalid attribute: {e}")))?;
        let key = String::from_utf8_lossy(attribute.key.as_ref()).into_owned();
        let value = attribute
            .unescape_value()
            .map_err(|e| FlyerError::Document(format!("Invalid attribute value: {e}")))?;
        node.attributes.push((key, value.into_owned()));
    }
    Ok(node)
}

fn attach(stack: &mut [Node], root: &mut Option<Node>, node: Node) -> Result<()> {
    if let Some(parent) = stack.last_mut() {
        parent.children.push(Child::Element(node));
        return Ok(());
    }
    if root.is_some() {
        return Err(FlyerError::Document(
            "Document has more than one root element".to_string(),
        ));
    }
    *root = Some(node);
    Ok(())
}

// Whitespace-only runs are layout noise between structural elements but
// separate words inside text content.
fn push_text(stack: &mut [Node], text: &str) {
    let Some(parent) = stack.last_mut() else {
        return;
    };
    if text.trim().is_empty() && !parent.is_text_content() {
        return;
    }
    parent.children.push(Child::Text(text.to_string()));
}

/// Viewport scroll offset of the host document
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ScrollPosition {
    /// Horizontal offset
    pub x: f32,
    /// Vertical offset
    pub y: f32,
}

/// Identifier of an attached off-screen sandbox
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SandboxId(u64);

/// Placement of an attached sandbox container
#[derive(Debug, Clone, PartialEq)]
pub struct SandboxRecord {
    /// Sandbox identifier
    pub id: SandboxId,
    /// Left offset, outside the visible viewport
    pub left: f32,
    /// Top offset, outside the visible viewport
    pub top: f32,
    /// Container width (the page's natural width)
    pub width: f32,
    /// Container height (the page's natural height)
    pub height: f32,
}

/// A mounted flyer document
///
/// The element tree is immutable for the document's lifetime; exports only
/// read and clone it. Sandbox and scroll state use short-lived locks that
/// are never held across an `.await`.
#[derive(Debug)]
pub struct LiveDocument {
    root: Node,
    base_dir: Option<PathBuf>,
    sandboxes: Mutex<Vec<SandboxRecord>>,
    scroll: Mutex<ScrollPosition>,
    next_sandbox: AtomicU64,
}

impl LiveDocument {
    /// Mounts an already-built element tree
    pub fn new(root: Node) -> Self {
        Self {
            root,
            base_dir: None,
            sandboxes: Mutex::new(Vec::new()),
            scroll: Mutex::new(ScrollPosition::default()),
            next_sandbox: AtomicU64::new(1),
        }
    }

    /// Parses and mounts SVG markup
    pub fn parse(markup: &str) -> Result<Self> {
        Ok(Self::new(parse_markup(markup)?))
    }

    /// Reads, parses and mounts a document file
    ///
    /// Relative image references resolve against the file's directory.
    pub async fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let markup = tokio::fs::read_to_string(path).await.map_err(|e| {
            FlyerError::Document(format!("Failed to read {}: {e}", path.display()))
        })?;
        let mut document = Self::parse(&markup)?;
        document.base_dir = path.parent().map(Path::to_path_buf);
        Ok(document)
    }

    /// Sets the directory relative image references resolve against
    pub fn with_base_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.base_dir = Some(dir.into());
        self
    }

    /// Directory relative image references resolve against
    pub fn base_dir(&self) -> Option<&Path> {
        self.base_dir.as_deref()
    }

    /// Root element of the tree
    pub fn root_node(&self) -> &Node {
        &self.root
    }

    /// Handle on the whole document
    pub fn root(&self) -> RenderRoot<'_> {
        RenderRoot {
            document: self,
            node: &self.root,
        }
    }

    /// Handle on the subtree whose `id` attribute equals `id`
    pub fn select(&self, id: &str) -> Result<RenderRoot<'_>> {
        let node = if self.root.attr("id") == Some(id) {
            Some(&self.root)
        } else {
            self.root.find_descendant(|node| node.attr("id") == Some(id))
        };
        node.map(|node| RenderRoot {
            document: self,
            node,
        })
        .ok_or_else(|| FlyerError::Document(format!("No element with id '{id}'")))
    }

    /// Top-level `<style>` and `<defs>` elements shared by every page
    pub fn shared_resources(&self) -> impl Iterator<Item = &Node> {
        self.root
            .elements()
            .filter(|node| matches!(node.name(), "style" | "defs"))
    }

    /// Current scroll position
    pub fn scroll_position(&self) -> ScrollPosition {
        *lock(&self.scroll)
    }

    /// Scrolls the viewport
    pub fn scroll_to(&self, position: ScrollPosition) {
        *lock(&self.scroll) = position;
    }

    /// Number of sandboxes currently attached
    pub fn attached_sandboxes(&self) -> usize {
        lock(&self.sandboxes).len()
    }

    pub(crate) fn attach_sandbox(&self, width: f32, height: f32, offset: f32) -> SandboxId {
        let id = SandboxId(self.next_sandbox.fetch_add(1, Ordering::Relaxed));
        lock(&self.sandboxes).push(SandboxRecord {
            id,
            left: offset,
            top: offset,
            width,
            height,
        });
        id
    }

    pub(crate) fn detach_sandbox(&self, id: SandboxId) {
        lock(&self.sandboxes).retain(|record| record.id != id);
    }

    pub(crate) fn sandbox(&self, id: SandboxId) -> Option<SandboxRecord> {
        lock(&self.sandboxes)
            .iter()
            .find(|record| record.id == id)
            .cloned()
    }
}

// A poisoned lock still holds consistent data here: every critical section
// is a single push/retain/assignment.
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Borrowed handle on a mounted subtree (the whole document or one page)
#[derive(Debug, Clone, Copy)]
pub struct RenderRoot<'a> {
    /// Document the subtree belongs to
    pub document: &'a LiveDocument,
    /// Root element of the subtree
    pub node: &'a Node,
}

impl RenderRoot<'_> {
    /// Whether this handle covers the document root
    pub fn is_document_root(&self) -> bool {
        std::ptr::eq(self.node, self.document.root_node())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TWO_PAGES: &str = r#"<?xml version="1.0"?>
<svg xmlns="http://www.w3.org/2000/svg" id="flyer" width="800" height="2400">
  <style>.export-price { fill: #c00; }</style>
  <!-- toolbar is not part of any page -->
  <svg class="flyer-page" data-flyer-page="1" width="794" height="1123" x="0" y="0">
    <svg class="flyer-content" width="794" height="1123">
      <text x="10" y="40" data-print-element="product-card-price">R$ 9,99 &amp; more</text>
    </svg>
  </svg>
  <svg data-flyer-page="2" width="794" height="1123" y="1200"/>
</svg>"#;

    #[test]
    fn test_parse_builds_tree() {
        let root = parse_markup(TWO_PAGES).unwrap();
        assert_eq!(root.name(), "svg");
        assert_eq!(root.attr("id"), Some("flyer"));
        assert_eq!(root.elements().count(), 3);

        let text = root.find_descendant(|n| n.name() == "text").unwrap();
        assert_eq!(text.text(), "R$ 9,99 & more");
    }

    #[test]
    fn test_parse_keeps_whitespace_inside_text() {
        let markup = r#"<svg>
  <text x="4"><tspan>R$</tspan> <tspan>9,99</tspan></text>
  <g>
    <rect/>
  </g>
</svg>"#;
        let root = parse_markup(markup).unwrap();

        let text = root.find_descendant(|n| n.name() == "text").unwrap();
        assert_eq!(text.text(), " ");
        assert_eq!(
            text.to_markup(),
            r#"<text x="4"><tspan>R$</tspan> <tspan>9,99</tspan></text>"#
        );

        // Indentation between structural elements is not kept
        let group = root.find_descendant(|n| n.name() == "g").unwrap();
        assert_eq!(group.to_markup(), "<g><rect/></g>");
        assert_eq!(root.children().len(), 2);
    }

    #[test]
    fn test_parse_rejects_malformed_markup() {
        assert!(parse_markup("<svg><g></svg>").is_err());
        assert!(parse_markup("<svg>").is_err());
        assert!(parse_markup("").is_err());
        assert!(parse_markup("<a/><b/>").is_err());
    }

    #[test]
    fn test_markup_round_trip_preserves_structure() {
        let root = parse_markup(TWO_PAGES).unwrap();
        let reparsed = parse_markup(&root.to_markup()).unwrap();
        assert_eq!(root, reparsed);
    }

    #[test]
    fn test_class_helpers() {
        let mut node = Node::new("g").with_attr("class", "flyer-page  shadow");
        assert!(node.is_page());
        assert!(!node.is_clean_content());

        node.add_class("export-price");
        node.add_class("export-price");
        assert_eq!(node.attr("class"), Some("flyer-page  shadow export-price"));

        let mut bare = Node::new("g");
        bare.add_class("exporting");
        assert_eq!(bare.attr("class"), Some("exporting"));
    }

    #[test]
    fn test_natural_size_sources() {
        let sized = Node::new("svg")
            .with_attr("width", "794px")
            .with_attr("height", "1123");
        assert_eq!(sized.natural_size(), Some((794.0, 1123.0)));

        let view_box = Node::new("svg").with_attr("viewBox", "0 0 400,600");
        assert_eq!(view_box.natural_size(), Some((400.0, 600.0)));

        let relative = Node::new("svg")
            .with_attr("width", "100%")
            .with_attr("height", "100%");
        assert_eq!(relative.natural_size(), None);

        let empty = Node::new("svg").with_attr("width", "0").with_attr("height", "10");
        assert_eq!(empty.natural_size(), None);
    }

    #[test]
    fn test_select_by_id() {
        let document = LiveDocument::parse(TWO_PAGES).unwrap();
        assert!(document.select("flyer").unwrap().is_document_root());
        assert!(document.select("missing").is_err());
    }

    #[test]
    fn test_shared_resources_are_top_level_styles() {
        let document = LiveDocument::parse(TWO_PAGES).unwrap();
        let names: Vec<&str> = document.shared_resources().map(Node::name).collect();
        assert_eq!(names, vec!["style"]);
    }

    #[test]
    fn test_sandbox_bookkeeping() {
        let document = LiveDocument::parse(TWO_PAGES).unwrap();
        let id = document.attach_sandbox(794.0, 1123.0, -9999.0);
        assert_eq!(document.attached_sandboxes(), 1);
        assert_eq!(document.sandbox(id).unwrap().left, -9999.0);

        document.detach_sandbox(id);
        assert_eq!(document.attached_sandboxes(), 0);
    }
}
