//! Page discovery
//!
//! Determines the ordered set of logical pages under a render root. Every
//! root yields at least one page.

use crate::domain::document::{Node, RenderRoot};
use crate::domain::ids::PageNumber;

/// One page of the exported flyer
#[derive(Debug, Clone, Copy)]
pub struct LogicalPage<'a> {
    /// 1-based position in document order
    pub number: PageNumber,
    /// Page element, borrowed from the live document
    pub node: &'a Node,
}

impl<'a> LogicalPage<'a> {
    /// Exportable region of the page
    pub fn content(&self) -> &'a Node {
        clean_content(self.node)
    }
}

/// Discovers the logical pages under `root`
///
/// - `root` marked as a page: `[root]`
/// - marked descendants in document order (a page is not searched for
///   nested pages)
/// - otherwise `[root]`
pub fn discover_pages<'a>(root: RenderRoot<'a>) -> Vec<LogicalPage<'a>> {
    if root.node.is_page() {
        return vec![single(root.node)];
    }

    let mut marked = Vec::new();
    collect_pages(root.node, &mut marked);

    if marked.is_empty() {
        tracing::debug!("No page markers found, exporting root as a single page");
        return vec![single(root.node)];
    }

    marked
        .into_iter()
        .enumerate()
        .map(|(index, node)| LogicalPage {
            number: PageNumber::from_index(index),
            node,
        })
        .collect()
}

fn single(node: &Node) -> LogicalPage<'_> {
    LogicalPage {
        number: PageNumber::FIRST,
        node,
    }
}

fn collect_pages<'a>(node: &'a Node, out: &mut Vec<&'a Node>) {
    for child in node.elements() {
        if child.is_page() {
            out.push(child);
        } else {
            collect_pages(child, out);
        }
    }
}

/// Exportable region within a page
///
/// The page itself when it carries the clean-content marker, else its first
/// marked descendant, else the whole page.
pub fn clean_content(page: &Node) -> &Node {
    if page.is_clean_content() {
        return page;
    }
    page.find_descendant(Node::is_clean_content).unwrap_or(page)
}
