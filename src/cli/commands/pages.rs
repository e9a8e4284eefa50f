//! Pages command implementation
//!
//! This module implements the `pages` command, which lists the logical pages
//! an export of a document would produce.

use crate::core::discovery::discover_pages;
use crate::domain::LiveDocument;
use clap::Args;
use std::path::PathBuf;

/// Arguments for the pages command
#[derive(Args, Debug)]
pub struct PagesArgs {
    /// Flyer document (SVG)
    pub input: PathBuf,

    /// Inspect the subtree with this element id instead of the whole document
    #[arg(long, value_name = "ID")]
    pub root: Option<String>,
}

impl PagesArgs {
    /// Execute the pages command
    pub async fn execute(&self) -> anyhow::Result<i32> {
        let document = match LiveDocument::from_file(&self.input).await {
            Ok(document) => document,
            Err(e) => {
                eprintln!("Failed to load document: {e}");
                return Ok(4);
            }
        };
        let root = match &self.root {
            Some(id) => match document.select(id) {
                Ok(root) => root,
                Err(e) => {
                    eprintln!("{e}");
                    return Ok(4);
                }
            },
            None => document.root(),
        };

        let pages = discover_pages(root);
        println!("📄 {} page(s) in {}", pages.len(), self.input.display());
        for page in &pages {
            let size = page
                .content()
                .natural_size()
                .or_else(|| page.node.natural_size())
                .map(|(w, h)| format!("{w}x{h}"))
                .unwrap_or_else(|| "no layout size".to_string());
            let id = page.node.attr("id").unwrap_or("-");
            println!("  {:>3}. <{}> id={} size={}", page.number.get(), page.node.name(), id, size);
        }

        Ok(0)
    }
}
