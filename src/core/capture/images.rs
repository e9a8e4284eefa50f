//! Image loading and inlining
//!
//! External `<image>` references are loaded, decoded to validate them and
//! inlined as `data:` URIs so a snapshot is self-contained.

use crate::domain::document::Node;
use crate::domain::errors::CaptureError;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use image::ImageFormat;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

const HREF_ATTRIBUTES: &[&str] = &["href", "xlink:href"];

/// An image that loaded and decoded successfully
#[derive(Debug, Clone)]
pub struct DecodedImage {
    /// MIME type of the encoded bytes
    pub mime: &'static str,
    /// Pixel width
    pub width: u32,
    /// Pixel height
    pub height: u32,
    /// Original encoded bytes
    pub bytes: Vec<u8>,
}

impl DecodedImage {
    /// The image as a base64 `data:` URI
    pub fn to_data_uri(&self) -> String {
        format!("data:{};base64,{}", self.mime, STANDARD.encode(&self.bytes))
    }
}

/// Loads an image reference and decodes it
///
/// Relative paths resolve against `base_dir`. Remote URLs are not fetched.
///
/// # Errors
///
/// Returns [`CaptureError::ImageDecode`] naming the reference when the file
/// cannot be read or does not decode as a supported image.
pub async fn load_and_decode(
    href: &str,
    base_dir: Option<&Path>,
) -> Result<DecodedImage, CaptureError> {
    let decode_error = |reason: String| CaptureError::ImageDecode {
        href: href.to_string(),
        reason,
    };

    if href.starts_with("http://") || href.starts_with("https://") {
        return Err(decode_error("remote images are not supported".to_string()));
    }

    let path = resolve(href, base_dir);
    let bytes = tokio::fs::read(&path)
        .await
        .map_err(|e| decode_error(format!("{}: {e}", path.display())))?;

    tokio::task::spawn_blocking(move || decode(bytes))
        .await
        .map_err(|e| decode_error(format!("Task join error: {e}")))?
        .map_err(decode_error)
}

fn resolve(href: &str, base_dir: Option<&Path>) -> PathBuf {
    let raw = Path::new(href.strip_prefix("file://").unwrap_or(href));
    match base_dir {
        Some(base) if raw.is_relative() => base.join(raw),
        _ => raw.to_path_buf(),
    }
}

fn decode(bytes: Vec<u8>) -> Result<DecodedImage, String> {
    let format = image::guess_format(&bytes).map_err(|e| e.to_string())?;
    let mime = match format {
        ImageFormat::Png => "image/png",
        ImageFormat::Jpeg => "image/jpeg",
        other => return Err(format!("unsupported image format {other:?}")),
    };
    let decoded = image::load_from_memory_with_format(&bytes, format).map_err(|e| e.to_string())?;
    Ok(DecodedImage {
        mime,
        width: decoded.width(),
        height: decoded.height(),
        bytes,
    })
}

fn external_href(node: &Node) -> Option<(&'static str, &str)> {
    if node.name() != "image" {
        return None;
    }
    HREF_ATTRIBUTES.iter().find_map(|attribute| {
        node.attr(attribute)
            .filter(|value| !value.starts_with("data:") && !value.trim().is_empty())
            .map(|value| (*attribute, value))
    })
}

/// Inlines every external image reference under `node`
///
/// Each distinct reference is loaded once. Returns the number of distinct
/// images inlined.
pub async fn inline_images(node: &mut Node, base_dir: Option<&Path>) -> Result<usize, CaptureError> {
    let mut hrefs: Vec<String> = Vec::new();
    for candidate in std::iter::once(&*node).chain(node.descendants()) {
        if let Some((_, href)) = external_href(candidate) {
            if !hrefs.iter().any(|seen| seen == href) {
                hrefs.push(href.to_string());
            }
        }
    }

    let mut inlined = HashMap::with_capacity(hrefs.len());
    for href in hrefs {
        let image = load_and_decode(&href, base_dir).await?;
        tracing::trace!(%href, width = image.width, height = image.height, "Inlined image");
        inlined.insert(href, image.to_data_uri());
    }

    node.walk_mut(&mut |element| {
        let replacement = external_href(element)
            .and_then(|(attribute, href)| inlined.get(href).map(|uri| (attribute, uri.clone())));
        if let Some((attribute, uri)) = replacement {
            element.set_attr(attribute, uri);
        }
    });

    Ok(inlined.len())
}
