//! PDF rasterisation: render pages to `DynamicImage` via pdfium.
//!
//! ## Why spawn_blocking?
//!
//! The `pdfium-render` crate wraps the pdfium C++ library, which uses
//! thread-local state internally and is not safe to call from async contexts.
//! `tokio::task::spawn_blocking` moves the work onto a dedicated thread pool
//! thread designed for blocking operations, preventing the Tokio worker
//! threads from stalling during CPU-heavy rendering.
//!
//! ## Why one page per call?
//!
//! [`PageRenderer`]'s `render_page` reopens the in-memory document and renders
//! a single page. Reparsing costs a few milliseconds per page, but it means
//! the extraction loop holds exactly one page bitmap at a time — peak memory
//! is bounded by the largest page, not the whole document.

use crate::error::FormScribeError;
use async_trait::async_trait;
use image::DynamicImage;
use pdfium_render::prelude::*;
use std::sync::Arc;
use tracing::{debug, info};

/// A paginated document whose pages can be rasterised one at a time.
///
/// [`PageRenderer`] is the pdfium-backed implementation; the extraction loop
/// only sees this trait, so tests and embedders can substitute synthetic
/// pages without a PDF library on the machine.
#[async_trait]
pub trait PageSource: Send + Sync {
    /// Total number of pages, fixed at open time. Always ≥ 1.
    fn page_count(&self) -> usize;

    /// Rasterise a single page (0-based index).
    ///
    /// Errors carry the 1-based page number.
    async fn render_page(&self, index: usize) -> Result<DynamicImage, FormScribeError>;
}

/// Renders pages of an uploaded PDF in ascending index order.
///
/// Opening validates that the bytes parse as a paginated document and fixes
/// the page count; `render_page` is then called once per index by the
/// extraction loop. A failure on any page aborts the loop — no partial
/// output is returned.
pub struct PageRenderer {
    bytes: Arc<Vec<u8>>,
    dpi: u32,
    max_pixels: u32,
    page_count: usize,
}

impl PageRenderer {
    /// Open a PDF from the upload bytes, validating it parses.
    ///
    /// `dpi` is chosen by the calling pipeline: 150 ahead of the cloud
    /// backend, 300 ahead of the local engine. `max_pixels` caps either
    /// rendered dimension regardless of DPI, so an oversized page cannot
    /// force an enormous bitmap allocation.
    pub async fn open(bytes: &[u8], dpi: u32, max_pixels: u32) -> Result<Self, FormScribeError> {
        let bytes = Arc::new(bytes.to_vec());
        let for_count = Arc::clone(&bytes);

        let page_count = tokio::task::spawn_blocking(move || page_count_blocking(&for_count))
            .await
            .map_err(|e| FormScribeError::Internal(format!("Page-count task panicked: {}", e)))??;

        if page_count == 0 {
            return Err(FormScribeError::CorruptDocument {
                detail: "document has no pages".into(),
            });
        }

        info!("PDF loaded: {} pages, rendering at {} DPI", page_count, dpi);

        Ok(Self {
            bytes,
            dpi,
            max_pixels,
            page_count,
        })
    }
}

#[async_trait]
impl PageSource for PageRenderer {
    fn page_count(&self) -> usize {
        self.page_count
    }

    async fn render_page(&self, index: usize) -> Result<DynamicImage, FormScribeError> {
        let bytes = Arc::clone(&self.bytes);
        let dpi = self.dpi;
        let max_pixels = self.max_pixels;

        tokio::task::spawn_blocking(move || render_page_blocking(&bytes, index, dpi, max_pixels))
            .await
            .map_err(|e| FormScribeError::Internal(format!("Render task panicked: {}", e)))?
    }
}

/// Blocking implementation of page counting.
fn page_count_blocking(bytes: &[u8]) -> Result<usize, FormScribeError> {
    let pdfium = Pdfium::default();
    let document = load_document(&pdfium, bytes)?;
    Ok(document.pages().len() as usize)
}

/// Blocking implementation of single-page rendering.
fn render_page_blocking(
    bytes: &[u8],
    index: usize,
    dpi: u32,
    max_pixels: u32,
) -> Result<DynamicImage, FormScribeError> {
    let pdfium = Pdfium::default();
    let document = load_document(&pdfium, bytes)?;
    let pages = document.pages();

    let page = pages
        .get(index as u16)
        .map_err(|e| FormScribeError::RenderFailed {
            page: index + 1,
            detail: format!("{:?}", e),
        })?;

    // Page dimensions are in points (1/72 inch); scale to the requested DPI.
    // Width drives the scale; pdfium keeps the aspect ratio. Poster-sized
    // pages are clamped so neither dimension exceeds `max_pixels`.
    let target_width = ((page.width().value * dpi as f32 / 72.0).round().max(1.0) as i32)
        .min(max_pixels as i32);
    let render_config = PdfRenderConfig::new()
        .set_target_width(target_width)
        .set_maximum_height(max_pixels as i32);

    let bitmap =
        page.render_with_config(&render_config)
            .map_err(|e| FormScribeError::RenderFailed {
                page: index + 1,
                detail: format!("{:?}", e),
            })?;

    let image = bitmap.as_image();
    debug!(
        "Rendered page {} → {}x{} px",
        index + 1,
        image.width(),
        image.height()
    );

    Ok(image)
}

fn load_document<'a>(
    pdfium: &'a Pdfium,
    bytes: &'a [u8],
) -> Result<PdfDocument<'a>, FormScribeError> {
    pdfium
        .load_pdf_from_byte_slice(bytes, None)
        .map_err(|e| FormScribeError::CorruptDocument {
            detail: format!("{:?}", e),
        })
}
