//! Document-to-text extraction: the orchestration of upload → pages → text.
//!
//! The per-request lifecycle is a straight line:
//!
//! ```text
//! Received → Validated → {Render → Encode → Backend}* per page → Aggregated
//! ```
//!
//! Pages are processed strictly sequentially — one rendered image in flight
//! at a time — which bounds peak memory and avoids bursts of concurrent
//! calls against a rate-limited API. Any stage failure on any page aborts
//! the whole document: there is no partial result and no retry.

use crate::config::{PipelineConfig, DEFAULT_MAX_RENDERED_PIXELS};
use crate::document::{DocumentKind, UploadedDocument};
use crate::error::FormScribeError;
use crate::pipeline::aggregate::{aggregate, PageText};
use crate::pipeline::backend::{self, OcrBackend};
use crate::pipeline::encode::EncodedPage;
use crate::pipeline::render::{PageRenderer, PageSource};
use serde::Serialize;
use std::time::Instant;
use tracing::{debug, info};

/// Whole-document extraction output, owned by the requesting context only.
#[derive(Debug, Clone, Serialize)]
pub struct ExtractionResult {
    /// Per-page text in ascending page order.
    pub pages: Vec<PageText>,
    /// Aggregated document text (see [`aggregate`] for the marker rule).
    pub text: String,
    /// Number of pages recognised. Always ≥ 1.
    pub page_count: usize,
}

/// The JSON body a hosting API returns for a successful cloud extraction.
///
/// The local-engine variant returns [`ExtractionResult::text`] as a raw text
/// body instead.
#[derive(Debug, Clone, Serialize)]
pub struct ExtractResponse {
    pub text: String,
}

impl From<ExtractionResult> for ExtractResponse {
    fn from(result: ExtractionResult) -> Self {
        Self { text: result.text }
    }
}

/// Extract text from an uploaded document using the configured backend.
///
/// This is the primary extraction entry point. Backend construction happens
/// first, so a missing credential fails before any rendering work.
///
/// # Errors
/// * Validation failures were already rejected by [`UploadedDocument::new`].
/// * [`FormScribeError::ProviderNotConfigured`] — cloud backend, no credential.
/// * [`FormScribeError::CorruptDocument`] — a `.pdf` upload pdfium cannot open.
/// * [`FormScribeError::RenderFailed`] / [`FormScribeError::EncodeFailed`] /
///   [`FormScribeError::ExtractionFailed`] — per-page failures, each carrying
///   the 1-based page number; any of them aborts the whole document.
pub async fn extract(
    doc: &UploadedDocument,
    config: &PipelineConfig,
) -> Result<ExtractionResult, FormScribeError> {
    let backend = backend::resolve_backend(config)?;
    extract_inner(doc, backend.as_ref(), config.max_rendered_pixels).await
}

/// Extract text using a caller-supplied backend.
///
/// Lets tests and embedders substitute any [`OcrBackend`] implementation
/// without touching provider resolution.
pub async fn extract_with_backend(
    doc: &UploadedDocument,
    backend: &dyn OcrBackend,
) -> Result<ExtractionResult, FormScribeError> {
    extract_inner(doc, backend, DEFAULT_MAX_RENDERED_PIXELS).await
}

async fn extract_inner(
    doc: &UploadedDocument,
    backend: &dyn OcrBackend,
    max_rendered_pixels: u32,
) -> Result<ExtractionResult, FormScribeError> {
    let start = Instant::now();
    info!(
        "Starting extraction: '{}' ({} bytes)",
        doc.filename(),
        doc.size()
    );

    let pages = match doc.kind() {
        DocumentKind::Image => extract_image(doc, backend).await?,
        DocumentKind::Pdf => {
            let renderer =
                PageRenderer::open(doc.bytes(), backend.render_dpi(), max_rendered_pixels).await?;
            extract_pages(&renderer, backend).await?
        }
    };

    let text = aggregate(&pages);
    let page_count = pages.len();

    info!(
        "Extraction complete: {} pages, {} chars, {}ms",
        page_count,
        text.len(),
        start.elapsed().as_millis()
    );

    Ok(ExtractionResult {
        pages,
        text,
        page_count,
    })
}

/// Single-image path: the raw upload bytes go straight to the backend, with
/// the media type derived from the filename.
async fn extract_image(
    doc: &UploadedDocument,
    backend: &dyn OcrBackend,
) -> Result<Vec<PageText>, FormScribeError> {
    let encoded = EncodedPage {
        bytes: doc.bytes().to_vec(),
        media_type: doc.image_media_type(),
    };

    let text = backend.extract_text(1, &encoded).await?;

    Ok(vec![PageText { page: 0, text }])
}

/// Multi-page path: render, encode, and recognise each page in order.
///
/// Public so tests and embedders can drive the loop from any [`PageSource`];
/// `extract` wires in the pdfium-backed [`PageRenderer`].
pub async fn extract_pages(
    source: &dyn PageSource,
    backend: &dyn OcrBackend,
) -> Result<Vec<PageText>, FormScribeError> {
    let page_count = source.page_count();

    let mut pages = Vec::with_capacity(page_count);

    for index in 0..page_count {
        debug!("Processing page {}/{}", index + 1, page_count);

        let image = source.render_page(index).await?;
        let encoded = backend.encode(index + 1, &image)?;
        // The rendered bitmap is dropped here; only the compressed bytes
        // stay alive for the backend call.
        drop(image);

        let text = backend.extract_text(index + 1, &encoded).await?;
        pages.push(PageText { page: index, text });
    }

    Ok(pages)
}
