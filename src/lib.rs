//! # formscribe
//!
//! Turn an uploaded document (single image or multi-page PDF) into plain
//! text, then optionally map that text onto the named fields of an HTML form
//! via a language model.
//!
//! ## Why this crate?
//!
//! Identity documents — passports, permits, certificates — arrive as photos
//! and scans, and the forms they need to populate arrive as HTML. This crate
//! covers the whole distance: it rasterises each page, reads it with either a
//! multimodal cloud model or a local Tesseract engine, and asks a language
//! model to match the recognised data against the form's field identifiers.
//!
//! ## Pipeline Overview
//!
//! ```text
//! upload
//!  │
//!  ├─ 1. Validate   size cap (20 MiB), classify by filename suffix
//!  ├─ 2. Render     rasterise PDF pages via pdfium (sequential, spawn_blocking)
//!  ├─ 3. Encode     JPEG q85 @ 150 DPI (cloud) / PNG @ 300 DPI (local)
//!  ├─ 4. Recognise  cloud multimodal model or local Tesseract, per page
//!  └─ 5. Aggregate  `=== Page k ===` markers when the document has > 1 page
//! ```
//!
//! Form filling is a separate pipeline consuming any extracted text plus the
//! raw form markup; see [`fill_form`].
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use formscribe::{extract, fill_form, PipelineConfig, UploadedDocument};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Provider auto-detected from ANTHROPIC_API_KEY / OPENAI_API_KEY
//!     let config = PipelineConfig::default();
//!
//!     let bytes = std::fs::read("passport.pdf")?;
//!     let doc = UploadedDocument::new(bytes, "passport.pdf", config.max_upload_bytes)?;
//!     let extraction = extract(&doc, &config).await?;
//!     println!("{}", extraction.text);
//!
//!     let form_html = std::fs::read_to_string("application_form.html")?;
//!     let filled = fill_form(&form_html, &extraction.text, &config).await?;
//!     eprintln!("mapped {} fields", filled.total_fields);
//!     Ok(())
//! }
//! ```
//!
//! ## Choosing a Backend
//!
//! | Backend | Engine | DPI | Encoding | Needs |
//! |---------|--------|-----|----------|-------|
//! | `Cloud` (default) | multimodal model via edgequake-llm | 150 | JPEG q85 | API key |
//! | `Local` | Tesseract 5 via leptess | 300 | PNG | `tesseract` + language data installed |
//!
//! The cloud path also translates to English and copes with handwriting and
//! low-quality photos; the local path is deterministic, free, and offline.
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `formscribe` binary (clap + anyhow + tracing-subscriber) |

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod document;
pub mod error;
pub mod extract;
pub mod fill;
pub mod pipeline;
pub mod prompts;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{
    BackendKind, PipelineConfig, PipelineConfigBuilder, DEFAULT_MAX_RENDERED_PIXELS,
    DEFAULT_MAX_UPLOAD_BYTES,
};
pub use document::{DocumentKind, UploadedDocument};
pub use error::FormScribeError;
pub use extract::{extract, extract_pages, extract_with_backend, ExtractResponse, ExtractionResult};
pub use fill::{fill_form, parse_fill_reply, FieldMapping, FillResponse, FillResult};
pub use pipeline::aggregate::{aggregate, PageText};
pub use pipeline::backend::{CloudBackend, LocalBackend, OcrBackend};
pub use pipeline::encode::EncodedPage;
pub use pipeline::render::{PageRenderer, PageSource};
