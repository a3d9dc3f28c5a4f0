//! Pipeline stages for document-to-text extraction.
//!
//! Each submodule implements exactly one transformation step. Keeping stages
//! separate makes each independently testable and lets us swap
//! implementations (e.g. a different OCR backend) without touching other
//! stages.
//!
//! ## Data Flow
//!
//! ```text
//! upload ──▶ render ──▶ encode ──▶ backend ──▶ aggregate
//! (bytes)    (pdfium)   (jpeg/png)  (OCR)      (page markers)
//! ```
//!
//! 1. [`render`]    — rasterise PDF pages one at a time; runs in
//!    `spawn_blocking` because pdfium is not async-safe
//! 2. [`encode`]    — compress each page image for its backend: lossy JPEG
//!    for the cloud path, lossless PNG for the local path
//! 3. [`backend`]   — the [`backend::OcrBackend`] capability and its two
//!    implementations; the only stage with network or engine I/O
//! 4. [`aggregate`] — join per-page text into one document-level string
//!
//! Single-image uploads skip stages 1–2: the raw bytes go straight to the
//! backend. Pages are processed strictly sequentially so one page image is
//! in flight at a time and a rate-limited API never sees a burst of calls.

pub mod aggregate;
pub mod backend;
pub mod encode;
pub mod render;
