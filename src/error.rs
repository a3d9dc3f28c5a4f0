//! Error types for the formscribe library.
//!
//! One enum covers both pipelines, grouped by the stage that produced the
//! failure:
//!
//! * **Validation** — malformed, missing, or oversized input. Rejected before
//!   any processing starts; [`FormScribeError::is_client_error`] returns true
//!   so a hosting API can answer with a 4xx status.
//!
//! * **Configuration** — a required credential is absent. The cloud backend
//!   fails fast at construction rather than mid-document.
//!
//! * **Render / Encoding / Extraction** — a page-level failure inside the
//!   extraction pipeline. Any of these aborts the whole document: there is no
//!   partial-document result and no retry of the failing page.
//!
//! * **Mapping** — the model's reply to a form-filling request did not parse
//!   as the required JSON shape. The raw reply is carried for operator
//!   diagnosis; it is logged, never returned in a success payload.

use thiserror::Error;

/// All errors returned by the formscribe library.
#[derive(Debug, Error)]
pub enum FormScribeError {
    // ── Validation errors ─────────────────────────────────────────────────
    /// The upload contained no file data.
    #[error("No file was provided.\nAttach a single image or PDF file to the request.")]
    MissingFile,

    /// The upload exceeds the configured maximum size.
    #[error("Upload of {size} bytes exceeds the {max}-byte limit")]
    UploadTooLarge { size: usize, max: usize },

    /// A required request field was empty or absent.
    #[error("'{field}' is required")]
    MissingInput { field: String },

    // ── Configuration errors ──────────────────────────────────────────────
    /// No model provider could be resolved (missing API key etc.).
    #[error("Model provider '{provider}' is not configured.\n{hint}")]
    ProviderNotConfigured { provider: String, hint: String },

    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Extraction-pipeline errors ────────────────────────────────────────
    /// The upload was classified as a PDF but pdfium could not open it.
    #[error("Failed to open PDF: {detail}")]
    CorruptDocument { detail: String },

    /// Rasterisation failed for a specific page (1-based).
    #[error("Failed to render page {page}: {detail}")]
    RenderFailed { page: usize, detail: String },

    /// Image compression failed for a specific page (1-based).
    #[error("Failed to encode page {page}: {detail}")]
    EncodeFailed { page: usize, detail: String },

    /// The OCR backend call failed for a specific page (1-based).
    #[error("Failed to extract text from page {page}: {detail}")]
    ExtractionFailed { page: usize, detail: String },

    // ── Mapping-pipeline errors ───────────────────────────────────────────
    /// The model API call itself failed (network, auth, rate limit).
    #[error("Model API error: {message}")]
    LlmApiError { message: String },

    /// The model reply did not parse as the required field-mapping shape.
    ///
    /// `raw_reply` holds the unparsed reply for operator diagnosis. Hosts
    /// must not forward it to the caller.
    #[error("Failed to parse model reply as field mappings: {detail}")]
    MappingFailed { detail: String, raw_reply: String },

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl FormScribeError {
    /// True for failures the caller can fix by changing the request.
    ///
    /// A hosting API maps these to 4xx responses; everything else is a
    /// server-side failure reported uniformly as 5xx (there is no distinct
    /// fatal-vs-retryable classification).
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            FormScribeError::MissingFile
                | FormScribeError::UploadTooLarge { .. }
                | FormScribeError::MissingInput { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upload_too_large_display() {
        let e = FormScribeError::UploadTooLarge {
            size: 20 * 1024 * 1024 + 1,
            max: 20 * 1024 * 1024,
        };
        let msg = e.to_string();
        assert!(msg.contains("20971521"), "got: {msg}");
        assert!(msg.contains("20971520"), "got: {msg}");
    }

    #[test]
    fn render_failed_uses_one_based_page() {
        let e = FormScribeError::RenderFailed {
            page: 3,
            detail: "bad xref".into(),
        };
        assert!(e.to_string().contains("page 3"));
    }

    #[test]
    fn mapping_failed_keeps_raw_reply_out_of_display() {
        let e = FormScribeError::MappingFailed {
            detail: "expected value at line 1".into(),
            raw_reply: "Sure! Here is the JSON you asked for".into(),
        };
        let msg = e.to_string();
        assert!(msg.contains("expected value"));
        assert!(!msg.contains("Sure!"), "raw reply must not leak into Display");
    }

    #[test]
    fn client_error_classification() {
        assert!(FormScribeError::MissingFile.is_client_error());
        assert!(FormScribeError::MissingInput {
            field: "formHTML".into()
        }
        .is_client_error());
        assert!(!FormScribeError::CorruptDocument {
            detail: "x".into()
        }
        .is_client_error());
        assert!(!FormScribeError::ProviderNotConfigured {
            provider: "anthropic".into(),
            hint: "set ANTHROPIC_API_KEY".into(),
        }
        .is_client_error());
    }
}
