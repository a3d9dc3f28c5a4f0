//! Upload validation and classification.
//!
//! An upload is classified by filename suffix only — `.pdf` (any case) takes
//! the multi-page path, everything else is treated as a single image. No
//! content sniffing is performed; a mislabelled file fails later inside the
//! renderer or the OCR engine with a stage-specific error.

use crate::error::FormScribeError;
use tracing::debug;

/// How an upload is routed through the extraction pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    /// Multi-page path: rasterise each page, then OCR page by page.
    Pdf,
    /// Single-image path: the raw bytes go straight to the OCR backend.
    Image,
}

/// A validated upload, created per request and discarded after extraction.
#[derive(Debug, Clone)]
pub struct UploadedDocument {
    bytes: Vec<u8>,
    filename: String,
}

impl UploadedDocument {
    /// Validate and wrap an upload.
    ///
    /// Fails with a validation error if the payload is empty or exceeds
    /// `max_bytes`. An upload of exactly `max_bytes` is accepted.
    pub fn new(
        bytes: Vec<u8>,
        filename: impl Into<String>,
        max_bytes: usize,
    ) -> Result<Self, FormScribeError> {
        if bytes.is_empty() {
            return Err(FormScribeError::MissingFile);
        }
        if bytes.len() > max_bytes {
            return Err(FormScribeError::UploadTooLarge {
                size: bytes.len(),
                max: max_bytes,
            });
        }

        let filename = filename.into();
        debug!("Accepted upload '{}' ({} bytes)", filename, bytes.len());

        Ok(Self { bytes, filename })
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn filename(&self) -> &str {
        &self.filename
    }

    pub fn size(&self) -> usize {
        self.bytes.len()
    }

    /// Classify by filename suffix. `.pdf` is matched case-insensitively.
    pub fn kind(&self) -> DocumentKind {
        if self.filename.to_lowercase().ends_with(".pdf") {
            DocumentKind::Pdf
        } else {
            DocumentKind::Image
        }
    }

    /// Media type for the single-image path, derived from the last four
    /// characters of the filename.
    ///
    /// Note the asymmetry: `.jpg` is matched with its dot while `jpeg` is
    /// matched without one (so `photo.jpeg` hits the `jpeg` arm). This
    /// mirrors the long-standing routing rule; both arms resolve to the
    /// default anyway, so correcting it would change nothing observable.
    pub fn image_media_type(&self) -> &'static str {
        let mut media_type = "image/jpeg";
        if self.filename.len() > 4 {
            // get() rather than indexing: a multi-byte character straddling
            // the 4-byte window must not panic, just fall through to jpeg.
            if let Some(tail) = self.filename.get(self.filename.len() - 4..) {
                match tail.to_lowercase().as_str() {
                    ".png" => media_type = "image/png",
                    ".jpg" | "jpeg" => media_type = "image/jpeg",
                    _ => {}
                }
            }
        }
        media_type
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(filename: &str) -> UploadedDocument {
        UploadedDocument::new(vec![1, 2, 3], filename, 1024).unwrap()
    }

    #[test]
    fn pdf_suffix_is_case_insensitive() {
        assert_eq!(doc("visa.pdf").kind(), DocumentKind::Pdf);
        assert_eq!(doc("VISA.PDF").kind(), DocumentKind::Pdf);
        assert_eq!(doc("scan.Pdf").kind(), DocumentKind::Pdf);
    }

    #[test]
    fn non_pdf_routes_to_image_path() {
        assert_eq!(doc("passport.png").kind(), DocumentKind::Image);
        assert_eq!(doc("passport.jpg").kind(), DocumentKind::Image);
        assert_eq!(doc("no_extension").kind(), DocumentKind::Image);
        // name-based only: a PDF payload named .png still takes the image path
        assert_eq!(doc("actually_a.pdf.png").kind(), DocumentKind::Image);
    }

    #[test]
    fn empty_upload_is_rejected() {
        let result = UploadedDocument::new(vec![], "a.png", 1024);
        assert!(matches!(result, Err(FormScribeError::MissingFile)));
    }

    #[test]
    fn size_boundary_exact_is_accepted_one_over_rejected() {
        let max = 16;
        assert!(UploadedDocument::new(vec![0u8; 16], "a.png", max).is_ok());

        let result = UploadedDocument::new(vec![0u8; 17], "a.png", max);
        match result {
            Err(FormScribeError::UploadTooLarge { size, max }) => {
                assert_eq!(size, 17);
                assert_eq!(max, 16);
            }
            other => panic!("expected UploadTooLarge, got {other:?}"),
        }
    }

    #[test]
    fn media_type_table() {
        assert_eq!(doc("scan.png").image_media_type(), "image/png");
        assert_eq!(doc("scan.PNG").image_media_type(), "image/png");
        assert_eq!(doc("scan.jpg").image_media_type(), "image/jpeg");
        // ".jpeg" ends in "jpeg" (no dot in the matched window)
        assert_eq!(doc("scan.jpeg").image_media_type(), "image/jpeg");
        // unknown and short names fall back to jpeg
        assert_eq!(doc("scan.gif").image_media_type(), "image/jpeg");
        assert_eq!(doc("x.py").image_media_type(), "image/jpeg");
    }
}
