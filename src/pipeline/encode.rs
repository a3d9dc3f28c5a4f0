//! Image encoding: `DynamicImage` → compressed bytes tagged with a media type.
//!
//! Two encodings, one per backend:
//!
//! * **JPEG at quality 85** for the cloud path — lossy, but the payload must
//!   travel inside a base64 JSON request body, so transfer size wins over
//!   pixel-perfect fidelity. 85 keeps rendered text legible to the model.
//! * **PNG** for the local path — lossless. Tesseract performs measurably
//!   worse on JPEG ringing artefacts around glyph edges, and there is no
//!   transfer-size constraint for a local engine.

use crate::error::FormScribeError;
use image::codecs::jpeg::JpegEncoder;
use image::DynamicImage;
use std::io::Cursor;
use tracing::debug;

/// A compressed page image plus the media type its backend expects.
#[derive(Debug, Clone)]
pub struct EncodedPage {
    pub bytes: Vec<u8>,
    pub media_type: &'static str,
}

/// Encode a rasterised page as JPEG for the cloud backend.
///
/// `page_num` is 1-based and used only for error context.
pub fn encode_jpeg(
    page_num: usize,
    img: &DynamicImage,
    quality: u8,
) -> Result<EncodedPage, FormScribeError> {
    let mut buf = Vec::new();
    // JPEG has no alpha channel; pdfium bitmaps come out RGBA.
    let rgb = img.to_rgb8();
    let encoder = JpegEncoder::new_with_quality(Cursor::new(&mut buf), quality);
    rgb.write_with_encoder(encoder)
        .map_err(|e| FormScribeError::EncodeFailed {
            page: page_num,
            detail: format!("{}", e),
        })?;

    debug!("Encoded page {} → {} bytes JPEG q{}", page_num, buf.len(), quality);

    Ok(EncodedPage {
        bytes: buf,
        media_type: "image/jpeg",
    })
}

/// Encode a rasterised page as lossless PNG for the local backend.
pub fn encode_png(page_num: usize, img: &DynamicImage) -> Result<EncodedPage, FormScribeError> {
    let mut buf = Vec::new();
    img.write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .map_err(|e| FormScribeError::EncodeFailed {
            page: page_num,
            detail: format!("{}", e),
        })?;

    debug!("Encoded page {} → {} bytes PNG", page_num, buf.len());

    Ok(EncodedPage {
        bytes: buf,
        media_type: "image/png",
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};

    fn test_image() -> DynamicImage {
        DynamicImage::ImageRgba8(RgbaImage::from_pixel(10, 10, Rgba([255, 0, 0, 255])))
    }

    #[test]
    fn jpeg_media_type_and_magic() {
        let page = encode_jpeg(1, &test_image(), 85).expect("encode should succeed");
        assert_eq!(page.media_type, "image/jpeg");
        assert_eq!(&page.bytes[..2], &[0xFF, 0xD8], "JPEG SOI marker");
    }

    #[test]
    fn png_media_type_and_magic() {
        let page = encode_png(1, &test_image()).expect("encode should succeed");
        assert_eq!(page.media_type, "image/png");
        assert_eq!(&page.bytes[..4], &[0x89, b'P', b'N', b'G']);
    }

    #[test]
    fn jpeg_accepts_rgba_input() {
        // Alpha must be dropped, not rejected
        let img = DynamicImage::ImageRgba8(RgbaImage::from_pixel(4, 4, Rgba([0, 0, 0, 0])));
        assert!(encode_jpeg(2, &img, 85).is_ok());
    }
}
