//! Configuration for the extraction and mapping pipelines.
//!
//! All behaviour is controlled through [`PipelineConfig`], built via its
//! [`PipelineConfigBuilder`]. The config is constructed once at startup and
//! passed by reference into pipeline construction — pipeline code never reads
//! credentials or budgets from ambient global state, which keeps every run
//! reproducible from the config value alone.

use crate::error::FormScribeError;
use edgequake_llm::LLMProvider;
use std::fmt;
use std::sync::Arc;

/// Default upload-size cap: 20 MiB, checked before any processing begins.
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 20 * 1024 * 1024;

/// Default cap on either rendered page dimension, in pixels.
///
/// Chosen so A4 and Letter pages at 300 DPI (~2480 px wide) render uncapped;
/// only poster-sized pages are clamped.
pub const DEFAULT_MAX_RENDERED_PIXELS: u32 = 4000;

/// Which OCR backend the extraction pipeline uses.
///
/// This is a pipeline-level switch, not a per-page choice: one backend
/// handles every page of a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BackendKind {
    /// Multimodal cloud model (Anthropic by default). Pages are rendered at
    /// 150 DPI and JPEG-compressed to respect API response-size constraints.
    #[default]
    Cloud,
    /// Local Tesseract engine. Pages are rendered at 300 DPI and PNG-encoded;
    /// the engine has no transfer-size constraint and performs best on
    /// artefact-free input.
    Local,
}

/// Configuration shared by the extraction and form-filling pipelines.
///
/// # Example
/// ```rust
/// use formscribe::{BackendKind, PipelineConfig};
///
/// let config = PipelineConfig::builder()
///     .backend(BackendKind::Local)
///     .ocr_language("eng")
///     .build()
///     .unwrap();
/// ```
#[derive(Clone)]
pub struct PipelineConfig {
    /// Which OCR backend to use. Default: [`BackendKind::Cloud`].
    pub backend: BackendKind,

    /// Maximum accepted upload size in bytes. Default: 20 MiB.
    ///
    /// An upload of exactly this size is accepted; one byte over is rejected
    /// with a validation error before any rendering or backend work.
    pub max_upload_bytes: usize,

    /// Model identifier for the cloud backend and the form-filling model,
    /// e.g. "claude-sonnet-4-5". If None, uses the provider default.
    pub model: Option<String>,

    /// Provider name (e.g. "anthropic", "openai"). If None along with
    /// `provider`, the provider is auto-detected from the environment.
    pub provider_name: Option<String>,

    /// Pre-constructed model provider. Takes precedence over `provider_name`.
    /// Useful in tests or when the caller needs custom middleware.
    pub provider: Option<Arc<dyn LLMProvider>>,

    /// Maximum tokens the model may generate per call. Default: 4096.
    pub max_tokens: usize,

    /// Rendering DPI ahead of the cloud backend. Default: 150.
    ///
    /// Sufficient for the model to read the page while keeping the JPEG
    /// payload well under API upload limits.
    pub cloud_dpi: u32,

    /// Rendering DPI ahead of the local backend. Default: 300.
    ///
    /// Tesseract benefits from the finer detail and has no payload limit.
    pub local_dpi: u32,

    /// Maximum rendered page dimension (width or height) in pixels.
    /// Default: 4000.
    ///
    /// A safety cap independent of DPI. An A0 page at 300 DPI would produce
    /// a ~10 000 × 14 000 px bitmap; this field caps either dimension,
    /// scaling the other proportionally.
    pub max_rendered_pixels: u32,

    /// JPEG quality for cloud-path page images, 1–100. Default: 85.
    pub jpeg_quality: u8,

    /// Tesseract language code for the local backend. Default: "eng".
    pub ocr_language: String,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            backend: BackendKind::Cloud,
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            model: None,
            provider_name: None,
            provider: None,
            max_tokens: 4096,
            cloud_dpi: 150,
            local_dpi: 300,
            max_rendered_pixels: DEFAULT_MAX_RENDERED_PIXELS,
            jpeg_quality: 85,
            ocr_language: "eng".to_string(),
        }
    }
}

impl fmt::Debug for PipelineConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PipelineConfig")
            .field("backend", &self.backend)
            .field("max_upload_bytes", &self.max_upload_bytes)
            .field("model", &self.model)
            .field("provider_name", &self.provider_name)
            .field("provider", &self.provider.as_ref().map(|_| "<dyn LLMProvider>"))
            .field("max_tokens", &self.max_tokens)
            .field("cloud_dpi", &self.cloud_dpi)
            .field("local_dpi", &self.local_dpi)
            .field("max_rendered_pixels", &self.max_rendered_pixels)
            .field("jpeg_quality", &self.jpeg_quality)
            .field("ocr_language", &self.ocr_language)
            .finish()
    }
}

impl PipelineConfig {
    /// Create a new builder for `PipelineConfig`.
    pub fn builder() -> PipelineConfigBuilder {
        PipelineConfigBuilder {
            config: Self::default(),
        }
    }

    /// The rendering DPI for the configured backend.
    pub fn render_dpi(&self) -> u32 {
        match self.backend {
            BackendKind::Cloud => self.cloud_dpi,
            BackendKind::Local => self.local_dpi,
        }
    }
}

/// Builder for [`PipelineConfig`].
#[derive(Debug)]
pub struct PipelineConfigBuilder {
    config: PipelineConfig,
}

impl PipelineConfigBuilder {
    pub fn backend(mut self, backend: BackendKind) -> Self {
        self.config.backend = backend;
        self
    }

    pub fn max_upload_bytes(mut self, bytes: usize) -> Self {
        self.config.max_upload_bytes = bytes;
        self
    }

    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.config.model = Some(model.into());
        self
    }

    pub fn provider_name(mut self, name: impl Into<String>) -> Self {
        self.config.provider_name = Some(name.into());
        self
    }

    pub fn provider(mut self, provider: Arc<dyn LLMProvider>) -> Self {
        self.config.provider = Some(provider);
        self
    }

    pub fn max_tokens(mut self, n: usize) -> Self {
        self.config.max_tokens = n;
        self
    }

    pub fn cloud_dpi(mut self, dpi: u32) -> Self {
        self.config.cloud_dpi = dpi.clamp(72, 400);
        self
    }

    pub fn local_dpi(mut self, dpi: u32) -> Self {
        self.config.local_dpi = dpi.clamp(72, 400);
        self
    }

    pub fn max_rendered_pixels(mut self, px: u32) -> Self {
        self.config.max_rendered_pixels = px.max(100);
        self
    }

    pub fn jpeg_quality(mut self, q: u8) -> Self {
        self.config.jpeg_quality = q.clamp(1, 100);
        self
    }

    pub fn ocr_language(mut self, lang: impl Into<String>) -> Self {
        self.config.ocr_language = lang.into();
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<PipelineConfig, FormScribeError> {
        let c = &self.config;
        if c.max_upload_bytes == 0 {
            return Err(FormScribeError::InvalidConfig(
                "max_upload_bytes must be ≥ 1".into(),
            ));
        }
        if c.max_tokens == 0 {
            return Err(FormScribeError::InvalidConfig(
                "max_tokens must be ≥ 1".into(),
            ));
        }
        if c.ocr_language.is_empty() {
            return Err(FormScribeError::InvalidConfig(
                "ocr_language must not be empty".into(),
            ));
        }
        Ok(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let c = PipelineConfig::default();
        assert_eq!(c.backend, BackendKind::Cloud);
        assert_eq!(c.max_upload_bytes, 20 * 1024 * 1024);
        assert_eq!(c.max_tokens, 4096);
        assert_eq!(c.cloud_dpi, 150);
        assert_eq!(c.local_dpi, 300);
        assert_eq!(c.max_rendered_pixels, 4000);
        assert_eq!(c.jpeg_quality, 85);
        assert_eq!(c.ocr_language, "eng");
    }

    #[test]
    fn render_dpi_follows_backend() {
        let cloud = PipelineConfig::default();
        assert_eq!(cloud.render_dpi(), 150);

        let local = PipelineConfig::builder()
            .backend(BackendKind::Local)
            .build()
            .unwrap();
        assert_eq!(local.render_dpi(), 300);
    }

    #[test]
    fn builder_clamps_out_of_range_values() {
        let c = PipelineConfig::builder()
            .cloud_dpi(10)
            .local_dpi(10_000)
            .max_rendered_pixels(0)
            .jpeg_quality(0)
            .build()
            .unwrap();
        assert_eq!(c.cloud_dpi, 72);
        assert_eq!(c.local_dpi, 400);
        assert_eq!(c.max_rendered_pixels, 100);
        assert_eq!(c.jpeg_quality, 1);
    }

    #[test]
    fn build_rejects_empty_language() {
        let result = PipelineConfig::builder().ocr_language("").build();
        assert!(matches!(result, Err(FormScribeError::InvalidConfig(_))));
    }
}
