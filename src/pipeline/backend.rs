//! The OCR capability and its two implementations.
//!
//! [`OcrBackend`] is the seam between the page loop and whatever actually
//! reads the image. Backend selection is a pipeline-level configuration
//! choice ([`crate::config::BackendKind`]), not a per-page decision, and each
//! implementation also owns the rendering/encoding parameters its engine
//! wants — the cloud path trades fidelity for transfer size, the local path
//! does the opposite.
//!
//! * [`CloudBackend`] sends the instructional prompt plus the base64 page
//!   image to a multimodal model via `edgequake-llm` and returns the text of
//!   the reply. It fails fast at construction when no credential resolves.
//! * [`LocalBackend`] initialises a Tesseract instance per call (the engine
//!   keeps mutable internal state, so a fresh instance per page is the
//!   simplest way to stay request-independent), fixed to the configured
//!   language.

use crate::config::{BackendKind, PipelineConfig};
use crate::error::FormScribeError;
use crate::pipeline::encode::{self, EncodedPage};
use crate::prompts::EXTRACT_PROMPT;
use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use edgequake_llm::{ChatMessage, CompletionOptions, ImageData, LLMProvider, ProviderFactory};
use image::DynamicImage;
use leptess::LepTess;
use std::sync::Arc;
use tracing::debug;

/// Model used when neither the config nor the provider specifies one.
const DEFAULT_MODEL: &str = "claude-sonnet-4-5";

/// Polymorphic OCR capability: one encoded page image in, text out.
///
/// The trait also exposes the render/encode parameters the backend wants, so
/// the page loop stays backend-agnostic.
#[async_trait]
pub trait OcrBackend: Send + Sync {
    /// DPI the extraction pipeline should rasterise PDF pages at.
    fn render_dpi(&self) -> u32;

    /// Compress a rendered page into the encoding this backend consumes.
    /// `page_num` is 1-based and used for error context.
    fn encode(&self, page_num: usize, image: &DynamicImage)
        -> Result<EncodedPage, FormScribeError>;

    /// Recognise the text in one encoded image.
    async fn extract_text(
        &self,
        page_num: usize,
        page: &EncodedPage,
    ) -> Result<String, FormScribeError>;
}

/// Build the backend selected by the configuration.
///
/// For [`BackendKind::Cloud`] this resolves the model provider immediately,
/// so a missing credential fails here rather than mid-document.
pub fn resolve_backend(config: &PipelineConfig) -> Result<Arc<dyn OcrBackend>, FormScribeError> {
    match config.backend {
        BackendKind::Cloud => Ok(Arc::new(CloudBackend::new(config)?)),
        BackendKind::Local => Ok(Arc::new(LocalBackend::new(config))),
    }
}

// ── Cloud backend ────────────────────────────────────────────────────────

/// OCR via a multimodal cloud model.
pub struct CloudBackend {
    provider: Arc<dyn LLMProvider>,
    max_tokens: usize,
    dpi: u32,
    jpeg_quality: u8,
}

impl CloudBackend {
    /// Resolve the provider and build the backend.
    pub fn new(config: &PipelineConfig) -> Result<Self, FormScribeError> {
        Ok(Self {
            provider: resolve_provider(config)?,
            max_tokens: config.max_tokens,
            dpi: config.cloud_dpi,
            jpeg_quality: config.jpeg_quality,
        })
    }
}

#[async_trait]
impl OcrBackend for CloudBackend {
    fn render_dpi(&self) -> u32 {
        self.dpi
    }

    fn encode(
        &self,
        page_num: usize,
        image: &DynamicImage,
    ) -> Result<EncodedPage, FormScribeError> {
        encode::encode_jpeg(page_num, image, self.jpeg_quality)
    }

    async fn extract_text(
        &self,
        page_num: usize,
        page: &EncodedPage,
    ) -> Result<String, FormScribeError> {
        let b64 = STANDARD.encode(&page.bytes);
        debug!("Page {}: sending {} bytes base64 to model", page_num, b64.len());

        // One user turn carrying the directive and the image together.
        let messages = vec![ChatMessage::user_with_images(
            EXTRACT_PROMPT,
            vec![ImageData::new(b64, page.media_type)],
        )];

        let options = CompletionOptions {
            max_tokens: Some(self.max_tokens),
            ..Default::default()
        };

        let response = self
            .provider
            .chat(&messages, Some(&options))
            .await
            .map_err(|e| FormScribeError::ExtractionFailed {
                page: page_num,
                detail: format!("{}", e),
            })?;

        debug!(
            "Page {}: {} input tokens, {} output tokens",
            page_num, response.prompt_tokens, response.completion_tokens
        );

        Ok(response.content)
    }
}

// ── Local backend ────────────────────────────────────────────────────────

/// OCR via a local Tesseract engine.
pub struct LocalBackend {
    language: String,
    dpi: u32,
}

impl LocalBackend {
    pub fn new(config: &PipelineConfig) -> Self {
        Self {
            language: config.ocr_language.clone(),
            dpi: config.local_dpi,
        }
    }
}

#[async_trait]
impl OcrBackend for LocalBackend {
    fn render_dpi(&self) -> u32 {
        self.dpi
    }

    fn encode(
        &self,
        page_num: usize,
        image: &DynamicImage,
    ) -> Result<EncodedPage, FormScribeError> {
        encode::encode_png(page_num, image)
    }

    async fn extract_text(
        &self,
        page_num: usize,
        page: &EncodedPage,
    ) -> Result<String, FormScribeError> {
        let bytes = page.bytes.clone();
        let language = self.language.clone();

        // Tesseract is blocking C code; keep it off the async workers.
        tokio::task::spawn_blocking(move || recognize_blocking(page_num, &bytes, &language))
            .await
            .map_err(|e| FormScribeError::Internal(format!("OCR task panicked: {}", e)))?
    }
}

/// Blocking Tesseract recognition of one image.
fn recognize_blocking(
    page_num: usize,
    bytes: &[u8],
    language: &str,
) -> Result<String, FormScribeError> {
    let mut engine =
        LepTess::new(None, language).map_err(|e| FormScribeError::ExtractionFailed {
            page: page_num,
            detail: format!(
                "failed to initialise Tesseract with language '{}': {}",
                language, e
            ),
        })?;

    engine
        .set_image_from_mem(bytes)
        .map_err(|e| FormScribeError::ExtractionFailed {
            page: page_num,
            detail: format!("invalid image format: {}", e),
        })?;

    engine
        .get_utf8_text()
        .map_err(|e| FormScribeError::ExtractionFailed {
            page: page_num,
            detail: format!("OCR processing failed: {}", e),
        })
}

// ── Provider resolution ──────────────────────────────────────────────────

/// Resolve the model provider, from most-specific to least-specific.
///
/// 1. **Pre-built provider** (`config.provider`) — the caller constructed and
///    configured the provider entirely; use it as-is. Useful in tests or when
///    the caller needs custom middleware.
///
/// 2. **Named provider + model** (`config.provider_name`) — the factory reads
///    the corresponding API key (`ANTHROPIC_API_KEY`, `OPENAI_API_KEY`, …)
///    from the environment.
///
/// 3. **Anthropic key present** — the extraction directive is tuned for
///    Claude's vision input, so `ANTHROPIC_API_KEY` wins over other keys when
///    several are set.
///
/// 4. **Full auto-detection** (`ProviderFactory::from_env`) — the factory
///    scans all known API key variables and picks the first available
///    provider.
pub fn resolve_provider(
    config: &PipelineConfig,
) -> Result<Arc<dyn LLMProvider>, FormScribeError> {
    if let Some(ref provider) = config.provider {
        return Ok(Arc::clone(provider));
    }

    if let Some(ref name) = config.provider_name {
        let model = config.model.as_deref().unwrap_or(DEFAULT_MODEL);
        return create_provider(name, model);
    }

    if let Ok(key) = std::env::var("ANTHROPIC_API_KEY") {
        if !key.is_empty() {
            let model = config.model.as_deref().unwrap_or(DEFAULT_MODEL);
            return create_provider("anthropic", model);
        }
    }

    let (provider, _embedding) =
        ProviderFactory::from_env().map_err(|e| FormScribeError::ProviderNotConfigured {
            provider: "auto".to_string(),
            hint: format!(
                "No model provider could be auto-detected from environment.\n\
                Set ANTHROPIC_API_KEY, OPENAI_API_KEY, or configure a provider.\n\
                Error: {}",
                e
            ),
        })?;

    Ok(provider)
}

/// Instantiate a named provider with the given model.
fn create_provider(
    provider_name: &str,
    model: &str,
) -> Result<Arc<dyn LLMProvider>, FormScribeError> {
    ProviderFactory::create_llm_provider(provider_name, model).map_err(|e| {
        FormScribeError::ProviderNotConfigured {
            provider: provider_name.to_string(),
            hint: format!("{e}"),
        }
    })
}
