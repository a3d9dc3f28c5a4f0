//! Form-field mapping: extracted text + form markup → field/value pairs.
//!
//! The form markup is opaque to this module — it is embedded verbatim in the
//! instruction and the mapping model does all structural interpretation. The
//! fragile part is the reply: the contract says "bare JSON only", but models
//! routinely wrap replies in markdown fences, so [`normalize_reply`] and
//! [`parse_fill_reply`] are separate units testable without any model call.

use crate::config::PipelineConfig;
use crate::error::FormScribeError;
use crate::pipeline::backend::resolve_provider;
use crate::prompts;
use edgequake_llm::{ChatMessage, CompletionOptions};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info};

/// One filled field: a form-field identifier and the value to place in it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldMapping {
    #[serde(rename = "fieldId")]
    pub field_id: String,
    pub value: String,
}

/// Mapping output: the ordered field list and its count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FillResult {
    pub fields: Vec<FieldMapping>,
    pub total_fields: usize,
}

/// The JSON body a hosting API returns for a successful mapping request.
#[derive(Debug, Clone, Serialize)]
pub struct FillResponse {
    pub status: &'static str,
    pub message: &'static str,
    pub fields: Vec<FieldMapping>,
    pub stats: FillStats,
}

#[derive(Debug, Clone, Serialize)]
pub struct FillStats {
    #[serde(rename = "totalFields")]
    pub total_fields: usize,
}

impl From<FillResult> for FillResponse {
    fn from(result: FillResult) -> Self {
        Self {
            status: "success",
            message: "Form filled successfully",
            stats: FillStats {
                total_fields: result.total_fields,
            },
            fields: result.fields,
        }
    }
}

/// The shape the model is instructed to reply with.
#[derive(Debug, Deserialize)]
struct FillReply {
    fields: Vec<FieldMapping>,
}

/// Map extracted document text onto the fields of an HTML form.
///
/// Builds one instruction embedding `form_html` and `document_text` verbatim,
/// invokes the model once, and normalises/parses the reply.
///
/// # Errors
/// * [`FormScribeError::MissingInput`] — either input is empty.
/// * [`FormScribeError::ProviderNotConfigured`] — no credential resolves.
/// * [`FormScribeError::LlmApiError`] — the model call itself failed.
/// * [`FormScribeError::MappingFailed`] — the reply did not parse as the
///   required shape; carries the raw reply for operator diagnosis.
pub async fn fill_form(
    form_html: &str,
    document_text: &str,
    config: &PipelineConfig,
) -> Result<FillResult, FormScribeError> {
    if form_html.is_empty() {
        return Err(FormScribeError::MissingInput {
            field: "formHTML".into(),
        });
    }
    if document_text.is_empty() {
        return Err(FormScribeError::MissingInput {
            field: "documentsExtractedText".into(),
        });
    }

    info!(
        "Fill request: {} bytes of form markup, {} bytes of document text",
        form_html.len(),
        document_text.len()
    );

    let provider = resolve_provider(config)?;
    let prompt = prompts::fill_prompt(form_html, document_text);

    let messages = vec![ChatMessage::user(prompt)];
    let options = CompletionOptions {
        max_tokens: Some(config.max_tokens),
        ..Default::default()
    };

    let response = provider
        .chat(&messages, Some(&options))
        .await
        .map_err(|e| FormScribeError::LlmApiError {
            message: format!("{}", e),
        })?;

    debug!("Model reply received: {} chars", response.content.len());

    parse_fill_reply(&response.content)
}

/// Strip the optional markdown fencing a model may wrap its reply in.
///
/// A reply wrapped as ```` ```json … ``` ```` (or with bare ``` fences)
/// normalises to the same content as the unwrapped reply, so both parse
/// identically downstream.
pub fn normalize_reply(raw: &str) -> &str {
    let s = raw.trim();
    let s = s.strip_prefix("```json").unwrap_or(s);
    let s = s.strip_prefix("```").unwrap_or(s);
    let s = s.strip_suffix("```").unwrap_or(s);
    s.trim()
}

/// Parse a (possibly fenced) model reply into a [`FillResult`].
///
/// On failure the raw reply is logged for the operator and carried inside
/// the error — it is never part of a success payload.
pub fn parse_fill_reply(raw: &str) -> Result<FillResult, FormScribeError> {
    let normalized = normalize_reply(raw);

    let reply: FillReply = serde_json::from_str(normalized).map_err(|e| {
        error!(
            reply = %raw,
            "Model reply is not valid field-mapping JSON: {}", e
        );
        FormScribeError::MappingFailed {
            detail: format!("{}", e),
            raw_reply: raw.to_string(),
        }
    })?;

    if let Some(bad) = reply.fields.iter().position(|f| f.field_id.is_empty()) {
        error!(reply = %raw, "Model reply contains an empty fieldId at index {}", bad);
        return Err(FormScribeError::MappingFailed {
            detail: format!("field {} has an empty fieldId", bad),
            raw_reply: raw.to_string(),
        });
    }

    let total_fields = reply.fields.len();
    Ok(FillResult {
        fields: reply.fields,
        total_fields,
    })
}
