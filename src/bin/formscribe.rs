//! CLI binary for formscribe.
//!
//! A thin shim over the library crate: maps flags to `PipelineConfig`, runs
//! one of the two pipelines, and prints the same payloads a hosting API
//! would return — a `{"text": …}` JSON object for cloud extraction, the raw
//! aggregated text for the local engine, and the full fill envelope for
//! mapping.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use formscribe::{
    extract, fill_form, BackendKind, ExtractResponse, FillResponse, PipelineConfig,
    UploadedDocument,
};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "formscribe", version, about = "Document OCR and form filling")]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Log verbosely (equivalent to RUST_LOG=debug).
    #[arg(long, short, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Command {
    /// Extract text from an image or PDF.
    Extract {
        /// Path to the image or PDF file.
        file: PathBuf,

        /// OCR backend to use.
        #[arg(long, value_enum, default_value_t = BackendArg::Cloud)]
        backend: BackendArg,

        /// Model identifier for the cloud backend (e.g. claude-sonnet-4-5).
        #[arg(long, env = "FORMSCRIBE_MODEL")]
        model: Option<String>,

        /// Provider name (anthropic, openai, …); auto-detected when omitted.
        #[arg(long, env = "FORMSCRIBE_PROVIDER")]
        provider: Option<String>,

        /// Maximum output tokens per model call.
        #[arg(long, default_value_t = 4096)]
        max_tokens: usize,

        /// Tesseract language code for the local backend.
        #[arg(long, default_value = "eng")]
        language: String,
    },

    /// Map extracted text onto the fields of an HTML form.
    Fill {
        /// Path to the raw form HTML.
        #[arg(long)]
        form: PathBuf,

        /// Path to the extracted document text.
        #[arg(long)]
        text: PathBuf,

        /// Model identifier (e.g. claude-sonnet-4-5).
        #[arg(long, env = "FORMSCRIBE_MODEL")]
        model: Option<String>,

        /// Provider name (anthropic, openai, …); auto-detected when omitted.
        #[arg(long, env = "FORMSCRIBE_PROVIDER")]
        provider: Option<String>,

        /// Maximum output tokens for the model call.
        #[arg(long, default_value_t = 4096)]
        max_tokens: usize,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum BackendArg {
    /// Multimodal cloud model (needs an API key).
    Cloud,
    /// Local Tesseract engine.
    Local,
}

impl From<BackendArg> for BackendKind {
    fn from(arg: BackendArg) -> Self {
        match arg {
            BackendArg::Cloud => BackendKind::Cloud,
            BackendArg::Local => BackendKind::Local,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("formscribe=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("formscribe=info"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Command::Extract {
            file,
            backend,
            model,
            provider,
            max_tokens,
            language,
        } => run_extract(file, backend, model, provider, max_tokens, language).await,
        Command::Fill {
            form,
            text,
            model,
            provider,
            max_tokens,
        } => run_fill(form, text, model, provider, max_tokens).await,
    }
}

async fn run_extract(
    file: PathBuf,
    backend: BackendArg,
    model: Option<String>,
    provider: Option<String>,
    max_tokens: usize,
    language: String,
) -> Result<()> {
    let bytes = std::fs::read(&file).with_context(|| format!("reading {}", file.display()))?;
    let filename = file
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();

    let mut builder = PipelineConfig::builder()
        .backend(backend.into())
        .max_tokens(max_tokens)
        .ocr_language(language);
    if let Some(m) = model {
        builder = builder.model(m);
    }
    if let Some(p) = provider {
        builder = builder.provider_name(p);
    }
    let config = builder.build()?;

    let doc = UploadedDocument::new(bytes, filename, config.max_upload_bytes)?;
    let result = extract(&doc, &config).await?;

    match config.backend {
        BackendKind::Cloud => {
            println!("{}", serde_json::to_string(&ExtractResponse::from(result))?)
        }
        BackendKind::Local => println!("{}", result.text),
    }

    Ok(())
}

async fn run_fill(
    form: PathBuf,
    text: PathBuf,
    model: Option<String>,
    provider: Option<String>,
    max_tokens: usize,
) -> Result<()> {
    let form_html =
        std::fs::read_to_string(&form).with_context(|| format!("reading {}", form.display()))?;
    let document_text =
        std::fs::read_to_string(&text).with_context(|| format!("reading {}", text.display()))?;

    let mut builder = PipelineConfig::builder().max_tokens(max_tokens);
    if let Some(m) = model {
        builder = builder.model(m);
    }
    if let Some(p) = provider {
        builder = builder.provider_name(p);
    }
    let config = builder.build()?;

    let result = fill_form(&form_html, &document_text, &config).await?;
    println!(
        "{}",
        serde_json::to_string_pretty(&FillResponse::from(result))?
    );

    Ok(())
}
