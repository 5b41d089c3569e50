use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::env;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use aura_intake::config::{ClientConfig, LogFormat};
use aura_intake::models::{UploadFile, UploadLimits};
use aura_intake::services::{ExtractionService, HttpExtractionService};
use aura_intake::view::{FormField, RecordingView, TerminalView, View};
use aura_intake::UploadController;

#[derive(Parser)]
#[command(name = "aura-intake", about = "Upload identity documents for field extraction")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Upload a PDF, JPG or PNG document and show the extracted fields
    Upload {
        /// Path to the document
        file: PathBuf,
        /// Override the detected MIME type
        #[arg(long)]
        mime: Option<String>,
        /// Print the final view state as JSON instead of text
        #[arg(long)]
        json: bool,
        /// Download the stored document to this path after extraction
        #[arg(long)]
        save_preview: Option<PathBuf>,
        /// Correct a field after extraction, e.g. --set gender=F (repeatable)
        #[arg(long = "set", value_parser = parse_assignment)]
        edits: Vec<(FormField, String)>,
    },
    /// Run the local type and size checks without uploading
    Check {
        /// Path to the document
        file: PathBuf,
        /// Override the detected MIME type
        #[arg(long)]
        mime: Option<String>,
    },
}

fn parse_assignment(raw: &str) -> Result<(FormField, String), String> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected field=value, got '{}'", raw))?;
    Ok((key.trim().parse()?, value.to_string()))
}

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "aura_intake=info".into());
    let format = env::var("LOG_FORMAT")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(LogFormat::Pretty);

    let registry = tracing_subscriber::registry().with(filter);
    match format {
        LogFormat::Json => registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init(),
        LogFormat::Pretty => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(false)
                    .with_writer(std::io::stderr),
            )
            .init(),
    }
}

async fn run_upload<V: View>(
    controller: &mut UploadController<HttpExtractionService, V>,
    service: &HttpExtractionService,
    file: UploadFile,
    edits: Vec<(FormField, String)>,
    save_preview: Option<PathBuf>,
) -> Result<()> {
    controller.submit_for_extraction(file).await?;

    if !edits.is_empty() {
        controller.toggle_edit();
        for (field, value) in edits {
            controller.set_field(field, value)?;
        }
        controller.toggle_edit();
    }

    if let (Some(path), Some(result)) = (save_preview, controller.result()) {
        let stored = service.fetch_file(&result.filename).await?;
        tokio::fs::write(&path, &stored.content)
            .await
            .with_context(|| format!("Failed to write preview to {}", path.display()))?;
        tracing::info!(
            path = %path.display(),
            bytes = stored.content.len(),
            content_type = ?stored.content_type,
            "Preview saved"
        );
    }

    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    let cli = Cli::parse();
    let config = ClientConfig::from_env()?;
    let limits = UploadLimits::from_megabytes(config.max_upload_size_mb)
        .context("MAX_UPLOAD_SIZE_MB is out of range")?;

    match cli.command {
        Commands::Upload {
            file,
            mime,
            json,
            save_preview,
            edits,
        } => {
            let upload = UploadFile::from_path(&file, mime.as_deref())
                .await
                .with_context(|| format!("Failed to read {}", file.display()))?;
            let service = Arc::new(HttpExtractionService::new(&config)?);

            tracing::info!(service_url = %service.base_url(), "Starting document upload");

            if json {
                let mut controller =
                    UploadController::new(Arc::clone(&service), RecordingView::new()).with_limits(limits);
                let outcome = run_upload(&mut controller, &service, upload, edits, save_preview).await;
                let out = serde_json::to_string_pretty(&controller.view().snapshot)
                    .context("Serialize view state")?;
                println!("{}", out);
                outcome
            } else {
                let mut controller =
                    UploadController::new(Arc::clone(&service), TerminalView::stdout()).with_limits(limits);
                run_upload(&mut controller, &service, upload, edits, save_preview).await
            }
        }
        Commands::Check { file, mime } => {
            let upload = UploadFile::from_path(&file, mime.as_deref())
                .await
                .with_context(|| format!("Failed to read {}", file.display()))?;
            match limits.validate(&upload) {
                Ok(()) => {
                    println!("OK: {} ({}, {} bytes)", upload.name, upload.mime_type, upload.size());
                    Ok(())
                }
                Err(e) => {
                    println!("{}", e.user_message());
                    Err(e.into())
                }
            }
        }
    }
}
