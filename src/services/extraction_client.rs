use anyhow::Context;
use async_trait::async_trait;
use bytes::Bytes;
use reqwest::multipart::{Form, Part};
use reqwest::Client;
use std::time::Instant;
use tracing::{debug, info, warn};

use crate::config::ClientConfig;
use crate::error::{UploadError, UploadResult};
use crate::models::{parse_upload_response, ExtractionResult, UploadFile};

pub const UPLOAD_PATH: &str = "/upload";
pub const FILES_PATH: &str = "/files";

/// Bytes of a previously uploaded document as served back for preview.
#[derive(Debug, Clone)]
pub struct StoredFile {
    pub content: Bytes,
    pub content_type: Option<String>,
}

/// The remote document-understanding backend.
#[async_trait]
pub trait ExtractionService: Send + Sync {
    async fn extract(&self, file: &UploadFile) -> UploadResult<ExtractionResult>;

    async fn fetch_file(&self, filename: &str) -> UploadResult<StoredFile>;
}

/// Relative URL the view uses to show a stored document.
pub fn file_url(filename: &str) -> String {
    format!("{}/{}", FILES_PATH, filename)
}

#[derive(Debug, Clone)]
pub struct HttpExtractionService {
    client: Client,
    base_url: String,
}

impl HttpExtractionService {
    pub fn new(config: &ClientConfig) -> anyhow::Result<Self> {
        let client = Client::builder()
            .timeout(config.request_timeout())
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            base_url: config.service_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn build_url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

#[async_trait]
impl ExtractionService for HttpExtractionService {
    async fn extract(&self, file: &UploadFile) -> UploadResult<ExtractionResult> {
        let start = Instant::now();
        let url = self.build_url(UPLOAD_PATH);

        let part = Part::bytes(file.content.to_vec())
            .file_name(file.name.clone())
            .mime_str(&file.mime_type)
            .map_err(|e| UploadError::transport(format!("Invalid MIME type {}: {}", file.mime_type, e)))?;
        let form = Form::new().part("file", part);

        info!(url = %url, file_name = %file.name, file_size = file.size(), "Uploading document");

        let response = self.client.post(&url).multipart(form).send().await?;
        let status = response.status();
        if !status.is_success() {
            warn!(status = %status, "Extraction service returned non-success status");
        }

        let body = response.bytes().await?;
        debug!(
            status = %status,
            body_len = body.len(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Upload response received"
        );

        parse_upload_response(&body)
    }

    async fn fetch_file(&self, filename: &str) -> UploadResult<StoredFile> {
        if filename.is_empty() || filename.contains(|c: char| c == '/' || c == '\\') || filename == ".." {
            return Err(UploadError::protocol(format!("invalid stored file name '{}'", filename)));
        }

        let url = self.build_url(&file_url(filename));
        debug!(url = %url, "Fetching stored document");

        let response = self.client.get(&url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(UploadError::service(Some(format!(
                "Failed to fetch {}: HTTP {}",
                filename, status
            ))));
        }

        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|ct| ct.to_str().ok())
            .map(str::to_string);
        let content = response.bytes().await?;

        Ok(StoredFile {
            content,
            content_type,
        })
    }
}
