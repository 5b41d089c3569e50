use bytes::Bytes;
use std::path::Path;

use crate::error::{UploadResult, ValidationError};

pub const MIME_JPEG: &str = "image/jpeg";
pub const MIME_PNG: &str = "image/png";
pub const MIME_PDF: &str = "application/pdf";
pub const MIME_UNKNOWN: &str = "application/octet-stream";

pub const ALLOWED_MIME_TYPES: [&str; 3] = [MIME_JPEG, MIME_PNG, MIME_PDF];

pub const DEFAULT_MAX_UPLOAD_BYTES: u64 = 16 * 1024 * 1024;

/// A file picked by the user, ready to be sent to the extraction service.
#[derive(Debug, Clone)]
pub struct UploadFile {
    pub name: String,
    pub mime_type: String,
    pub content: Bytes,
}

impl UploadFile {
    pub fn new(name: impl Into<String>, mime_type: impl Into<String>, content: impl Into<Bytes>) -> Self {
        Self {
            name: name.into(),
            mime_type: mime_type.into(),
            content: content.into(),
        }
    }

    /// Builds a file whose MIME type is inferred from its name, then its leading bytes.
    pub fn detect(name: impl Into<String>, content: impl Into<Bytes>) -> Self {
        let name = name.into();
        let content = content.into();
        let mime_type = guess_mime_type(&name, &content);
        Self::new(name, mime_type, content)
    }

    pub async fn from_path(path: impl AsRef<Path>, mime_override: Option<&str>) -> UploadResult<Self> {
        let path = path.as_ref();
        let content = tokio::fs::read(path).await?;
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("upload")
            .to_string();

        tracing::debug!(file_name = %name, file_size = content.len(), "Read upload from disk");

        Ok(match mime_override {
            Some(mime) => Self::new(name, mime, content),
            None => Self::detect(name, content),
        })
    }

    pub fn size(&self) -> u64 {
        self.content.len() as u64
    }

    pub fn is_pdf(&self) -> bool {
        self.mime_type == MIME_PDF
    }
}

pub fn guess_mime_type(name: &str, content: &[u8]) -> &'static str {
    let ext = name.rsplit_once('.').map(|(_, ext)| ext.to_ascii_lowercase());
    match ext.as_deref() {
        Some("jpg") | Some("jpeg") => return MIME_JPEG,
        Some("png") => return MIME_PNG,
        Some("pdf") => return MIME_PDF,
        _ => {}
    }

    if content.starts_with(b"%PDF") {
        MIME_PDF
    } else if content.starts_with(b"\x89PNG\r\n\x1a\n") {
        MIME_PNG
    } else if content.starts_with(&[0xFF, 0xD8, 0xFF]) {
        MIME_JPEG
    } else {
        MIME_UNKNOWN
    }
}

/// Client-side constraints checked before any network call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UploadLimits {
    pub max_bytes: u64,
}

impl Default for UploadLimits {
    fn default() -> Self {
        Self {
            max_bytes: DEFAULT_MAX_UPLOAD_BYTES,
        }
    }
}

impl UploadLimits {
    /// `None` when the byte count does not fit in a `u64`.
    pub fn from_megabytes(mb: u64) -> Option<Self> {
        mb.checked_mul(1024 * 1024)
            .map(|max_bytes| Self { max_bytes })
    }

    /// Type is checked before size.
    pub fn validate(&self, file: &UploadFile) -> Result<(), ValidationError> {
        if !ALLOWED_MIME_TYPES.contains(&file.mime_type.as_str()) {
            return Err(ValidationError::UnsupportedType {
                mime_type: file.mime_type.clone(),
            });
        }
        if file.size() > self.max_bytes {
            return Err(ValidationError::TooLarge {
                size: file.size(),
                limit: self.max_bytes,
            });
        }
        Ok(())
    }
}
