use thiserror::Error;

pub type UploadResult<T> = Result<T, UploadError>;

pub const UNSUPPORTED_TYPE_MESSAGE: &str = "Please upload a PDF, JPG, or PNG file";
pub const GENERIC_SERVICE_MESSAGE: &str = "Failed to process document";
pub const INVALID_RESPONSE_MESSAGE: &str = "Server error: Invalid response.";
pub const NETWORK_ERROR_MESSAGE: &str = "Network error. Please try again.";

/// Rejections raised locally, before anything is sent to the service.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("unsupported type: {mime_type}")]
    UnsupportedType { mime_type: String },

    #[error("too large: {size} bytes exceeds limit of {limit} bytes")]
    TooLarge { size: u64, limit: u64 },
}

impl ValidationError {
    pub fn user_message(&self) -> String {
        match self {
            ValidationError::UnsupportedType { .. } => UNSUPPORTED_TYPE_MESSAGE.to_string(),
            ValidationError::TooLarge { limit, .. } => {
                format!("File size must be less than {}MB", limit / (1024 * 1024))
            }
        }
    }
}

#[derive(Error, Debug)]
pub enum UploadError {
    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationError),

    #[error("Extraction service reported failure: {}", .message.as_deref().unwrap_or("<no message>"))]
    Service { message: Option<String> },

    #[error("Malformed service response: {message}")]
    Protocol { message: String },

    #[error("Request did not complete: {message}")]
    Transport { message: String },

    #[error("Form fields are read-only")]
    FormLocked,

    #[error("IO error: {message}")]
    Io { message: String },
}

impl UploadError {
    pub fn error_code(&self) -> &'static str {
        match self {
            UploadError::Validation(ValidationError::UnsupportedType { .. }) => "UNSUPPORTED_TYPE",
            UploadError::Validation(ValidationError::TooLarge { .. }) => "FILE_TOO_LARGE",
            UploadError::Service { .. } => "SERVICE_ERROR",
            UploadError::Protocol { .. } => "PROTOCOL_ERROR",
            UploadError::Transport { .. } => "TRANSPORT_ERROR",
            UploadError::FormLocked => "FORM_LOCKED",
            UploadError::Io { .. } => "IO_ERROR",
        }
    }

    /// The single line shown in the error region.
    pub fn user_message(&self) -> String {
        match self {
            UploadError::Validation(err) => err.user_message(),
            UploadError::Service { message } => message
                .as_deref()
                .filter(|m| !m.is_empty())
                .unwrap_or(GENERIC_SERVICE_MESSAGE)
                .to_string(),
            UploadError::Protocol { .. } => INVALID_RESPONSE_MESSAGE.to_string(),
            UploadError::Transport { .. } => NETWORK_ERROR_MESSAGE.to_string(),
            UploadError::FormLocked => "Click \"Edit Fields\" before changing values".to_string(),
            UploadError::Io { message } => message.clone(),
        }
    }
}

impl From<std::io::Error> for UploadError {
    fn from(err: std::io::Error) -> Self {
        UploadError::Io {
            message: err.to_string(),
        }
    }
}

impl From<serde_json::Error> for UploadError {
    fn from(err: serde_json::Error) -> Self {
        UploadError::Protocol {
            message: format!("JSON parsing error: {}", err),
        }
    }
}

impl From<reqwest::Error> for UploadError {
    fn from(err: reqwest::Error) -> Self {
        UploadError::Transport {
            message: err.to_string(),
        }
    }
}

// Helper methods for creating specific errors
impl UploadError {
    pub fn service(message: Option<String>) -> Self {
        UploadError::Service { message }
    }

    pub fn protocol(message: impl Into<String>) -> Self {
        UploadError::Protocol {
            message: message.into(),
        }
    }

    pub fn transport(message: impl Into<String>) -> Self {
        UploadError::Transport {
            message: message.into(),
        }
    }
}
