use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{UploadError, UploadResult};

/// Successful payload of `POST /upload`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractionResult {
    pub success: bool,
    pub filename: String,
    pub original_name: String,
    pub quality: QualityAssessment,
    #[serde(default)]
    pub fields: DocumentFields,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QualityAssessment {
    pub is_blurry: bool,
    pub is_blank: bool,
    pub brightness: QualityLabel,
    pub contrast: QualityLabel,
}

/// A graded label such as `good`, `low` or `high`. Only `good` is meaningful to the client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QualityLabel(pub String);

impl QualityLabel {
    pub fn new(label: impl Into<String>) -> Self {
        Self(label.into())
    }

    pub fn is_good(&self) -> bool {
        self.0 == "good"
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentFields {
    #[serde(default)]
    pub id_number: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub date_of_birth: Option<String>,
    #[serde(default)]
    pub gender: Option<String>,
    #[serde(default)]
    pub nationality: Option<String>,
    #[serde(default)]
    pub issue_date: Option<String>,
    #[serde(default)]
    pub expiry_date: Option<String>,
}

/// Interprets an upload response body.
///
/// The HTTP status is not consulted: the service reports failures in the body,
/// and a body that cannot be read as the expected structure is a protocol error.
pub fn parse_upload_response(body: &[u8]) -> UploadResult<ExtractionResult> {
    let value: Value = serde_json::from_slice(body)?;

    let success = value
        .get("success")
        .and_then(Value::as_bool)
        .ok_or_else(|| UploadError::protocol("missing boolean `success`"))?;

    if !success {
        let message = value
            .get("error")
            .and_then(Value::as_str)
            .map(str::to_string);
        return Err(UploadError::service(message));
    }

    Ok(serde_json::from_value(value)?)
}
