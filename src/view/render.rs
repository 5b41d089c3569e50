//! Pure rendering of an [`ExtractionResult`] into the pieces a view displays.

use serde::Serialize;
use std::fmt;
use std::str::FromStr;

use crate::models::{DocumentFields, ExtractionResult, QualityAssessment, QualityLabel};
use crate::services::file_url;

pub const PREVIEW_ALT: &str = "Document preview";
pub const PREVIEW_UNAVAILABLE: &str = "Preview not available";
pub const PDF_VIEWER_WIDTH: &str = "100%";
pub const PDF_VIEWER_HEIGHT: &str = "300px";
pub const NO_TEXT_PLACEHOLDER: &str = "No text could be extracted from the document.";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Preview {
    Image { src: String, alt: String },
    Pdf { src: String, width: String, height: String },
    Unavailable { message: String },
}

/// Picks the preview renderer from the extension of the name the user uploaded.
pub fn preview_for(filename: &str, original_name: &str) -> Preview {
    let ext = original_name
        .rsplit('.')
        .next()
        .unwrap_or_default()
        .to_lowercase();

    match ext.as_str() {
        "jpg" | "jpeg" | "png" => Preview::Image {
            src: file_url(filename),
            alt: PREVIEW_ALT.to_string(),
        },
        "pdf" => Preview::Pdf {
            src: file_url(filename),
            width: PDF_VIEWER_WIDTH.to_string(),
            height: PDF_VIEWER_HEIGHT.to_string(),
        },
        _ => Preview::Unavailable {
            message: PREVIEW_UNAVAILABLE.to_string(),
        },
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum QualityStatus {
    Good,
    Warning,
    Error,
}

impl QualityStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            QualityStatus::Good => "good",
            QualityStatus::Warning => "warning",
            QualityStatus::Error => "error",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QualityIndicator {
    pub id: &'static str,
    pub label: &'static str,
    pub value: String,
    pub status: QualityStatus,
}

/// Upper-cases the first character, leaving the rest untouched.
pub fn capitalize(label: &str) -> String {
    let mut chars = label.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn graded(id: &'static str, label: &'static str, grade: &QualityLabel) -> QualityIndicator {
    QualityIndicator {
        id,
        label,
        value: capitalize(grade.as_str()),
        status: if grade.is_good() {
            QualityStatus::Good
        } else {
            QualityStatus::Warning
        },
    }
}

pub fn quality_indicators(quality: &QualityAssessment) -> Vec<QualityIndicator> {
    vec![
        QualityIndicator {
            id: "blur",
            label: "Blurriness",
            value: if quality.is_blurry { "High" } else { "Low" }.to_string(),
            status: if quality.is_blurry {
                QualityStatus::Error
            } else {
                QualityStatus::Good
            },
        },
        QualityIndicator {
            id: "blank",
            label: "Blank Page",
            value: if quality.is_blank { "Yes" } else { "No" }.to_string(),
            status: if quality.is_blank {
                QualityStatus::Error
            } else {
                QualityStatus::Good
            },
        },
        graded("brightness", "Brightness", &quality.brightness),
        graded("contrast", "Contrast", &quality.contrast),
    ]
}

/// The seven editable fields of an identity document form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FormField {
    IdNumber,
    Name,
    DateOfBirth,
    Gender,
    Nationality,
    IssueDate,
    ExpiryDate,
}

impl FormField {
    pub const ALL: [FormField; 7] = [
        FormField::IdNumber,
        FormField::Name,
        FormField::DateOfBirth,
        FormField::Gender,
        FormField::Nationality,
        FormField::IssueDate,
        FormField::ExpiryDate,
    ];

    fn index(self) -> usize {
        self as usize
    }

    /// Key used by the extraction service.
    pub fn key(self) -> &'static str {
        match self {
            FormField::IdNumber => "id_number",
            FormField::Name => "name",
            FormField::DateOfBirth => "date_of_birth",
            FormField::Gender => "gender",
            FormField::Nationality => "nationality",
            FormField::IssueDate => "issue_date",
            FormField::ExpiryDate => "expiry_date",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            FormField::IdNumber => "ID Number",
            FormField::Name => "Full Name",
            FormField::DateOfBirth => "Date of Birth",
            FormField::Gender => "Gender",
            FormField::Nationality => "Nationality",
            FormField::IssueDate => "Issue Date",
            FormField::ExpiryDate => "Expiry Date",
        }
    }

    pub fn is_date(self) -> bool {
        matches!(
            self,
            FormField::DateOfBirth | FormField::IssueDate | FormField::ExpiryDate
        )
    }
}

impl fmt::Display for FormField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for FormField {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        FormField::ALL
            .into_iter()
            .find(|field| field.key() == s)
            .ok_or_else(|| format!("unknown form field '{}'", s))
    }
}

/// Current values of the form, always a concrete string per field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DocumentForm {
    values: [String; 7],
}

impl DocumentForm {
    pub fn from_fields(fields: &DocumentFields) -> Self {
        let pick = |value: &Option<String>| value.clone().unwrap_or_default();
        Self {
            values: [
                pick(&fields.id_number),
                pick(&fields.name),
                pick(&fields.date_of_birth),
                pick(&fields.gender),
                pick(&fields.nationality),
                pick(&fields.issue_date),
                pick(&fields.expiry_date),
            ],
        }
    }

    pub fn get(&self, field: FormField) -> &str {
        &self.values[field.index()]
    }

    pub fn set(&mut self, field: FormField, value: impl Into<String>) {
        self.values[field.index()] = value.into();
    }

    pub fn iter(&self) -> impl Iterator<Item = (FormField, &str)> {
        FormField::ALL.into_iter().map(move |field| (field, self.get(field)))
    }

    /// Value formatted for a date input, or `None` for non-date fields.
    pub fn date_input(&self, field: FormField) -> Option<String> {
        field.is_date().then(|| to_date_input(self.get(field)))
    }

    pub fn to_fields(&self) -> DocumentFields {
        let keep = |field: FormField| {
            let value = self.get(field);
            (!value.is_empty()).then(|| value.to_string())
        };
        DocumentFields {
            id_number: keep(FormField::IdNumber),
            name: keep(FormField::Name),
            date_of_birth: keep(FormField::DateOfBirth),
            gender: keep(FormField::Gender),
            nationality: keep(FormField::Nationality),
            issue_date: keep(FormField::IssueDate),
            expiry_date: keep(FormField::ExpiryDate),
        }
    }
}

impl Serialize for DocumentForm {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        use serde::ser::SerializeMap;
        let mut map = serializer.serialize_map(Some(self.values.len()))?;
        for (field, value) in self.iter() {
            map.serialize_entry(field.key(), value)?;
        }
        map.end()
    }
}

/// Converts `D/M/YYYY`, `DD-MM-YYYY` and friends to `YYYY-MM-DD`; anything else yields "".
pub fn to_date_input(value: &str) -> String {
    let parts: Vec<&str> = value.split(|c: char| c == '/' || c == '-').collect();
    if parts.len() != 3 {
        return String::new();
    }
    let (day, month, year) = (parts[0], parts[1], parts[2]);

    let digits = |s: &str, min: usize, max: usize| {
        (min..=max).contains(&s.len()) && s.bytes().all(|b| b.is_ascii_digit())
    };
    if !(digits(day, 1, 2) && digits(month, 1, 2) && digits(year, 4, 4)) {
        return String::new();
    }

    format!("{}-{:0>2}-{:0>2}", year, month, day)
}

pub fn raw_text_for(text: Option<&str>) -> String {
    match text {
        Some(text) if !text.is_empty() => text.to_string(),
        _ => NO_TEXT_PLACEHOLDER.to_string(),
    }
}

/// Everything the results section shows for one extraction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RenderedResult {
    pub preview: Preview,
    pub quality: Vec<QualityIndicator>,
    pub form: DocumentForm,
    pub raw_text: String,
}

impl RenderedResult {
    pub fn from_result(result: &ExtractionResult) -> Self {
        Self {
            preview: preview_for(&result.filename, &result.original_name),
            quality: quality_indicators(&result.quality),
            form: DocumentForm::from_fields(&result.fields),
            raw_text: raw_text_for(result.text.as_deref()),
        }
    }
}
