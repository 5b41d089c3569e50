use serde::Serialize;

use super::{FormControls, FormField, RenderedResult, View};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum ViewEvent {
    DropHighlight { highlighted: bool },
    Loading,
    Results,
    Error { message: String },
    ErrorHidden,
    FieldValue { field: FormField, value: String },
    Controls { controls: FormControls },
    Notice { message: String },
}

/// What is currently visible.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ViewSnapshot {
    pub drop_highlighted: bool,
    pub loading: bool,
    pub results: Option<RenderedResult>,
    pub error: Option<String>,
    pub controls: FormControls,
}

/// Keeps the visible state plus an ordered log of every update.
#[derive(Debug, Clone, Default)]
pub struct RecordingView {
    pub snapshot: ViewSnapshot,
    pub events: Vec<ViewEvent>,
    pub notices: Vec<String>,
}

impl RecordingView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn error(&self) -> Option<&str> {
        self.snapshot.error.as_deref()
    }

    pub fn results(&self) -> Option<&RenderedResult> {
        self.snapshot.results.as_ref()
    }

    pub fn field(&self, field: FormField) -> Option<&str> {
        self.results().map(|r| r.form.get(field))
    }
}

impl View for RecordingView {
    fn set_drop_highlight(&mut self, highlighted: bool) {
        self.snapshot.drop_highlighted = highlighted;
        self.events.push(ViewEvent::DropHighlight { highlighted });
    }

    fn show_loading(&mut self) {
        self.snapshot.loading = true;
        self.snapshot.results = None;
        self.snapshot.error = None;
        self.events.push(ViewEvent::Loading);
    }

    fn show_results(&mut self, rendered: &RenderedResult) {
        self.snapshot.loading = false;
        self.snapshot.results = Some(rendered.clone());
        self.events.push(ViewEvent::Results);
    }

    fn show_error(&mut self, message: &str) {
        self.snapshot.loading = false;
        self.snapshot.results = None;
        self.snapshot.error = Some(message.to_string());
        self.events.push(ViewEvent::Error {
            message: message.to_string(),
        });
    }

    fn hide_error(&mut self) {
        self.snapshot.error = None;
        self.events.push(ViewEvent::ErrorHidden);
    }

    fn set_field_value(&mut self, field: FormField, value: &str) {
        if let Some(results) = self.snapshot.results.as_mut() {
            results.form.set(field, value);
        }
        self.events.push(ViewEvent::FieldValue {
            field,
            value: value.to_string(),
        });
    }

    fn set_form_controls(&mut self, controls: FormControls) {
        self.snapshot.controls = controls;
        self.events.push(ViewEvent::Controls { controls });
    }

    fn notify(&mut self, message: &str) {
        self.notices.push(message.to_string());
        self.events.push(ViewEvent::Notice {
            message: message.to_string(),
        });
    }
}
