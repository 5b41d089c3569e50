//! The UI tree the controller draws into.
//!
//! The controller never looks elements up itself; a [`View`] is handed to it
//! at construction and receives every visible change.

pub mod recording;
pub mod render;
pub mod terminal;

pub use recording::{RecordingView, ViewEvent, ViewSnapshot};
pub use render::*;
pub use terminal::TerminalView;

use serde::Serialize;

pub const EDIT_LABEL: &str = "Edit Fields";
pub const SAVE_PENDING_LABEL: &str = "Save Changes";

/// State of the edit/save affordances under the form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FormControls {
    pub editable: bool,
    pub edit_label: &'static str,
    pub save_enabled: bool,
}

impl FormControls {
    pub const READ_ONLY: FormControls = FormControls {
        editable: false,
        edit_label: EDIT_LABEL,
        save_enabled: false,
    };

    pub const EDITING: FormControls = FormControls {
        editable: true,
        edit_label: SAVE_PENDING_LABEL,
        save_enabled: true,
    };
}

impl Default for FormControls {
    fn default() -> Self {
        Self::READ_ONLY
    }
}

pub trait View {
    fn set_drop_highlight(&mut self, highlighted: bool);

    /// Shows the loading indicator and hides both results and error.
    fn show_loading(&mut self);

    /// Hides the loading indicator and shows the results section.
    fn show_results(&mut self, rendered: &RenderedResult);

    /// Shows the error region, hiding loading and results.
    fn show_error(&mut self, message: &str);

    fn hide_error(&mut self);

    fn set_field_value(&mut self, field: FormField, value: &str);

    fn set_form_controls(&mut self, controls: FormControls);

    /// A one-off acknowledgement, e.g. after saving.
    fn notify(&mut self, message: &str);
}
