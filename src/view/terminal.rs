use std::io::{self, Write};

use super::{FormControls, FormField, Preview, RenderedResult, View};

/// Line-oriented view for the command line.
pub struct TerminalView<W: Write> {
    out: W,
}

impl TerminalView<io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write> TerminalView<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn line(&mut self, text: impl AsRef<str>) {
        if let Err(e) = writeln!(self.out, "{}", text.as_ref()) {
            tracing::warn!(error = %e, "Failed to write to terminal");
        }
    }
}

impl<W: Write> View for TerminalView<W> {
    fn set_drop_highlight(&mut self, highlighted: bool) {
        tracing::trace!(highlighted, "Drop zone highlight changed");
    }

    fn show_loading(&mut self) {
        self.line("Processing document...");
    }

    fn show_results(&mut self, rendered: &RenderedResult) {
        match &rendered.preview {
            Preview::Image { src, .. } => self.line(format!("Preview (image): {}", src)),
            Preview::Pdf { src, .. } => self.line(format!("Preview (pdf): {}", src)),
            Preview::Unavailable { message } => self.line(format!("Preview: {}", message)),
        }

        self.line("");
        self.line("Quality check");
        for indicator in &rendered.quality {
            self.line(format!(
                "  {:<12} {:<10} [{}]",
                indicator.label,
                indicator.value,
                indicator.status.as_str()
            ));
        }

        self.line("");
        self.line("Extracted fields");
        for (field, value) in rendered.form.iter() {
            self.line(format!("  {:<14} {}", field.label(), value));
        }

        self.line("");
        self.line("Raw text");
        for text_line in rendered.raw_text.lines() {
            self.line(format!("  {}", text_line));
        }
    }

    fn show_error(&mut self, message: &str) {
        self.line(format!("Error: {}", message));
    }

    fn hide_error(&mut self) {}

    fn set_field_value(&mut self, field: FormField, value: &str) {
        self.line(format!("  {} -> {}", field.label(), value));
    }

    fn set_form_controls(&mut self, controls: FormControls) {
        tracing::debug!(
            editable = controls.editable,
            save_enabled = controls.save_enabled,
            "Form controls updated"
        );
    }

    fn notify(&mut self, message: &str) {
        self.line(message);
    }
}
