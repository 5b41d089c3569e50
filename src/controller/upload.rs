use chrono::Utc;
use std::sync::Arc;
use tokio::task::{AbortHandle, JoinHandle};
use tracing::{debug, info, warn};

use crate::controller::state::{EditState, Phase, SessionId};
use crate::error::{UploadError, UploadResult};
use crate::models::{ExtractionResult, UploadFile, UploadLimits};
use crate::services::ExtractionService;
use crate::view::{DocumentForm, FormField, RenderedResult, View};

pub const CHANGES_SAVED_MESSAGE: &str = "Changes saved successfully!";
pub const DATA_SUBMITTED_MESSAGE: &str = "Data submitted successfully!";

/// The answer to one extraction request, tagged with the session that asked.
#[derive(Debug)]
pub struct Completion {
    pub session: SessionId,
    pub outcome: UploadResult<ExtractionResult>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompletionOutcome {
    Applied,
    /// A newer selection replaced the session; nothing changed.
    Stale,
}

/// An extraction running on the runtime in the background.
#[derive(Debug)]
pub struct PendingExtraction {
    session: SessionId,
    handle: JoinHandle<UploadResult<ExtractionResult>>,
}

impl PendingExtraction {
    pub fn session(&self) -> SessionId {
        self.session
    }

    /// Resolves to `None` when the task was aborted by a newer upload.
    pub async fn wait(self) -> Option<Completion> {
        match self.handle.await {
            Ok(outcome) => Some(Completion {
                session: self.session,
                outcome,
            }),
            Err(e) if e.is_cancelled() => None,
            Err(e) => Some(Completion {
                session: self.session,
                outcome: Err(UploadError::transport(format!("extraction task failed: {}", e))),
            }),
        }
    }
}

/// Drives the upload widget: selection, validation, extraction and rendering.
pub struct UploadController<S: ?Sized, V> {
    service: Arc<S>,
    view: V,
    limits: UploadLimits,
    phase: Phase,
    edit: EditState,
    drop_highlighted: bool,
    in_flight: Option<AbortHandle>,
}

impl<S, V> UploadController<S, V>
where
    S: ExtractionService + ?Sized + 'static,
    V: View,
{
    pub fn new(service: Arc<S>, view: V) -> Self {
        Self {
            service,
            view,
            limits: UploadLimits::default(),
            phase: Phase::Idle,
            edit: EditState::ReadOnly,
            drop_highlighted: false,
            in_flight: None,
        }
    }

    pub fn with_limits(mut self, limits: UploadLimits) -> Self {
        self.limits = limits;
        self
    }

    pub fn phase(&self) -> &Phase {
        &self.phase
    }

    pub fn edit_state(&self) -> EditState {
        self.edit
    }

    pub fn current_session(&self) -> Option<SessionId> {
        self.phase.session()
    }

    pub fn result(&self) -> Option<&ExtractionResult> {
        match &self.phase {
            Phase::Displaying { result, .. } => Some(result),
            _ => None,
        }
    }

    pub fn form(&self) -> Option<&DocumentForm> {
        match &self.phase {
            Phase::Displaying { form, .. } => Some(form),
            _ => None,
        }
    }

    pub fn view(&self) -> &V {
        &self.view
    }

    pub fn into_view(self) -> V {
        self.view
    }

    pub fn drag_enter(&mut self) {
        self.highlight(true);
    }

    pub fn drag_over(&mut self) {
        self.highlight(true);
    }

    pub fn drag_leave(&mut self) {
        self.highlight(false);
    }

    fn highlight(&mut self, on: bool) {
        if self.drop_highlighted != on {
            self.drop_highlighted = on;
            self.view.set_drop_highlight(on);
        }
    }

    /// Handles files dropped on the upload area. Only the first file is used.
    pub async fn drop_files(&mut self, files: Vec<UploadFile>) -> Option<UploadResult<()>> {
        self.highlight(false);
        let file = files.into_iter().next()?;
        Some(self.submit_for_extraction(file).await)
    }

    /// Validates a selection and, if it passes, opens a new session for it.
    pub fn accept_file(&mut self, file: &UploadFile) -> UploadResult<SessionId> {
        self.supersede();

        if let Err(e) = self.limits.validate(file) {
            let err = UploadError::from(e);
            self.fail(&err);
            return Err(err);
        }

        let session = SessionId::new();
        info!(
            session_id = %session,
            file_name = %file.name,
            file_size = file.size(),
            mime_type = %file.mime_type,
            "File accepted"
        );

        self.phase = Phase::Uploading {
            session,
            file_name: file.name.clone(),
            started_at: Utc::now(),
        };
        self.edit = EditState::ReadOnly;
        self.view.set_form_controls(self.edit.controls());
        self.view.show_loading();

        Ok(session)
    }

    /// Accepts the file and waits for the service to answer.
    pub async fn submit_for_extraction(&mut self, file: UploadFile) -> UploadResult<()> {
        let session = self.accept_file(&file)?;
        let outcome = self.service.extract(&file).await;
        match outcome {
            Ok(result) => {
                self.display(session, result);
                Ok(())
            }
            Err(e) => {
                self.fail(&e);
                Err(e)
            }
        }
    }

    /// Accepts the file and runs the request as a background task.
    ///
    /// The returned handle's [`Completion`] must be fed back through
    /// [`UploadController::complete`]. Accepting another file aborts this task.
    pub fn start_extraction(&mut self, file: UploadFile) -> UploadResult<PendingExtraction> {
        let session = self.accept_file(&file)?;
        let service = Arc::clone(&self.service);
        let handle = tokio::spawn(async move { service.extract(&file).await });
        self.in_flight = Some(handle.abort_handle());

        Ok(PendingExtraction { session, handle })
    }

    pub fn complete(&mut self, completion: Completion) -> CompletionOutcome {
        let current = match &self.phase {
            Phase::Uploading { session, .. } => Some(*session),
            _ => None,
        };
        if current != Some(completion.session) {
            debug!(
                session_id = %completion.session,
                phase = self.phase.name(),
                "Ignoring stale extraction response"
            );
            return CompletionOutcome::Stale;
        }

        self.in_flight = None;
        match completion.outcome {
            Ok(result) => self.display(completion.session, result),
            Err(e) => self.fail(&e),
        }
        CompletionOutcome::Applied
    }

    /// Pushes a result to the view. Fields start read-only.
    fn render(&mut self, result: &ExtractionResult) -> RenderedResult {
        let rendered = RenderedResult::from_result(result);
        self.view.show_results(&rendered);
        self.edit = EditState::ReadOnly;
        self.view.set_form_controls(self.edit.controls());
        rendered
    }

    fn display(&mut self, session: SessionId, result: ExtractionResult) {
        if let Phase::Uploading { started_at, .. } = &self.phase {
            let elapsed_ms = (Utc::now() - *started_at).num_milliseconds();
            info!(
                session_id = %session,
                stored_as = %result.filename,
                elapsed_ms,
                "Extraction completed"
            );
        }

        let rendered = self.render(&result);
        self.phase = Phase::Displaying {
            session,
            result,
            form: rendered.form,
        };
    }

    fn fail(&mut self, err: &UploadError) {
        warn!(error_code = err.error_code(), error = %err, "Upload failed");
        let message = err.user_message();
        self.view.show_error(&message);
        if self.edit.is_editing() {
            self.edit = EditState::ReadOnly;
            self.view.set_form_controls(self.edit.controls());
        }
        self.phase = Phase::Error {
            message,
            code: err.error_code(),
        };
    }

    fn supersede(&mut self) {
        if let Some(handle) = self.in_flight.take() {
            debug!("Aborting superseded extraction request");
            handle.abort();
        }
    }

    /// Flips the form between read-only and editing. Only results on screen can be edited.
    pub fn toggle_edit(&mut self) -> EditState {
        if !matches!(self.phase, Phase::Displaying { .. }) {
            debug!(phase = self.phase.name(), "Ignoring edit toggle without displayed results");
            return self.edit;
        }

        self.edit = self.edit.toggled();
        self.view.set_form_controls(self.edit.controls());

        if !self.edit.is_editing() {
            // Edits stay local; nothing is sent back to the service.
            info!(session_id = ?self.current_session(), "Form edits committed locally");
            self.view.notify(CHANGES_SAVED_MESSAGE);
        }
        self.edit
    }

    pub fn set_field(&mut self, field: FormField, value: impl Into<String>) -> UploadResult<()> {
        if !self.edit.is_editing() {
            return Err(UploadError::FormLocked);
        }
        let Phase::Displaying { form, .. } = &mut self.phase else {
            return Err(UploadError::FormLocked);
        };

        let value = value.into();
        form.set(field, value.clone());
        self.view.set_field_value(field, &value);
        Ok(())
    }

    pub fn submit_save(&mut self) {
        info!(session_id = ?self.current_session(), "Form submitted");
        self.view.notify(DATA_SUBMITTED_MESSAGE);
    }

    pub fn clear_error(&mut self) {
        if let Phase::Error { .. } = self.phase {
            self.view.hide_error();
            self.phase = Phase::Idle;
        }
    }
}
