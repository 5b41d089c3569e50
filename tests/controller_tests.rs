//! Controller behaviour against an in-process extraction service

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use aura_intake::{
    controller::{Completion, CompletionOutcome, EditState, Phase, UploadController},
    error::{UploadError, UploadResult},
    models::{
        DocumentFields, ExtractionResult, QualityAssessment, QualityLabel, UploadFile, MIME_JPEG,
        MIME_PDF,
    },
    services::{ExtractionService, StoredFile},
    view::{FormControls, FormField, Preview, QualityStatus, RecordingView, ViewEvent},
};

type Responder = Box<dyn Fn(&UploadFile) -> UploadResult<ExtractionResult> + Send + Sync>;

struct StubService {
    respond: Responder,
    calls: AtomicUsize,
}

impl StubService {
    fn new(respond: impl Fn(&UploadFile) -> UploadResult<ExtractionResult> + Send + Sync + 'static) -> Arc<Self> {
        Arc::new(Self {
            respond: Box::new(respond),
            calls: AtomicUsize::new(0),
        })
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ExtractionService for StubService {
    async fn extract(&self, file: &UploadFile) -> UploadResult<ExtractionResult> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        (self.respond)(file)
    }

    async fn fetch_file(&self, _filename: &str) -> UploadResult<StoredFile> {
        Err(UploadError::service(Some("not stored".to_string())))
    }
}

fn quality(is_blurry: bool, contrast: &str) -> QualityAssessment {
    QualityAssessment {
        is_blurry,
        is_blank: false,
        brightness: QualityLabel::new("good"),
        contrast: QualityLabel::new(contrast),
    }
}

fn result_for(file: &UploadFile) -> ExtractionResult {
    ExtractionResult {
        success: true,
        filename: format!("20240101_{}", file.name),
        original_name: file.name.clone(),
        quality: quality(false, "good"),
        fields: DocumentFields {
            id_number: Some("12345678".to_string()),
            name: Some(file.name.clone()),
            date_of_birth: Some("03/07/1990".to_string()),
            gender: Some("MALE".to_string()),
            nationality: Some("KENYAN".to_string()),
            issue_date: Some("20/01/2015".to_string()),
            expiry_date: Some("20/01/2025".to_string()),
        },
        text: Some("REPUBLIC OF KENYA\nNATIONAL IDENTITY CARD".to_string()),
        error: None,
    }
}

fn jpeg(name: &str) -> UploadFile {
    UploadFile::new(name, MIME_JPEG, vec![0xFF, 0xD8, 0xFF, 0xE0])
}

fn controller(service: Arc<StubService>) -> UploadController<StubService, RecordingView> {
    UploadController::new(service, RecordingView::new())
}

#[tokio::test]
async fn test_unsupported_type_never_reaches_service() {
    let service = StubService::new(|f| Ok(result_for(f)));
    let mut ctl = controller(service.clone());

    let err = ctl
        .submit_for_extraction(UploadFile::new("scan.gif", "image/gif", vec![1, 2, 3]))
        .await
        .unwrap_err();

    assert!(matches!(err, UploadError::Validation(_)));
    assert_eq!(service.calls(), 0);
    assert_eq!(ctl.view().error(), Some("Please upload a PDF, JPG, or PNG file"));
    assert!(matches!(ctl.phase(), Phase::Error { code: "UNSUPPORTED_TYPE", .. }));
}

#[tokio::test]
async fn test_size_boundary_through_controller() {
    let service = StubService::new(|f| Ok(result_for(f)));
    let mut ctl = controller(service.clone());

    let exact = UploadFile::new("big.pdf", MIME_PDF, vec![0u8; 16 * 1024 * 1024]);
    ctl.submit_for_extraction(exact).await.unwrap();
    assert_eq!(service.calls(), 1);

    let over = UploadFile::new("bigger.pdf", MIME_PDF, vec![0u8; 16 * 1024 * 1024 + 1]);
    ctl.submit_for_extraction(over).await.unwrap_err();
    assert_eq!(service.calls(), 1);
    assert_eq!(ctl.view().error(), Some("File size must be less than 16MB"));
    assert!(ctl.result().is_none());
}

#[tokio::test]
async fn test_successful_upload_renders_everything() {
    let service = StubService::new(|f| Ok(result_for(f)));
    let mut ctl = controller(service);

    ctl.submit_for_extraction(jpeg("national_id.jpg")).await.unwrap();

    assert!(matches!(ctl.phase(), Phase::Displaying { .. }));
    assert!(ctl.current_session().is_some());
    assert_eq!(ctl.edit_state(), EditState::ReadOnly);

    let view = ctl.view();
    assert!(view.error().is_none());
    assert!(!view.snapshot.loading);
    assert_eq!(view.snapshot.controls, FormControls::READ_ONLY);

    let rendered = view.results().unwrap();
    assert_eq!(
        rendered.preview,
        Preview::Image {
            src: "/files/20240101_national_id.jpg".to_string(),
            alt: "Document preview".to_string(),
        }
    );
    assert_eq!(rendered.quality.len(), 4);
    assert_eq!(view.field(FormField::IdNumber), Some("12345678"));
    assert_eq!(view.field(FormField::Name), Some("national_id.jpg"));
    assert_eq!(view.field(FormField::DateOfBirth), Some("03/07/1990"));
    assert_eq!(view.field(FormField::Gender), Some("MALE"));
    assert_eq!(view.field(FormField::Nationality), Some("KENYAN"));
    assert_eq!(view.field(FormField::IssueDate), Some("20/01/2015"));
    assert_eq!(view.field(FormField::ExpiryDate), Some("20/01/2025"));
    assert_eq!(rendered.raw_text, "REPUBLIC OF KENYA\nNATIONAL IDENTITY CARD");

    let loading_at = view.events.iter().position(|e| *e == ViewEvent::Loading).unwrap();
    let results_at = view.events.iter().position(|e| *e == ViewEvent::Results).unwrap();
    assert!(loading_at < results_at);
}

#[tokio::test]
async fn test_missing_gender_renders_empty() {
    let service = StubService::new(|f| {
        let mut result = result_for(f);
        result.fields.gender = None;
        result.text = None;
        Ok(result)
    });
    let mut ctl = controller(service);

    ctl.submit_for_extraction(jpeg("id.jpg")).await.unwrap();

    assert_eq!(ctl.view().field(FormField::Gender), Some(""));
    assert_eq!(
        ctl.view().results().unwrap().raw_text,
        "No text could be extracted from the document."
    );
}

#[tokio::test]
async fn test_quality_readout_through_controller() {
    let service = StubService::new(|f| {
        let mut result = result_for(f);
        result.quality = quality(true, "low");
        Ok(result)
    });
    let mut ctl = controller(service);
    ctl.submit_for_extraction(jpeg("blurry.jpg")).await.unwrap();

    let quality = &ctl.view().results().unwrap().quality;
    assert_eq!((quality[0].value.as_str(), quality[0].status), ("High", QualityStatus::Error));
    assert_eq!((quality[1].value.as_str(), quality[1].status), ("No", QualityStatus::Good));
    assert_eq!((quality[2].value.as_str(), quality[2].status), ("Good", QualityStatus::Good));
    assert_eq!((quality[3].value.as_str(), quality[3].status), ("Low", QualityStatus::Warning));
}

#[tokio::test]
async fn test_service_failure_messages() {
    let service = StubService::new(|_| Err(UploadError::service(Some("Could not read document".to_string()))));
    let mut ctl = controller(service);
    ctl.submit_for_extraction(jpeg("a.jpg")).await.unwrap_err();
    assert_eq!(ctl.view().error(), Some("Could not read document"));
    assert!(ctl.view().results().is_none());

    let service = StubService::new(|_| Err(UploadError::service(None)));
    let mut ctl = controller(service);
    ctl.submit_for_extraction(jpeg("a.jpg")).await.unwrap_err();
    assert_eq!(ctl.view().error(), Some("Failed to process document"));

    let service = StubService::new(|_| Err(UploadError::protocol("expected value at line 1")));
    let mut ctl = controller(service);
    ctl.submit_for_extraction(jpeg("a.jpg")).await.unwrap_err();
    assert_eq!(ctl.view().error(), Some("Server error: Invalid response."));

    let service = StubService::new(|_| Err(UploadError::transport("connection refused")));
    let mut ctl = controller(service);
    ctl.submit_for_extraction(jpeg("a.jpg")).await.unwrap_err();
    assert_eq!(ctl.view().error(), Some("Network error. Please try again."));
    assert!(matches!(ctl.phase(), Phase::Error { code: "TRANSPORT_ERROR", .. }));
}

#[tokio::test]
async fn test_toggle_edit_twice_restores_read_only() {
    let service = StubService::new(|f| Ok(result_for(f)));
    let mut ctl = controller(service);
    ctl.submit_for_extraction(jpeg("id.jpg")).await.unwrap();

    assert_eq!(ctl.toggle_edit(), EditState::Editing);
    assert_eq!(ctl.view().snapshot.controls, FormControls::EDITING);
    assert_eq!(ctl.view().snapshot.controls.edit_label, "Save Changes");
    assert!(ctl.view().notices.is_empty());

    assert_eq!(ctl.toggle_edit(), EditState::ReadOnly);
    let controls = ctl.view().snapshot.controls;
    assert!(!controls.editable);
    assert!(!controls.save_enabled);
    assert_eq!(controls.edit_label, "Edit Fields");
    assert_eq!(ctl.view().notices, vec!["Changes saved successfully!".to_string()]);
}

#[tokio::test]
async fn test_set_field_requires_editing() {
    let service = StubService::new(|f| Ok(result_for(f)));
    let mut ctl = controller(service);

    // nothing displayed yet
    assert_eq!(ctl.toggle_edit(), EditState::ReadOnly);
    assert!(matches!(ctl.set_field(FormField::Name, "X"), Err(UploadError::FormLocked)));

    ctl.submit_for_extraction(jpeg("id.jpg")).await.unwrap();
    assert!(matches!(
        ctl.set_field(FormField::Gender, "FEMALE"),
        Err(UploadError::FormLocked)
    ));

    ctl.toggle_edit();
    ctl.set_field(FormField::Gender, "FEMALE").unwrap();
    assert_eq!(ctl.form().unwrap().get(FormField::Gender), "FEMALE");
    assert_eq!(ctl.view().field(FormField::Gender), Some("FEMALE"));
    // the service result itself is left as returned
    assert_eq!(ctl.result().unwrap().fields.gender.as_deref(), Some("MALE"));
}

fn assert_controls_match(ctl: &UploadController<StubService, RecordingView>) {
    assert_eq!(ctl.view().snapshot.controls, ctl.edit_state().controls());
}

#[tokio::test]
async fn test_edit_state_and_controls_stay_in_step() {
    let service = StubService::new(|f| Ok(result_for(f)));
    let mut ctl = controller(service);
    assert_controls_match(&ctl);

    ctl.submit_for_extraction(jpeg("first.jpg")).await.unwrap();
    assert_controls_match(&ctl);

    ctl.toggle_edit();
    assert_eq!(ctl.edit_state(), EditState::Editing);
    assert_controls_match(&ctl);

    // a completed upload while editing lands read-only on both sides
    ctl.submit_for_extraction(jpeg("second.jpg")).await.unwrap();
    assert_eq!(ctl.edit_state(), EditState::ReadOnly);
    assert_controls_match(&ctl);

    ctl.toggle_edit();
    ctl.submit_for_extraction(UploadFile::new("x.gif", "image/gif", vec![1]))
        .await
        .unwrap_err();
    assert_eq!(ctl.edit_state(), EditState::ReadOnly);
    assert_controls_match(&ctl);

    let pending = ctl.start_extraction(jpeg("third.jpg")).unwrap();
    assert_controls_match(&ctl);
    let completion = pending.wait().await.unwrap();
    ctl.complete(completion);
    assert_controls_match(&ctl);
    assert!(ctl.view().notices.is_empty());
}

#[tokio::test]
async fn test_toggle_edit_ignored_without_results() {
    let service = StubService::new(|_| Err(UploadError::transport("down")));
    let mut ctl = controller(service);

    assert_eq!(ctl.toggle_edit(), EditState::ReadOnly);

    ctl.submit_for_extraction(jpeg("id.jpg")).await.unwrap_err();
    assert!(matches!(ctl.phase(), Phase::Error { .. }));
    assert_eq!(ctl.toggle_edit(), EditState::ReadOnly);
    assert_eq!(ctl.toggle_edit(), EditState::ReadOnly);

    assert!(ctl.view().notices.is_empty());
    assert!(!ctl
        .view()
        .events
        .iter()
        .any(|e| matches!(e, ViewEvent::Controls { controls } if controls.editable)));
}

#[tokio::test]
async fn test_new_session_resets_edit_state() {
    let service = StubService::new(|f| Ok(result_for(f)));
    let mut ctl = controller(service);
    ctl.submit_for_extraction(jpeg("first.jpg")).await.unwrap();
    let first = ctl.current_session().unwrap();

    ctl.toggle_edit();
    assert_eq!(ctl.edit_state(), EditState::Editing);

    ctl.submit_for_extraction(jpeg("second.jpg")).await.unwrap();
    assert_eq!(ctl.edit_state(), EditState::ReadOnly);
    assert_eq!(ctl.view().snapshot.controls, FormControls::READ_ONLY);
    assert_ne!(ctl.current_session().unwrap(), first);
    assert_eq!(ctl.form().unwrap().get(FormField::Name), "second.jpg");
}

#[tokio::test]
async fn test_submit_save_only_acknowledges() {
    let service = StubService::new(|f| Ok(result_for(f)));
    let mut ctl = controller(service.clone());
    ctl.submit_for_extraction(jpeg("id.jpg")).await.unwrap();

    ctl.submit_save();
    assert_eq!(ctl.view().notices, vec!["Data submitted successfully!".to_string()]);
    assert_eq!(service.calls(), 1);
}

#[tokio::test]
async fn test_clear_error_only_affects_error_phase() {
    let service = StubService::new(|f| Ok(result_for(f)));
    let mut ctl = controller(service);

    ctl.clear_error();
    assert_eq!(*ctl.phase(), Phase::Idle);

    ctl.submit_for_extraction(jpeg("id.jpg")).await.unwrap();
    let events_before = ctl.view().events.len();
    ctl.clear_error();
    assert!(matches!(ctl.phase(), Phase::Displaying { .. }));
    assert_eq!(ctl.view().events.len(), events_before);

    ctl.submit_for_extraction(UploadFile::new("x.txt", "text/plain", vec![1]))
        .await
        .unwrap_err();
    assert!(ctl.view().error().is_some());
    ctl.clear_error();
    assert!(ctl.view().error().is_none());
    assert_eq!(*ctl.phase(), Phase::Idle);
}

#[tokio::test]
async fn test_drag_and_drop() {
    let service = StubService::new(|f| Ok(result_for(f)));
    let mut ctl = controller(service.clone());

    ctl.drag_enter();
    ctl.drag_over();
    assert!(ctl.view().snapshot.drop_highlighted);
    ctl.drag_leave();
    assert!(!ctl.view().snapshot.drop_highlighted);

    let highlights = ctl
        .view()
        .events
        .iter()
        .filter(|e| matches!(e, ViewEvent::DropHighlight { .. }))
        .count();
    assert_eq!(highlights, 2);

    ctl.drag_enter();
    assert!(ctl.drop_files(Vec::new()).await.is_none());
    assert!(!ctl.view().snapshot.drop_highlighted);
    assert_eq!(service.calls(), 0);

    let outcome = ctl
        .drop_files(vec![jpeg("front.jpg"), jpeg("back.jpg")])
        .await
        .unwrap();
    assert!(outcome.is_ok());
    assert_eq!(service.calls(), 1);
    assert_eq!(ctl.result().unwrap().original_name, "front.jpg");
}

#[tokio::test]
async fn test_stale_completion_is_ignored() {
    let service = StubService::new(|f| Ok(result_for(f)));
    let mut ctl = controller(service);

    let first = ctl.start_extraction(jpeg("first.jpg")).unwrap();
    let first_session = first.session();
    let second = ctl.start_extraction(jpeg("second.jpg")).unwrap();
    assert_ne!(first_session, second.session());

    // a late answer for the superseded selection changes nothing
    let late = Completion {
        session: first_session,
        outcome: Ok(result_for(&jpeg("first.jpg"))),
    };
    assert_eq!(ctl.complete(late), CompletionOutcome::Stale);
    assert!(matches!(ctl.phase(), Phase::Uploading { .. }));

    if let Some(completion) = first.wait().await {
        assert_eq!(ctl.complete(completion), CompletionOutcome::Stale);
    }

    let completion = second.wait().await.expect("second upload was not aborted");
    assert_eq!(ctl.complete(completion), CompletionOutcome::Applied);
    assert_eq!(ctl.result().unwrap().original_name, "second.jpg");

    // completing the same session twice is stale as well
    let repeat = Completion {
        session: ctl.current_session().unwrap(),
        outcome: Err(UploadError::transport("late")),
    };
    assert_eq!(ctl.complete(repeat), CompletionOutcome::Stale);
    assert!(ctl.view().error().is_none());
}

#[tokio::test]
async fn test_rejected_selection_supersedes_pending_upload() {
    let service = StubService::new(|f| Ok(result_for(f)));
    let mut ctl = controller(service);

    let pending = ctl.start_extraction(jpeg("first.jpg")).unwrap();
    ctl.accept_file(&UploadFile::new("bad.gif", "image/gif", vec![1]))
        .unwrap_err();

    if let Some(completion) = pending.wait().await {
        assert_eq!(ctl.complete(completion), CompletionOutcome::Stale);
    }
    assert_eq!(ctl.view().error(), Some("Please upload a PDF, JPG, or PNG file"));
}
