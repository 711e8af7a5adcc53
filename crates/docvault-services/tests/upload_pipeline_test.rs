mod common;

use std::time::Duration;

use common::{harness, pdf_upload, FakeStrategy, RecordingProgress, Script, ScriptedClassifier};
use docvault_core::models::{
    ClassificationStatus, DocumentType, ExtractionStrategyKind, RecordState, UploadedFile,
};
use docvault_core::AppError;
use docvault_db::{DocumentStore, ProvisionalRecordStore};
use docvault_services::{NoopProgress, ProgressEvent};
use uuid::Uuid;

#[tokio::test]
async fn test_mismatch_then_confirm_with_ai_type() {
    let native = FakeStrategy::new(
        ExtractionStrategyKind::NativeText,
        Script::Text("Invoice #123, total R$450.00"),
    );
    let raster = FakeStrategy::new(ExtractionStrategyKind::RasterizeOcr, Script::Text("ocr"));
    let h = harness(
        vec![native.clone(), raster.clone()],
        ScriptedClassifier::answering(DocumentType::Financial, 85),
    )
    .await;
    let user = Uuid::new_v4();

    let outcome = h
        .orchestrator
        .process(
            user,
            pdf_upload(DocumentType::Personal),
            Duration::from_secs(120),
            &NoopProgress,
        )
        .await
        .unwrap();

    assert_eq!(outcome.strategy_used, ExtractionStrategyKind::NativeText);
    assert_eq!(outcome.extracted_text, "Invoice #123, total R$450.00");
    assert_eq!(raster.calls(), 0);
    let verdict = outcome.mismatch.clone().unwrap();
    assert_eq!(verdict.declared_type, DocumentType::Personal);
    assert_eq!(verdict.inferred_type, DocumentType::Financial);
    assert_eq!(verdict.confidence, 85);

    let record = h.records.get(user, outcome.record_id).await.unwrap();
    assert_eq!(record.state, RecordState::PendingConfirmation);
    assert_eq!(h.stored_files(), 1);
    assert!(h.records.list_for_user(user, 50, 0).await.unwrap().is_empty());

    let document = h
        .confirmation
        .confirm(user, outcome.record_id, DocumentType::Personal, true)
        .await
        .unwrap();
    assert_eq!(document.document_type, DocumentType::Financial);
    assert_eq!(document.title, "Invoice #123");
    assert_eq!(document.fields["amount"], "450.00");

    let listed = h.records.list_for_user(user, 50, 0).await.unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(h.stored_files(), 1);
    assert!(h.scratch_is_empty());
}

#[tokio::test]
async fn test_classifier_failure_still_creates_record() {
    let native = FakeStrategy::new(
        ExtractionStrategyKind::NativeText,
        Script::Text("CONSULTA MEDICA Dr. Ana Silva"),
    );
    let classifier = ScriptedClassifier::failing();
    let h = harness(vec![native], classifier.clone()).await;
    let user = Uuid::new_v4();

    let outcome = h
        .orchestrator
        .process(
            user,
            pdf_upload(DocumentType::Medical),
            Duration::from_secs(120),
            &NoopProgress,
        )
        .await
        .unwrap();

    assert_eq!(classifier.calls(), 1);
    assert_eq!(outcome.classification.status, ClassificationStatus::Unavailable);
    assert_eq!(outcome.classification.inferred_type, DocumentType::Medical);
    assert_eq!(outcome.classification.confidence, 0);
    assert!(outcome.classification.reasoning.is_empty());
    assert!(outcome.mismatch.is_none());
    assert!(h.records.get(user, outcome.record_id).await.is_ok());

    let err = h
        .confirmation
        .confirm(user, outcome.record_id, DocumentType::Medical, true)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));
}

#[tokio::test]
async fn test_deadline_exceeded_mid_ocr_is_a_timeout() {
    let native = FakeStrategy::new(ExtractionStrategyKind::NativeText, Script::Empty);
    let raster = FakeStrategy::new(ExtractionStrategyKind::RasterizeOcr, Script::Hang);
    let full = FakeStrategy::new(ExtractionStrategyKind::FullDocumentOcr, Script::Text("late"));
    let classifier = ScriptedClassifier::answering(DocumentType::Financial, 90);
    let h = harness(vec![native, raster.clone(), full.clone()], classifier.clone()).await;

    let err = h
        .orchestrator
        .process(
            Uuid::new_v4(),
            pdf_upload(DocumentType::Financial),
            Duration::from_millis(200),
            &NoopProgress,
        )
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::ProcessingTimeout { .. }));
    assert_eq!(raster.calls(), 1);
    assert_eq!(full.calls(), 0);
    assert_eq!(classifier.calls(), 0);
    assert_eq!(h.records.record_count(), 0);
    assert_eq!(h.stored_files(), 0);
    assert!(h.scratch_is_empty());
}

#[tokio::test]
async fn test_classifier_gets_only_the_remaining_budget() {
    let native = FakeStrategy::new(ExtractionStrategyKind::NativeText, Script::Text("Invoice #123"));
    let classifier =
        ScriptedClassifier::slow(DocumentType::Financial, 90, Duration::from_secs(30));
    let h = harness(vec![native], classifier.clone()).await;

    let started = std::time::Instant::now();
    let err = h
        .orchestrator
        .process(
            Uuid::new_v4(),
            pdf_upload(DocumentType::Financial),
            Duration::from_millis(200),
            &NoopProgress,
        )
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::ProcessingTimeout { seconds: 0 }));
    assert!(started.elapsed() < Duration::from_secs(5));
    assert_eq!(classifier.calls(), 1);
    assert_eq!(h.records.record_count(), 0);
    assert_eq!(h.stored_files(), 0);
}

#[tokio::test]
async fn test_slow_classifier_within_deadline_completes() {
    let native = FakeStrategy::new(ExtractionStrategyKind::NativeText, Script::Text("Invoice #123"));
    let classifier =
        ScriptedClassifier::slow(DocumentType::Financial, 90, Duration::from_millis(50));
    let h = harness(vec![native], classifier.clone()).await;

    let outcome = h
        .orchestrator
        .process(
            Uuid::new_v4(),
            pdf_upload(DocumentType::Personal),
            Duration::from_secs(5),
            &NoopProgress,
        )
        .await
        .unwrap();

    assert!(outcome.classification.is_available());
    assert!(outcome.mismatch.is_some());
    assert_eq!(h.records.record_count(), 1);
}

#[tokio::test]
async fn test_extraction_failure_skips_classifier() {
    let native = FakeStrategy::new(ExtractionStrategyKind::NativeText, Script::Empty);
    let raster = FakeStrategy::new(ExtractionStrategyKind::RasterizeOcr, Script::Empty);
    let full = FakeStrategy::new(ExtractionStrategyKind::FullDocumentOcr, Script::Empty);
    let classifier = ScriptedClassifier::answering(DocumentType::Financial, 90);
    let h = harness(vec![native, raster, full], classifier.clone()).await;

    let err = h
        .orchestrator
        .process(
            Uuid::new_v4(),
            pdf_upload(DocumentType::Financial),
            Duration::from_secs(120),
            &NoopProgress,
        )
        .await
        .unwrap_err();

    let AppError::ExtractionFailed { attempts } = err else {
        panic!("expected extraction failure, got {err:?}");
    };
    assert_eq!(attempts.len(), 3);
    assert_eq!(classifier.calls(), 0);
    assert_eq!(h.records.record_count(), 0);
    assert_eq!(h.stored_files(), 0);
}

#[tokio::test]
async fn test_validation_runs_before_any_strategy() {
    let native = FakeStrategy::new(ExtractionStrategyKind::NativeText, Script::Text("text"));
    let h = harness(vec![native.clone()], ScriptedClassifier::failing()).await;

    let oversized = UploadedFile::new(
        "big.pdf",
        "application/pdf",
        DocumentType::Other,
        [b"%PDF".as_slice(), &vec![0u8; 10 * 1024 * 1024]].concat(),
    );
    let err = h
        .orchestrator
        .process(Uuid::new_v4(), oversized, Duration::from_secs(120), &NoopProgress)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::PayloadTooLarge(_)));

    let spreadsheet = UploadedFile::new(
        "sheet.xls",
        "application/vnd.ms-excel",
        DocumentType::Financial,
        vec![0xD0, 0xCF, 0x11, 0xE0],
    );
    let err = h
        .orchestrator
        .process(Uuid::new_v4(), spreadsheet, Duration::from_secs(120), &NoopProgress)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));

    assert_eq!(native.calls(), 0);
    assert_eq!(h.records.record_count(), 0);
}

#[tokio::test]
async fn test_progress_events_in_pipeline_order() {
    let native = FakeStrategy::new(ExtractionStrategyKind::NativeText, Script::Text("Recibo"));
    let h = harness(vec![native], ScriptedClassifier::answering(DocumentType::Budget, 40)).await;
    let progress = RecordingProgress::default();

    let outcome = h
        .orchestrator
        .process(
            Uuid::new_v4(),
            pdf_upload(DocumentType::Budget),
            Duration::from_secs(120),
            &progress,
        )
        .await
        .unwrap();

    assert_eq!(
        progress.events(),
        vec![
            ProgressEvent::Validating,
            ProgressEvent::Extracting,
            ProgressEvent::Extracted {
                strategy: ExtractionStrategyKind::NativeText
            },
            ProgressEvent::Classifying,
            ProgressEvent::Reconciling,
            ProgressEvent::Persisting,
            ProgressEvent::Completed {
                record_id: outcome.record_id
            },
        ]
    );
}

#[tokio::test]
async fn test_concurrent_uploads_get_distinct_records() {
    let native = FakeStrategy::new(ExtractionStrategyKind::NativeText, Script::Text("Recibo"));
    let h = harness(vec![native], ScriptedClassifier::failing()).await;
    let user = Uuid::new_v4();

    let mut handles = Vec::new();
    for _ in 0..8 {
        let orchestrator = h.orchestrator.clone();
        handles.push(tokio::spawn(async move {
            orchestrator
                .process(
                    user,
                    pdf_upload(DocumentType::Personal),
                    Duration::from_secs(120),
                    &NoopProgress,
                )
                .await
                .unwrap()
                .record_id
        }));
    }

    let mut ids = Vec::new();
    for handle in handles {
        ids.push(handle.await.unwrap());
    }
    ids.sort();
    ids.dedup();
    assert_eq!(ids.len(), 8);
    assert_eq!(h.stored_files(), 8);
}
