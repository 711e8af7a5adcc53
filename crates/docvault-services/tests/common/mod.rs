#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use docvault_core::models::{
    ClassificationResult, ClassificationStatus, DocumentType, ExtractionStrategyKind, UploadedFile,
};
use docvault_db::InMemoryProvisionalRecordStore;
use docvault_processing::{Diagnostic, ExtractionEngine, ExtractionInput, ExtractionStrategy};
use docvault_services::{
    ConfirmationService, DocumentClassifier, ProgressEvent, ProgressSink, UploadOrchestrator,
    UploadValidator,
};
use docvault_storage::LocalStorage;
use tempfile::TempDir;

pub enum Script {
    Text(&'static str),
    Empty,
    Hang,
}

/// Extraction strategy with a fixed behaviour and a call counter.
pub struct FakeStrategy {
    kind: ExtractionStrategyKind,
    script: Script,
    calls: AtomicUsize,
}

impl FakeStrategy {
    pub fn new(kind: ExtractionStrategyKind, script: Script) -> Arc<Self> {
        Arc::new(Self {
            kind,
            script,
            calls: AtomicUsize::new(0),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ExtractionStrategy for FakeStrategy {
    fn kind(&self) -> ExtractionStrategyKind {
        self.kind
    }

    fn timeout(&self) -> Duration {
        Duration::from_secs(30)
    }

    async fn extract(&self, input: &ExtractionInput) -> Result<String, Diagnostic> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let scratch = input.scratch_dir("fake-ocr-")?;
        tokio::fs::write(scratch.path().join("page.png"), b"png").await?;
        match self.script {
            Script::Text(text) => Ok(text.to_string()),
            Script::Empty => Ok(String::new()),
            Script::Hang => {
                tokio::time::sleep(Duration::from_secs(60)).await;
                Ok("never".to_string())
            }
        }
    }
}

/// Classifier returning a canned answer, or the unavailable result.
pub struct ScriptedClassifier {
    answer: Option<(DocumentType, u8)>,
    delay: Duration,
    calls: AtomicUsize,
}

impl ScriptedClassifier {
    pub fn answering(inferred: DocumentType, confidence: u8) -> Arc<Self> {
        Arc::new(Self {
            answer: Some((inferred, confidence)),
            delay: Duration::ZERO,
            calls: AtomicUsize::new(0),
        })
    }

    pub fn failing() -> Arc<Self> {
        Arc::new(Self {
            answer: None,
            delay: Duration::ZERO,
            calls: AtomicUsize::new(0),
        })
    }

    /// Answers like [`ScriptedClassifier::answering`] after `delay`.
    pub fn slow(inferred: DocumentType, confidence: u8, delay: Duration) -> Arc<Self> {
        Arc::new(Self {
            answer: Some((inferred, confidence)),
            delay,
            calls: AtomicUsize::new(0),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl DocumentClassifier for ScriptedClassifier {
    async fn classify(&self, _text: &str, declared: DocumentType) -> ClassificationResult {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        match self.answer {
            Some((inferred, confidence)) => {
                let mut result = ClassificationResult::unavailable(inferred);
                result.status = ClassificationStatus::Available;
                result.confidence = confidence;
                result.reasoning = "Invoice with amount due".to_string();
                result.title = Some("Invoice #123".to_string());
                result
                    .fields
                    .insert("amount".to_string(), serde_json::json!("450.00"));
                result
            }
            None => ClassificationResult::unavailable(declared),
        }
    }
}

#[derive(Default)]
pub struct RecordingProgress {
    pub events: Mutex<Vec<ProgressEvent>>,
}

impl RecordingProgress {
    pub fn events(&self) -> Vec<ProgressEvent> {
        self.events.lock().unwrap().clone()
    }
}

impl ProgressSink for RecordingProgress {
    fn report(&self, event: ProgressEvent) {
        self.events.lock().unwrap().push(event);
    }
}

pub struct Harness {
    pub orchestrator: UploadOrchestrator,
    pub confirmation: ConfirmationService,
    pub records: Arc<InMemoryProvisionalRecordStore>,
    pub storage: Arc<LocalStorage>,
    pub storage_dir: TempDir,
    pub scratch_dir: TempDir,
}

impl Harness {
    pub fn storage_root(&self) -> PathBuf {
        self.storage_dir.path().to_path_buf()
    }

    /// Files currently held by storage, at any depth.
    pub fn stored_files(&self) -> usize {
        count_files(self.storage_dir.path())
    }

    pub fn scratch_is_empty(&self) -> bool {
        std::fs::read_dir(self.scratch_dir.path())
            .unwrap()
            .next()
            .is_none()
    }
}

fn count_files(dir: &std::path::Path) -> usize {
    std::fs::read_dir(dir)
        .unwrap()
        .map(|entry| {
            let path = entry.unwrap().path();
            if path.is_dir() {
                count_files(&path)
            } else {
                1
            }
        })
        .sum()
}

pub async fn harness(
    pdf_cascade: Vec<Arc<FakeStrategy>>,
    classifier: Arc<dyn DocumentClassifier>,
) -> Harness {
    let storage_dir = tempfile::tempdir().unwrap();
    let scratch_dir = tempfile::tempdir().unwrap();

    let storage = Arc::new(
        LocalStorage::new(storage_dir.path(), "http://localhost:4000/files".to_string())
            .await
            .unwrap(),
    );
    let records = Arc::new(InMemoryProvisionalRecordStore::new());

    let pdf: Vec<Arc<dyn ExtractionStrategy>> = pdf_cascade
        .into_iter()
        .map(|s| s as Arc<dyn ExtractionStrategy>)
        .collect();
    let engine = ExtractionEngine::with_cascades(pdf, Vec::new(), Vec::new())
        .with_scratch_root(scratch_dir.path());

    let validator = UploadValidator::new(
        10 * 1024 * 1024,
        vec![
            "image/jpeg".to_string(),
            "image/png".to_string(),
            "image/gif".to_string(),
            "application/pdf".to_string(),
            "text/plain".to_string(),
        ],
    );

    let orchestrator = UploadOrchestrator::new(
        validator,
        Arc::new(engine),
        classifier,
        records.clone(),
        storage.clone(),
        Duration::from_secs(120),
    );
    let confirmation = ConfirmationService::new(records.clone(), storage.clone());

    Harness {
        orchestrator,
        confirmation,
        records,
        storage,
        storage_dir,
        scratch_dir,
    }
}

pub fn pdf_upload(declared: DocumentType) -> UploadedFile {
    UploadedFile::new(
        "invoice.pdf",
        "application/pdf",
        declared,
        b"%PDF-1.7\n1 0 obj\n".to_vec(),
    )
}
