//! Upload orchestration
//!
//! One call to [`UploadOrchestrator::process`] handles one upload from
//! validation to a persisted provisional record. Extraction, classification
//! and reconciliation share a single deadline. Each stage gets whatever is
//! left of it; when it runs out, the in-flight work is dropped, which kills
//! any running tool (or aborts the classifier request) and removes scratch
//! files, and no record is created. The classifier's own HTTP timeout only
//! matters when it is shorter than the remaining budget, in which case the
//! upload degrades to an unavailable classification.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use docvault_classifier::DocumentClassifier;
use docvault_core::models::{
    ClassificationResult, ExtractedText, ExtractionAttempt, ExtractionResult,
    ExtractionStrategyKind, MismatchVerdict, NewProvisionalRecord, StoredFile, TextQuality,
    UploadedFile,
};
use docvault_core::AppError;
use docvault_db::ProvisionalRecordStore;
use docvault_processing::{ExtractionEngine, UploadValidator};
use docvault_storage::{sanitize_filename, Storage};
use tokio::time::Instant;
use uuid::Uuid;

use crate::progress::{ProgressEvent, ProgressSink};
use crate::reconciler::{reconcile_with_threshold, MISMATCH_CONFIDENCE_THRESHOLD};

/// What the uploader gets back.
#[derive(Debug, Clone)]
pub struct ProcessOutcome {
    pub record_id: Uuid,
    pub classification: ClassificationResult,
    pub mismatch: Option<MismatchVerdict>,
    pub extracted_text: String,
    pub strategy_used: ExtractionStrategyKind,
    pub quality: TextQuality,
    pub attempts: Vec<ExtractionAttempt>,
}

/// Run one stage with whatever is left before `expires_at`.
async fn within_deadline<T>(
    stage: &'static str,
    expires_at: Instant,
    deadline: Duration,
    work: impl Future<Output = T>,
) -> Result<T, AppError> {
    let remaining = expires_at.saturating_duration_since(Instant::now());
    tokio::time::timeout(remaining, work).await.map_err(|_| {
        tracing::warn!(
            stage,
            deadline_secs = deadline.as_secs(),
            "Upload processing exceeded deadline"
        );
        AppError::ProcessingTimeout {
            seconds: deadline.as_secs(),
        }
    })
}

struct Analysis {
    text: ExtractedText,
    classification: ClassificationResult,
    mismatch: Option<MismatchVerdict>,
}

#[derive(Clone)]
pub struct UploadOrchestrator {
    validator: UploadValidator,
    engine: Arc<ExtractionEngine>,
    classifier: Arc<dyn DocumentClassifier>,
    records: Arc<dyn ProvisionalRecordStore>,
    storage: Arc<dyn Storage>,
    deadline: Duration,
    mismatch_threshold: u8,
}

impl UploadOrchestrator {
    pub fn new(
        validator: UploadValidator,
        engine: Arc<ExtractionEngine>,
        classifier: Arc<dyn DocumentClassifier>,
        records: Arc<dyn ProvisionalRecordStore>,
        storage: Arc<dyn Storage>,
        deadline: Duration,
    ) -> Self {
        Self {
            validator,
            engine,
            classifier,
            records,
            storage,
            deadline,
            mismatch_threshold: MISMATCH_CONFIDENCE_THRESHOLD,
        }
    }

    pub fn with_mismatch_threshold(mut self, threshold: u8) -> Self {
        self.mismatch_threshold = threshold;
        self
    }

    /// Configured overall deadline.
    pub fn deadline(&self) -> Duration {
        self.deadline
    }

    /// Validate, extract, classify, reconcile and persist one upload.
    ///
    /// Errors:
    /// - `Validation` / `PayloadTooLarge`: refused before any tool runs
    /// - `ExtractionFailed`: every strategy failed; the classifier is not called
    /// - `ProcessingTimeout`: `deadline` elapsed before reconciliation finished
    ///
    /// A classifier failure is not an error; the record carries an
    /// unavailable classification instead.
    #[tracing::instrument(
        skip_all,
        fields(
            user_id = %user_id,
            filename = %file.filename,
            declared_type = %file.declared_type,
            size = file.data.len()
        )
    )]
    pub async fn process(
        &self,
        user_id: Uuid,
        file: UploadedFile,
        deadline: Duration,
        progress: &dyn ProgressSink,
    ) -> Result<ProcessOutcome, AppError> {
        let result = self.run(user_id, file, deadline, progress).await;
        match &result {
            Ok(outcome) => progress.report(ProgressEvent::Completed {
                record_id: outcome.record_id,
            }),
            Err(e) => progress.report(ProgressEvent::Failed {
                reason: e.to_string(),
            }),
        }
        result
    }

    async fn run(
        &self,
        user_id: Uuid,
        file: UploadedFile,
        deadline: Duration,
        progress: &dyn ProgressSink,
    ) -> Result<ProcessOutcome, AppError> {
        progress.report(ProgressEvent::Validating);
        self.validator.validate_all(&file)?;

        let expires_at = Instant::now() + deadline;
        let analysis = self.analyze(&file, expires_at, deadline, progress).await?;

        progress.report(ProgressEvent::Persisting);
        let record_id = self.persist(user_id, file, &analysis).await?;

        tracing::info!(
            record_id = %record_id,
            strategy = %analysis.text.strategy_used,
            classification_available = analysis.classification.is_available(),
            mismatch = analysis.mismatch.is_some(),
            "Provisional record created"
        );

        Ok(ProcessOutcome {
            record_id,
            classification: analysis.classification,
            mismatch: analysis.mismatch,
            extracted_text: analysis.text.content,
            strategy_used: analysis.text.strategy_used,
            quality: analysis.text.quality,
            attempts: analysis.text.attempts,
        })
    }

    async fn analyze(
        &self,
        file: &UploadedFile,
        expires_at: Instant,
        deadline: Duration,
        progress: &dyn ProgressSink,
    ) -> Result<Analysis, AppError> {
        progress.report(ProgressEvent::Extracting);
        let extraction =
            within_deadline("extraction", expires_at, deadline, self.engine.extract(file)).await?;
        let text = match extraction? {
            ExtractionResult::Text(text) => text,
            ExtractionResult::Failed { attempts } => {
                return Err(AppError::ExtractionFailed { attempts });
            }
        };
        progress.report(ProgressEvent::Extracted {
            strategy: text.strategy_used,
        });

        progress.report(ProgressEvent::Classifying);
        let classification = within_deadline(
            "classification",
            expires_at,
            deadline,
            self.classifier.classify(&text.content, file.declared_type),
        )
        .await?;
        if !classification.is_available() {
            tracing::warn!(
                declared_type = %file.declared_type,
                "Classification unavailable, keeping declared type"
            );
        }

        progress.report(ProgressEvent::Reconciling);
        let mismatch =
            reconcile_with_threshold(file.declared_type, &classification, self.mismatch_threshold);

        Ok(Analysis {
            text,
            classification,
            mismatch,
        })
    }

    /// Store the original, then create the record. The stored file is
    /// removed again if the record cannot be created.
    async fn persist(
        &self,
        user_id: Uuid,
        file: UploadedFile,
        analysis: &Analysis,
    ) -> Result<Uuid, AppError> {
        let content_type = file.essence();
        let file_size = file.data.len() as i64;
        let stored_name = format!("{}-{}", Uuid::new_v4(), sanitize_filename(&file.filename));

        let (storage_key, storage_url) = self
            .storage
            .upload(user_id, &stored_name, &content_type, file.data)
            .await?;

        let record = NewProvisionalRecord {
            user_id,
            declared_type: file.declared_type,
            extracted_text: analysis.text.content.clone(),
            strategy_used: analysis.text.strategy_used,
            text_quality: analysis.text.quality.clone(),
            classification: analysis.classification.clone(),
            mismatch: analysis.mismatch.clone(),
            file: StoredFile {
                storage_key: storage_key.clone(),
                storage_url,
                content_type,
                file_size,
                filename: file.filename,
            },
        };

        match self.records.create(record).await {
            Ok(record_id) => Ok(record_id),
            Err(e) => {
                if let Err(delete_err) = self.storage.delete(&storage_key).await {
                    tracing::error!(
                        error = %delete_err,
                        storage_key = %storage_key,
                        "Failed to remove stored file after record creation failed"
                    );
                }
                Err(e)
            }
        }
    }
}
