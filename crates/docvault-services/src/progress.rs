use docvault_core::models::ExtractionStrategyKind;
use serde::Serialize;
use uuid::Uuid;

/// Pipeline stage notifications for one upload.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "stage", rename_all = "snake_case")]
pub enum ProgressEvent {
    Validating,
    Extracting,
    Extracted { strategy: ExtractionStrategyKind },
    Classifying,
    Reconciling,
    Persisting,
    Completed { record_id: Uuid },
    Failed { reason: String },
}

/// Receiver of [`ProgressEvent`]s. Must not block.
pub trait ProgressSink: Send + Sync {
    fn report(&self, event: ProgressEvent);
}

#[derive(Debug, Default, Clone, Copy)]
pub struct NoopProgress;

impl ProgressSink for NoopProgress {
    fn report(&self, _event: ProgressEvent) {}
}

/// Logs every event at `debug`, failures at `info`.
#[derive(Debug, Clone)]
pub struct TracingProgress {
    pub upload_id: Uuid,
}

impl ProgressSink for TracingProgress {
    fn report(&self, event: ProgressEvent) {
        match &event {
            ProgressEvent::Failed { reason } => {
                tracing::info!(upload_id = %self.upload_id, reason = %reason, "Upload failed");
            }
            other => {
                tracing::debug!(upload_id = %self.upload_id, event = ?other, "Upload progress");
            }
        }
    }
}
