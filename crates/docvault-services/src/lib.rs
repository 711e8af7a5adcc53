//! Docvault Services Layer
//!
//! Business services between the HTTP layer and the building blocks: the
//! upload orchestrator (validate, extract, classify, reconcile, persist),
//! the confirmation service that finalizes provisional records, and the
//! background sweeper that expires abandoned ones. Handlers in docvault-api
//! stay thin and call into this crate.

pub mod confirmation;
pub mod expiry;
pub mod orchestrator;
pub mod progress;
pub mod reconciler;

pub use confirmation::ConfirmationService;
pub use docvault_classifier::{create_classifier, DisabledClassifier, DocumentClassifier};
pub use docvault_processing::{ExtractionEngine, UploadValidator};
pub use docvault_storage::{create_storage, Storage, StorageBackend};
pub use expiry::PendingRecordSweeper;
pub use orchestrator::{ProcessOutcome, UploadOrchestrator};
pub use progress::{NoopProgress, ProgressEvent, ProgressSink, TracingProgress};
pub use reconciler::{reconcile, reconcile_with_threshold, MISMATCH_CONFIDENCE_THRESHOLD};
