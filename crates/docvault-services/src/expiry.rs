use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use docvault_core::AppError;
use docvault_db::ProvisionalRecordStore;
use docvault_storage::Storage;
use tokio::time::interval;

const SWEEP_BATCH_SIZE: i64 = 100;

/// Rejects provisional records nobody decided on within the TTL and deletes
/// their uploads.
#[derive(Clone)]
pub struct PendingRecordSweeper {
    records: Arc<dyn ProvisionalRecordStore>,
    storage: Arc<dyn Storage>,
    ttl: chrono::Duration,
    period: Duration,
}

impl PendingRecordSweeper {
    pub fn new(
        records: Arc<dyn ProvisionalRecordStore>,
        storage: Arc<dyn Storage>,
        ttl_hours: i64,
        period: Duration,
    ) -> Self {
        Self {
            records,
            storage,
            ttl: chrono::Duration::hours(ttl_hours),
            period,
        }
    }

    /// Start the background sweep loop.
    /// Returns a JoinHandle for graceful shutdown; `None` when the period is zero.
    pub fn start(self: Arc<Self>) -> Option<tokio::task::JoinHandle<()>> {
        if self.period.is_zero() {
            tracing::info!("Pending record sweeper disabled");
            return None;
        }

        Some(tokio::spawn(async move {
            let mut sweep_interval = interval(self.period);

            loop {
                sweep_interval.tick().await;

                match self.sweep_once().await {
                    Ok(0) => tracing::debug!("No expired provisional records"),
                    Ok(expired) => tracing::info!(expired, "Expired provisional records"),
                    Err(e) => tracing::error!(error = %e, "Pending record sweep failed"),
                }
            }
        }))
    }

    /// Expire every pending record older than the TTL, then let the store
    /// forget records finalized more than one TTL ago. Returns how many
    /// records this call moved to `rejected`.
    #[tracing::instrument(skip(self), fields(sweep.ttl_hours = self.ttl.num_hours()))]
    pub async fn sweep_once(&self) -> Result<usize, AppError> {
        let cutoff = Utc::now() - self.ttl;
        let mut expired = 0;

        loop {
            let batch = self
                .records
                .list_expired_pending(cutoff, SWEEP_BATCH_SIZE)
                .await?;
            let batch_len = batch.len();
            let mut progressed = false;

            for record in batch {
                if !self.records.expire(record.id).await? {
                    tracing::debug!(record_id = %record.id, "Record finalized before expiry");
                    continue;
                }
                progressed = true;
                expired += 1;

                tracing::info!(
                    record_id = %record.id,
                    storage_key = %record.file.storage_key,
                    created_at = %record.created_at,
                    "Expired provisional record"
                );
                if let Err(e) = self.storage.delete(&record.file.storage_key).await {
                    tracing::error!(
                        error = %e,
                        storage_key = %record.file.storage_key,
                        "Failed to delete expired upload from storage"
                    );
                }
            }

            if (batch_len as i64) < SWEEP_BATCH_SIZE || !progressed {
                break;
            }
        }

        let pruned = self.records.prune_finalized(cutoff).await?;
        if pruned > 0 {
            tracing::info!(pruned, "Pruned finalized provisional records");
        }

        Ok(expired)
    }
}
