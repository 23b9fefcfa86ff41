//! Batched, idempotent writes against an [`IndicatorStore`].

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, warn};

use crate::db::store::{DeleteFilter, IndicatorStore};
use crate::error::StoreError;
use crate::models::{ObservationKey, ObservedValue};

pub const DEFAULT_BATCH_SIZE: usize = 500;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatchFailure {
    /// Index of the batch's first row within the deduplicated write.
    pub offset: usize,
    pub len: usize,
    pub error: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct WriteSummary {
    /// Rows handed to the store after deduplication.
    pub attempted: usize,
    pub written: usize,
    /// Non-finite values dropped before writing.
    pub skipped: usize,
    pub failed: Vec<BatchFailure>,
}

impl WriteSummary {
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }

    pub fn failed_rows(&self) -> usize {
        self.failed.iter().map(|f| f.len).sum()
    }

    pub fn merge(&mut self, other: WriteSummary) {
        let base = self.attempted;
        self.attempted += other.attempted;
        self.written += other.written;
        self.skipped += other.skipped;
        self.failed
            .extend(other.failed.into_iter().map(|f| BatchFailure {
                offset: base + f.offset,
                ..f
            }));
    }
}

#[derive(Clone)]
pub struct PersistenceGateway {
    store: Arc<dyn IndicatorStore>,
    batch_size: usize,
}

impl PersistenceGateway {
    pub fn new(store: Arc<dyn IndicatorStore>, batch_size: usize) -> Self {
        Self {
            store,
            batch_size: batch_size.max(1),
        }
    }

    pub fn store(&self) -> &Arc<dyn IndicatorStore> {
        &self.store
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    /// Upsert `records` in bounded batches.
    ///
    /// Repeated keys collapse to the last occurrence. A failing batch is logged
    /// with its offset and recorded; the remaining batches are still written.
    pub async fn upsert(&self, records: Vec<ObservedValue>) -> WriteSummary {
        let mut skipped = 0;
        let mut latest: BTreeMap<ObservationKey, ObservedValue> = BTreeMap::new();
        for record in records {
            if !record.value.is_finite() {
                skipped += 1;
                continue;
            }
            latest.insert(record.key(), record);
        }
        let rows: Vec<ObservedValue> = latest.into_values().collect();

        let mut summary = WriteSummary {
            attempted: rows.len(),
            skipped,
            ..WriteSummary::default()
        };

        for (index, batch) in rows.chunks(self.batch_size).enumerate() {
            let offset = index * self.batch_size;
            match self.store.upsert_values(batch).await {
                Ok(_) => {
                    summary.written += batch.len();
                    debug!(offset, rows = batch.len(), "Batch written");
                }
                Err(e) => {
                    warn!(offset, rows = batch.len(), error = %e, "Batch write failed");
                    summary.failed.push(BatchFailure {
                        offset,
                        len: batch.len(),
                        error: e.to_string(),
                    });
                }
            }
        }

        summary
    }

    /// Remove rows for one code (optionally one year) ahead of regeneration.
    pub async fn delete_where(&self, filter: &DeleteFilter) -> Result<u64, StoreError> {
        let removed = self.store.delete_values(filter).await?;
        debug!(
            indicator = %filter.indicator_code,
            year = ?filter.year,
            removed,
            "Deleted rows"
        );
        Ok(removed)
    }
}
