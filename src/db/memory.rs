//! In-process store with the same conflict semantics as the PostgreSQL one.
//! Used by tests and dry runs.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::db::store::{DeleteFilter, IndicatorStore, ValueFilter};
use crate::error::StoreError;
use crate::models::{CountryRecord, IndicatorDefinition, ObservationKey, ObservedValue};

#[derive(Default)]
pub struct MemoryStore {
    countries: RwLock<Vec<CountryRecord>>,
    indicators: RwLock<BTreeMap<String, IndicatorDefinition>>,
    values: RwLock<BTreeMap<ObservationKey, ObservedValue>>,
    upsert_calls: AtomicUsize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_countries(mut countries: Vec<CountryRecord>) -> Self {
        countries.sort_by(|a, b| a.iso3.cmp(&b.iso3));
        Self {
            countries: RwLock::new(countries),
            ..Self::default()
        }
    }

    /// Number of `upsert_values` calls, one per batch written.
    pub fn upsert_calls(&self) -> usize {
        self.upsert_calls.load(Ordering::SeqCst)
    }

    pub async fn len(&self) -> usize {
        self.values.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.values.read().await.is_empty()
    }

    pub async fn get(&self, country: &str, code: &str, year: i32) -> Option<ObservedValue> {
        let key = ObservationKey {
            country_iso3: country.to_string(),
            indicator_code: code.to_string(),
            year,
        };
        self.values.read().await.get(&key).cloned()
    }
}

#[async_trait]
impl IndicatorStore for MemoryStore {
    async fn list_countries(&self) -> Result<Vec<CountryRecord>, StoreError> {
        Ok(self.countries.read().await.clone())
    }

    async fn list_indicators(&self) -> Result<Vec<IndicatorDefinition>, StoreError> {
        Ok(self.indicators.read().await.values().cloned().collect())
    }

    async fn upsert_indicator(&self, definition: &IndicatorDefinition) -> Result<bool, StoreError> {
        let mut indicators = self.indicators.write().await;
        match indicators.get_mut(&definition.code) {
            Some(existing) => Ok(existing.backfill_from(definition)),
            None => {
                indicators.insert(definition.code.clone(), definition.clone());
                Ok(true)
            }
        }
    }

    async fn upsert_values(&self, batch: &[ObservedValue]) -> Result<u64, StoreError> {
        self.upsert_calls.fetch_add(1, Ordering::SeqCst);

        let mut seen = BTreeSet::new();
        for row in batch {
            if !seen.insert(row.key()) {
                return Err(StoreError::Rejected(format!(
                    "batch touches {} more than once",
                    row.key()
                )));
            }
        }

        let mut values = self.values.write().await;
        for row in batch {
            values.insert(row.key(), row.clone());
        }
        Ok(batch.len() as u64)
    }

    async fn delete_values(&self, filter: &DeleteFilter) -> Result<u64, StoreError> {
        let mut values = self.values.write().await;
        let before = values.len();
        values.retain(|_, row| !filter.matches(row));
        Ok((before - values.len()) as u64)
    }

    async fn select_values(&self, filter: &ValueFilter) -> Result<Vec<ObservedValue>, StoreError> {
        // Map order is (country, indicator, year), same as the SQL ORDER BY.
        Ok(self
            .values
            .read()
            .await
            .values()
            .filter(|row| filter.matches(row))
            .cloned()
            .collect())
    }
}
