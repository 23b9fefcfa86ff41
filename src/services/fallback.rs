//! Ordered fallback across source adapters, with provenance.
//!
//! Within one chain adapters run strictly in order; across chains, fetches
//! run concurrently up to the configured limit.

use std::collections::BTreeSet;
use std::sync::Arc;

use futures_util::stream::{self, StreamExt};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::error::SourceError;
use crate::models::{IndicatorDefinition, ObservedValue, YearRange, NO_SOURCE};
use crate::services::retry::RetryPolicy;
use crate::services::source::{FetchRequest, SourceAdapter};

/// Ordered adapters for one indicator, fixed at configuration time.
#[derive(Clone)]
pub struct FallbackChain {
    pub indicator: IndicatorDefinition,
    pub adapters: Vec<Arc<dyn SourceAdapter>>,
}

impl FallbackChain {
    pub fn new(indicator: IndicatorDefinition, adapters: Vec<Arc<dyn SourceAdapter>>) -> Self {
        Self { indicator, adapters }
    }

    pub fn adapter_names(&self) -> Vec<String> {
        self.adapters.iter().map(|a| a.name().to_string()).collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum AttemptResult {
    Records(usize),
    Empty,
    Failed(String),
    /// Not called because the health probe marked the source down.
    Skipped,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SourceAttempt {
    pub adapter: String,
    pub result: AttemptResult,
}

/// Result of running one chain.
#[derive(Debug, Clone, Serialize)]
pub struct FetchOutcome {
    pub indicator_code: String,
    /// Adapter that supplied the records, or [`NO_SOURCE`].
    pub source: String,
    pub records: Vec<ObservedValue>,
    pub attempts: Vec<SourceAttempt>,
}

impl FetchOutcome {
    pub fn is_no_data(&self) -> bool {
        self.source == NO_SOURCE
    }

    /// True when the winning adapter was not the chain's first choice.
    pub fn used_fallback(&self) -> bool {
        !self.is_no_data() && self.attempts.len() > 1
    }
}

pub struct FallbackOrchestrator {
    retry: RetryPolicy,
    concurrency: usize,
}

impl FallbackOrchestrator {
    pub fn new(retry: RetryPolicy, concurrency: usize) -> Self {
        Self {
            retry,
            concurrency: concurrency.max(1),
        }
    }

    /// Probe every distinct adapter name once and return the ones that are down.
    pub async fn probe(&self, chains: &[FallbackChain]) -> BTreeSet<String> {
        let mut seen = BTreeSet::new();
        let mut down = BTreeSet::new();

        for adapter in chains.iter().flat_map(|c| c.adapters.iter()) {
            if !seen.insert(adapter.name().to_string()) {
                continue;
            }
            match adapter.probe().await {
                Some(false) => {
                    warn!(source = %adapter.name(), "Health probe failed, source will be skipped this run");
                    down.insert(adapter.name().to_string());
                }
                Some(true) => debug!(source = %adapter.name(), "Health probe passed"),
                None => {}
            }
        }

        down
    }

    /// Try each adapter in order until one yields at least one record.
    pub async fn run_chain(
        &self,
        chain: &FallbackChain,
        request: &FetchRequest,
        down: &BTreeSet<String>,
    ) -> FetchOutcome {
        let code = chain.indicator.code.clone();
        let mut attempts = Vec::with_capacity(chain.adapters.len());

        for adapter in &chain.adapters {
            let name = adapter.name().to_string();
            if down.contains(&name) {
                attempts.push(SourceAttempt {
                    adapter: name,
                    result: AttemptResult::Skipped,
                });
                continue;
            }

            let result: Result<_, SourceError> = self
                .retry
                .run(&name, move || async move { adapter.fetch(request).await })
                .await;

            match result {
                Ok(records) if !records.is_empty() => {
                    let values: Vec<ObservedValue> = records
                        .into_iter()
                        .filter(|r| r.value.is_finite())
                        .map(|r| ObservedValue::new(r.iso3, code.clone(), r.year, r.value, name.clone()))
                        .collect();
                    attempts.push(SourceAttempt {
                        adapter: name.clone(),
                        result: AttemptResult::Records(values.len()),
                    });
                    info!(
                        indicator = %code,
                        source = %name,
                        records = values.len(),
                        "Fetched {} records for {} from {}",
                        values.len(),
                        code,
                        name
                    );
                    return FetchOutcome {
                        indicator_code: code,
                        source: name,
                        records: values,
                        attempts,
                    };
                }
                Ok(_) => {
                    debug!(indicator = %code, source = %name, "Source returned no data, trying next");
                    attempts.push(SourceAttempt {
                        adapter: name,
                        result: AttemptResult::Empty,
                    });
                }
                Err(e) => {
                    warn!(indicator = %code, source = %name, error = %e, "Source failed, trying next");
                    attempts.push(SourceAttempt {
                        adapter: name,
                        result: AttemptResult::Failed(e.to_string()),
                    });
                }
            }
        }

        warn!(indicator = %code, "No data available from any source");
        FetchOutcome {
            indicator_code: code,
            source: NO_SOURCE.to_string(),
            records: Vec::new(),
            attempts,
        }
    }

    /// Run every chain with bounded concurrency. Outcomes are sorted by indicator code.
    pub async fn run_all(
        &self,
        chains: &[FallbackChain],
        countries: Arc<BTreeSet<String>>,
        years: YearRange,
        down: &BTreeSet<String>,
    ) -> Vec<FetchOutcome> {
        let mut outcomes: Vec<FetchOutcome> = stream::iter(chains.iter().map(|chain| {
            let request = FetchRequest::new(chain.indicator.code.clone(), countries.clone(), years);
            async move { self.run_chain(chain, &request, down).await }
        }))
        .buffer_unordered(self.concurrency)
        .collect()
        .await;

        outcomes.sort_by(|a, b| a.indicator_code.cmp(&b.indicator_code));
        outcomes
    }
}
