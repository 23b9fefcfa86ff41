//! Upstream data sources and the fallback orchestration around them.

pub mod csv;
pub mod csv_source;
pub mod fallback;
pub mod retry;
pub mod source;
pub mod world_bank;

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

pub use csv_source::{LocalCsvAdapter, RemoteCsvAdapter, RemoteDocument};
pub use fallback::{AttemptResult, FallbackChain, FallbackOrchestrator, FetchOutcome, SourceAttempt};
pub use retry::RetryPolicy;
pub use source::{FetchRequest, SourceAdapter};
pub use world_bank::WorldBankAdapter;

use crate::indicators::registry::{IndicatorSpec, SourceSpec};

/// Settings shared by every adapter built for a run.
#[derive(Debug, Clone)]
pub struct AdapterSettings {
    pub client: reqwest::Client,
    pub world_bank_base_url: String,
    pub page_delay: Duration,
}

/// Build one HTTP client with the run's request timeout.
pub fn build_http_client(timeout: Duration) -> Result<reqwest::Client, reqwest::Error> {
    reqwest::Client::builder()
        .timeout(timeout)
        .user_agent(concat!("report-card/", env!("CARGO_PKG_VERSION")))
        .build()
}

/// Turn catalog specs into adapter chains.
///
/// Remote CSV sources pointing at the same URL share one download.
pub fn build_chains(catalog: &[IndicatorSpec], settings: &AdapterSettings) -> Vec<FallbackChain> {
    let mut documents: HashMap<String, Arc<RemoteDocument>> = HashMap::new();

    catalog
        .iter()
        .map(|spec| {
            let adapters = spec
                .sources
                .iter()
                .map(|source| -> Arc<dyn SourceAdapter> {
                    match source {
                        SourceSpec::WorldBank { series } => Arc::new(
                            WorldBankAdapter::new(
                                settings.client.clone(),
                                settings.world_bank_base_url.clone(),
                                series.clone(),
                            )
                            .with_page_delay(settings.page_delay),
                        ),
                        SourceSpec::RemoteCsv { label, url, format } => {
                            let document = documents
                                .entry(url.clone())
                                .or_insert_with(|| RemoteDocument::new(url.clone(), settings.client.clone()))
                                .clone();
                            Arc::new(RemoteCsvAdapter::new(label.clone(), document, format.clone()))
                        }
                        SourceSpec::LocalCsv { label, path, format } => Arc::new(
                            LocalCsvAdapter::new(label.clone(), path.clone(), format.clone()),
                        ),
                    }
                })
                .collect();
            FallbackChain::new(spec.definition.clone(), adapters)
        })
        .collect()
}
