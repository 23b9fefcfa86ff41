//! Source adapter interface.

use std::collections::BTreeSet;
use std::sync::Arc;

use async_trait::async_trait;

use crate::error::SourceError;
use crate::models::{SourceRecord, YearRange};

/// What one adapter call should return.
#[derive(Debug, Clone)]
pub struct FetchRequest {
    pub indicator_code: String,
    /// Target ISO3 set. Empty means "no country filter".
    pub countries: Arc<BTreeSet<String>>,
    pub years: YearRange,
}

impl FetchRequest {
    pub fn new(
        indicator_code: impl Into<String>,
        countries: Arc<BTreeSet<String>>,
        years: YearRange,
    ) -> Self {
        Self {
            indicator_code: indicator_code.into(),
            countries,
            years,
        }
    }

    /// Whether a record for `iso3`/`year` belongs in the result.
    pub fn accepts(&self, iso3: &str, year: i32) -> bool {
        self.years.contains(year) && (self.countries.is_empty() || self.countries.contains(iso3))
    }
}

/// One transport for one indicator's data.
///
/// An empty `Ok` is a valid "no data" answer and is distinct from failure.
#[async_trait]
pub trait SourceAdapter: Send + Sync {
    /// Provenance label written on every record this adapter supplies.
    fn name(&self) -> &str;

    async fn fetch(&self, request: &FetchRequest) -> Result<Vec<SourceRecord>, SourceError>;

    /// Cheap upstream liveness check. `None` when the adapter has nothing to probe.
    async fn probe(&self) -> Option<bool> {
        None
    }
}
