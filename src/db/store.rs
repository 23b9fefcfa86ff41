//! Store abstraction over the indicator catalog, the country reference table
//! and the observed-value fact table.

use async_trait::async_trait;

use crate::error::StoreError;
use crate::models::{CountryRecord, IndicatorDefinition, ObservedValue, YearRange};

/// Row selection for [`IndicatorStore::select_values`]. Empty lists match everything.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ValueFilter {
    pub indicator_codes: Vec<String>,
    pub countries: Vec<String>,
    pub years: Option<YearRange>,
}

impl ValueFilter {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn codes<I, S>(codes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            indicator_codes: codes.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    pub fn with_years(mut self, years: YearRange) -> Self {
        self.years = Some(years);
        self
    }

    pub fn matches(&self, row: &ObservedValue) -> bool {
        (self.indicator_codes.is_empty() || self.indicator_codes.contains(&row.indicator_code))
            && (self.countries.is_empty() || self.countries.contains(&row.country_iso3))
            && self.years.map_or(true, |y| y.contains(row.year))
    }
}

/// Rows to remove: one indicator code, optionally a single year.
#[derive(Debug, Clone, PartialEq)]
pub struct DeleteFilter {
    pub indicator_code: String,
    pub year: Option<i32>,
}

impl DeleteFilter {
    pub fn code(indicator_code: impl Into<String>) -> Self {
        Self {
            indicator_code: indicator_code.into(),
            year: None,
        }
    }

    pub fn code_in_year(indicator_code: impl Into<String>, year: i32) -> Self {
        Self {
            indicator_code: indicator_code.into(),
            year: Some(year),
        }
    }

    pub fn matches(&self, row: &ObservedValue) -> bool {
        row.indicator_code == self.indicator_code && self.year.map_or(true, |y| y == row.year)
    }
}

#[async_trait]
pub trait IndicatorStore: Send + Sync {
    /// Reference countries, ordered by ISO3 code.
    async fn list_countries(&self) -> Result<Vec<CountryRecord>, StoreError>;

    async fn list_indicators(&self) -> Result<Vec<IndicatorDefinition>, StoreError>;

    /// Insert a catalog entry, or backfill empty metadata on an existing one.
    /// Returns true when a row was inserted or changed.
    async fn upsert_indicator(&self, definition: &IndicatorDefinition) -> Result<bool, StoreError>;

    /// Write one batch with last-write-wins on `(country, indicator, year)`.
    /// The batch must not repeat a key.
    async fn upsert_values(&self, batch: &[ObservedValue]) -> Result<u64, StoreError>;

    /// Returns the number of removed rows.
    async fn delete_values(&self, filter: &DeleteFilter) -> Result<u64, StoreError>;

    /// Matching rows ordered by country, indicator and year.
    async fn select_values(&self, filter: &ValueFilter) -> Result<Vec<ObservedValue>, StoreError>;
}
