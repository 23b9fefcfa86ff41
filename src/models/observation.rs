use std::fmt;

use serde::{Deserialize, Serialize};

/// Provenance written when every source for an indicator came up empty.
pub const NO_SOURCE: &str = "NONE";

/// Provenance of derived indicator rows.
pub const DERIVED_SOURCE: &str = "DERIVED";

/// Provenance of report card score rows.
pub const REPORT_SOURCE: &str = "REPORT_CARD";

/// Join key for series alignment.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CountryYear {
    pub country: String,
    pub year: i32,
}

impl CountryYear {
    pub fn new(country: impl Into<String>, year: i32) -> Self {
        Self {
            country: country.into(),
            year,
        }
    }
}

/// Unique key of the fact table.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ObservationKey {
    pub country_iso3: String,
    pub indicator_code: String,
    pub year: i32,
}

impl fmt::Display for ObservationKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.country_iso3, self.indicator_code, self.year)
    }
}

/// Record as returned by a source adapter, before provenance is attached.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceRecord {
    pub iso3: String,
    pub year: i32,
    pub value: f64,
}

impl SourceRecord {
    pub fn new(iso3: impl Into<String>, year: i32, value: f64) -> Self {
        Self {
            iso3: iso3.into(),
            year,
            value,
        }
    }
}

/// One row of the fact table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObservedValue {
    pub country_iso3: String,
    pub indicator_code: String,
    pub year: i32,
    pub value: f64,
    pub source: String,
}

impl ObservedValue {
    pub fn new(
        country_iso3: impl Into<String>,
        indicator_code: impl Into<String>,
        year: i32,
        value: f64,
        source: impl Into<String>,
    ) -> Self {
        Self {
            country_iso3: country_iso3.into(),
            indicator_code: indicator_code.into(),
            year,
            value,
            source: source.into(),
        }
    }

    pub fn key(&self) -> ObservationKey {
        ObservationKey {
            country_iso3: self.country_iso3.clone(),
            indicator_code: self.indicator_code.clone(),
            year: self.year,
        }
    }

    pub fn country_year(&self) -> CountryYear {
        CountryYear::new(self.country_iso3.clone(), self.year)
    }
}

/// Inclusive year bound.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct YearRange {
    pub start: i32,
    pub end: i32,
}

impl YearRange {
    pub fn new(start: i32, end: i32) -> Self {
        Self { start, end }
    }

    pub fn contains(&self, year: i32) -> bool {
        year >= self.start && year <= self.end
    }
}

impl fmt::Display for YearRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.start, self.end)
    }
}
