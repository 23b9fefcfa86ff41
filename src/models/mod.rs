//! Shared data models spanning the pipeline stages.

pub mod indicators;
pub mod observation;

pub use indicators::{CountryRecord, IndicatorDefinition};
pub use observation::{
    CountryYear, ObservationKey, ObservedValue, SourceRecord, YearRange, DERIVED_SOURCE,
    NO_SOURCE, REPORT_SOURCE,
};
