//! Per-stage reports collected into the run summary.

use serde::Serialize;

use crate::db::WriteSummary;
use crate::scoring::{Exclusion, ReportCard};
use crate::services::{FetchOutcome, SourceAttempt};

/// Which source one indicator ended up coming from.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SourceUsage {
    pub indicator_code: String,
    /// Adapter name, or `NONE` when every source came up empty.
    pub source: String,
    pub records: usize,
    pub used_fallback: bool,
    pub attempts: Vec<SourceAttempt>,
}

impl From<&FetchOutcome> for SourceUsage {
    fn from(outcome: &FetchOutcome) -> Self {
        Self {
            indicator_code: outcome.indicator_code.clone(),
            source: outcome.source.clone(),
            records: outcome.records.len(),
            used_fallback: outcome.used_fallback(),
            attempts: outcome.attempts.clone(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct IngestReport {
    pub countries: usize,
    pub catalog_updates: usize,
    pub sources_down: Vec<String>,
    pub indicators: Vec<SourceUsage>,
    pub write: WriteSummary,
}

impl IngestReport {
    pub fn no_data(&self) -> impl Iterator<Item = &SourceUsage> {
        self.indicators.iter().filter(|u| u.records == 0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DerivedResult {
    pub indicator_code: String,
    pub rows: usize,
    pub removed: u64,
    /// `None` when the old rows could not be removed and nothing was written.
    pub write: Option<WriteSummary>,
    pub error: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DeriveReport {
    pub input_rows: usize,
    pub indicators: Vec<DerivedResult>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedCountry {
    pub country: String,
    pub total: f64,
    pub grade: String,
}

impl From<&ReportCard> for RankedCountry {
    fn from(card: &ReportCard) -> Self {
        Self {
            country: card.country.clone(),
            total: card.total,
            grade: card.grade.letter.clone(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ScoreReport {
    pub scoring_year: i32,
    pub scored: usize,
    pub excluded: Vec<Exclusion>,
    pub grade_distribution: Vec<(String, usize)>,
    pub top: Vec<RankedCountry>,
    pub bottom: Vec<RankedCountry>,
    pub removed: u64,
    /// Score codes whose stale rows could not be cleared.
    pub delete_failures: Vec<String>,
    pub write: WriteSummary,
}
