//! Read-only QA checks over the fact table.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::Serialize;

use crate::models::{CountryRecord, ObservationKey, ObservedValue, YearRange};

/// Keys listed in check details before truncation.
const MAX_EXAMPLES: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub enum CheckStatus {
    Pass,
    Warn,
    Fail,
}

impl fmt::Display for CheckStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            CheckStatus::Pass => "PASS",
            CheckStatus::Warn => "WARN",
            CheckStatus::Fail => "FAIL",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CheckResult {
    pub name: &'static str,
    pub status: CheckStatus,
    pub details: String,
}

impl CheckResult {
    fn new(name: &'static str, status: CheckStatus, details: impl Into<String>) -> Self {
        Self {
            name,
            status,
            details: details.into(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct QaReport {
    pub checks: Vec<CheckResult>,
}

impl QaReport {
    /// Worst status across all checks.
    pub fn overall(&self) -> CheckStatus {
        self.checks
            .iter()
            .map(|c| c.status)
            .max()
            .unwrap_or(CheckStatus::Pass)
    }

    pub fn has_failures(&self) -> bool {
        self.overall() == CheckStatus::Fail
    }

    pub fn check(&self, name: &str) -> Option<&CheckResult> {
        self.checks.iter().find(|c| c.name == name)
    }
}

#[derive(Debug, Clone)]
pub struct QaConfig {
    pub years: YearRange,
    /// Missing ratios above this produce a warning.
    pub missing_threshold: f64,
}

pub const COUNTRY_COVERAGE: &str = "country_coverage";
pub const MISSING_RATIO: &str = "missing_ratio";
pub const DUPLICATE_KEYS: &str = "duplicate_keys";
pub const YEAR_RANGE: &str = "year_range";

/// Run every check. `tracked_codes` are the raw indicators the missing ratio
/// is measured against.
pub fn validate(
    rows: &[ObservedValue],
    countries: &[CountryRecord],
    tracked_codes: &[String],
    config: &QaConfig,
) -> QaReport {
    QaReport {
        checks: vec![
            check_country_coverage(rows, countries),
            check_missing_ratio(rows, countries, tracked_codes, config),
            check_duplicate_keys(rows),
            check_year_range(rows, config.years),
        ],
    }
}

fn examples<T: fmt::Display>(items: impl IntoIterator<Item = T>) -> String {
    items
        .into_iter()
        .take(MAX_EXAMPLES)
        .map(|i| i.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

fn check_country_coverage(rows: &[ObservedValue], countries: &[CountryRecord]) -> CheckResult {
    if countries.is_empty() {
        return CheckResult::new(COUNTRY_COVERAGE, CheckStatus::Fail, "no tracked countries");
    }

    let covered: BTreeSet<&str> = rows.iter().map(|r| r.country_iso3.as_str()).collect();
    let uncovered: Vec<&str> = countries
        .iter()
        .map(|c| c.iso3.as_str())
        .filter(|iso3| !covered.contains(iso3))
        .collect();

    if uncovered.is_empty() {
        CheckResult::new(
            COUNTRY_COVERAGE,
            CheckStatus::Pass,
            format!("all {} countries have data", countries.len()),
        )
    } else if uncovered.len() == countries.len() {
        CheckResult::new(COUNTRY_COVERAGE, CheckStatus::Fail, "no country has any data")
    } else {
        CheckResult::new(
            COUNTRY_COVERAGE,
            CheckStatus::Warn,
            format!(
                "{} of {} countries have no rows (e.g. {})",
                uncovered.len(),
                countries.len(),
                examples(&uncovered)
            ),
        )
    }
}

fn check_missing_ratio(
    rows: &[ObservedValue],
    countries: &[CountryRecord],
    tracked_codes: &[String],
    config: &QaConfig,
) -> CheckResult {
    let expected = countries.len() * tracked_codes.len();
    if expected == 0 {
        return CheckResult::new(MISSING_RATIO, CheckStatus::Warn, "nothing to measure");
    }

    let tracked: BTreeSet<&str> = tracked_codes.iter().map(String::as_str).collect();
    let known: BTreeSet<&str> = countries.iter().map(|c| c.iso3.as_str()).collect();
    let present: BTreeSet<(&str, &str)> = rows
        .iter()
        .filter(|r| {
            r.value.is_finite()
                && config.years.contains(r.year)
                && tracked.contains(r.indicator_code.as_str())
                && known.contains(r.country_iso3.as_str())
        })
        .map(|r| (r.country_iso3.as_str(), r.indicator_code.as_str()))
        .collect();

    let ratio = 1.0 - present.len() as f64 / expected as f64;
    let details = format!(
        "{:.1}% of country/indicator pairs have no value in {} (threshold {:.1}%)",
        ratio * 100.0,
        config.years,
        config.missing_threshold * 100.0
    );
    let status = if ratio > config.missing_threshold {
        CheckStatus::Warn
    } else {
        CheckStatus::Pass
    };
    CheckResult::new(MISSING_RATIO, status, details)
}

fn check_duplicate_keys(rows: &[ObservedValue]) -> CheckResult {
    let mut counts: BTreeMap<ObservationKey, usize> = BTreeMap::new();
    for row in rows {
        *counts.entry(row.key()).or_default() += 1;
    }
    let duplicates: Vec<&ObservationKey> = counts
        .iter()
        .filter(|(_, &n)| n > 1)
        .map(|(key, _)| key)
        .collect();

    if duplicates.is_empty() {
        CheckResult::new(DUPLICATE_KEYS, CheckStatus::Pass, "no duplicate keys")
    } else {
        CheckResult::new(
            DUPLICATE_KEYS,
            CheckStatus::Fail,
            format!("{} duplicated keys (e.g. {})", duplicates.len(), examples(duplicates)),
        )
    }
}

fn check_year_range(rows: &[ObservedValue], years: YearRange) -> CheckResult {
    let outside: Vec<ObservationKey> = rows
        .iter()
        .filter(|r| !years.contains(r.year))
        .map(ObservedValue::key)
        .collect();

    if outside.is_empty() {
        CheckResult::new(
            YEAR_RANGE,
            CheckStatus::Pass,
            format!("all years within {}", years),
        )
    } else {
        CheckResult::new(
            YEAR_RANGE,
            CheckStatus::Fail,
            format!(
                "{} rows outside {} (e.g. {})",
                outside.len(),
                years,
                examples(&outside)
            ),
        )
    }
}
