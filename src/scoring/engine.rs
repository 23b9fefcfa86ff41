//! Report card scoring for one fixed scoring year.
//!
//! The engine is a pure function of the rows it is given. Normalization is
//! recomputed over the whole country set on every call.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::Serialize;

use crate::models::{ObservedValue, REPORT_SOURCE};
use crate::scoring::aggregation::{
    domain_score, round1, total_score, DEFAULT_MIN_DOMAINS, DEFAULT_MIN_DOMAIN_COVERAGE,
};
use crate::scoring::domains::{Domain, ScoringModel};
use crate::scoring::grades::{Grade, GradeTable};
use crate::scoring::normalize::score_indicator;

pub const TOTAL_SCORE_CODE: &str = "REPORT.TOTAL_SCORE";
pub const GRADE_CODE: &str = "REPORT.GRADE";

#[derive(Debug, Clone)]
pub struct ScoringConfig {
    pub scoring_year: i32,
    /// Values older than this are never used as a country's latest value.
    pub min_year: i32,
    pub min_domain_coverage: f64,
    pub min_domains: usize,
    pub model: ScoringModel,
    pub grades: GradeTable,
}

impl ScoringConfig {
    pub fn new(scoring_year: i32, min_year: i32) -> Self {
        Self {
            scoring_year,
            min_year,
            min_domain_coverage: DEFAULT_MIN_DOMAIN_COVERAGE,
            min_domains: DEFAULT_MIN_DOMAINS,
            model: ScoringModel::default(),
            grades: GradeTable::default(),
        }
    }

    pub fn with_model(mut self, model: ScoringModel) -> Self {
        self.model = model;
        self
    }

    pub fn with_min_domains(mut self, min_domains: usize) -> Self {
        self.min_domains = min_domains;
        self
    }

    /// Every reserved code a scoring run writes for this model.
    pub fn score_codes(&self) -> Vec<String> {
        self.model
            .domains()
            .iter()
            .map(|d| d.domain.score_code().to_string())
            .chain([TOTAL_SCORE_CODE.to_string(), GRADE_CODE.to_string()])
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportCard {
    pub country: String,
    pub indicator_scores: BTreeMap<String, f64>,
    pub domain_scores: BTreeMap<Domain, f64>,
    pub total: f64,
    pub grade: Grade,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum ExclusionReason {
    InsufficientDomains {
        present: Vec<Domain>,
        missing: Vec<Domain>,
        required: usize,
    },
}

impl fmt::Display for ExclusionReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExclusionReason::InsufficientDomains {
                present,
                missing,
                required,
            } => {
                let names = |domains: &[Domain]| {
                    domains
                        .iter()
                        .map(|d| d.label())
                        .collect::<Vec<_>>()
                        .join(", ")
                };
                write!(
                    f,
                    "{} of {} domains present (need {}); missing: {}",
                    present.len(),
                    present.len() + missing.len(),
                    required,
                    names(missing)
                )
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Exclusion {
    pub country: String,
    pub reason: ExclusionReason,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ScoringOutcome {
    pub scoring_year: i32,
    pub cards: Vec<ReportCard>,
    pub excluded: Vec<Exclusion>,
}

impl ScoringOutcome {
    pub fn card(&self, country: &str) -> Option<&ReportCard> {
        self.cards.iter().find(|c| c.country == country)
    }

    /// Cards by total score, best first. Ties break on country code.
    pub fn ranked(&self) -> Vec<&ReportCard> {
        let mut ranked: Vec<&ReportCard> = self.cards.iter().collect();
        ranked.sort_by(|a, b| {
            b.total
                .total_cmp(&a.total)
                .then_with(|| a.country.cmp(&b.country))
        });
        ranked
    }

    /// Count of cards per grade letter, in grade table order.
    pub fn grade_distribution(&self, grades: &GradeTable) -> Vec<(String, usize)> {
        grades
            .grades()
            .iter()
            .map(|g| {
                let count = self
                    .cards
                    .iter()
                    .filter(|c| c.grade.numeric == g.numeric)
                    .count();
                (g.letter.clone(), count)
            })
            .collect()
    }
}

pub struct ScoringEngine {
    config: ScoringConfig,
}

impl ScoringEngine {
    pub fn new(config: ScoringConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ScoringConfig {
        &self.config
    }

    /// Latest value per indicator and country within `min_year..=scoring_year`.
    pub fn latest_values(&self, rows: &[ObservedValue]) -> BTreeMap<String, BTreeMap<String, f64>> {
        let wanted: BTreeSet<String> = self.config.model.indicator_codes().into_iter().collect();
        let mut latest: BTreeMap<String, BTreeMap<String, (i32, f64)>> = BTreeMap::new();

        for row in rows {
            if !wanted.contains(&row.indicator_code)
                || !row.value.is_finite()
                || row.year > self.config.scoring_year
                || row.year < self.config.min_year
            {
                continue;
            }
            let per_country = latest.entry(row.indicator_code.clone()).or_default();
            match per_country.get(&row.country_iso3) {
                Some(&(year, _)) if year >= row.year => {}
                _ => {
                    per_country.insert(row.country_iso3.clone(), (row.year, row.value));
                }
            }
        }

        latest
            .into_iter()
            .map(|(code, per_country)| {
                let values = per_country
                    .into_iter()
                    .map(|(country, (_, value))| (country, value))
                    .collect();
                (code, values)
            })
            .collect()
    }

    pub fn score(&self, rows: &[ObservedValue]) -> ScoringOutcome {
        let latest = self.latest_values(rows);

        // indicator code -> country -> directed score
        let mut normalized: BTreeMap<&str, BTreeMap<String, f64>> = BTreeMap::new();
        for domain in self.config.model.domains() {
            for indicator in &domain.indicators {
                if let Some(values) = latest.get(&indicator.code) {
                    normalized.insert(
                        indicator.code.as_str(),
                        score_indicator(values, indicator.direction),
                    );
                }
            }
        }

        let countries: BTreeSet<&String> = latest.values().flat_map(|v| v.keys()).collect();
        let mut outcome = ScoringOutcome {
            scoring_year: self.config.scoring_year,
            ..Default::default()
        };

        for country in countries {
            let indicator_scores: BTreeMap<String, f64> = normalized
                .iter()
                .filter_map(|(code, scores)| {
                    scores.get(country).map(|s| (code.to_string(), *s))
                })
                .collect();

            let domain_scores: BTreeMap<Domain, f64> = self
                .config
                .model
                .domains()
                .iter()
                .filter_map(|d| {
                    domain_score(&indicator_scores, d, self.config.min_domain_coverage)
                        .map(|s| (d.domain, s))
                })
                .collect();

            match total_score(&domain_scores, &self.config.model, self.config.min_domains) {
                Some(total) => {
                    let grade = self.config.grades.grade_for(total).clone();
                    outcome.cards.push(ReportCard {
                        country: country.clone(),
                        indicator_scores,
                        domain_scores,
                        total,
                        grade,
                    });
                }
                None => {
                    let missing = self
                        .config
                        .model
                        .domains()
                        .iter()
                        .map(|d| d.domain)
                        .filter(|d| !domain_scores.contains_key(d))
                        .collect();
                    outcome.excluded.push(Exclusion {
                        country: country.clone(),
                        reason: ExclusionReason::InsufficientDomains {
                            present: domain_scores.keys().copied().collect(),
                            missing,
                            required: self.config.min_domains,
                        },
                    });
                }
            }
        }

        outcome
    }

    /// Rows to persist: domain scores, total and numeric grade per scored country.
    ///
    /// Excluded countries produce nothing, not even the domains they do have.
    pub fn to_observations(&self, outcome: &ScoringOutcome) -> Vec<ObservedValue> {
        let year = outcome.scoring_year;
        let mut rows = Vec::new();
        for card in &outcome.cards {
            for (domain, score) in &card.domain_scores {
                rows.push(ObservedValue::new(
                    card.country.clone(),
                    domain.score_code(),
                    year,
                    round1(*score),
                    REPORT_SOURCE,
                ));
            }
            rows.push(ObservedValue::new(
                card.country.clone(),
                TOTAL_SCORE_CODE,
                year,
                card.total,
                REPORT_SOURCE,
            ));
            rows.push(ObservedValue::new(
                card.country.clone(),
                GRADE_CODE,
                year,
                f64::from(card.grade.numeric),
                REPORT_SOURCE,
            ));
        }
        rows
    }
}
