//! Weighted aggregation of indicator scores into domain and total scores.

use std::collections::BTreeMap;

use crate::scoring::domains::{Domain, DomainConfig, ScoringModel};

/// Absorbs float noise in weight sums such as `0.2 + 0.1 + 0.2`.
const EPSILON: f64 = 1e-9;

/// Minimum share of a domain's configured weight that must be available.
pub const DEFAULT_MIN_DOMAIN_COVERAGE: f64 = 0.5;

/// Minimum number of domains a country needs for a total score.
pub const DEFAULT_MIN_DOMAINS: usize = 3;

pub fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Weighted mean over the indicators a country has, or `None` when the
/// available weight is below `min_coverage` of the domain's total weight.
pub fn domain_score(
    indicator_scores: &BTreeMap<String, f64>,
    domain: &DomainConfig,
    min_coverage: f64,
) -> Option<f64> {
    let configured = domain.total_indicator_weight();
    if configured <= 0.0 {
        return None;
    }

    let (weighted_sum, available) = domain
        .indicators
        .iter()
        .filter_map(|i| indicator_scores.get(&i.code).map(|score| (score * i.weight, i.weight)))
        .fold((0.0, 0.0), |(sum, mass), (s, w)| (sum + s, mass + w));

    if available <= 0.0 || available + EPSILON < min_coverage * configured {
        return None;
    }
    Some(weighted_sum / available)
}

/// Weighted mean over present domains, rounded to one decimal.
///
/// `None` when fewer than `min_domains` domains are present.
pub fn total_score(
    domain_scores: &BTreeMap<Domain, f64>,
    model: &ScoringModel,
    min_domains: usize,
) -> Option<f64> {
    if domain_scores.len() < min_domains {
        return None;
    }

    let (weighted_sum, present_weight) = domain_scores
        .iter()
        .filter_map(|(domain, score)| model.domain_weight(*domain).map(|w| (score * w, w)))
        .fold((0.0, 0.0), |(sum, mass), (s, w)| (sum + s, mass + w));

    if present_weight <= 0.0 {
        return None;
    }
    Some(round1(weighted_sum / present_weight))
}
