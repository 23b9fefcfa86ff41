//! Scoring domains and their weighted indicators.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::scoring::normalize::Direction;

const WEIGHT_TOLERANCE: f64 = 0.001;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Domain {
    Emissions,
    Energy,
    Economy,
    Nature,
    Health,
}

impl Domain {
    pub fn all() -> [Domain; 5] {
        [
            Domain::Emissions,
            Domain::Energy,
            Domain::Economy,
            Domain::Nature,
            Domain::Health,
        ]
    }

    pub fn label(&self) -> &'static str {
        match self {
            Domain::Emissions => "Emissions",
            Domain::Energy => "Energy",
            Domain::Economy => "Economy",
            Domain::Nature => "Nature",
            Domain::Health => "Health",
        }
    }

    /// Reserved indicator code under which the domain score is stored.
    pub fn score_code(&self) -> &'static str {
        match self {
            Domain::Emissions => "REPORT.EMISSIONS_SCORE",
            Domain::Energy => "REPORT.ENERGY_SCORE",
            Domain::Economy => "REPORT.ECONOMY_SCORE",
            Domain::Nature => "REPORT.NATURE_SCORE",
            Domain::Health => "REPORT.HEALTH_SCORE",
        }
    }
}

impl fmt::Display for Domain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeightedIndicator {
    pub code: String,
    pub weight: f64,
    pub direction: Direction,
}

impl WeightedIndicator {
    pub fn forward(code: &str, weight: f64) -> Self {
        Self {
            code: code.to_string(),
            weight,
            direction: Direction::Forward,
        }
    }

    pub fn inverse(code: &str, weight: f64) -> Self {
        Self {
            code: code.to_string(),
            weight,
            direction: Direction::Inverse,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DomainConfig {
    pub domain: Domain,
    pub weight: f64,
    pub indicators: Vec<WeightedIndicator>,
}

impl DomainConfig {
    pub fn total_indicator_weight(&self) -> f64 {
        self.indicators.iter().map(|i| i.weight).sum()
    }
}

/// The full weighting scheme. Construction verifies weights, including
/// when deserialized from a list of domains.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<DomainConfig>", into = "Vec<DomainConfig>")]
pub struct ScoringModel {
    domains: Vec<DomainConfig>,
}

impl TryFrom<Vec<DomainConfig>> for ScoringModel {
    type Error = String;

    fn try_from(domains: Vec<DomainConfig>) -> Result<Self, Self::Error> {
        Self::new(domains)
    }
}

impl From<ScoringModel> for Vec<DomainConfig> {
    fn from(model: ScoringModel) -> Self {
        model.domains
    }
}

impl ScoringModel {
    /// Domain weights and each domain's indicator weights must sum to 1.0.
    pub fn new(domains: Vec<DomainConfig>) -> Result<Self, String> {
        if domains.is_empty() {
            return Err("Scoring model needs at least one domain".to_string());
        }
        let total: f64 = domains.iter().map(|d| d.weight).sum();
        if (total - 1.0).abs() > WEIGHT_TOLERANCE {
            return Err(format!("Domain weights must sum to 1.0, got: {}", total));
        }
        for domain in &domains {
            if domain.weight < 0.0 || domain.indicators.iter().any(|i| i.weight < 0.0) {
                return Err(format!("{}: all weights must be non-negative", domain.domain));
            }
            let inner = domain.total_indicator_weight();
            if (inner - 1.0).abs() > WEIGHT_TOLERANCE {
                return Err(format!(
                    "{}: indicator weights must sum to 1.0, got: {}",
                    domain.domain, inner
                ));
            }
        }
        for (i, a) in domains.iter().enumerate() {
            if domains[i + 1..].iter().any(|b| b.domain == a.domain) {
                return Err(format!("{} configured twice", a.domain));
            }
        }
        Ok(Self { domains })
    }

    pub fn domains(&self) -> &[DomainConfig] {
        &self.domains
    }

    pub fn domain_weight(&self, domain: Domain) -> Option<f64> {
        self.domains
            .iter()
            .find(|d| d.domain == domain)
            .map(|d| d.weight)
    }

    /// Every indicator code the model reads.
    pub fn indicator_codes(&self) -> Vec<String> {
        let mut codes: Vec<String> = self
            .domains
            .iter()
            .flat_map(|d| d.indicators.iter().map(|i| i.code.clone()))
            .collect();
        codes.sort();
        codes.dedup();
        codes
    }
}

impl Default for ScoringModel {
    fn default() -> Self {
        Self {
            domains: vec![
                DomainConfig {
                    domain: Domain::Emissions,
                    weight: 0.30,
                    indicators: vec![
                        WeightedIndicator::inverse("emissions.co2_per_capita", 0.4),
                        WeightedIndicator::inverse("emissions.ghg_per_capita", 0.3),
                        WeightedIndicator::inverse("derived.carbon_intensity", 0.3),
                    ],
                },
                DomainConfig {
                    domain: Domain::Energy,
                    weight: 0.25,
                    indicators: vec![
                        WeightedIndicator::forward("energy.renewable_share", 0.4),
                        WeightedIndicator::inverse("energy.fossil_share", 0.2),
                        WeightedIndicator::inverse("derived.energy_intensity", 0.2),
                        WeightedIndicator::forward("energy.electricity_access", 0.2),
                    ],
                },
                DomainConfig {
                    domain: Domain::Economy,
                    weight: 0.15,
                    indicators: vec![
                        WeightedIndicator::forward("derived.decoupling_index", 0.6),
                        WeightedIndicator::forward("economy.gdp_per_capita", 0.4),
                    ],
                },
                DomainConfig {
                    domain: Domain::Nature,
                    weight: 0.15,
                    indicators: vec![
                        WeightedIndicator::forward("nature.forest_area", 0.5),
                        WeightedIndicator::forward("nature.protected_areas", 0.5),
                    ],
                },
                DomainConfig {
                    domain: Domain::Health,
                    weight: 0.15,
                    indicators: vec![
                        WeightedIndicator::inverse("health.pm25_exposure", 0.6),
                        WeightedIndicator::forward("health.life_expectancy", 0.4),
                    ],
                },
            ],
        }
    }
}
