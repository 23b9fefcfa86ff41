//! Derived indicators computed from joined raw series.
//!
//! All formulas are pure. A country or `(country, year)` pair without enough
//! input is left out of the output; it is never an error.

use std::collections::{BTreeMap, BTreeSet};

use crate::models::{CountryYear, IndicatorDefinition, ObservedValue, DERIVED_SOURCE};

/// A series aligned on `(country, year)`.
pub type Series = BTreeMap<CountryYear, f64>;

/// Collect the rows of `code` into a series, skipping non-finite values.
pub fn series_for(rows: &[ObservedValue], code: &str) -> Series {
    rows.iter()
        .filter(|r| r.indicator_code == code && r.value.is_finite())
        .map(|r| (r.country_year(), r.value))
        .collect()
}

/// `numerator / denominator * scale` for pairs present in both series.
#[derive(Debug, Clone, PartialEq)]
pub struct RatioDerivation {
    pub numerator: String,
    pub denominator: String,
    pub scale: f64,
    /// Denominators at or below this value are treated as missing.
    pub minimum_denominator: f64,
}

impl RatioDerivation {
    pub fn compute(&self, numerator: &Series, denominator: &Series) -> Series {
        numerator
            .iter()
            .filter_map(|(key, num)| {
                let den = *denominator.get(key)?;
                if den <= self.minimum_denominator {
                    return None;
                }
                let value = num / den * self.scale;
                value.is_finite().then(|| (key.clone(), value))
            })
            .collect()
    }
}

/// Growth of `lead` minus growth of `lag`, both as percent change from `base_year`.
///
/// Every year observed in both series gets a row, including the base year
/// itself (always 0) and years before it.
///
/// With GDP as `lead` and CO2 as `lag` this is the decoupling index: positive
/// when the economy grew faster than emissions.
#[derive(Debug, Clone, PartialEq)]
pub struct GrowthComparison {
    pub lead: String,
    pub lag: String,
    pub base_year: i32,
    /// Base values at or below this are unusable as a growth denominator.
    pub minimum_base: f64,
}

impl GrowthComparison {
    pub fn compute(&self, lead: &Series, lag: &Series) -> Series {
        let countries: BTreeSet<&str> = lead.keys().map(|k| k.country.as_str()).collect();
        let mut out = Series::new();

        for country in countries {
            let base = CountryYear::new(country, self.base_year);
            let (Some(&lead_base), Some(&lag_base)) = (lead.get(&base), lag.get(&base)) else {
                continue;
            };
            if lead_base <= self.minimum_base || lag_base <= self.minimum_base {
                continue;
            }

            let from = CountryYear::new(country, i32::MIN);
            let to = CountryYear::new(country, i32::MAX);
            for (key, lead_value) in lead.range(from..=to) {
                let Some(lag_value) = lag.get(key) else {
                    continue;
                };
                let lead_growth = (lead_value - lead_base) / lead_base * 100.0;
                let lag_growth = (lag_value - lag_base) / lag_base * 100.0;
                let delta = lead_growth - lag_growth;
                if delta.is_finite() {
                    out.insert(key.clone(), delta);
                }
            }
        }

        out
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Formula {
    Ratio(RatioDerivation),
    GrowthComparison(GrowthComparison),
}

#[derive(Debug, Clone, PartialEq)]
pub struct DerivedIndicator {
    pub definition: IndicatorDefinition,
    pub formula: Formula,
}

impl DerivedIndicator {
    pub fn code(&self) -> &str {
        &self.definition.code
    }

    /// Codes of the raw series this indicator reads.
    pub fn inputs(&self) -> Vec<String> {
        match &self.formula {
            Formula::Ratio(r) => vec![r.numerator.clone(), r.denominator.clone()],
            Formula::GrowthComparison(g) => vec![g.lead.clone(), g.lag.clone()],
        }
    }

    /// Compute this indicator's rows from `rows` (which may hold any codes).
    pub fn derive(&self, rows: &[ObservedValue]) -> Vec<ObservedValue> {
        let series = match &self.formula {
            Formula::Ratio(r) => r.compute(
                &series_for(rows, &r.numerator),
                &series_for(rows, &r.denominator),
            ),
            Formula::GrowthComparison(g) => {
                g.compute(&series_for(rows, &g.lead), &series_for(rows, &g.lag))
            }
        };

        series
            .into_iter()
            .map(|(key, value)| {
                ObservedValue::new(key.country, self.code(), key.year, value, DERIVED_SOURCE)
            })
            .collect()
    }
}

/// Derived indicators computed after ingestion.
pub fn default_derivations() -> Vec<DerivedIndicator> {
    vec![
        DerivedIndicator {
            definition: IndicatorDefinition::new(
                "derived.carbon_intensity",
                "Carbon intensity of GDP",
                "kg CO2 per USD",
                DERIVED_SOURCE,
                "emissions",
            ),
            formula: Formula::Ratio(RatioDerivation {
                numerator: "emissions.co2_total".to_string(),
                denominator: "economy.gdp_total".to_string(),
                // Mt -> kg
                scale: 1e9,
                minimum_denominator: 0.0,
            }),
        },
        DerivedIndicator {
            definition: IndicatorDefinition::new(
                "derived.energy_intensity",
                "Energy intensity of GDP",
                "kWh per USD",
                DERIVED_SOURCE,
                "energy",
            ),
            formula: Formula::Ratio(RatioDerivation {
                numerator: "energy.primary_energy".to_string(),
                denominator: "economy.gdp_total".to_string(),
                // TWh -> kWh
                scale: 1e9,
                minimum_denominator: 0.0,
            }),
        },
        DerivedIndicator {
            definition: IndicatorDefinition::new(
                "derived.decoupling_index",
                "GDP vs CO2 decoupling since 2015",
                "percentage points",
                DERIVED_SOURCE,
                "economy",
            ),
            formula: Formula::GrowthComparison(GrowthComparison {
                lead: "economy.gdp_total".to_string(),
                lag: "emissions.co2_total".to_string(),
                base_year: 2015,
                minimum_base: 0.0,
            }),
        },
    ]
}
