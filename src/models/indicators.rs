use serde::{Deserialize, Serialize};

/// Catalog entry for one tracked indicator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndicatorDefinition {
    /// Dotted code, e.g. `emissions.co2_per_capita`.
    pub code: String,
    pub name: String,
    pub unit: String,
    /// Provenance label for the catalog entry itself.
    pub source: String,
    pub category: String,
}

impl IndicatorDefinition {
    pub fn new(code: &str, name: &str, unit: &str, source: &str, category: &str) -> Self {
        Self {
            code: code.to_string(),
            name: name.to_string(),
            unit: unit.to_string(),
            source: source.to_string(),
            category: category.to_string(),
        }
    }

    /// Fill empty metadata fields from `other`, never overwriting populated ones.
    pub fn backfill_from(&mut self, other: &IndicatorDefinition) -> bool {
        let mut changed = false;
        for (mine, theirs) in [
            (&mut self.name, &other.name),
            (&mut self.unit, &other.unit),
            (&mut self.source, &other.source),
            (&mut self.category, &other.category),
        ] {
            if mine.trim().is_empty() && !theirs.trim().is_empty() {
                *mine = theirs.clone();
                changed = true;
            }
        }
        changed
    }
}

/// Reference country, owned by the reference-data tables.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountryRecord {
    pub iso3: String,
    pub name: String,
    pub region: String,
}

impl CountryRecord {
    pub fn new(iso3: &str, name: &str, region: &str) -> Self {
        Self {
            iso3: iso3.to_string(),
            name: name.to_string(),
            region: region.to_string(),
        }
    }
}
