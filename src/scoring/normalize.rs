//! Global min–max normalization onto 0–100.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Score given to every country when all values are identical.
pub const DEGENERATE_SCORE: f64 = 50.0;

/// Whether a higher raw value is better (`Forward`) or worse (`Inverse`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    Forward,
    Inverse,
}

/// Min and max across all countries with a value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Range {
    pub min: f64,
    pub max: f64,
}

impl Range {
    pub fn of<'a>(values: impl IntoIterator<Item = &'a f64>) -> Option<Self> {
        values.into_iter().filter(|v| v.is_finite()).fold(None, |acc, &v| {
            Some(match acc {
                None => Range { min: v, max: v },
                Some(r) => Range {
                    min: r.min.min(v),
                    max: r.max.max(v),
                },
            })
        })
    }

    pub fn is_degenerate(&self) -> bool {
        self.max == self.min
    }

    /// `(value - min) / (max - min) * 100`, or [`DEGENERATE_SCORE`] when the range is empty.
    pub fn normalize(&self, value: f64) -> f64 {
        if self.is_degenerate() {
            return DEGENERATE_SCORE;
        }
        // Halved so spans near f64::MAX stay finite.
        let offset = value / 2.0 - self.min / 2.0;
        let span = self.max / 2.0 - self.min / 2.0;
        (offset / span * 100.0).clamp(0.0, 100.0)
    }
}

/// Apply directionality to a normalized value.
pub fn directed(normalized: f64, direction: Direction) -> f64 {
    match direction {
        Direction::Forward => normalized,
        Direction::Inverse => 100.0 - normalized,
    }
}

/// Normalize every country's value for one indicator and apply direction.
///
/// Must be run over the full country set: any single value can move every
/// other country's score.
pub fn score_indicator(
    values: &BTreeMap<String, f64>,
    direction: Direction,
) -> BTreeMap<String, f64> {
    let Some(range) = Range::of(values.values()) else {
        return BTreeMap::new();
    };
    values
        .iter()
        .filter(|(_, v)| v.is_finite())
        .map(|(country, &value)| (country.clone(), directed(range.normalize(value), direction)))
        .collect()
}
