//! Unit tests for min-max normalization

use std::collections::BTreeMap;

use report_card::scoring::normalize::{directed, score_indicator, Range, DEGENERATE_SCORE};
use report_card::scoring::Direction;

fn values(points: &[(&str, f64)]) -> BTreeMap<String, f64> {
    points.iter().map(|(c, v)| (c.to_string(), *v)).collect()
}

#[test]
fn scores_stay_within_bounds_and_best_country_scores_100() {
    let raw = values(&[("A", -4.0), ("B", 12.5), ("C", 3.0), ("D", 100.0)]);

    let forward = score_indicator(&raw, Direction::Forward);
    let inverse = score_indicator(&raw, Direction::Inverse);

    for score in forward.values().chain(inverse.values()) {
        assert!((0.0..=100.0).contains(score));
    }
    assert_eq!(forward["D"], 100.0);
    assert_eq!(forward["A"], 0.0);
    assert_eq!(inverse["A"], 100.0);
    assert_eq!(inverse["D"], 0.0);
}

#[test]
fn range_near_float_limits_still_spans_0_to_100() {
    let raw = values(&[("A", -1e308), ("B", 0.0), ("C", 1e308)]);

    let forward = score_indicator(&raw, Direction::Forward);

    assert_eq!(forward["A"], 0.0);
    assert_eq!(forward["B"], 50.0);
    assert_eq!(forward["C"], 100.0);
}

#[test]
fn identical_values_score_exactly_50() {
    let raw = values(&[("A", 7.0), ("B", 7.0), ("C", 7.0)]);

    for direction in [Direction::Forward, Direction::Inverse] {
        let scores = score_indicator(&raw, direction);
        assert_eq!(scores.len(), 3);
        assert!(scores.values().all(|s| *s == DEGENERATE_SCORE));
    }
}

#[test]
fn single_country_is_a_degenerate_range() {
    let scores = score_indicator(&values(&[("A", 1.5)]), Direction::Forward);

    assert_eq!(scores["A"], 50.0);
}

#[test]
fn no_values_means_no_scores() {
    assert!(score_indicator(&BTreeMap::new(), Direction::Forward).is_empty());
}

#[test]
fn range_interpolates_linearly() {
    let range = Range::of(&[10.0, 30.0]).expect("non-empty");

    assert_eq!(range.normalize(20.0), 50.0);
    assert_eq!(range.normalize(10.0), 0.0);
    assert_eq!(directed(25.0, Direction::Inverse), 75.0);
    assert_eq!(directed(25.0, Direction::Forward), 25.0);
}
