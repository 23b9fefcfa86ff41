//! Unit tests for the scoring engine

use report_card::models::{ObservedValue, REPORT_SOURCE};
use report_card::scoring::{
    Domain, DomainConfig, ExclusionReason, ScoringConfig, ScoringEngine, ScoringModel,
    WeightedIndicator, GRADE_CODE, TOTAL_SCORE_CODE,
};

fn row(country: &str, code: &str, year: i32, value: f64) -> ObservedValue {
    ObservedValue::new(country, code, year, value, "TEST")
}

fn two_indicator_engine() -> ScoringEngine {
    let model = ScoringModel::new(vec![DomainConfig {
        domain: Domain::Emissions,
        weight: 1.0,
        indicators: vec![
            WeightedIndicator::forward("X", 0.5),
            WeightedIndicator::inverse("Y", 0.5),
        ],
    }])
    .expect("valid model");
    ScoringEngine::new(
        ScoringConfig::new(2020, 2000)
            .with_model(model)
            .with_min_domains(1),
    )
}

#[test]
fn forward_and_inverse_indicators_combine_into_domain_scores() {
    let engine = two_indicator_engine();
    let rows = vec![
        row("C1", "X", 2020, 10.0),
        row("C2", "X", 2020, 30.0),
        row("C1", "Y", 2020, 5.0),
        row("C2", "Y", 2020, 1.0),
    ];

    let outcome = engine.score(&rows);

    let c1 = outcome.card("C1").expect("C1 scored");
    let c2 = outcome.card("C2").expect("C2 scored");
    assert_eq!(c1.indicator_scores["X"], 0.0);
    assert_eq!(c2.indicator_scores["X"], 100.0);
    assert_eq!(c1.indicator_scores["Y"], 0.0);
    assert_eq!(c2.indicator_scores["Y"], 100.0);
    assert_eq!(c1.domain_scores[&Domain::Emissions], 0.0);
    assert_eq!(c2.domain_scores[&Domain::Emissions], 100.0);
    assert_eq!(c2.total, 100.0);
    assert_eq!(c2.grade.letter, "A+");
    assert_eq!(c1.grade.letter, "F");
}

#[test]
fn latest_value_at_or_before_scoring_year_wins() {
    let engine = two_indicator_engine();
    let rows = vec![
        row("C1", "X", 2018, 1.0),
        row("C1", "X", 2019, 2.0),
        row("C1", "X", 2021, 99.0),
        row("C1", "X", 1990, 50.0),
        row("C2", "X", 1995, 7.0),
    ];

    let latest = engine.latest_values(&rows);

    assert_eq!(latest["X"]["C1"], 2.0);
    // 1995 is before the minimum year.
    assert!(!latest["X"].contains_key("C2"));
}

#[test]
fn rescoring_after_raw_change_moves_other_countries() {
    let engine = two_indicator_engine();
    let mut rows = vec![
        row("C1", "X", 2020, 10.0),
        row("C2", "X", 2020, 20.0),
        row("C3", "X", 2020, 30.0),
        row("C1", "Y", 2020, 1.0),
        row("C2", "Y", 2020, 1.0),
        row("C3", "Y", 2020, 1.0),
    ];

    let before = engine.score(&rows);
    assert_eq!(before.card("C2").expect("scored").indicator_scores["X"], 50.0);

    rows[2].value = 110.0;
    let after = engine.score(&rows);
    assert_eq!(after.card("C2").expect("scored").indicator_scores["X"], 10.0);

    // Same input, same output.
    assert_eq!(engine.score(&rows), after);
}

fn full_row_set(country: &str, scale: f64) -> Vec<ObservedValue> {
    ScoringModel::default()
        .indicator_codes()
        .into_iter()
        .map(|code| row(country, &code, 2020, scale))
        .collect()
}

#[test]
fn countries_with_fewer_than_three_domains_are_excluded() {
    let engine = ScoringEngine::new(ScoringConfig::new(2020, 2000));
    let mut rows = full_row_set("AAA", 1.0);
    rows.extend(full_row_set("BBB", 2.0));
    // CCC only covers Emissions and Nature.
    rows.extend([
        row("CCC", "emissions.co2_per_capita", 2020, 1.5),
        row("CCC", "emissions.ghg_per_capita", 2020, 1.5),
        row("CCC", "nature.forest_area", 2020, 1.5),
        row("CCC", "nature.protected_areas", 2020, 1.5),
        row("CCC", "health.life_expectancy", 2020, 1.5),
    ]);

    let outcome = engine.score(&rows);

    assert!(outcome.card("CCC").is_none());
    let exclusion = outcome
        .excluded
        .iter()
        .find(|e| e.country == "CCC")
        .expect("CCC excluded");
    match &exclusion.reason {
        ExclusionReason::InsufficientDomains {
            present,
            missing,
            required,
        } => {
            assert_eq!(present, &vec![Domain::Emissions, Domain::Nature]);
            assert_eq!(missing.len(), 3);
            assert_eq!(*required, 3);
        }
    }
    assert!(exclusion.reason.to_string().contains("Health"));

    let persisted = engine.to_observations(&outcome);
    assert!(persisted.iter().all(|r| r.country_iso3 != "CCC"));
}

#[test]
fn observations_carry_domain_total_and_numeric_grade() {
    let engine = ScoringEngine::new(ScoringConfig::new(2020, 2000));
    let mut rows = full_row_set("AAA", 1.0);
    rows.extend(full_row_set("BBB", 2.0));

    let outcome = engine.score(&rows);
    let persisted = engine.to_observations(&outcome);

    // 5 domains + total + grade, per country
    assert_eq!(persisted.len(), 14);
    assert!(persisted.iter().all(|r| r.year == 2020 && r.source == REPORT_SOURCE));

    let grade = persisted
        .iter()
        .find(|r| r.country_iso3 == "AAA" && r.indicator_code == GRADE_CODE)
        .expect("grade row");
    let total = persisted
        .iter()
        .find(|r| r.country_iso3 == "AAA" && r.indicator_code == TOTAL_SCORE_CODE)
        .expect("total row");
    let card = outcome.card("AAA").expect("AAA scored");
    assert_eq!(grade.value, f64::from(card.grade.numeric));
    assert_eq!(total.value, card.total);
}

#[test]
fn ranking_and_distribution() {
    let engine = two_indicator_engine();
    let rows = vec![
        row("C1", "X", 2020, 10.0),
        row("C2", "X", 2020, 30.0),
        row("C3", "X", 2020, 20.0),
        row("C1", "Y", 2020, 4.0),
        row("C2", "Y", 2020, 4.0),
        row("C3", "Y", 2020, 4.0),
    ];

    let outcome = engine.score(&rows);
    let ranked: Vec<&str> = outcome.ranked().iter().map(|c| c.country.as_str()).collect();
    assert_eq!(ranked, vec!["C2", "C3", "C1"]);

    let distribution = outcome.grade_distribution(&engine.config().grades);
    let count = |letter: &str| {
        distribution
            .iter()
            .find(|(l, _)| l == letter)
            .map(|(_, n)| *n)
            .unwrap_or(0)
    };
    // Y is degenerate (50 everywhere): totals 75, 50 and 25.
    assert_eq!(count("B+"), 1);
    assert_eq!(count("C+"), 1);
    assert_eq!(count("F"), 1);
}
