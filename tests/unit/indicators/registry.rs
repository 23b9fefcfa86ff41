//! Unit tests for the indicator catalog

use std::collections::BTreeSet;

use report_card::config::SourceEndpoints;
use report_card::indicators::registry::{default_catalog, filter_catalog, SourceSpec};
use report_card::scoring::ScoringModel;

#[test]
fn catalog_codes_are_unique_and_every_indicator_has_a_source() {
    let catalog = default_catalog(&SourceEndpoints::default());
    let codes: BTreeSet<&str> = catalog.iter().map(|s| s.definition.code.as_str()).collect();

    assert_eq!(codes.len(), catalog.len());
    assert_eq!(catalog.len(), 13);
    assert!(catalog.iter().all(|s| !s.sources.is_empty()));
}

#[test]
fn every_scored_raw_indicator_is_ingested() {
    let catalog = default_catalog(&SourceEndpoints::default());
    let codes: BTreeSet<String> = catalog.iter().map(|s| s.definition.code.clone()).collect();

    for code in ScoringModel::default().indicator_codes() {
        if !code.starts_with("derived.") {
            assert!(codes.contains(&code), "{} is scored but never ingested", code);
        }
    }
}

#[test]
fn local_exports_resolve_under_the_data_dir() {
    let endpoints = SourceEndpoints {
        local_data_dir: "/srv/exports".into(),
        ..SourceEndpoints::default()
    };
    let catalog = default_catalog(&endpoints);
    let gdp = catalog
        .iter()
        .find(|s| s.definition.code == "economy.gdp_total")
        .expect("gdp in catalog");

    let local = gdp
        .sources
        .iter()
        .find_map(|s| match s {
            SourceSpec::LocalCsv { path, .. } => Some(path.clone()),
            _ => None,
        })
        .expect("local fallback configured");
    assert!(local.starts_with("/srv/exports"));
}

#[test]
fn filter_keeps_everything_when_empty() {
    let all = default_catalog(&SourceEndpoints::default());
    let count = all.len();

    assert_eq!(filter_catalog(all, &[]).len(), count);

    let only = filter_catalog(
        default_catalog(&SourceEndpoints::default()),
        &["nature.forest_area".to_string()],
    );
    assert_eq!(only.len(), 1);
    assert_eq!(only[0].definition.code, "nature.forest_area");
}
