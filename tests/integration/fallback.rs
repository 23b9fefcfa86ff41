//! Fallback orchestration against stub adapters

use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Duration;

use report_card::error::SourceError;
use report_card::models::{IndicatorDefinition, YearRange, NO_SOURCE};
use report_card::services::{
    AttemptResult, FallbackChain, FallbackOrchestrator, FetchRequest, RetryPolicy, SourceAdapter,
};

use crate::test_utils::{records, StubAdapter};

fn definition(code: &str) -> IndicatorDefinition {
    IndicatorDefinition::new(code, code, "unit", "TEST", "test")
}

fn request(code: &str) -> FetchRequest {
    FetchRequest::new(code, Arc::new(BTreeSet::new()), YearRange::new(2000, 2030))
}

fn orchestrator() -> FallbackOrchestrator {
    FallbackOrchestrator::new(RetryPolicy::new(1, Duration::from_millis(1)), 4)
}

#[tokio::test]
async fn first_non_empty_adapter_supplies_records_and_provenance() {
    let a1 = StubAdapter::failing("A1", SourceError::Unavailable("HTTP 503".to_string()));
    let a2 = StubAdapter::returning("A2", records(&[("DEU", 2020, 1.0), ("FRA", 2020, 2.0), ("ITA", 2020, 3.0)]));
    let a3 = StubAdapter::returning("A3", records(&[("DEU", 2020, 9.0)]));
    let chain = FallbackChain::new(
        definition("x"),
        vec![
            a1.clone() as Arc<dyn SourceAdapter>,
            a2.clone() as Arc<dyn SourceAdapter>,
            a3.clone() as Arc<dyn SourceAdapter>,
        ],
    );

    let outcome = orchestrator()
        .run_chain(&chain, &request("x"), &BTreeSet::new())
        .await;

    assert_eq!(outcome.source, "A2");
    assert_eq!(outcome.records.len(), 3);
    assert!(outcome.records.iter().all(|r| r.source == "A2" && r.indicator_code == "x"));
    assert!(outcome.used_fallback());
    assert_eq!(a3.calls(), 0);
    // One retry of the transport failure before moving on.
    assert_eq!(a1.calls(), 2);
}

#[tokio::test]
async fn parse_errors_fall_through_without_retry() {
    let a1 = StubAdapter::failing("A1", SourceError::Parse("bad payload".to_string()));
    let a2 = StubAdapter::returning("A2", records(&[("DEU", 2020, 1.0)]));
    let chain = FallbackChain::new(
        definition("x"),
        vec![a1.clone() as Arc<dyn SourceAdapter>, a2.clone() as Arc<dyn SourceAdapter>],
    );

    let outcome = orchestrator()
        .run_chain(&chain, &request("x"), &BTreeSet::new())
        .await;

    assert_eq!(outcome.source, "A2");
    assert_eq!(a1.calls(), 1);
}

#[tokio::test]
async fn empty_adapter_is_not_a_success() {
    let a1 = StubAdapter::returning("A1", vec![]);
    let a2 = StubAdapter::returning("A2", records(&[("DEU", 2020, 1.0)]));
    let chain = FallbackChain::new(
        definition("x"),
        vec![a1.clone() as Arc<dyn SourceAdapter>, a2 as Arc<dyn SourceAdapter>],
    );

    let outcome = orchestrator()
        .run_chain(&chain, &request("x"), &BTreeSet::new())
        .await;

    assert_eq!(outcome.source, "A2");
    assert_eq!(outcome.attempts[0].result, AttemptResult::Empty);
    assert_eq!(a1.calls(), 1);
}

#[tokio::test]
async fn exhausted_chain_records_no_source() {
    let chain = FallbackChain::new(
        definition("x"),
        vec![
            StubAdapter::returning("A1", vec![]) as Arc<dyn SourceAdapter>,
            StubAdapter::failing("A2", SourceError::Parse("garbage".to_string())) as Arc<dyn SourceAdapter>,
        ],
    );

    let outcome = orchestrator()
        .run_chain(&chain, &request("x"), &BTreeSet::new())
        .await;

    assert_eq!(outcome.source, NO_SOURCE);
    assert!(outcome.is_no_data());
    assert!(outcome.records.is_empty());
    assert_eq!(outcome.attempts.len(), 2);
}

#[tokio::test]
async fn probe_skips_down_source_for_every_chain() {
    let primary = StubAdapter::down("PRIMARY");
    let backup = StubAdapter::returning("BACKUP", records(&[("DEU", 2020, 1.0)]));
    let chains: Vec<FallbackChain> = ["x", "y"]
        .iter()
        .map(|code| {
            FallbackChain::new(
                definition(code),
                vec![
                    primary.clone() as Arc<dyn SourceAdapter>,
                    backup.clone() as Arc<dyn SourceAdapter>,
                ],
            )
        })
        .collect();
    let orchestrator = orchestrator();

    let down = orchestrator.probe(&chains).await;
    let outcomes = orchestrator
        .run_all(&chains, Arc::new(BTreeSet::new()), YearRange::new(2000, 2030), &down)
        .await;

    assert!(down.contains("PRIMARY"));
    assert_eq!(primary.calls(), 0);
    assert_eq!(backup.calls(), 2);
    assert_eq!(outcomes.len(), 2);
    assert_eq!(outcomes[0].indicator_code, "x");
    assert!(outcomes.iter().all(|o| o.source == "BACKUP"));
    assert_eq!(outcomes[0].attempts[0].result, AttemptResult::Skipped);
}
