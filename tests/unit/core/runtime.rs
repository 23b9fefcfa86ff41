//! Unit tests for stage parsing and run summary rendering

use chrono::Utc;
use report_card::core::{render_markdown, RunSummary, Stage};
use report_card::db::{BatchFailure, WriteSummary};
use report_card::jobs::{IngestReport, RankedCountry, ScoreReport, SourceUsage};
use report_card::quality::{CheckResult, CheckStatus, QaReport};
use report_card::scoring::{Domain, Exclusion, ExclusionReason};
use report_card::services::{AttemptResult, SourceAttempt};

#[test]
fn stages_parse_case_insensitively() {
    assert_eq!("ingest".parse::<Stage>(), Ok(Stage::Ingest));
    assert_eq!("SCORE".parse::<Stage>(), Ok(Stage::Score));
    assert!("deploy".parse::<Stage>().is_err());
    assert_eq!(
        Stage::all().to_vec(),
        vec![Stage::Ingest, Stage::Derive, Stage::Score, Stage::Validate]
    );
}

fn summary() -> RunSummary {
    let now = Utc::now();
    RunSummary {
        started_at: now,
        finished_at: now,
        ingest: Some(IngestReport {
            countries: 2,
            catalog_updates: 0,
            sources_down: vec![],
            indicators: vec![
                SourceUsage {
                    indicator_code: "nature.forest_area".to_string(),
                    source: "LOCAL_CSV".to_string(),
                    records: 12,
                    used_fallback: true,
                    attempts: vec![
                        SourceAttempt {
                            adapter: "WORLD_BANK".to_string(),
                            result: AttemptResult::Failed("HTTP 503".to_string()),
                        },
                        SourceAttempt {
                            adapter: "LOCAL_CSV".to_string(),
                            result: AttemptResult::Records(12),
                        },
                    ],
                },
                SourceUsage {
                    indicator_code: "health.pm25_exposure".to_string(),
                    source: "NONE".to_string(),
                    records: 0,
                    used_fallback: false,
                    attempts: vec![SourceAttempt {
                        adapter: "WORLD_BANK".to_string(),
                        result: AttemptResult::Empty,
                    }],
                },
            ],
            write: WriteSummary {
                attempted: 12,
                written: 8,
                skipped: 0,
                failed: vec![BatchFailure {
                    offset: 8,
                    len: 4,
                    error: "write rejected: boom".to_string(),
                }],
            },
        }),
        derive: None,
        score: Some(ScoreReport {
            scoring_year: 2022,
            scored: 1,
            excluded: vec![Exclusion {
                country: "TCD".to_string(),
                reason: ExclusionReason::InsufficientDomains {
                    present: vec![Domain::Nature],
                    missing: vec![
                        Domain::Emissions,
                        Domain::Energy,
                        Domain::Economy,
                        Domain::Health,
                    ],
                    required: 3,
                },
            }],
            grade_distribution: vec![("A".to_string(), 1)],
            top: vec![RankedCountry {
                country: "DEU".to_string(),
                total: 81.2,
                grade: "A".to_string(),
            }],
            bottom: vec![],
            removed: 0,
            delete_failures: vec![],
            write: WriteSummary::default(),
        }),
        validate: Some(QaReport {
            checks: vec![CheckResult {
                name: "year_range",
                status: CheckStatus::Pass,
                details: "all years within 2000:2024".to_string(),
            }],
        }),
    }
}

#[test]
fn markdown_report_lists_fallbacks_exclusions_and_failed_batches() {
    let summary = summary();

    let markdown = render_markdown(&summary);

    assert!(markdown.contains("| nature.forest_area | LOCAL_CSV | 12 |"));
    assert!(markdown.contains("WORLD_BANK (failed: HTTP 503) -> LOCAL_CSV (12 records)"));
    assert!(markdown.contains("| health.pm25_exposure | NONE | 0 |"));
    assert!(markdown.contains("batch at offset 8 (4 rows)"));
    assert!(markdown.contains("TCD: 1 of 5 domains present (need 3)"));
    assert!(markdown.contains("1. DEU 81.2 (A)"));
    assert!(markdown.contains("## QA: PASS"));
}

#[test]
fn failed_batches_are_surfaced_in_summary() {
    assert!(summary().has_write_failures());
}
