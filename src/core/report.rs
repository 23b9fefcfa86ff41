//! Run summary output: structured log lines and an optional markdown report.

use std::fmt::Write;

use tracing::{info, warn};

use crate::core::runtime::RunSummary;
use crate::db::WriteSummary;
use crate::jobs::SourceUsage;
use crate::quality::CheckStatus;
use crate::services::{AttemptResult, SourceAttempt};

fn describe_attempt(attempt: &SourceAttempt) -> String {
    match &attempt.result {
        AttemptResult::Records(n) => format!("{} ({} records)", attempt.adapter, n),
        AttemptResult::Empty => format!("{} (empty)", attempt.adapter),
        AttemptResult::Failed(e) => format!("{} (failed: {})", attempt.adapter, e),
        AttemptResult::Skipped => format!("{} (skipped, probe failed)", attempt.adapter),
    }
}

fn describe_attempts(usage: &SourceUsage) -> String {
    usage
        .attempts
        .iter()
        .map(describe_attempt)
        .collect::<Vec<_>>()
        .join(" -> ")
}

fn log_write(stage: &str, write: &WriteSummary) {
    for failure in &write.failed {
        warn!(
            stage,
            offset = failure.offset,
            rows = failure.len,
            error = %failure.error,
            "{}: batch at offset {} failed",
            stage,
            failure.offset
        );
    }
}

/// Emit the summary through `tracing`.
pub fn log_summary(summary: &RunSummary) {
    if let Some(ingest) = &summary.ingest {
        for usage in &ingest.indicators {
            if usage.records == 0 {
                warn!(
                    indicator = %usage.indicator_code,
                    source = %usage.source,
                    attempts = %describe_attempts(usage),
                    "No data for {}",
                    usage.indicator_code
                );
            } else if usage.used_fallback {
                info!(
                    indicator = %usage.indicator_code,
                    source = %usage.source,
                    attempts = %describe_attempts(usage),
                    "{} fell back to {}",
                    usage.indicator_code,
                    usage.source
                );
            } else {
                info!(indicator = %usage.indicator_code, source = %usage.source, records = usage.records);
            }
        }
        log_write("ingest", &ingest.write);
    }

    if let Some(derive) = &summary.derive {
        for result in &derive.indicators {
            match (&result.write, &result.error) {
                (Some(write), _) => {
                    info!(indicator = %result.indicator_code, rows = result.rows, written = write.written);
                    log_write("derive", write);
                }
                (None, error) => warn!(
                    indicator = %result.indicator_code,
                    error = error.as_deref().unwrap_or("unknown"),
                    "Derived indicator not regenerated"
                ),
            }
        }
    }

    if let Some(score) = &summary.score {
        for exclusion in &score.excluded {
            info!(country = %exclusion.country, reason = %exclusion.reason, "Excluded from scoring");
        }
        let distribution = score
            .grade_distribution
            .iter()
            .map(|(letter, n)| format!("{}={}", letter, n))
            .collect::<Vec<_>>()
            .join(" ");
        info!(
            scoring_year = score.scoring_year,
            scored = score.scored,
            excluded = score.excluded.len(),
            grades = %distribution,
            "Scoring summary"
        );
        for (rank, country) in score.top.iter().enumerate() {
            info!(rank = rank + 1, country = %country.country, total = country.total, grade = %country.grade, "Top");
        }
        for country in &score.bottom {
            info!(country = %country.country, total = country.total, grade = %country.grade, "Bottom");
        }
        log_write("score", &score.write);
    }

    if let Some(qa) = &summary.validate {
        let overall = qa.overall();
        if overall == CheckStatus::Fail {
            warn!(status = %overall, "QA finished with failures");
        } else {
            info!(status = %overall, "QA finished");
        }
    }
}

fn write_summary_line(out: &mut String, write: &WriteSummary) {
    let _ = writeln!(
        out,
        "- rows written: {} of {} ({} failed batches, {} non-finite skipped)",
        write.written,
        write.attempted,
        write.failed.len(),
        write.skipped
    );
    for failure in &write.failed {
        let _ = writeln!(
            out,
            "  - batch at offset {} ({} rows): {}",
            failure.offset, failure.len, failure.error
        );
    }
}

/// Render the summary as a markdown document.
pub fn render_markdown(summary: &RunSummary) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "# Report card run\n");
    let _ = writeln!(
        out,
        "Started {} · finished {}\n",
        summary.started_at.to_rfc3339(),
        summary.finished_at.to_rfc3339()
    );

    if let Some(ingest) = &summary.ingest {
        let _ = writeln!(out, "## Ingestion\n");
        let _ = writeln!(out, "- countries: {}", ingest.countries);
        if !ingest.sources_down.is_empty() {
            let _ = writeln!(out, "- skipped sources: {}", ingest.sources_down.join(", "));
        }
        write_summary_line(&mut out, &ingest.write);
        let _ = writeln!(out, "\n| Indicator | Source | Records | Attempts |");
        let _ = writeln!(out, "|---|---|---|---|");
        for usage in &ingest.indicators {
            let _ = writeln!(
                out,
                "| {} | {} | {} | {} |",
                usage.indicator_code,
                usage.source,
                usage.records,
                describe_attempts(usage)
            );
        }
        out.push('\n');
    }

    if let Some(derive) = &summary.derive {
        let _ = writeln!(out, "## Derived indicators\n");
        for result in &derive.indicators {
            match &result.error {
                Some(error) => {
                    let _ = writeln!(out, "- {}: not regenerated ({})", result.indicator_code, error);
                }
                None => {
                    let _ = writeln!(
                        out,
                        "- {}: {} rows (replaced {})",
                        result.indicator_code, result.rows, result.removed
                    );
                }
            }
        }
        out.push('\n');
    }

    if let Some(score) = &summary.score {
        let _ = writeln!(out, "## Scores ({})\n", score.scoring_year);
        let _ = writeln!(out, "- scored: {}", score.scored);
        let _ = writeln!(out, "- excluded: {}", score.excluded.len());
        write_summary_line(&mut out, &score.write);

        let _ = writeln!(out, "\n| Grade | Countries |\n|---|---|");
        for (letter, n) in &score.grade_distribution {
            let _ = writeln!(out, "| {} | {} |", letter, n);
        }

        let _ = writeln!(out, "\n### Top\n");
        for (rank, country) in score.top.iter().enumerate() {
            let _ = writeln!(
                out,
                "{}. {} {:.1} ({})",
                rank + 1,
                country.country,
                country.total,
                country.grade
            );
        }
        let _ = writeln!(out, "\n### Bottom\n");
        for country in &score.bottom {
            let _ = writeln!(out, "- {} {:.1} ({})", country.country, country.total, country.grade);
        }

        if !score.excluded.is_empty() {
            let _ = writeln!(out, "\n### Excluded\n");
            for exclusion in &score.excluded {
                let _ = writeln!(out, "- {}: {}", exclusion.country, exclusion.reason);
            }
        }
        out.push('\n');
    }

    if let Some(qa) = &summary.validate {
        let _ = writeln!(out, "## QA: {}\n", qa.overall());
        let _ = writeln!(out, "| Check | Status | Details |\n|---|---|---|");
        for check in &qa.checks {
            let _ = writeln!(out, "| {} | {} | {} |", check.name, check.status, check.details);
        }
    }

    out
}
