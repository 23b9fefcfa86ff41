//! Stage handlers: ingest, derive, score, validate.
//!
//! Each handler reads what it needs back from the store, so stages can also
//! run as independent batch jobs.

use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, info, warn};

use crate::db::{DeleteFilter, ValueFilter};
use crate::error::PipelineError;
use crate::jobs::context::PipelineContext;
use crate::jobs::types::{
    DeriveReport, DerivedResult, IngestReport, RankedCountry, ScoreReport, SourceUsage,
};
use crate::models::ObservedValue;
use crate::quality::{self, QaConfig, QaReport};
use crate::scoring::ScoringEngine;

const RANKING_SIZE: usize = 5;

/// Register catalog entries. Failures are logged; the catalog is metadata only.
async fn register_catalog(ctx: &PipelineContext) -> usize {
    let mut updates = 0;
    for definition in ctx.catalog() {
        match ctx.store.upsert_indicator(&definition).await {
            Ok(true) => updates += 1,
            Ok(false) => {}
            Err(e) => {
                warn!(indicator = %definition.code, error = %e, "Failed to register indicator")
            }
        }
    }
    updates
}

/// Fetch every catalog indicator through its fallback chain and persist the result.
pub async fn run_ingest(ctx: &PipelineContext) -> Result<IngestReport, PipelineError> {
    let start = Instant::now();

    let countries: BTreeSet<String> = ctx
        .store
        .list_countries()
        .await?
        .into_iter()
        .map(|c| c.iso3)
        .collect();
    if countries.is_empty() {
        return Err(PipelineError::NoCountries);
    }
    info!(
        countries = countries.len(),
        indicators = ctx.chains.len(),
        years = %ctx.config.years,
        "Ingest: fetching {} indicators for {} countries",
        ctx.chains.len(),
        countries.len()
    );

    let catalog_updates = register_catalog(ctx).await;

    let down = ctx.orchestrator.probe(&ctx.chains).await;
    let outcomes = ctx
        .orchestrator
        .run_all(&ctx.chains, Arc::new(countries.clone()), ctx.config.years, &down)
        .await;

    let indicators: Vec<SourceUsage> = outcomes.iter().map(SourceUsage::from).collect();
    let records: Vec<ObservedValue> = outcomes.into_iter().flat_map(|o| o.records).collect();
    let write = ctx.gateway.upsert(records).await;

    info!(
        written = write.written,
        failed_batches = write.failed.len(),
        elapsed_ms = start.elapsed().as_millis() as u64,
        "Ingest: wrote {} rows",
        write.written
    );

    Ok(IngestReport {
        countries: countries.len(),
        catalog_updates,
        sources_down: down.into_iter().collect(),
        indicators,
        write,
    })
}

/// Regenerate each derived indicator from the persisted raw series.
///
/// Old rows of a code are deleted before its new rows are written. When the
/// delete fails the code is left untouched rather than mixed with stale rows.
pub async fn run_derive(ctx: &PipelineContext) -> Result<DeriveReport, PipelineError> {
    let inputs: BTreeSet<String> = ctx.derivations.iter().flat_map(|d| d.inputs()).collect();
    let rows = ctx
        .store
        .select_values(&ValueFilter::codes(inputs).with_years(ctx.config.years))
        .await?;
    debug!(rows = rows.len(), "Derive: loaded input rows");

    let mut report = DeriveReport {
        input_rows: rows.len(),
        indicators: Vec::with_capacity(ctx.derivations.len()),
    };

    for derivation in &ctx.derivations {
        let code = derivation.code().to_string();
        let derived = derivation.derive(&rows);

        let removed = match ctx.gateway.delete_where(&DeleteFilter::code(code.clone())).await {
            Ok(removed) => removed,
            Err(e) => {
                warn!(indicator = %code, error = %e, "Derive: could not clear old rows, skipping");
                report.indicators.push(DerivedResult {
                    indicator_code: code,
                    rows: derived.len(),
                    removed: 0,
                    write: None,
                    error: Some(e.to_string()),
                });
                continue;
            }
        };

        let rows_out = derived.len();
        let write = ctx.gateway.upsert(derived).await;
        info!(
            indicator = %code,
            rows = rows_out,
            removed,
            written = write.written,
            "Derive: regenerated {}",
            code
        );
        report.indicators.push(DerivedResult {
            indicator_code: code,
            rows: rows_out,
            removed,
            write: Some(write),
            error: None,
        });
    }

    Ok(report)
}

/// Score every country for the configured scoring year and replace the
/// year's report card rows.
pub async fn run_score(ctx: &PipelineContext) -> Result<ScoreReport, PipelineError> {
    let engine = ScoringEngine::new(ctx.scoring.clone());
    let year = ctx.scoring.scoring_year;

    let rows = ctx
        .store
        .select_values(
            &ValueFilter::codes(ctx.scoring.model.indicator_codes()).with_years(ctx.scoring_window()),
        )
        .await?;
    let outcome = engine.score(&rows);
    info!(
        scoring_year = year,
        scored = outcome.cards.len(),
        excluded = outcome.excluded.len(),
        "Score: scored {} countries, excluded {}",
        outcome.cards.len(),
        outcome.excluded.len()
    );

    let mut removed = 0;
    let mut delete_failures = Vec::new();
    for code in ctx.scoring.score_codes() {
        match ctx
            .gateway
            .delete_where(&DeleteFilter::code_in_year(code.clone(), year))
            .await
        {
            Ok(n) => removed += n,
            Err(e) => {
                warn!(indicator = %code, year, error = %e, "Score: could not clear old scores");
                delete_failures.push(code);
            }
        }
    }

    let write = ctx.gateway.upsert(engine.to_observations(&outcome)).await;

    let ranked = outcome.ranked();
    let top = ranked.iter().take(RANKING_SIZE).map(|c| RankedCountry::from(*c)).collect();
    let bottom = ranked
        .iter()
        .rev()
        .take(RANKING_SIZE)
        .map(|c| RankedCountry::from(*c))
        .collect();

    Ok(ScoreReport {
        scoring_year: year,
        scored: outcome.cards.len(),
        grade_distribution: outcome.grade_distribution(&ctx.scoring.grades),
        excluded: outcome.excluded,
        top,
        bottom,
        removed,
        delete_failures,
        write,
    })
}

/// Read-only QA pass over the whole fact table.
pub async fn run_validate(ctx: &PipelineContext) -> Result<QaReport, PipelineError> {
    let rows = ctx.store.select_values(&ValueFilter::all()).await?;
    let countries = ctx.store.list_countries().await?;
    let config = QaConfig {
        years: ctx.config.years,
        missing_threshold: ctx.config.qa_missing_threshold,
    };

    let report = quality::validate(&rows, &countries, &ctx.raw_codes(), &config);
    for check in &report.checks {
        info!(check = check.name, status = %check.status, "QA {}: {} ({})", check.name, check.status, check.details);
    }
    Ok(report)
}
