//! Everything a stage handler needs, built once per run.

use std::sync::Arc;

use crate::config::PipelineConfig;
use crate::db::{IndicatorStore, PersistenceGateway};
use crate::error::PipelineError;
use crate::indicators::derived::{default_derivations, DerivedIndicator};
use crate::indicators::registry::{default_catalog, filter_catalog};
use crate::models::{IndicatorDefinition, YearRange, REPORT_SOURCE};
use crate::scoring::{ScoringConfig, GRADE_CODE, TOTAL_SCORE_CODE};
use crate::services::{
    build_chains, build_http_client, AdapterSettings, FallbackChain, FallbackOrchestrator,
    RetryPolicy,
};

pub struct PipelineContext {
    pub config: PipelineConfig,
    pub store: Arc<dyn IndicatorStore>,
    pub gateway: PersistenceGateway,
    pub orchestrator: FallbackOrchestrator,
    pub chains: Vec<FallbackChain>,
    pub derivations: Vec<DerivedIndicator>,
    pub scoring: ScoringConfig,
}

impl PipelineContext {
    /// Wire up adapters from the default catalog. `only` restricts ingestion
    /// to the given indicator codes when non-empty.
    pub fn from_config(
        config: PipelineConfig,
        store: Arc<dyn IndicatorStore>,
        only: &[String],
    ) -> Result<Self, PipelineError> {
        let settings = AdapterSettings {
            client: build_http_client(config.request_timeout)?,
            world_bank_base_url: config.endpoints.world_bank_base_url.clone(),
            page_delay: config.page_delay,
        };
        let catalog = filter_catalog(default_catalog(&config.endpoints), only);
        let chains = build_chains(&catalog, &settings);
        Ok(Self::new(config, store, chains))
    }

    /// Context over explicit chains, with the default derivations and scoring model.
    pub fn new(
        config: PipelineConfig,
        store: Arc<dyn IndicatorStore>,
        chains: Vec<FallbackChain>,
    ) -> Self {
        let gateway = PersistenceGateway::new(store.clone(), config.write_batch_size);
        let orchestrator = FallbackOrchestrator::new(
            RetryPolicy::new(config.retry_max_retries, config.retry_delay),
            config.fetch_concurrency,
        );
        let scoring = ScoringConfig::new(config.scoring_year, config.years.start);
        Self {
            config,
            store,
            gateway,
            orchestrator,
            chains,
            derivations: default_derivations(),
            scoring,
        }
    }

    pub fn with_scoring(mut self, scoring: ScoringConfig) -> Self {
        self.scoring = scoring;
        self
    }

    pub fn with_derivations(mut self, derivations: Vec<DerivedIndicator>) -> Self {
        self.derivations = derivations;
        self
    }

    /// Codes ingested from upstream sources.
    pub fn raw_codes(&self) -> Vec<String> {
        self.chains.iter().map(|c| c.indicator.code.clone()).collect()
    }

    /// Years the scoring stage reads: `MIN_YEAR` through the scoring year.
    pub fn scoring_window(&self) -> YearRange {
        YearRange::new(self.scoring.min_year, self.scoring.scoring_year)
    }

    /// Catalog entries for raw, derived and report card codes.
    pub fn catalog(&self) -> Vec<IndicatorDefinition> {
        let raw = self.chains.iter().map(|c| c.indicator.clone());
        let derived = self.derivations.iter().map(|d| d.definition.clone());
        let domains = self.scoring.model.domains().iter().map(|d| {
            IndicatorDefinition::new(
                d.domain.score_code(),
                &format!("{} score", d.domain),
                "score (0-100)",
                REPORT_SOURCE,
                "report",
            )
        });
        let summary = [
            IndicatorDefinition::new(
                TOTAL_SCORE_CODE,
                "Total score",
                "score (0-100)",
                REPORT_SOURCE,
                "report",
            ),
            IndicatorDefinition::new(GRADE_CODE, "Grade", "numeric grade", REPORT_SOURCE, "report"),
        ];
        raw.chain(derived).chain(domains).chain(summary).collect()
    }
}
