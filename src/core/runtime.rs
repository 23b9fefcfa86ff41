//! Sequential stage runner.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::info;

use crate::error::PipelineError;
use crate::jobs::{self, DeriveReport, IngestReport, PipelineContext, ScoreReport};
use crate::quality::QaReport;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub enum Stage {
    Ingest,
    Derive,
    Score,
    Validate,
}

impl Stage {
    /// Full run order.
    pub fn all() -> [Stage; 4] {
        [Stage::Ingest, Stage::Derive, Stage::Score, Stage::Validate]
    }

    pub fn name(&self) -> &'static str {
        match self {
            Stage::Ingest => "ingest",
            Stage::Derive => "derive",
            Stage::Score => "score",
            Stage::Validate => "validate",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Stage {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Stage::all()
            .into_iter()
            .find(|stage| stage.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("Unknown stage: {}", s))
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub ingest: Option<IngestReport>,
    pub derive: Option<DeriveReport>,
    pub score: Option<ScoreReport>,
    pub validate: Option<QaReport>,
}

impl RunSummary {
    fn started() -> Self {
        let now = Utc::now();
        Self {
            started_at: now,
            finished_at: now,
            ingest: None,
            derive: None,
            score: None,
            validate: None,
        }
    }

    /// True when some batch write failed in any stage.
    pub fn has_write_failures(&self) -> bool {
        let ingest = self.ingest.as_ref().is_some_and(|r| !r.write.is_complete());
        let derive = self.derive.as_ref().is_some_and(|r| {
            r.indicators
                .iter()
                .any(|d| d.error.is_some() || d.write.as_ref().is_some_and(|w| !w.is_complete()))
        });
        let score = self
            .score
            .as_ref()
            .is_some_and(|r| !r.write.is_complete() || !r.delete_failures.is_empty());
        ingest || derive || score
    }
}

pub struct PipelineRuntime {
    context: PipelineContext,
}

impl PipelineRuntime {
    pub fn new(context: PipelineContext) -> Self {
        Self { context }
    }

    pub fn context(&self) -> &PipelineContext {
        &self.context
    }

    /// Run `stages` in the given order. Only [`PipelineError`]s stop the run.
    pub async fn run(&self, stages: &[Stage]) -> Result<RunSummary, PipelineError> {
        let mut summary = RunSummary::started();

        for stage in stages {
            info!(stage = %stage, "Starting stage {}", stage);
            match stage {
                Stage::Ingest => summary.ingest = Some(jobs::run_ingest(&self.context).await?),
                Stage::Derive => summary.derive = Some(jobs::run_derive(&self.context).await?),
                Stage::Score => summary.score = Some(jobs::run_score(&self.context).await?),
                Stage::Validate => summary.validate = Some(jobs::run_validate(&self.context).await?),
            }
        }

        summary.finished_at = Utc::now();
        Ok(summary)
    }
}
