//! Pipeline stages as batch jobs.

pub mod context;
pub mod handlers;
pub mod types;

pub use context::PipelineContext;
pub use handlers::{run_derive, run_ingest, run_score, run_validate};
pub use types::{DeriveReport, DerivedResult, IngestReport, RankedCountry, ScoreReport, SourceUsage};
