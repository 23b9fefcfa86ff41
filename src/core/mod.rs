//! Core application primitives (stage runner, run summary)

pub mod report;
pub mod runtime;

pub use report::{log_summary, render_markdown};
pub use runtime::{PipelineRuntime, RunSummary, Stage};
