//! Normalization, weighted aggregation and grading.

pub mod aggregation;
pub mod domains;
pub mod engine;
pub mod grades;
pub mod normalize;

pub use domains::{Domain, DomainConfig, ScoringModel, WeightedIndicator};
pub use engine::{
    Exclusion, ExclusionReason, ReportCard, ScoringConfig, ScoringEngine, ScoringOutcome,
    GRADE_CODE, TOTAL_SCORE_CODE,
};
pub use grades::{Grade, GradeTable};
pub use normalize::Direction;
