pub mod derived;
pub mod parser;
pub mod registry;

pub use derived::{
    default_derivations, series_for, DerivedIndicator, Formula, GrowthComparison, RatioDerivation,
    Series,
};
pub use parser::*;
pub use registry::{default_catalog, filter_catalog, IndicatorSpec, SourceSpec};
