//! Climate & economy report card pipeline.
//!
//! Ingests indicator series from heterogeneous upstream sources, derives
//! computed indicators, and scores every tracked country into a weighted,
//! graded report card.

pub mod config;
pub mod core;
pub mod db;
pub mod error;
pub mod indicators;
pub mod jobs;
pub mod logging;
pub mod models;
pub mod quality;
pub mod scoring;
pub mod services;

pub use error::{ConfigError, PipelineError, SourceError, StoreError};
